//! Shapes shared by the HTTP server and its client.

use serde::{Deserialize, Serialize};

/// Subject of the signed-in user, set by the identity provider in front of
/// the server.
pub const AUTH_USER_HEADER: &str = "x-auth-user";
pub const AUTH_NAME_HEADER: &str = "x-auth-name";
pub const AUTH_EMAIL_HEADER: &str = "x-auth-email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub new_status_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
