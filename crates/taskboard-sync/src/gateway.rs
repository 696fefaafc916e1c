//! Where requests go: straight to a [`TaskStore`] or over HTTP to the server.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::api::{
    ErrorBody, StatusPayload, AUTH_EMAIL_HEADER, AUTH_NAME_HEADER, AUTH_USER_HEADER,
};
use taskboard_domain::{BoardColumns, StatusName, Task, TaskDraft, TaskId};
use taskboard_persistence::{Identity, TaskStore};

/// Remote task operations as seen by the client.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn fetch_board(&self) -> TaskboardResult<BoardColumns>;
    async fn fetch_canceled(&self) -> TaskboardResult<Vec<Task>>;
    async fn create_task(&self, draft: TaskDraft) -> TaskboardResult<Task>;
    async fn update_task(&self, task_id: &TaskId, draft: TaskDraft) -> TaskboardResult<Task>;
    async fn update_status(&self, task_id: &TaskId, status: StatusName) -> TaskboardResult<()>;
    async fn delete_task(&self, task_id: &TaskId) -> TaskboardResult<()>;
}

/// Gateway that talks to a store in the same process.
pub struct StoreGateway {
    store: Arc<dyn TaskStore>,
    identity: Option<Identity>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn TaskStore>, identity: Option<Identity>) -> Self {
        Self { store, identity }
    }

    fn identity(&self) -> TaskboardResult<&Identity> {
        self.identity.as_ref().ok_or(TaskboardError::Unauthorized)
    }
}

#[async_trait]
impl TaskGateway for StoreGateway {
    async fn fetch_board(&self) -> TaskboardResult<BoardColumns> {
        self.store.fetch_board(self.identity()?).await
    }

    async fn fetch_canceled(&self) -> TaskboardResult<Vec<Task>> {
        self.store.fetch_canceled(self.identity()?).await
    }

    async fn create_task(&self, draft: TaskDraft) -> TaskboardResult<Task> {
        self.store.create_task(self.identity()?, draft).await
    }

    async fn update_task(&self, task_id: &TaskId, draft: TaskDraft) -> TaskboardResult<Task> {
        self.store.update_task(self.identity()?, task_id, draft).await
    }

    async fn update_status(&self, task_id: &TaskId, status: StatusName) -> TaskboardResult<()> {
        self.store
            .update_status(self.identity()?, task_id, status)
            .await
    }

    async fn delete_task(&self, task_id: &TaskId) -> TaskboardResult<()> {
        self.store.delete_task(self.identity()?, task_id).await
    }
}

/// Gateway for the taskboard HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    identity: Option<Identity>,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        identity: Option<Identity>,
        timeout: Duration,
    ) -> TaskboardResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TaskboardError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            identity,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/tasks{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let Some(identity) = &self.identity else {
            return request;
        };
        let mut request = request.header(AUTH_USER_HEADER, &identity.subject);
        if let Some(name) = &identity.name {
            request = request.header(AUTH_NAME_HEADER, name);
        }
        if let Some(email) = &identity.email {
            request = request.header(AUTH_EMAIL_HEADER, email);
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> TaskboardResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TaskboardError::Transport(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(error_from_response(response).await)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> TaskboardResult<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| TaskboardError::Serialization(e.to_string()))
    }
}

async fn error_from_response(response: Response) -> TaskboardError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    tracing::debug!(status = status.as_u16(), "Request failed: {}", message);

    match status {
        StatusCode::UNAUTHORIZED => TaskboardError::Unauthorized,
        StatusCode::BAD_REQUEST => TaskboardError::Validation(message),
        StatusCode::NOT_FOUND => TaskboardError::NotFound(message),
        _ => TaskboardError::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl TaskGateway for HttpGateway {
    async fn fetch_board(&self) -> TaskboardResult<BoardColumns> {
        self.send_json(self.client.get(self.url(""))).await
    }

    async fn fetch_canceled(&self) -> TaskboardResult<Vec<Task>> {
        self.send_json(self.client.get(self.url("/canceled"))).await
    }

    async fn create_task(&self, draft: TaskDraft) -> TaskboardResult<Task> {
        self.send_json(self.client.post(self.url("")).json(&draft))
            .await
    }

    async fn update_task(&self, task_id: &TaskId, draft: TaskDraft) -> TaskboardResult<Task> {
        let url = self.url(&format!("/{}", task_id));
        self.send_json(self.client.put(url).json(&draft)).await
    }

    async fn update_status(&self, task_id: &TaskId, status: StatusName) -> TaskboardResult<()> {
        let url = self.url(&format!("/{}", task_id));
        let payload = StatusPayload {
            new_status_name: status.as_str().to_string(),
        };
        self.send(self.client.patch(url).json(&payload)).await?;
        Ok(())
    }

    async fn delete_task(&self, task_id: &TaskId) -> TaskboardResult<()> {
        let url = self.url(&format!("/{}", task_id));
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_persistence::MemoryStore;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(
            server.uri(),
            Some(Identity::new("alice")),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_board_sends_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .and(header(AUTH_USER_HEADER, "alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ToDo": [{"id": "1", "title": "Write"}],
                "Doing": [],
                "Done": []
            })))
            .mount(&server)
            .await;

        let board = gateway(&server).fetch_board().await.unwrap();
        assert_eq!(board.todo.len(), 1);
        assert_eq!(board.todo[0].id, TaskId::from(1));
    }

    #[tokio::test]
    async fn test_update_status_payload() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/tasks/4"))
            .and(body_json(serde_json::json!({"newStatusName": "canceled"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server)
            .update_status(&TaskId::from(4), StatusName::Canceled)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_status_codes_map_to_errors() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/tasks/1"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "Task 1 not found"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/tasks/2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/tasks"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "Title is required"})),
            )
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        match gateway.delete_task(&TaskId::from(1)).await {
            Err(TaskboardError::NotFound(message)) => assert_eq!(message, "Task 1 not found"),
            other => panic!("unexpected result {:?}", other),
        }
        match gateway.delete_task(&TaskId::from(2)).await {
            Err(TaskboardError::Remote { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "busy");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            gateway.create_task(TaskDraft::new("x")).await,
            Err(TaskboardError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tasks/canceled"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "Unauthorized"})),
            )
            .mount(&server)
            .await;

        let anonymous = HttpGateway::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            anonymous.fetch_canceled().await,
            Err(TaskboardError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let gateway =
            HttpGateway::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
        assert!(matches!(
            gateway.fetch_board().await,
            Err(TaskboardError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_store_gateway_requires_identity() {
        let store: Arc<dyn TaskStore> = Arc::new(MemoryStore::new());
        let anonymous = StoreGateway::new(store.clone(), None);
        assert!(matches!(
            anonymous.fetch_board().await,
            Err(TaskboardError::Unauthorized)
        ));

        let gateway = StoreGateway::new(store, Some(Identity::new("alice")));
        let task = gateway.create_task(TaskDraft::new("local")).await.unwrap();
        gateway
            .update_status(&task.id, StatusName::Done)
            .await
            .unwrap();
        assert_eq!(gateway.fetch_board().await.unwrap().done, vec![task]);
    }
}
