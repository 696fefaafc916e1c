pub mod driver;
pub mod gateway;
pub mod intent;
pub mod reconciler;

pub use driver::{dispatch, SyncClient};
pub use gateway::{HttpGateway, StoreGateway, TaskGateway};
pub use intent::{
    Intent, RequestToken, Resolution, SyncOperation, SyncRequest, SyncResponse, TaskAspect,
};
pub use reconciler::{PendingMutation, Reconciler};
