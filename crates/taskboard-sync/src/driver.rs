use crate::gateway::TaskGateway;
use crate::intent::{Intent, Resolution, SyncOperation, SyncRequest, SyncResponse};
use crate::reconciler::Reconciler;
use std::sync::Arc;
use taskboard_core::TaskboardResult;
use taskboard_domain::{BoardColumns, DragOutcome};

/// Send one operation through a gateway.
///
/// Free-standing so an event loop can run it on a spawned task while keeping
/// the reconciler to itself.
pub async fn dispatch(
    gateway: &dyn TaskGateway,
    operation: SyncOperation,
) -> TaskboardResult<SyncResponse> {
    match operation {
        SyncOperation::Create { draft, .. } => {
            gateway.create_task(draft).await.map(SyncResponse::Created)
        }
        SyncOperation::UpdateContent { task_id, draft } => gateway
            .update_task(&task_id, draft)
            .await
            .map(SyncResponse::Updated),
        SyncOperation::UpdateStatus { task_id, status } => {
            gateway.update_status(&task_id, status).await?;
            Ok(SyncResponse::Ack)
        }
        SyncOperation::Delete { task_id } => {
            gateway.delete_task(&task_id).await?;
            Ok(SyncResponse::Ack)
        }
    }
}

/// A reconciler paired with the gateway its requests go through. Requests
/// are awaited one at a time.
pub struct SyncClient {
    gateway: Arc<dyn TaskGateway>,
    reconciler: Reconciler,
}

impl SyncClient {
    pub fn new(gateway: Arc<dyn TaskGateway>, authenticated: bool) -> Self {
        Self {
            gateway,
            reconciler: Reconciler::new(authenticated),
        }
    }

    pub fn gateway(&self) -> Arc<dyn TaskGateway> {
        Arc::clone(&self.gateway)
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut Reconciler {
        &mut self.reconciler
    }

    pub async fn dispatch(&self, request: &SyncRequest) -> TaskboardResult<SyncResponse> {
        dispatch(self.gateway.as_ref(), request.operation.clone()).await
    }

    /// Load the visible board and the canceled bucket. Without a signed-in
    /// user the board is simply empty.
    pub async fn refresh(&mut self) -> TaskboardResult<()> {
        if !self.reconciler.is_authenticated() {
            self.reconciler.load_board(BoardColumns::new())?;
            return self.reconciler.load_canceled(Vec::new());
        }
        let columns = self.gateway.fetch_board().await?;
        let canceled = self.gateway.fetch_canceled().await?;
        tracing::debug!(
            visible = columns.task_count(),
            canceled = canceled.len(),
            "Refreshed board"
        );
        self.reconciler.load_board(columns)?;
        self.reconciler.load_canceled(canceled)
    }

    /// Apply an intent, send its request and fold the answer back in.
    pub async fn execute(&mut self, intent: Intent) -> TaskboardResult<Resolution> {
        let request = self.reconciler.begin(intent)?;
        self.settle(request).await
    }

    pub async fn execute_drag(&mut self, outcome: DragOutcome) -> TaskboardResult<Resolution> {
        let request = self.reconciler.commit_drag(outcome)?;
        self.settle(request).await
    }

    async fn settle(&mut self, request: Option<SyncRequest>) -> TaskboardResult<Resolution> {
        let Some(request) = request else {
            return Ok(Resolution::Committed);
        };
        let result = self.dispatch(&request).await;
        Ok(self.reconciler.complete(request.token, result))
    }
}
