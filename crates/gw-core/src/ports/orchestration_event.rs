use crate::orchestration::OrchestrationState;

#[async_trait::async_trait]
pub trait OrchestrationEventPort: Send + Sync {
    async fn emit_state_changed(&self, state: OrchestrationState);
}
