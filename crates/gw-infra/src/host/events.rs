use async_trait::async_trait;
use gw_core::orchestration::OrchestrationState;
use gw_core::ports::OrchestrationEventPort;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

/// Fans orchestration state changes out to every subscriber.
///
/// Emitting with no subscribers is not an error; the state is simply dropped.
pub struct BroadcastEvents {
    sender: broadcast::Sender<OrchestrationState>,
}

impl BroadcastEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrchestrationState> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrchestrationEventPort for BroadcastEvents {
    async fn emit_state_changed(&self, state: OrchestrationState) {
        if self.sender.send(state).is_err() {
            debug!("no subscriber for orchestration state change");
        }
    }
}
