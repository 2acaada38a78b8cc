//! Event broadcast (§4.8.4). Grounded on the teacher's `factory::ws::WsMessage`
//! tagged enum plus `broadcast_message()` — same shape, minus the websocket
//! transport, since GUI/control-UI wiring is out of scope for the core; the
//! core only needs to be able to publish, not to own any transport.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::state_machine::LoopState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    StateChanged {
        from: LoopState,
        to: LoopState,
        phase: Option<String>,
        cycle_id: Option<String>,
    },
    PhaseComplete {
        phase: String,
        cycle_id: String,
        cycle_number: u64,
        success: bool,
        cost_usd: f64,
        error: Option<String>,
    },
    TaskUpdate {
        task_id: String,
        state: String,
    },
    ApprovalRequired {
        task_id: String,
        title: String,
    },
    CostAlert {
        level: String,
        message: String,
    },
    BudgetExceeded {
        level: String,
        reason: String,
    },
}

const CHANNEL_CAPACITY: usize = 256;

/// Shared handle so the Orchestrator can publish without owning any
/// particular consumer (GUI, CLI, webhook relay — all out of scope here).
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Publishing is best-effort: no subscribers is not an error (§2 item 9
    /// — the Orchestrator must be able to publish but need not subscribe).
    pub fn publish(&self, event: EngineEvent) {
        let _ = self.sender.send(event);
    }
}
