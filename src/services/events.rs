//! Refresh signal for views that render round state.
//!
//! Services publish a [`LotteryEvent`] after each committed change; the SSE
//! endpoint forwards them to connected clients.

use serde::Serialize;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LotteryEvent {
    RoundStarted { round_id: i32 },
    LockToggled { round_id: i32, is_locked: bool },
    TicketsClaimed { round_id: i32, numbers: Vec<i32> },
    WinnerDrawn { round_id: i32, number: i32 },
}

#[derive(Clone)]
pub struct RoundEvents {
    sender: broadcast::Sender<LotteryEvent>,
}

impl Default for RoundEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RoundEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fan out to current subscribers; with none the event is dropped
    pub fn publish(&self, event: LotteryEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("No refresh subscribers connected");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LotteryEvent> {
        self.sender.subscribe()
    }
}
