//! Requeue workflow: rejoining a new round after death, a win or a
//! disconnect.
//!
//! Spectators and partyless players requeue directly: send `GAME_REQUEUE`
//! and wait for the inbound `requeue` field. Players in a party instead
//! watch a queue-position stream until it delivers a ready signal with the
//! new round id. Either way, completion persists the round id and the
//! caller reloads the whole pipeline.

use crate::session::{keys, SessionStore};
use log::{info, warn};
use shared::{ClientCommand, QueueMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeueState {
    Idle,
    /// Waiting for the inbound `requeue` field on the push channel.
    Direct,
    /// Watching the queue-position stream.
    Queued,
}

/// What the surrounding loop must do to advance a rejoin request.
#[derive(Debug, PartialEq)]
pub enum RequeueAction {
    SendCommand(ClientCommand),
    OpenQueueStream { party_id: String },
}

/// Result of one queue-stream event.
#[derive(Debug, PartialEq)]
pub enum QueueStep {
    /// Position stored; switch to the waiting view, keep the stream open.
    ShowQueuePosition(u32),
    /// Ready signal; close the stream and complete the requeue.
    Ready { round_id: String },
    /// Unrecognized payload, logged and dropped.
    Ignored,
}

pub struct RequeueFlow {
    state: RequeueState,
}

impl RequeueFlow {
    pub fn new() -> Self {
        Self {
            state: RequeueState::Idle,
        }
    }

    pub fn state(&self) -> RequeueState {
        self.state
    }

    /// User asked to rejoin. Spectators and players without a party context
    /// requeue directly; party members go through the wait queue.
    pub fn request_rejoin(&mut self, store: &SessionStore) -> RequeueAction {
        match store.get(keys::PARTY_ID) {
            Some(party_id) if !store.is_spectator() => {
                self.state = RequeueState::Queued;
                RequeueAction::OpenQueueStream {
                    party_id: party_id.to_string(),
                }
            }
            _ => {
                self.state = RequeueState::Direct;
                RequeueAction::SendCommand(ClientCommand::game_requeue())
            }
        }
    }

    /// One raw JSON payload from the queue-position stream.
    pub fn handle_queue_event(&mut self, raw: &str, store: &mut SessionStore) -> QueueStep {
        let msg: QueueMessage = match serde_json::from_str(raw) {
            Ok(msg) => msg,
            Err(_) => {
                warn!("unrecognized message {}", raw);
                return QueueStep::Ignored;
            }
        };

        // a zero position is not a real position update, same as absent
        if let Some(position) = msg.queue_position.filter(|position| *position > 0) {
            store.set(keys::QUEUE_POSITION, position.to_string());
            QueueStep::ShowQueuePosition(position)
        } else if let Some(round_id) = msg.requeue {
            info!("ready to join game! Joining round {}", round_id);
            self.state = RequeueState::Direct;
            QueueStep::Ready { round_id }
        } else {
            warn!("unrecognized message {}", raw);
            QueueStep::Ignored
        }
    }

    /// Persist the new round id; the caller tears the pipeline down and
    /// reinitializes it from scratch.
    pub fn complete(&mut self, round_id: &str, store: &mut SessionStore) {
        store.set(keys::ROUND_ID, round_id);
        self.state = RequeueState::Idle;
    }
}

impl Default for RequeueFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectator_requeues_directly() {
        let mut store = SessionStore::new();
        store.set(keys::IS_SPECTATOR, "true");
        store.set(keys::PARTY_ID, "party-1");

        let mut flow = RequeueFlow::new();
        let action = flow.request_rejoin(&store);

        assert_eq!(
            action,
            RequeueAction::SendCommand(ClientCommand::game_requeue())
        );
        assert_eq!(flow.state(), RequeueState::Direct);
    }

    #[test]
    fn partyless_player_requeues_directly() {
        let store = SessionStore::new();
        let mut flow = RequeueFlow::new();

        assert_eq!(
            flow.request_rejoin(&store),
            RequeueAction::SendCommand(ClientCommand::game_requeue())
        );
    }

    #[test]
    fn party_member_goes_through_the_queue() {
        let mut store = SessionStore::new();
        store.set(keys::PARTY_ID, "party-1");

        let mut flow = RequeueFlow::new();
        let action = flow.request_rejoin(&store);

        assert_eq!(
            action,
            RequeueAction::OpenQueueStream {
                party_id: "party-1".to_string()
            }
        );
        assert_eq!(flow.state(), RequeueState::Queued);
    }

    #[test]
    fn queue_position_is_stored_and_stream_stays_open() {
        let mut store = SessionStore::new();
        store.set(keys::PARTY_ID, "party-1");
        let mut flow = RequeueFlow::new();
        flow.request_rejoin(&store);

        let step = flow.handle_queue_event(r#"{"queuePosition":3}"#, &mut store);

        assert_eq!(step, QueueStep::ShowQueuePosition(3));
        assert_eq!(store.get(keys::QUEUE_POSITION), Some("3"));
        assert_eq!(flow.state(), RequeueState::Queued);
    }

    #[test]
    fn ready_signal_carries_the_round_id() {
        let mut store = SessionStore::new();
        store.set(keys::PARTY_ID, "party-1");
        let mut flow = RequeueFlow::new();
        flow.request_rejoin(&store);

        let step = flow.handle_queue_event(r#"{"requeue":"round-42"}"#, &mut store);
        assert_eq!(
            step,
            QueueStep::Ready {
                round_id: "round-42".to_string()
            }
        );

        flow.complete("round-42", &mut store);
        assert_eq!(store.get(keys::ROUND_ID), Some("round-42"));
        assert_eq!(flow.state(), RequeueState::Idle);
    }

    #[test]
    fn zero_queue_position_is_not_a_position_update() {
        let mut store = SessionStore::new();
        store.set(keys::PARTY_ID, "party-1");
        let mut flow = RequeueFlow::new();
        flow.request_rejoin(&store);

        assert_eq!(
            flow.handle_queue_event(r#"{"queuePosition":0}"#, &mut store),
            QueueStep::Ignored
        );
        assert_eq!(store.get(keys::QUEUE_POSITION), None);
        assert_eq!(flow.state(), RequeueState::Queued);

        // a ready signal alongside a zero position still wins
        let step =
            flow.handle_queue_event(r#"{"queuePosition":0,"requeue":"round-9"}"#, &mut store);
        assert_eq!(
            step,
            QueueStep::Ready {
                round_id: "round-9".to_string()
            }
        );
    }

    #[test]
    fn garbage_on_the_queue_stream_changes_nothing() {
        let mut store = SessionStore::new();
        store.set(keys::PARTY_ID, "party-1");
        let mut flow = RequeueFlow::new();
        flow.request_rejoin(&store);

        assert_eq!(
            flow.handle_queue_event("not json at all", &mut store),
            QueueStep::Ignored
        );
        assert_eq!(
            flow.handle_queue_event(r#"{"somethingElse":1}"#, &mut store),
            QueueStep::Ignored
        );
        assert_eq!(flow.state(), RequeueState::Queued);
        assert_eq!(store.get(keys::QUEUE_POSITION), None);
    }
}
