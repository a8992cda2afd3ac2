//! Cached snapshot with a request-sequence guard.
//! Every fetch takes a number from `issue()`; a response is applied only if its
//! number is newer than the last applied one, so a slow reply cannot overwrite a
//! fresher snapshot.

use crate::model::GameState;
use tracing::debug;

#[derive(Debug, Default)]
pub struct SnapshotSlot {
    issued: u64,
    applied: u64,
    state: Option<GameState>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Stores the response for request `seq`. Returns `false` if it was stale.
    pub fn accept(&mut self, seq: u64, state: Option<GameState>) -> bool {
        if seq <= self.applied {
            debug!(seq, applied = self.applied, "dropping stale snapshot");
            return false;
        }
        self.applied = seq;
        self.state = state;
        true
    }

    pub fn current(&self) -> Option<&GameState> {
        self.state.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameStatus;
    use std::collections::HashMap;

    fn state(size: usize) -> GameState {
        GameState {
            id: None,
            status: GameStatus::Setup,
            board_size: size,
            time_limit: None,
            started_at: None,
            ended_at: None,
            teams: vec![],
            cells: vec![],
            scores: HashMap::new(),
        }
    }

    #[test]
    fn test_in_order_responses_apply() {
        let mut slot = SnapshotSlot::new();
        let first = slot.issue();
        let second = slot.issue();
        assert!(slot.accept(first, Some(state(3))));
        assert!(slot.accept(second, Some(state(4))));
        assert_eq!(slot.current().map(|s| s.board_size), Some(4));
    }

    #[test]
    fn test_stale_response_dropped() {
        let mut slot = SnapshotSlot::new();
        let older = slot.issue();
        let newer = slot.issue();
        assert!(slot.accept(newer, Some(state(5))));
        assert!(!slot.accept(older, Some(state(2))));
        assert_eq!(slot.current().map(|s| s.board_size), Some(5));
    }

    #[test]
    fn test_no_game_clears_snapshot() {
        let mut slot = SnapshotSlot::new();
        let a = slot.issue();
        slot.accept(a, Some(state(3)));
        let b = slot.issue();
        assert!(slot.accept(b, None));
        assert!(slot.current().is_none());
    }
}
