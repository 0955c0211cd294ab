//! Per-direction move quota
//!
//! Bounds how many steps the arm may take in each direction before it has to
//! return home. A step in one direction gives one step of credit back to the
//! opposite direction, so the counters approximate net displacement from the
//! reference pose without any odometry. This is a heuristic, not a travel
//! ledger: the boundary guard re-validates the real position on every move.

use crate::motion::Direction;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum steps per direction before a forced stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuotaCeilings {
    pub right: i32,
    pub left: i32,
    pub up: i32,
    pub down: i32,
    pub forward: i32,
    pub backward: i32,
}

impl Default for QuotaCeilings {
    fn default() -> Self {
        Self {
            right: 3,
            left: 3,
            up: 2,
            down: 3,
            forward: 3,
            backward: 3,
        }
    }
}

impl QuotaCeilings {
    /// Ceiling for one direction
    pub fn get(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Right => self.right,
            Direction::Left => self.left,
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
        }
    }

    /// Same ceiling in every direction
    pub const fn uniform(ceiling: i32) -> Self {
        Self {
            right: ceiling,
            left: ceiling,
            up: ceiling,
            down: ceiling,
            forward: ceiling,
            backward: ceiling,
        }
    }
}

/// Direction counters with configured ceilings
#[derive(Debug, Clone)]
pub struct MoveQuota {
    ceilings: QuotaCeilings,
    /// Net steps per direction, indexed by [`Direction::index`]
    counters: [i32; 6],
}

impl MoveQuota {
    /// Create a quota with all counters at zero
    pub fn new(ceilings: QuotaCeilings) -> Self {
        Self {
            ceilings,
            counters: [0; 6],
        }
    }

    /// Try to spend one step in `direction`
    ///
    /// Returns false, leaving every counter unchanged, when the direction is
    /// at its ceiling. The caller must stop instead of moving.
    pub fn try_consume(&mut self, direction: Direction) -> bool {
        if self.counters[direction.index()] >= self.ceilings.get(direction) {
            return false;
        }

        self.counters[direction.index()] += 1;
        self.counters[direction.opposite().index()] -= 1;
        true
    }

    /// Zero all counters (arm is back at the reference pose)
    pub fn reset_all(&mut self) {
        self.counters = [0; 6];
    }

    /// Current counter for a direction (may be negative)
    pub fn count(&self, direction: Direction) -> i32 {
        self.counters[direction.index()]
    }

    /// Configured ceiling for a direction
    pub fn ceiling(&self, direction: Direction) -> i32 {
        self.ceilings.get(direction)
    }

    /// Steps still available before `direction` hits its ceiling
    pub fn remaining(&self, direction: Direction) -> i32 {
        self.ceiling(direction) - self.count(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_stops_further_moves() {
        let mut quota = MoveQuota::new(QuotaCeilings::default());

        let results: [bool; 6] = core::array::from_fn(|_| quota.try_consume(Direction::Right));
        assert_eq!(results, [true, true, true, false, false, false]);
        assert_eq!(quota.count(Direction::Right), 3);
    }

    #[test]
    fn test_up_has_lower_ceiling() {
        let mut quota = MoveQuota::new(QuotaCeilings::default());

        assert!(quota.try_consume(Direction::Up));
        assert!(quota.try_consume(Direction::Up));
        assert!(!quota.try_consume(Direction::Up));
    }

    #[test]
    fn test_opposite_move_gives_credit() {
        let mut quota = MoveQuota::new(QuotaCeilings::default());

        for _ in 0..3 {
            assert!(quota.try_consume(Direction::Right));
        }
        assert!(!quota.try_consume(Direction::Right));

        // One step left frees one step right without touching RIGHT directly
        assert!(quota.try_consume(Direction::Left));
        assert_eq!(quota.count(Direction::Right), 2);
        assert!(quota.try_consume(Direction::Right));
        assert!(!quota.try_consume(Direction::Right));
    }

    #[test]
    fn test_counters_may_go_negative() {
        let mut quota = MoveQuota::new(QuotaCeilings::default());

        assert!(quota.try_consume(Direction::Down));
        assert_eq!(quota.count(Direction::Up), -1);
        assert_eq!(quota.remaining(Direction::Up), 3);
    }

    #[test]
    fn test_denied_move_changes_nothing() {
        let mut quota = MoveQuota::new(QuotaCeilings::uniform(1));

        assert!(quota.try_consume(Direction::Forward));
        assert_eq!(quota.count(Direction::Backward), -1);

        assert!(!quota.try_consume(Direction::Forward));
        assert_eq!(quota.count(Direction::Forward), 1);
        assert_eq!(quota.count(Direction::Backward), -1);
    }

    #[test]
    fn test_reset_all() {
        let mut quota = MoveQuota::new(QuotaCeilings::default());
        quota.try_consume(Direction::Left);
        quota.try_consume(Direction::Up);

        quota.reset_all();
        for dir in Direction::ALL {
            assert_eq!(quota.count(dir), 0);
        }
    }
}
