use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::action::{AiAction, ACTION_COUNT};
use super::observation::DiscreteState;

/// Action values for one state
pub type ActionValues = [f64; ACTION_COUNT];

/// Sparse tabular value function.
///
/// Rows are created on first access and start at zero for every action,
/// so reading an unseen state never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    rows: HashMap<DiscreteState, ActionValues>,
}

/// One serialised row of a [`QTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: DiscreteState,
    pub values: ActionValues,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for `state`, inserting zeros if it was never visited
    pub fn values_mut(&mut self, state: DiscreteState) -> &mut ActionValues {
        self.rows.entry(state).or_insert([0.0; ACTION_COUNT])
    }

    /// Row for `state` without inserting
    pub fn get(&self, state: &DiscreteState) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    pub fn value(&mut self, state: DiscreteState, action: AiAction) -> f64 {
        self.values_mut(state)[action.index()]
    }

    /// Greedy action; ties go to the lowest action index
    pub fn best_action(&mut self, state: DiscreteState) -> AiAction {
        let row = self.values_mut(state);
        let mut best = 0;
        for (i, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = i;
            }
        }
        AiAction::from_index(best)
    }

    pub fn max_value(&mut self, state: DiscreteState) -> f64 {
        self.values_mut(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// One-step TD update of `Q[state, action]` towards
    /// `reward + gamma * max Q[next_state]`. Returns the new value.
    pub fn update(
        &mut self,
        state: DiscreteState,
        action: AiAction,
        reward: f64,
        next_state: DiscreteState,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let best_next = self.max_value(next_state);
        let cell = &mut self.values_mut(state)[action.index()];
        let old = *cell;
        let new = old + alpha * (reward + gamma * best_next - old);
        if new.is_finite() {
            *cell = new;
        }
        *cell
    }

    /// Number of visited states
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows sorted by state, for stable serialisation
    pub fn to_entries(&self) -> Vec<QEntry> {
        let mut entries: Vec<QEntry> = self
            .rows
            .iter()
            .map(|(state, values)| QEntry {
                state: *state,
                values: *values,
            })
            .collect();
        entries.sort_by_key(|entry| entry.state);
        entries
    }

    /// Rebuild a table from rows; later duplicates win and non-finite
    /// values are reset to zero
    pub fn from_entries(entries: impl IntoIterator<Item = QEntry>) -> Self {
        let rows = entries
            .into_iter()
            .map(|entry| {
                let values = entry.values.map(|v| if v.is_finite() { v } else { 0.0 });
                (entry.state, values)
            })
            .collect();
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(speed: u8, lane: u8, gap: u8) -> DiscreteState {
        DiscreteState { speed, lane, gap }
    }

    #[test]
    fn test_lazy_zero_initialisation() {
        let mut table = QTable::new();
        assert!(table.is_empty());
        assert_eq!(table.get(&state(1, 2, 3)), None);

        assert_eq!(*table.values_mut(state(1, 2, 3)), [0.0; ACTION_COUNT]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_best_action_tie_breaks_low() {
        let mut table = QTable::new();
        let s = state(0, 0, 0);
        assert_eq!(table.best_action(s), AiAction::Accelerate);

        table.values_mut(s)[2] = 1.0;
        table.values_mut(s)[4] = 1.0;
        assert_eq!(table.best_action(s), AiAction::SteerLeft);

        table.values_mut(s)[4] = 1.5;
        assert_eq!(table.best_action(s), AiAction::Coast);
    }

    #[test]
    fn test_update_formula() {
        let mut table = QTable::new();
        let s = state(0, 0, 0);
        let next = state(1, 1, 1);
        table.values_mut(next)[3] = 10.0;
        table.values_mut(s)[0] = 2.0;

        let value = table.update(s, AiAction::Accelerate, 1.0, next, 0.15, 0.92);
        let expected = 2.0 + 0.15 * (1.0 + 0.92 * 10.0 - 2.0);
        assert!((value - expected).abs() < 1e-12);
        assert!((table.value(s, AiAction::Accelerate) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_update_converges_towards_fixed_point() {
        // Self-loop: next-state value is the state's own value
        let mut table = QTable::new();
        let s = state(2, 2, 2);
        let reward = 0.8;
        let target = reward / (1.0 - 0.92);

        let mut previous = 0.0;
        for _ in 0..2000 {
            let value = table.update(s, AiAction::Coast, reward, s, 0.15, 0.92);
            assert!(value >= previous);
            assert!(value <= target + 1e-9);
            previous = value;
        }
        assert!((previous - target).abs() < 1e-3);
    }

    #[test]
    fn test_update_converges_for_negative_reward() {
        let mut table = QTable::new();
        let s = state(0, 4, 0);
        let next = state(4, 4, 4);
        let reward = -2.0;

        // Next state never changes value, so the fixed point is the reward
        let mut previous = 0.0;
        for _ in 0..100 {
            let value = table.update(s, AiAction::Brake, reward, next, 0.15, 0.92);
            assert!(value < previous);
            assert!(value >= reward - 1e-9);
            previous = value;
        }
        assert!((previous - reward).abs() < 1e-6);
    }

    #[test]
    fn test_entries_roundtrip_is_sorted() {
        let mut table = QTable::new();
        table.values_mut(state(3, 0, 0))[0] = 1.0;
        table.values_mut(state(0, 1, 0))[1] = 2.0;

        let entries = table.to_entries();
        assert_eq!(entries[0].state, state(0, 1, 0));
        assert_eq!(entries[1].state, state(3, 0, 0));
        assert_eq!(QTable::from_entries(entries), table);
    }

    #[test]
    fn test_from_entries_scrubs_non_finite() {
        let table = QTable::from_entries(vec![QEntry {
            state: state(0, 0, 0),
            values: [f64::NAN, 1.0, f64::INFINITY, 0.0, 0.0],
        }]);
        assert_eq!(table.get(&state(0, 0, 0)), Some(&[0.0, 1.0, 0.0, 0.0, 0.0]));
    }
}
