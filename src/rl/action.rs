use serde::{Deserialize, Serialize};

/// Number of actions available to the opponent
pub const ACTION_COUNT: usize = 5;

/// One tick's choice for the learning opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiAction {
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
    #[default]
    Coast,
}

impl AiAction {
    /// All actions in index order
    pub const ALL: [AiAction; ACTION_COUNT] = [
        AiAction::Accelerate,
        AiAction::Brake,
        AiAction::SteerLeft,
        AiAction::SteerRight,
        AiAction::Coast,
    ];

    pub fn index(self) -> usize {
        match self {
            AiAction::Accelerate => 0,
            AiAction::Brake => 1,
            AiAction::SteerLeft => 2,
            AiAction::SteerRight => 3,
            AiAction::Coast => 4,
        }
    }

    /// Convert an index into an action, wrapping out-of-range values
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % ACTION_COUNT]
    }

    pub fn name(self) -> &'static str {
        match self {
            AiAction::Accelerate => "accelerate",
            AiAction::Brake => "brake",
            AiAction::SteerLeft => "left",
            AiAction::SteerRight => "right",
            AiAction::Coast => "coast",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_order() {
        for (i, action) in AiAction::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(AiAction::from_index(i), *action);
        }
        assert_eq!(AiAction::from_index(7), AiAction::SteerLeft);
    }

    #[test]
    fn test_names() {
        assert_eq!(AiAction::Accelerate.name(), "accelerate");
        assert_eq!(AiAction::Coast.name(), "coast");
        assert_eq!(AiAction::default(), AiAction::Coast);
    }
}
