use serde::{Deserialize, Serialize};

/// A user's voting relationship to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Upvote,
    Downvote,
    #[default]
    None,
}

/// The result of requesting a vote action from some current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub from: VoteAction,
    pub to: VoteAction,
    /// Change to apply to the displayed tally.
    pub delta: i64,
}

impl VoteAction {
    /// Contribution of this status to an event's net tally.
    pub fn weight(self) -> i64 {
        match self {
            VoteAction::Upvote => 1,
            VoteAction::Downvote => -1,
            VoteAction::None => 0,
        }
    }

    /// Requesting the status already held clears it; anything else replaces it.
    pub fn transition(self, requested: VoteAction) -> VoteTransition {
        let to = if requested == self {
            VoteAction::None
        } else {
            requested
        };
        VoteTransition {
            from: self,
            to,
            delta: to.weight() - self.weight(),
        }
    }

    pub fn is_upvoting(self) -> bool {
        self == VoteAction::Upvote
    }

    pub fn is_downvoting(self) -> bool {
        self == VoteAction::Downvote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoteAction::{Downvote, Upvote};

    #[test]
    fn test_transition_table() {
        let table = [
            (VoteAction::None, Upvote, Upvote, 1),
            (VoteAction::None, Downvote, Downvote, -1),
            (Upvote, Upvote, VoteAction::None, -1),
            (Upvote, Downvote, Downvote, -2),
            (Downvote, Upvote, Upvote, 2),
            (Downvote, Downvote, VoteAction::None, 1),
        ];

        for (current, requested, expected, delta) in table {
            let t = current.transition(requested);
            assert_eq!(t.from, current);
            assert_eq!(t.to, expected, "{current:?} + {requested:?}");
            assert_eq!(t.delta, delta, "{current:?} + {requested:?}");
        }
    }

    #[test]
    fn test_double_upvote_nets_zero() {
        let first = VoteAction::None.transition(Upvote);
        let second = first.to.transition(Upvote);
        assert_eq!(second.to, VoteAction::None);
        assert_eq!(first.delta + second.delta, 0);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Upvote).unwrap(), "\"upvote\"");
        let parsed: VoteAction = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, VoteAction::None);
    }
}
