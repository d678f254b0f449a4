use sqlx::FromRow;
use uuid::Uuid;

use super::vote::VoteAction;
use crate::utils::AppError;

/// Raw `user_event_actions` row as the database returns it.
#[derive(Debug, Clone, FromRow)]
pub struct UserActionRow {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub is_attending: bool,
    pub is_upvoting: bool,
    pub is_downvoting: bool,
}

/// A user's recorded relationship to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserEventAction {
    pub attending: bool,
    pub vote: VoteAction,
}

impl TryFrom<UserActionRow> for UserEventAction {
    type Error = AppError;

    fn try_from(row: UserActionRow) -> Result<Self, Self::Error> {
        let vote = match (row.is_upvoting, row.is_downvoting) {
            (true, true) => {
                return Err(AppError::DecodeError(format!(
                    "action record for user {} on event {} is both upvoting and downvoting",
                    row.user_id, row.event_id
                )))
            }
            (true, false) => VoteAction::Upvote,
            (false, true) => VoteAction::Downvote,
            (false, false) => VoteAction::None,
        };

        Ok(Self {
            attending: row.is_attending,
            vote,
        })
    }
}
