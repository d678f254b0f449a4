use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, EventDraft, UserActionRow, UserEventAction, VoteAction};
use crate::services::EventBackend;
use crate::utils::AppError;

const EVENT_COLUMNS: &str =
    "id, title, description, date, latitude, longitude, rsvps, upvote_count, downvote_count";

const ACTION_COLUMNS: &str = "user_id, event_id, is_attending, is_upvoting, is_downvoting";

/// `EventBackend` over the hosted Postgres database (`events` and
/// `user_event_actions` tables).
pub struct PgEventBackend {
    pool: PgPool,
}

impl PgEventBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventBackend for PgEventBackend {
    async fn fetch_events(&self) -> Result<Vec<Event>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC");
        let events = sqlx::query_as::<_, Event>(&sql).fetch_all(&self.pool).await?;
        Ok(events)
    }

    async fn fetch_user_action(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<UserEventAction>, AppError> {
        let sql = format!(
            "SELECT {ACTION_COLUMNS} FROM user_event_actions \
             WHERE event_id = $1 AND user_id = $2"
        );
        let row = sqlx::query_as::<_, UserActionRow>(&sql)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserEventAction::try_from).transpose()
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, AppError> {
        let sql = format!(
            "INSERT INTO events (title, description, date, latitude, longitude) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.date)
            .bind(draft.coordinate.map(|c| c.latitude))
            .bind(draft.coordinate.map(|c| c.longitude))
            .fetch_one(&self.pool)
            .await?;
        Ok(event)
    }

    async fn set_attendance(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        attending: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO user_event_actions (user_id, event_id, is_attending)
               VALUES ($1, $2, $3)
               ON CONFLICT (user_id, event_id)
               DO UPDATE SET is_attending = EXCLUDED.is_attending"#,
        )
        .bind(user_id)
        .bind(event_id)
        .bind(attending)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_vote(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        vote: VoteAction,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO user_event_actions (user_id, event_id, is_upvoting, is_downvoting)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (user_id, event_id)
               DO UPDATE SET is_upvoting = EXCLUDED.is_upvoting,
                             is_downvoting = EXCLUDED.is_downvoting"#,
        )
        .bind(user_id)
        .bind(event_id)
        .bind(vote.is_upvoting())
        .bind(vote.is_downvoting())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../migrations/20240101000000_plot_schema.sql");

    #[test]
    fn test_action_flags_are_read_as_stored() {
        for flag in ["is_attending", "is_upvoting", "is_downvoting"] {
            assert!(ACTION_COLUMNS.contains(flag));
            // The row type decodes plain bools, so the column must never be NULL
            assert!(
                SCHEMA.contains(&format!("{flag} BOOLEAN NOT NULL DEFAULT FALSE")),
                "{flag} is nullable"
            );
        }
    }
}
