use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extractors::AuthUser;
use crate::models::{Coordinate, Event, EventCategory, TravelEstimate};
use crate::services::events::{create_event as create, NewEvent};
use crate::services::feed::{self, TRENDING_LIMIT};
use crate::services::EngagementState;
use crate::state::AppState;
use crate::utils::response::{created, success};
use crate::utils::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: EventCategory,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl DetailQuery {
    fn origin(&self) -> Option<Coordinate> {
        let (lat, lon) = (self.lat?, self.lon?);
        Some(Coordinate::new(lat, lon)).filter(Coordinate::is_valid)
    }
}

#[derive(Serialize)]
struct EventDetail {
    event: Event,
    category: EventCategory,
    engagement: EngagementState,
    travel: Option<TravelEstimate>,
}

pub async fn list_events(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let events = state.store.snapshot().await;
    let mut matches = feed::filter_by_category(&events, query.category);
    if let Some(q) = query.q.as_deref() {
        matches = feed::search_titles(&matches, q);
    }

    let message = format!("{} event(s)", matches.len());
    success(matches, message)
}

pub async fn trending_events(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let events = state.store.snapshot().await;
    let trending = feed::trending(&events, query.category, TRENDING_LIMIT);
    success(trending, "Trending events")
}

pub async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .find(event_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Event '{event_id}' was not found")))?;
    let engagement = state.engagement.load(auth.user.id, event_id).await?;

    let detail = EventDetail {
        category: EventCategory::for_event(&event),
        travel: TravelEstimate::between(query.origin(), event.coordinate()),
        engagement,
        event,
    };
    Ok(success(detail, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewEvent>,
) -> Result<Response, AppError> {
    tracing::debug!(user_id = %auth.user.id, "Creating event");
    let event = create(
        state.events.as_ref(),
        state.geocoder.as_ref(),
        &state.notifier,
        body,
    )
    .await?;
    Ok(created(event, "Event created"))
}
