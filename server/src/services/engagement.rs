//! Optimistic vote and RSVP state per (user, event).
//!
//! A mutation is applied to the local state and published before the backend
//! call is made; if the backend rejects it the exact prior state is restored.
//! Mutations for the same (user, event) pair are serialized, so a second action
//! never interleaves with the first one's rollback.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ports::EventBackend;
use super::store::EventStore;
use crate::models::{Event, UserEventAction, VoteAction, VoteTransition};
use crate::utils::AppError;

/// What an event detail view shows for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementState {
    pub vote_count: i64,
    pub vote: VoteAction,
    pub attending: bool,
    pub rsvp_count: i64,
}

impl EngagementState {
    pub fn seed(event: &Event, action: UserEventAction) -> Self {
        Self {
            vote_count: event.net_votes(),
            vote: action.vote,
            attending: action.attending,
            rsvp_count: event.rsvp_count(),
        }
    }

    pub fn apply_vote(&mut self, transition: VoteTransition) {
        self.vote_count += transition.delta;
        self.vote = transition.to;
    }

    pub fn apply_attendance(&mut self, attending: bool) {
        if self.attending != attending {
            self.rsvp_count += if attending { 1 } else { -1 };
            self.attending = attending;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reconciliation {
    Confirmed { state: EngagementState },
    RolledBack { state: EngagementState, reason: String },
}

impl Reconciliation {
    pub fn state(&self) -> &EngagementState {
        match self {
            Reconciliation::Confirmed { state } | Reconciliation::RolledBack { state, .. } => state,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Reconciliation::Confirmed { .. })
    }
}

type SlotKey = (Uuid, Uuid);

struct Slot {
    inner: Mutex<SlotInner>,
    view: watch::Sender<EngagementState>,
}

struct SlotInner {
    state: EngagementState,
    seeded_generation: u64,
}

impl Slot {
    fn publish(&self, inner: &SlotInner) {
        self.view.send_replace(inner.state);
    }
}

/// `slot` is the map's own `Arc`, so a count of one means no request is
/// using it.
fn is_idle(slot: &Arc<Slot>) -> bool {
    Arc::strong_count(slot) == 1 && slot.view.receiver_count() == 0
}

enum Mutation {
    Vote(VoteTransition),
    Attendance(bool),
}

pub struct EngagementReconciler {
    backend: Arc<dyn EventBackend>,
    store: Arc<EventStore>,
    slots: DashMap<SlotKey, Arc<Slot>>,
}

impl EngagementReconciler {
    pub fn new(backend: Arc<dyn EventBackend>, store: Arc<EventStore>) -> Self {
        Self {
            backend,
            store,
            slots: DashMap::new(),
        }
    }

    /// Current state, re-seeded from the backend if the event list changed
    /// since the last seed and nothing is in flight. While a mutation is in
    /// flight this returns its optimistic state.
    pub async fn load(&self, user_id: Uuid, event_id: Uuid) -> Result<EngagementState, AppError> {
        let slot = self.slot(user_id, event_id).await?;
        if let Ok(mut inner) = slot.inner.try_lock() {
            self.reseed_if_stale(&slot, &mut inner, user_id, event_id)
                .await?;
        }
        let state = *slot.view.borrow();
        Ok(state)
    }

    pub async fn subscribe(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<watch::Receiver<EngagementState>, AppError> {
        Ok(self.slot(user_id, event_id).await?.view.subscribe())
    }

    pub async fn vote(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        requested: VoteAction,
    ) -> Result<Reconciliation, AppError> {
        let slot = self.slot(user_id, event_id).await?;
        let mut inner = slot.inner.lock().await;
        self.reseed_if_stale(&slot, &mut inner, user_id, event_id)
            .await?;

        let transition = inner.state.vote.transition(requested);
        self.reconcile(&slot, &mut inner, user_id, event_id, Mutation::Vote(transition))
            .await
    }

    pub async fn set_attendance(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        attending: bool,
    ) -> Result<Reconciliation, AppError> {
        let slot = self.slot(user_id, event_id).await?;
        let mut inner = slot.inner.lock().await;
        self.reseed_if_stale(&slot, &mut inner, user_id, event_id)
            .await?;

        if inner.state.attending == attending {
            return Ok(Reconciliation::Confirmed { state: inner.state });
        }
        self.reconcile(&slot, &mut inner, user_id, event_id, Mutation::Attendance(attending))
            .await
    }

    /// Drops slots nobody is using: no request holds them and no receiver
    /// watches them. Called after the store refreshes, when idle slots would
    /// be re-seeded anyway. Returns how many were dropped.
    pub fn evict_idle(&self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| !is_idle(slot));
        let evicted = before.saturating_sub(self.slots.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.slots.len(), "Evicted idle engagement slots");
        }
        evicted
    }

    /// Drops the user's idle slots, e.g. on sign-out. Slots with a mutation
    /// in flight are left to finish.
    pub fn forget_user(&self, user_id: Uuid) {
        self.slots
            .retain(|(slot_user, _), slot| *slot_user != user_id || !is_idle(slot));
    }

    pub fn tracked_slots(&self) -> usize {
        self.slots.len()
    }

    async fn reconcile(
        &self,
        slot: &Slot,
        inner: &mut SlotInner,
        user_id: Uuid,
        event_id: Uuid,
        mutation: Mutation,
    ) -> Result<Reconciliation, AppError> {
        let previous = inner.state;
        match &mutation {
            Mutation::Vote(t) => inner.state.apply_vote(*t),
            Mutation::Attendance(attending) => inner.state.apply_attendance(*attending),
        }
        slot.publish(inner);

        let result = match mutation {
            Mutation::Vote(t) => self.backend.set_vote(user_id, event_id, t.to).await,
            Mutation::Attendance(attending) => {
                self.backend
                    .set_attendance(user_id, event_id, attending)
                    .await
            }
        };

        match result {
            Ok(()) => {
                debug!(%user_id, %event_id, state = ?inner.state, "Mutation confirmed");
                Ok(Reconciliation::Confirmed { state: inner.state })
            }
            Err(e) => {
                inner.state = previous;
                slot.publish(inner);
                warn!(%user_id, %event_id, error = %e, "Mutation failed, rolled back");
                Ok(Reconciliation::RolledBack {
                    state: previous,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn slot(&self, user_id: Uuid, event_id: Uuid) -> Result<Arc<Slot>, AppError> {
        let key = (user_id, event_id);
        if let Some(slot) = self.slots.get(&key) {
            return Ok(slot.clone());
        }

        let generation = self.store.generation();
        let state = self.fetch_seed(user_id, event_id).await?;

        // A concurrent caller may have seeded the same slot meanwhile; keep theirs
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| {
                let (view, _) = watch::channel(state);
                Arc::new(Slot {
                    inner: Mutex::new(SlotInner {
                        state,
                        seeded_generation: generation,
                    }),
                    view,
                })
            })
            .clone();
        Ok(slot)
    }

    async fn reseed_if_stale(
        &self,
        slot: &Slot,
        inner: &mut SlotInner,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), AppError> {
        let generation = self.store.generation();
        if inner.seeded_generation == generation {
            return Ok(());
        }
        inner.state = self.fetch_seed(user_id, event_id).await?;
        inner.seeded_generation = generation;
        slot.publish(inner);
        info!(%user_id, %event_id, generation, "Engagement state re-seeded");
        Ok(())
    }

    async fn fetch_seed(&self, user_id: Uuid, event_id: Uuid) -> Result<EngagementState, AppError> {
        let event = self
            .store
            .find(event_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Event '{event_id}' was not found")))?;
        let action = self
            .backend
            .fetch_user_action(user_id, event_id)
            .await?
            .unwrap_or_default();
        Ok(EngagementState::seed(&event, action))
    }
}
