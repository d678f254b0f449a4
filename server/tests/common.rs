use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use plot_server::{
    background::start_refresh_worker,
    config::Config,
    models::{
        AuthenticatedUser, Coordinate, Event, EventDraft, Session, UserEventAction, VoteAction,
    },
    routes::create_routes,
    services::{AuthBackend, EventBackend, Geocoder},
    state::AppState,
    utils::AppError,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const ALICE_TOKEN: &str = "alice-token";
pub const CAMPUS: Coordinate = Coordinate {
    latitude: 33.9700,
    longitude: -118.4180,
};

/// Events and action rows in memory. Counters on events follow the action
/// rows, the way the database triggers keep them.
#[derive(Default)]
pub struct InMemoryBackend {
    pub events: Mutex<Vec<Event>>,
    pub actions: Mutex<HashMap<(Uuid, Uuid), UserEventAction>>,
    pub fail_mutations: AtomicBool,
    pub fail_fetch: AtomicBool,
}

impl InMemoryBackend {
    pub fn seeded() -> Self {
        let now = Utc::now();
        let mut rugby = Event::new("Rugby Party", "Sunken Garden", now + ChronoDuration::hours(2));
        rugby.latitude = Some(CAMPUS.latitude);
        rugby.longitude = Some(CAMPUS.longitude);
        rugby.rsvps = Some(12);
        rugby.upvote_count = Some(4);
        rugby.downvote_count = Some(1);

        let mut hockey = Event::new("Hockey Night", "Lions vs Toreros", now + ChronoDuration::days(3));
        hockey.rsvps = Some(30);

        let formal = Event::new("Alpha Phi Formal", "Chapter house", now + ChronoDuration::days(5));

        let mut concert = Event::new("Spring Concert", "Live band on the bluff", now - ChronoDuration::days(2));
        concert.rsvps = Some(50);

        let backend = Self::default();
        *backend.events.lock().unwrap() = vec![concert, rugby, hockey, formal];
        backend
    }

    pub fn event_id(&self, title: &str) -> Uuid {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.title == title)
            .map(|e| e.id)
            .unwrap()
    }

    fn check_mutation(&self) -> Result<(), AppError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            Err(AppError::ExternalServiceError("backend offline".into()))
        } else {
            Ok(())
        }
    }

    fn update_action(&self, user_id: Uuid, event_id: Uuid, update: impl FnOnce(&mut UserEventAction)) {
        let mut actions = self.actions.lock().unwrap();
        let before = actions.get(&(user_id, event_id)).copied().unwrap_or_default();
        let mut after = before;
        update(&mut after);
        actions.insert((user_id, event_id), after);

        let mut events = self.events.lock().unwrap();
        if let Some(event) = events.iter_mut().find(|e| e.id == event_id) {
            let bump = |counter: &mut Option<i32>, was: bool, is: bool| {
                let delta = i32::from(is) - i32::from(was);
                *counter = Some(counter.unwrap_or(0) + delta);
            };
            bump(&mut event.rsvps, before.attending, after.attending);
            bump(&mut event.upvote_count, before.vote.is_upvoting(), after.vote.is_upvoting());
            bump(&mut event.downvote_count, before.vote.is_downvoting(), after.vote.is_downvoting());
        }
    }
}

#[async_trait]
impl EventBackend for InMemoryBackend {
    async fn fetch_events(&self) -> Result<Vec<Event>, AppError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError("backend offline".into()));
        }
        let mut events = self.events.lock().unwrap().clone();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    async fn fetch_user_action(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<UserEventAction>, AppError> {
        Ok(self.actions.lock().unwrap().get(&(user_id, event_id)).copied())
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, AppError> {
        let mut event = Event::new(draft.title.clone(), draft.description.clone(), draft.date);
        event.latitude = draft.coordinate.map(|c| c.latitude);
        event.longitude = draft.coordinate.map(|c| c.longitude);
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn set_attendance(&self, user_id: Uuid, event_id: Uuid, attending: bool) -> Result<(), AppError> {
        self.check_mutation()?;
        self.update_action(user_id, event_id, |a| a.attending = attending);
        Ok(())
    }

    async fn set_vote(&self, user_id: Uuid, event_id: Uuid, vote: VoteAction) -> Result<(), AppError> {
        self.check_mutation()?;
        self.update_action(user_id, event_id, |a| a.vote = vote);
        Ok(())
    }
}

/// Accepts any sign-up and resolves the tokens it was given.
#[derive(Default)]
pub struct MockAuth {
    pub tokens: Mutex<HashMap<String, AuthenticatedUser>>,
    pub sign_ups: Mutex<Vec<String>>,
    pub resets: Mutex<Vec<String>>,
}

#[async_trait]
impl AuthBackend for MockAuth {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<(), AppError> {
        self.sign_ups.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        if password != "correct horse" {
            return Err(AppError::AuthError("Invalid login credentials".into()));
        }
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        let access_token = format!("token-{}", user.id);
        self.tokens.lock().unwrap().insert(access_token.clone(), user.clone());
        Ok(Session {
            access_token,
            refresh_token: "refresh".into(),
            expires_in: Some(3600),
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.tokens.lock().unwrap().remove(access_token);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        self.resets.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn user_for_token(&self, access_token: &str) -> Result<AuthenticatedUser, AppError> {
        self.tokens
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| AppError::AuthError("Invalid token".into()))
    }
}

#[derive(Default)]
pub struct MockGeocoder {
    pub fail: AtomicBool,
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinate>, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError("geocoder offline".into()));
        }
        Ok(Some(CAMPUS))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub backend: Arc<InMemoryBackend>,
    pub auth: Arc<MockAuth>,
    pub geocoder: Arc<MockGeocoder>,
    pub alice: AuthenticatedUser,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let backend = Arc::new(InMemoryBackend::seeded());
        let auth = Arc::new(MockAuth::default());
        let geocoder = Arc::new(MockGeocoder::default());

        let alice = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: Some("alice@lion.lmu.edu".into()),
        };
        auth.tokens
            .lock()
            .unwrap()
            .insert(ALICE_TOKEN.to_string(), alice.clone());

        let (state, changes) = AppState::new(
            Config::default(),
            backend.clone(),
            auth.clone(),
            geocoder.clone(),
        );
        assert!(state.store.refresh().await, "initial load failed");

        tokio::spawn(start_refresh_worker(
            state.store.clone(),
            state.engagement.clone(),
            changes,
            Duration::from_secs(3600),
        ));

        let router = create_routes(state.clone());

        Self {
            router,
            state,
            backend,
            auth,
            geocoder,
            alice,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(ALICE_TOKEN), None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(ALICE_TOKEN), Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(ALICE_TOKEN), Some(body)).await
    }
}
