use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::chat::{ChatBot, ChatSession, QueryNormalizer, Responder};
use crate::config::Config;
use crate::services::{
    change_channel, AuthBackend, AuthService, ChangeListener, ChangeNotifier,
    EngagementReconciler, EventBackend, EventStore, Geocoder,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: Arc<dyn EventBackend>,
    pub geocoder: Arc<dyn Geocoder>,
    pub auth: Arc<AuthService>,
    pub store: Arc<EventStore>,
    pub engagement: Arc<EngagementReconciler>,
    pub chat: Arc<ChatBot>,
    pub chat_sessions: Arc<DashMap<Uuid, ChatSession>>,
    pub notifier: ChangeNotifier,
}

impl AppState {
    /// Wires the services over the given backends. The returned listener
    /// receives "events changed" notifications and belongs to the refresh
    /// worker.
    pub fn new(
        config: Config,
        events: Arc<dyn EventBackend>,
        auth: Arc<dyn AuthBackend>,
        geocoder: Arc<dyn Geocoder>,
    ) -> (Self, ChangeListener) {
        let (notifier, listener) = change_channel();
        let store = Arc::new(EventStore::new(events.clone()));
        let engagement = Arc::new(EngagementReconciler::new(events.clone(), store.clone()));
        let chat = ChatBot::new(QueryNormalizer::default(), Responder::new(config.timezone));
        let auth = AuthService::new(auth, config.allowed_email_domain.clone());

        let state = Self {
            config: Arc::new(config),
            events,
            geocoder,
            auth: Arc::new(auth),
            store,
            engagement,
            chat: Arc::new(chat),
            chat_sessions: Arc::new(DashMap::new()),
            notifier,
        };
        (state, listener)
    }
}
