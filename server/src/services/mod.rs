pub mod auth;
pub mod engagement;
pub mod events;
pub mod feed;
pub mod ports;
pub mod store;

pub use auth::AuthService;
pub use engagement::{EngagementReconciler, EngagementState, Reconciliation};
pub use ports::{AuthBackend, EventBackend, Geocoder};
pub use store::{change_channel, ChangeListener, ChangeNotifier, EventStore};
