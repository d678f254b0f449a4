//! Adapters for the hosted services behind the `services::ports` traits.

pub mod geocoder;
pub mod gotrue;
pub mod postgres;

pub use geocoder::{DisabledGeocoder, NominatimGeocoder};
pub use gotrue::GoTrueAuth;
pub use postgres::PgEventBackend;
