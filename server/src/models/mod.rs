pub mod category;
pub mod chat;
pub mod event;
pub mod geo;
pub mod user;
pub mod user_action;
pub mod vote;

pub use category::EventCategory;
pub use chat::ChatMessage;
pub use event::{Event, EventDraft};
pub use geo::{Coordinate, TravelEstimate};
pub use user::{AuthenticatedUser, Session};
pub use user_action::{UserActionRow, UserEventAction};
pub use vote::{VoteAction, VoteTransition};
