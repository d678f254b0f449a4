//! The in-app chat bot: typo correction followed by rule-based answers.

pub mod normalizer;
pub mod responder;
pub mod session;

pub use normalizer::QueryNormalizer;
pub use responder::{Intent, Responder};
pub use session::{ChatBot, ChatReply, ChatSession};
