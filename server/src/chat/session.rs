use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::normalizer::QueryNormalizer;
use super::responder::Responder;
use crate::models::{ChatMessage, Event};

pub const WELCOME_MESSAGE: &str = "Welcome to Plot Chat! Ask me about any event.";
pub const DEFAULT_TRANSCRIPT_CAPACITY: usize = 200;

/// Normalizer and responder wired together.
#[derive(Debug, Clone)]
pub struct ChatBot {
    normalizer: QueryNormalizer,
    responder: Responder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub corrected_query: String,
    pub text: String,
}

impl ChatBot {
    pub fn new(normalizer: QueryNormalizer, responder: Responder) -> Self {
        Self {
            normalizer,
            responder,
        }
    }

    pub fn reply(&self, query: &str, events: &[Event], now: DateTime<Utc>) -> ChatReply {
        let corrected_query = self.normalizer.normalize(query);
        let text = self.responder.respond(&corrected_query, events, now);
        ChatReply {
            corrected_query,
            text,
        }
    }
}

/// One user's in-memory conversation with the bot. The oldest messages are
/// dropped once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRANSCRIPT_CAPACITY)
    }
}

impl ChatSession {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut session = Self {
            messages: VecDeque::new(),
            capacity: capacity.max(2),
        };
        session.push(ChatMessage::from_bot(WELCOME_MESSAGE));
        session
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Blank input is ignored and returns `None`.
    pub fn send(
        &mut self,
        bot: &ChatBot,
        input: &str,
        events: &[Event],
        now: DateTime<Utc>,
    ) -> Option<ChatReply> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        self.push(ChatMessage::from_user(text));
        let reply = bot.reply(text, events, now);
        self.push(ChatMessage::from_bot(reply.text.clone()));
        Some(reply)
    }

    fn push(&mut self, message: ChatMessage) {
        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
}
