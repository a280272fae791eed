//! PetHelper Telegram bot library.
//!
//! The core of the bot is the symptom triage engine in [`triage`], wrapped by
//! a Telegram surface ([`bot`]), Fluent localization ([`localization`]),
//! Postgres persistence ([`db`]) and a reminder scheduler ([`scheduler`]).

pub mod bot;
pub mod content;
pub mod db;
pub mod dialogue;
pub mod localization;
pub mod scheduler;
pub mod triage;
