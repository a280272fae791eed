//! Bot module containing handlers for messages, callbacks, dialogue flows
//! and keyboard construction.

pub mod callback_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

pub use callback_handler::callback_handler;
pub use message_handler::message_handler;
