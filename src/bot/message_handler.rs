//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import dialogue types
use crate::dialogue::{BotDialogue, BotDialogueState};

// Import database operations
use crate::db;

// Import dialogue manager functions
use super::dialogue_manager::{
    handle_ad_input, handle_owner_profile_input, handle_reminder_schedule_input,
    handle_reminder_text_input, handle_symptom_input, handle_vet_profile_input,
};

// Import UI builder functions
use super::ui_builder::create_main_menu_keyboard;

/// Resolve the language for a chat: stored preference first, then the
/// Telegram client locale.
pub async fn resolve_language(
    pool: &PgPool,
    telegram_id: i64,
    client_code: Option<&str>,
) -> Option<String> {
    match db::get_user_language(pool, telegram_id).await {
        Ok(Some(language)) => Some(language),
        Ok(None) => client_code.map(str::to_owned),
        Err(e) => {
            warn!(user_id = telegram_id, error = %e, "Failed to load stored language");
            client_code.map(str::to_owned)
        }
    }
}

fn client_language_code(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    pool: Arc<PgPool>,
) -> Result<()> {
    let text = match msg.text() {
        Some(text) => text,
        None => return Ok(()),
    };

    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    let language = resolve_language(&pool, msg.chat.id.0, client_language_code(msg)).await;
    let language_code = language.as_deref();

    // Check dialogue state first
    let dialogue_state = dialogue.get().await?;
    match dialogue_state {
        Some(BotDialogueState::AwaitingSymptoms { pet_type }) => {
            return handle_symptom_input(bot, msg, dialogue, pool, text, pet_type, language_code)
                .await;
        }
        Some(BotDialogueState::OwnerProfile { form }) => {
            return handle_owner_profile_input(
                bot,
                msg,
                dialogue,
                pool,
                text,
                form,
                language_code,
            )
            .await;
        }
        Some(BotDialogueState::VetProfile { form }) => {
            return handle_vet_profile_input(bot, msg, dialogue, pool, text, form, language_code)
                .await;
        }
        Some(BotDialogueState::ReminderText { kind }) => {
            return handle_reminder_text_input(bot, msg, dialogue, text, kind, language_code).await;
        }
        Some(BotDialogueState::ReminderSchedule { kind, text: reminder_text }) => {
            return handle_reminder_schedule_input(
                bot,
                msg,
                dialogue,
                pool,
                text,
                kind,
                reminder_text,
                language_code,
            )
            .await;
        }
        Some(BotDialogueState::Ad { form }) => {
            return handle_ad_input(bot, msg, dialogue, pool, text, form, language_code).await;
        }
        Some(BotDialogueState::Start) | None => {
            // Continue with normal command handling
        }
    }

    // Handle /start command
    if text == "/start" {
        let user_name = msg
            .from
            .as_ref()
            .map(|user| user.first_name.clone())
            .unwrap_or_default();

        let language = crate::localization::detect_language(language_code);
        if let Err(e) = db::get_or_create_user(&pool, msg.chat.id.0, language).await {
            warn!(user_id = %msg.chat.id, error = %e, "Failed to register user on /start");
        }

        let welcome_message = t_args_lang("welcome", &[("name", user_name.as_str())], language_code);
        bot.send_message(msg.chat.id, welcome_message)
            .reply_markup(create_main_menu_keyboard(language_code))
            .await?;
    }
    // Handle /help command
    else if text == "/help" {
        bot.send_message(msg.chat.id, t_lang("help", language_code))
            .parse_mode(ParseMode::Html)
            .reply_markup(create_main_menu_keyboard(language_code))
            .await?;
    }
    // Handle /menu command
    else if text == "/menu" {
        bot.send_message(msg.chat.id, t_lang("main-menu", language_code))
            .reply_markup(create_main_menu_keyboard(language_code))
            .await?;
    }
    // Handle regular text messages
    else {
        bot.send_message(msg.chat.id, t_lang("unknown-message", language_code))
            .reply_markup(create_main_menu_keyboard(language_code))
            .await?;
    }

    Ok(())
}

/// Entry point for message updates.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    pool: Arc<PgPool>,
    dialogue: BotDialogue,
) -> Result<()> {
    if msg.text().is_some() {
        handle_text_message(&bot, &msg, dialogue, pool).await?;
    } else {
        let language = resolve_language(&pool, msg.chat.id.0, client_language_code(&msg)).await;
        bot.send_message(msg.chat.id, t_lang("unknown-message", language.as_deref()))
            .reply_markup(create_main_menu_keyboard(language.as_deref()))
            .await?;
    }

    Ok(())
}
