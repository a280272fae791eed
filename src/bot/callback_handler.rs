//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode};
use tracing::{debug, error};

// Import localization
use crate::localization::{detect_language, t_args_lang, t_lang};

// Import static content
use crate::content::{self, DirectoryKind};

// Import triage types
use crate::triage::PetType;

// Import dialogue types
use crate::dialogue::{
    AdForm, BotDialogue, BotDialogueState, OwnerProfileForm, ReminderKind, VetProfileForm,
};

// Import database operations
use crate::db;

// Import the shared language resolver
use super::message_handler::resolve_language;

// Import UI builder functions
use super::ui_builder::{
    create_ads_menu_keyboard, create_animal_type_keyboard, create_back_keyboard,
    create_cancel_keyboard, create_cities_keyboard, create_directory_result_keyboard,
    create_domestic_animals_keyboard, create_feeding_keyboard, create_language_keyboard,
    create_main_menu_keyboard, create_profile_menu_keyboard, create_reminder_type_keyboard,
    create_reminders_menu_keyboard, format_ads_list, format_directory_listing, format_history,
    format_owner_profile, format_reminder_list, format_vet_profile,
};

/// Edit the message in place, falling back to a fresh message when Telegram
/// rejects the edit (e.g. the content is identical or the message is too old).
pub async fn safe_edit_message(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: &str,
    keyboard: InlineKeyboardMarkup,
) -> Result<()> {
    let edited = bot
        .edit_message_text(chat_id, message_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard.clone())
        .await;

    if let Err(e) = edited {
        debug!(%chat_id, error = %e, "Edit failed, sending new message instead");
        bot.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;
    }

    Ok(())
}

/// Entry point for callback query updates.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    pool: Arc<PgPool>,
    dialogue: BotDialogue,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    let data = q.data.clone().unwrap_or_default();

    let message = match &q.message {
        Some(message) => message,
        None => {
            bot.answer_callback_query(q.id).await?;
            return Ok(());
        }
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let language = resolve_language(&pool, chat_id.0, q.from.language_code.as_deref()).await;
    let lang = language.as_deref();

    // Every menu button abandons whatever form was in progress.
    if data == "back_to_menu" || data.starts_with("menu_") {
        dialogue.reset().await?;
    }

    match data.as_str() {
        "back_to_menu" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("main-menu", lang),
                create_main_menu_keyboard(lang),
            )
            .await?;
        }
        "menu_profile" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("profile-section", lang),
                create_profile_menu_keyboard(lang),
            )
            .await?;
        }
        "menu_ads" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("ads-section", lang),
                create_ads_menu_keyboard(lang),
            )
            .await?;
        }
        "menu_news" => {
            let text = format!(
                "{}\n\n{}",
                t_lang("news-section", lang),
                content::NEWS_ITEMS.join("\n\n")
            );
            safe_edit_message(&bot, chat_id, message_id, &text, create_back_keyboard(lang))
                .await?;
        }
        "menu_facts" => {
            let text = format!(
                "{}\n\n{}\n\n{}",
                t_lang("facts-section", lang),
                t_lang("random-fact", lang),
                content::random_fact()
            );
            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("another-fact", lang),
                    "menu_facts".to_string(),
                )],
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("back-to-menu", lang),
                    "back_to_menu".to_string(),
                )],
            ]);
            safe_edit_message(&bot, chat_id, message_id, &text, keyboard).await?;
        }
        "menu_feeding" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("feeding-section", lang),
                create_feeding_keyboard(lang),
            )
            .await?;
        }
        "menu_symptoms" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("symptoms-section", lang),
                create_animal_type_keyboard(lang),
            )
            .await?;
        }
        "menu_clinics" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("clinics-section", lang),
                create_cities_keyboard(DirectoryKind::Clinics, lang),
            )
            .await?;
        }
        "menu_pharmacies" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("pharmacies-section", lang),
                create_cities_keyboard(DirectoryKind::Pharmacies, lang),
            )
            .await?;
        }
        "menu_shelters" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("shelters-section", lang),
                create_cities_keyboard(DirectoryKind::Shelters, lang),
            )
            .await?;
        }
        "menu_reminders" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("reminders-section", lang),
                create_reminders_menu_keyboard(lang),
            )
            .await?;
        }
        "menu_vet_chat" => {
            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("clinics", lang),
                    "menu_clinics".to_string(),
                )],
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("become-vet", lang),
                    "create_vet_profile".to_string(),
                )],
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("back-to-menu", lang),
                    "back_to_menu".to_string(),
                )],
            ]);
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("vet-chat-section", lang),
                keyboard,
            )
            .await?;
        }
        "menu_appointment" => {
            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("book-online", lang),
                    "book_appointment".to_string(),
                )],
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("clinics", lang),
                    "menu_clinics".to_string(),
                )],
                vec![teloxide::types::InlineKeyboardButton::callback(
                    t_lang("back-to-menu", lang),
                    "back_to_menu".to_string(),
                )],
            ]);
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("appointment-section", lang),
                keyboard,
            )
            .await?;
        }
        "menu_history" => {
            show_history(&bot, &pool, chat_id, message_id, lang).await?;
        }
        "menu_language" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("choose-language", lang),
                create_language_keyboard(),
            )
            .await?;
        }

        // ---- profile ----
        "create_profile" => {
            dialogue
                .update(BotDialogueState::OwnerProfile {
                    form: OwnerProfileForm::default(),
                })
                .await?;
            let text = format!(
                "{}\n\n{}",
                t_lang("create-profile-title", lang),
                t_lang(OwnerProfileForm::FIRST_PROMPT, lang)
            );
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &text,
                create_cancel_keyboard("menu_profile", lang),
            )
            .await?;
        }
        "create_vet_profile" => {
            dialogue
                .update(BotDialogueState::VetProfile {
                    form: VetProfileForm::default(),
                })
                .await?;
            let text = format!(
                "{}\n\n{}",
                t_lang("create-vet-profile-title", lang),
                t_lang(VetProfileForm::FIRST_PROMPT, lang)
            );
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &text,
                create_cancel_keyboard("menu_profile", lang),
            )
            .await?;
        }
        "profile_view" => {
            let card = match db::get_or_create_user(&pool, chat_id.0, detect_language(lang)).await
            {
                Ok(user) => {
                    let pets = db::list_pets(&pool, user.id).await.unwrap_or_default();
                    format_owner_profile(&user, &pets, lang)
                }
                Err(e) => {
                    error!(user_id = %q.from.id, error = %e, "Failed to load profile");
                    None
                }
            };
            let text = card.unwrap_or_else(|| t_lang("profile-empty", lang));
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &text,
                create_profile_menu_keyboard(lang),
            )
            .await?;
        }
        "vet_profile_view" => {
            let card = match db::get_or_create_user(&pool, chat_id.0, detect_language(lang)).await
            {
                Ok(user) => match db::get_vet_profile(&pool, user.id).await {
                    Ok(profile) => profile.map(|profile| format_vet_profile(&profile, lang)),
                    Err(e) => {
                        error!(user_id = %q.from.id, error = %e, "Failed to load vet profile");
                        None
                    }
                },
                Err(_) => None,
            };
            let text = card.unwrap_or_else(|| t_lang("vet-profile-empty", lang));
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &text,
                create_profile_menu_keyboard(lang),
            )
            .await?;
        }
        "profile_clear" => {
            if let Ok(user) = db::get_or_create_user(&pool, chat_id.0, detect_language(lang)).await
            {
                if let Err(e) = db::clear_owner_profile(&pool, user.id).await {
                    error!(user_id = %q.from.id, error = %e, "Failed to clear profile");
                }
            }
            bot.answer_callback_query(q.id.clone())
                .text(t_lang("profile-cleared", lang))
                .await?;
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("main-menu", lang),
                create_main_menu_keyboard(lang),
            )
            .await?;
            return Ok(());
        }

        // ---- reminders ----
        "reminder_add" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("reminder-types", lang),
                create_reminder_type_keyboard(lang),
            )
            .await?;
        }
        "reminder_list" => {
            let reminders = match db::get_or_create_user(&pool, chat_id.0, detect_language(lang))
                .await
            {
                Ok(user) => db::list_reminders(&pool, user.id).await.unwrap_or_default(),
                Err(_) => Vec::new(),
            };
            let text = if reminders.is_empty() {
                t_lang("no-reminders", lang)
            } else {
                format_reminder_list(&reminders, lang)
            };
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &text,
                create_reminders_menu_keyboard(lang),
            )
            .await?;
        }

        // ---- ads ----
        "post_ad" => {
            dialogue
                .update(BotDialogueState::Ad {
                    form: AdForm::default(),
                })
                .await?;
            let text = format!(
                "{}\n\n{}",
                t_lang("post-ad-title", lang),
                t_lang(AdForm::FIRST_PROMPT, lang)
            );
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &text,
                create_cancel_keyboard("menu_ads", lang),
            )
            .await?;
        }
        "my_ads" => {
            let ads = match db::get_or_create_user(&pool, chat_id.0, detect_language(lang)).await {
                Ok(user) => db::list_ads(&pool, user.id).await.unwrap_or_default(),
                Err(_) => Vec::new(),
            };
            let text = if ads.is_empty() {
                t_lang("no-ads", lang)
            } else {
                format_ads_list(&ads, lang)
            };
            safe_edit_message(&bot, chat_id, message_id, &text, create_ads_menu_keyboard(lang))
                .await?;
        }
        "all_ads" => {
            let ads = db::list_all_ads(&pool, 20).await.unwrap_or_default();
            let text = if ads.is_empty() {
                t_lang("no-ads-published", lang)
            } else {
                format_ads_list(&ads, lang)
            };
            safe_edit_message(&bot, chat_id, message_id, &text, create_ads_menu_keyboard(lang))
                .await?;
        }

        // ---- history ----
        "clear_history" => {
            if let Ok(user) = db::get_or_create_user(&pool, chat_id.0, detect_language(lang)).await
            {
                if let Err(e) = db::clear_symptom_history(&pool, user.id).await {
                    error!(user_id = %q.from.id, error = %e, "Failed to clear history");
                }
            }
            bot.answer_callback_query(q.id.clone())
                .text(t_lang("history-cleared", lang))
                .await?;
            show_history(&bot, &pool, chat_id, message_id, lang).await?;
            return Ok(());
        }

        // ---- placeholders ----
        "feeding_farm" => {
            bot.answer_callback_query(q.id)
                .text(t_lang("farm-in-development", lang))
                .show_alert(true)
                .await?;
            return Ok(());
        }
        "feeding_exotic" => {
            bot.answer_callback_query(q.id)
                .text(t_lang("exotic-in-development", lang))
                .show_alert(true)
                .await?;
            return Ok(());
        }
        "book_appointment" => {
            bot.answer_callback_query(q.id)
                .text(t_lang("booking-in-development", lang))
                .show_alert(true)
                .await?;
            return Ok(());
        }

        "feeding_domestic" => {
            safe_edit_message(
                &bot,
                chat_id,
                message_id,
                &t_lang("feeding-domestic-section", lang),
                create_domestic_animals_keyboard(lang),
            )
            .await?;
        }

        _ => {
            handle_prefixed_callback(&bot, &pool, &dialogue, &data, chat_id, message_id, lang)
                .await?;
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}

/// Callbacks that carry a payload after a prefix: animal/feeding/city/kind/language.
async fn handle_prefixed_callback(
    bot: &Bot,
    pool: &PgPool,
    dialogue: &BotDialogue,
    data: &str,
    chat_id: ChatId,
    message_id: MessageId,
    lang: Option<&str>,
) -> Result<()> {
    if let Some(kind) = data.strip_prefix("animal_") {
        let pet_type = PetType::from_callback(kind);
        dialogue
            .update(BotDialogueState::AwaitingSymptoms { pet_type })
            .await?;

        let animal = t_lang(&format!("animal-{}", pet_type.as_str()), lang);
        let text = t_args_lang("describe-symptoms", &[("animal", animal.as_str())], lang);
        safe_edit_message(
            bot,
            chat_id,
            message_id,
            &text,
            create_cancel_keyboard("menu_symptoms", lang),
        )
        .await?;
        return Ok(());
    }

    if let Some(kind) = data.strip_prefix("remtype_") {
        if let Some(kind) = ReminderKind::from_callback(kind) {
            dialogue
                .update(BotDialogueState::ReminderText { kind })
                .await?;
            safe_edit_message(
                bot,
                chat_id,
                message_id,
                &t_lang("enter-reminder-text", lang),
                create_cancel_keyboard("menu_reminders", lang),
            )
            .await?;
        }
        return Ok(());
    }

    if let Some(animal) = data.strip_prefix("feed_") {
        let key = match animal {
            "dog" => "feeding-dog",
            "cat" => "feeding-cat",
            "bird" => "feeding-bird",
            _ => "feeding-unknown",
        };
        let keyboard = InlineKeyboardMarkup::new(vec![
            vec![teloxide::types::InlineKeyboardButton::callback(
                t_lang("cancel", lang),
                "feeding_domestic".to_string(),
            )],
            vec![teloxide::types::InlineKeyboardButton::callback(
                t_lang("back-to-menu", lang),
                "back_to_menu".to_string(),
            )],
        ]);
        safe_edit_message(bot, chat_id, message_id, &t_lang(key, lang), keyboard).await?;
        return Ok(());
    }

    if let Some(language) = data.strip_prefix("lang_") {
        let language = detect_language(Some(language));
        if let Err(e) = db::get_or_create_user(pool, chat_id.0, language).await {
            error!(%chat_id, error = %e, "Failed to ensure user before language change");
        }
        if let Err(e) = db::update_user_language(pool, chat_id.0, language).await {
            error!(%chat_id, error = %e, "Failed to store language preference");
        }
        safe_edit_message(
            bot,
            chat_id,
            message_id,
            &t_lang("main-menu", Some(language)),
            create_main_menu_keyboard(Some(language)),
        )
        .await?;
        return Ok(());
    }

    for kind in [
        DirectoryKind::Clinics,
        DirectoryKind::Pharmacies,
        DirectoryKind::Shelters,
    ] {
        let prefix = format!("{}:", kind.callback_prefix());
        if let Some(city) = data.strip_prefix(&prefix) {
            let city_name = t_lang(&format!("city-{city}"), lang);
            let entries = content::directory_entries(kind, city);
            let text = format_directory_listing(kind, &city_name, entries, lang);
            safe_edit_message(
                bot,
                chat_id,
                message_id,
                &text,
                create_directory_result_keyboard(kind, city, lang),
            )
            .await?;
            return Ok(());
        }
    }

    debug!(%chat_id, data, "Ignoring unknown callback payload");
    Ok(())
}

/// Render the symptom check history section.
async fn show_history(
    bot: &Bot,
    pool: &PgPool,
    chat_id: ChatId,
    message_id: MessageId,
    lang: Option<&str>,
) -> Result<()> {
    let records = match db::get_or_create_user(pool, chat_id.0, detect_language(lang)).await {
        Ok(user) => db::list_symptom_history(pool, user.id, 10)
            .await
            .unwrap_or_default(),
        Err(e) => {
            error!(%chat_id, error = %e, "Failed to load history");
            Vec::new()
        }
    };

    let text = if records.is_empty() {
        t_lang("history-empty", lang)
    } else {
        format!(
            "{}\n\n{}",
            t_lang("history-header", lang),
            format_history(&records, lang)
        )
    };

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![teloxide::types::InlineKeyboardButton::callback(
            t_lang("clear-history", lang),
            "clear_history".to_string(),
        )],
        vec![teloxide::types::InlineKeyboardButton::callback(
            t_lang("back-to-menu", lang),
            "back_to_menu".to_string(),
        )],
    ]);

    safe_edit_message(bot, chat_id, message_id, &text, keyboard).await
}
