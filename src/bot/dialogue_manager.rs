//! Dialogue Manager module for handling dialogue state transitions
//!
//! Each handler consumes one text message for the active form, either asking
//! for the next field or completing the flow: saving to the database and
//! sending the confirmation.

use anyhow::Result;
use sqlx::postgres::PgPool;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{error, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import triage core
use crate::triage::{self, PetType};

// Import dialogue types
use crate::dialogue::{
    validate_field, validate_schedule, AdForm, BotDialogue, BotDialogueState, FormStep,
    OwnerProfileForm, ReminderKind, VetProfileForm,
};

// Import database operations
use crate::db;

// Import scheduler helpers
use crate::scheduler::initial_due;

// Import UI builder functions
use super::ui_builder::{
    create_ads_menu_keyboard, create_cancel_keyboard, create_post_triage_keyboard,
    create_profile_menu_keyboard, create_reminders_menu_keyboard,
};

/// Handle the symptom description: run the triage core, persist the outcome
/// and reply with the composed recommendation.
pub async fn handle_symptom_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    pool: Arc<PgPool>,
    text: &str,
    pet_type: PetType,
    language_code: Option<&str>,
) -> Result<()> {
    let result = triage::triage(text, pet_type);

    info!(
        user_id = %msg.chat.id,
        pet_type = %pet_type,
        category = %result.category,
        is_emergency = result.is_emergency,
        "Symptom report triaged"
    );

    // History record: report plus outcome, keyed by user and timestamp.
    match db::get_or_create_user(&pool, msg.chat.id.0, crate::localization::detect_language(language_code)).await {
        Ok(user) => {
            if let Err(e) = db::create_symptom_record(
                &pool,
                user.id,
                pet_type.as_str(),
                text,
                result.category.as_str(),
                result.is_emergency,
            )
            .await
            {
                error!(user_id = %msg.chat.id, error = %e, "Failed to save symptom record");
            }
        }
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to resolve user for symptom record");
        }
    }

    bot.send_message(msg.chat.id, result.message)
        .parse_mode(ParseMode::Html)
        .reply_markup(create_post_triage_keyboard(language_code))
        .await?;

    dialogue.exit().await?;
    Ok(())
}

/// Handle one field of the owner profile form.
pub async fn handle_owner_profile_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    pool: Arc<PgPool>,
    text: &str,
    form: OwnerProfileForm,
    language_code: Option<&str>,
) -> Result<()> {
    let value = match validate_field(text) {
        Ok(value) => value,
        Err(_) => {
            bot.send_message(msg.chat.id, t_lang("invalid-input", language_code))
                .await?;
            // Keep dialogue active, user can try again
            dialogue
                .update(BotDialogueState::OwnerProfile { form })
                .await?;
            return Ok(());
        }
    };

    match form.fill(value) {
        FormStep::Next { form, prompt_key } => {
            bot.send_message(msg.chat.id, t_lang(prompt_key, language_code))
                .reply_markup(create_cancel_keyboard("menu_profile", language_code))
                .await?;
            dialogue
                .update(BotDialogueState::OwnerProfile { form })
                .await?;
        }
        FormStep::Complete(profile) => {
            let saved = save_owner_profile(&pool, msg.chat.id.0, &profile, language_code).await;
            if let Err(e) = saved {
                error!(user_id = %msg.chat.id, error = %e, "Failed to save owner profile");
                bot.send_message(msg.chat.id, t_lang("error-processing", language_code))
                    .await?;
                dialogue.exit().await?;
                return Ok(());
            }

            let card = t_args_lang(
                "owner-profile-card",
                &[
                    ("name", profile.owner_name.as_str()),
                    ("phone", profile.owner_phone.as_str()),
                    ("city", profile.city.as_str()),
                    ("pets", &format!("{} ({})", profile.pet_name, profile.pet_kind)),
                ],
                language_code,
            );
            let confirmation = format!(
                "{}\n\n{}",
                t_lang("profile-created-title", language_code),
                card
            );

            bot.send_message(msg.chat.id, confirmation)
                .parse_mode(ParseMode::Html)
                .reply_markup(create_profile_menu_keyboard(language_code))
                .await?;
            dialogue.exit().await?;
        }
    }

    Ok(())
}

async fn save_owner_profile(
    pool: &PgPool,
    telegram_id: i64,
    profile: &crate::dialogue::OwnerProfile,
    language_code: Option<&str>,
) -> Result<()> {
    let user = db::get_or_create_user(
        pool,
        telegram_id,
        crate::localization::detect_language(language_code),
    )
    .await?;
    db::update_owner_profile(
        pool,
        user.id,
        &profile.owner_name,
        &profile.owner_phone,
        &profile.city,
    )
    .await?;
    db::create_pet(pool, user.id, &profile.pet_name, &profile.pet_kind).await?;
    Ok(())
}

/// Handle one field of the veterinarian profile form.
pub async fn handle_vet_profile_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    pool: Arc<PgPool>,
    text: &str,
    form: VetProfileForm,
    language_code: Option<&str>,
) -> Result<()> {
    let value = match validate_field(text) {
        Ok(value) => value,
        Err(_) => {
            bot.send_message(msg.chat.id, t_lang("invalid-input", language_code))
                .await?;
            dialogue
                .update(BotDialogueState::VetProfile { form })
                .await?;
            return Ok(());
        }
    };

    match form.fill(value) {
        FormStep::Next { form, prompt_key } => {
            bot.send_message(msg.chat.id, t_lang(prompt_key, language_code))
                .reply_markup(create_cancel_keyboard("menu_profile", language_code))
                .await?;
            dialogue
                .update(BotDialogueState::VetProfile { form })
                .await?;
        }
        FormStep::Complete(profile) => {
            let user = db::get_or_create_user(
                &pool,
                msg.chat.id.0,
                crate::localization::detect_language(language_code),
            )
            .await;

            let saved = match user {
                Ok(user) => db::upsert_vet_profile(&pool, user.id, &profile).await,
                Err(e) => Err(e),
            };

            if let Err(e) = saved {
                error!(user_id = %msg.chat.id, error = %e, "Failed to save vet profile");
                bot.send_message(msg.chat.id, t_lang("error-processing", language_code))
                    .await?;
                dialogue.exit().await?;
                return Ok(());
            }

            let card = t_args_lang(
                "vet-profile-card",
                &[
                    ("name", profile.name.as_str()),
                    ("phone", profile.phone.as_str()),
                    ("city", profile.city.as_str()),
                    ("specialization", profile.specialization.as_str()),
                    ("experience", profile.experience.as_str()),
                    ("education", profile.education.as_str()),
                    ("telegram", profile.telegram.as_str()),
                    ("price", profile.consultation_price.as_str()),
                    ("about", profile.about.as_str()),
                ],
                language_code,
            );
            let confirmation = format!(
                "{}\n\n{}",
                t_lang("vet-profile-created-title", language_code),
                card
            );

            bot.send_message(msg.chat.id, confirmation)
                .parse_mode(ParseMode::Html)
                .reply_markup(create_profile_menu_keyboard(language_code))
                .await?;
            dialogue.exit().await?;
        }
    }

    Ok(())
}

/// Handle the reminder text; then ask for the schedule matching the kind.
pub async fn handle_reminder_text_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    text: &str,
    kind: ReminderKind,
    language_code: Option<&str>,
) -> Result<()> {
    let text = match validate_field(text) {
        Ok(text) => text,
        Err(_) => {
            bot.send_message(msg.chat.id, t_lang("invalid-input", language_code))
                .await?;
            dialogue
                .update(BotDialogueState::ReminderText { kind })
                .await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, t_lang(kind.schedule_prompt_key(), language_code))
        .reply_markup(create_cancel_keyboard("menu_reminders", language_code))
        .await?;

    dialogue
        .update(BotDialogueState::ReminderSchedule { kind, text })
        .await?;
    Ok(())
}

/// Handle the schedule input and save the reminder.
pub async fn handle_reminder_schedule_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    pool: Arc<PgPool>,
    input: &str,
    kind: ReminderKind,
    text: String,
    language_code: Option<&str>,
) -> Result<()> {
    let schedule = match validate_schedule(kind, input) {
        Ok(schedule) => schedule,
        Err(error_key) => {
            let key = match error_key {
                "invalid-date" | "invalid-time" => error_key,
                _ => "invalid-input",
            };
            bot.send_message(msg.chat.id, t_lang(key, language_code))
                .await?;
            // Keep dialogue active, user can try again
            dialogue
                .update(BotDialogueState::ReminderSchedule { kind, text })
                .await?;
            return Ok(());
        }
    };

    let due_at = initial_due(kind, &schedule, chrono::Utc::now());
    if due_at.is_none() {
        warn!(
            user_id = %msg.chat.id,
            kind = kind.as_str(),
            "Reminder stored without a derivable firing time"
        );
    }

    let saved = async {
        let user = db::get_or_create_user(
            &pool,
            msg.chat.id.0,
            crate::localization::detect_language(language_code),
        )
        .await?;
        db::create_reminder(
            &pool,
            user.id,
            msg.chat.id.0,
            &text,
            kind.as_str(),
            &schedule,
            due_at,
        )
        .await
    }
    .await;

    if let Err(e) = saved {
        error!(user_id = %msg.chat.id, error = %e, "Failed to save reminder");
        bot.send_message(msg.chat.id, t_lang("error-processing", language_code))
            .await?;
        dialogue.exit().await?;
        return Ok(());
    }

    let confirmation = t_args_lang(
        "reminder-saved",
        &[
            ("text", text.as_str()),
            ("schedule", schedule.as_str()),
            ("kind", &t_lang(kind.label_key(), language_code)),
        ],
        language_code,
    );

    bot.send_message(msg.chat.id, confirmation)
        .parse_mode(ParseMode::Html)
        .reply_markup(create_reminders_menu_keyboard(language_code))
        .await?;

    dialogue.exit().await?;
    Ok(())
}

/// Handle one field of the ad posting form.
pub async fn handle_ad_input(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    pool: Arc<PgPool>,
    input: &str,
    form: AdForm,
    language_code: Option<&str>,
) -> Result<()> {
    let value = match validate_field(input) {
        Ok(value) => value,
        Err(_) => {
            bot.send_message(msg.chat.id, t_lang("invalid-input", language_code))
                .await?;
            dialogue.update(BotDialogueState::Ad { form }).await?;
            return Ok(());
        }
    };

    match form.fill(value) {
        FormStep::Next { form, prompt_key } => {
            bot.send_message(msg.chat.id, t_lang(prompt_key, language_code))
                .reply_markup(create_cancel_keyboard("menu_ads", language_code))
                .await?;
            dialogue.update(BotDialogueState::Ad { form }).await?;
        }
        FormStep::Complete(ad) => {
            let saved = async {
                let user = db::get_or_create_user(
                    &pool,
                    msg.chat.id.0,
                    crate::localization::detect_language(language_code),
                )
                .await?;
                db::create_ad(&pool, user.id, &ad.title, &ad.body, &ad.price, &ad.contact).await
            }
            .await;

            if let Err(e) = saved {
                error!(user_id = %msg.chat.id, error = %e, "Failed to save ad");
                bot.send_message(msg.chat.id, t_lang("error-processing", language_code))
                    .await?;
                dialogue.exit().await?;
                return Ok(());
            }

            let confirmation = format!(
                "{}\n\n{}",
                t_lang("ad-published", language_code),
                t_args_lang(
                    "ad-card",
                    &[
                        ("title", ad.title.as_str()),
                        ("body", ad.body.as_str()),
                        ("price", ad.price.as_str()),
                        ("contact", ad.contact.as_str()),
                    ],
                    language_code,
                )
            );

            bot.send_message(msg.chat.id, confirmation)
                .parse_mode(ParseMode::Html)
                .reply_markup(create_ads_menu_keyboard(language_code))
                .await?;
            dialogue.exit().await?;
        }
    }

    Ok(())
}
