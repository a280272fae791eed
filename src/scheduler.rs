//! Reminder delivery loop.
//!
//! A background task polls the reminders table once a minute, sends whatever
//! is due and either advances repeating reminders to their next occurrence or
//! deactivates one-shot ones. Errors in one cycle are logged and never stop
//! the loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use sqlx::postgres::PgPool;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::db;
use crate::dialogue::{validate_date, validate_time, ReminderKind};
use crate::localization::t_args_lang;

/// How often the reminders table is checked.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Hour of day (UTC) at which date-only reminders fire.
const DEFAULT_FIRE_HOUR: u32 = 9;

/// Compute the first firing instant for a freshly created reminder.
///
/// `schedule` is the validated user input: a DD.MM.YYYY date for one-time
/// reminders, an HH:MM time for daily ones, free text for weekly/custom.
/// Returns `None` when no firing time can be derived (the reminder is stored
/// but never delivered, matching the stored-text-only custom kinds).
pub fn initial_due(
    kind: ReminderKind,
    schedule: &str,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match kind {
        ReminderKind::OneTime => {
            let date = validate_date(schedule).ok()?;
            let naive = date.and_hms_opt(DEFAULT_FIRE_HOUR, 0, 0)?;
            Some(to_utc(naive))
        }
        ReminderKind::Daily => {
            let time = validate_time(schedule).ok()?;
            let today = now.date_naive().and_time(time);
            let candidate = to_utc(today);
            if candidate > now {
                Some(candidate)
            } else {
                Some(candidate + ChronoDuration::days(1))
            }
        }
        ReminderKind::Weekly => Some(now + ChronoDuration::weeks(1)),
        ReminderKind::Custom => {
            // Take the first date of a comma-separated list, if there is one.
            let first = schedule.split(',').next()?.trim();
            let date = validate_date(first).ok()?;
            let naive = date.and_hms_opt(DEFAULT_FIRE_HOUR, 0, 0)?;
            Some(to_utc(naive))
        }
    }
}

/// Next occurrence of a reminder after it has fired.
///
/// One-time and custom reminders do not repeat.
pub fn next_occurrence(kind: ReminderKind, fired_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match kind {
        ReminderKind::OneTime | ReminderKind::Custom => None,
        ReminderKind::Daily => Some(fired_at + ChronoDuration::days(1)),
        ReminderKind::Weekly => Some(fired_at + ChronoDuration::weeks(1)),
    }
}

fn to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
}

/// Spawn the background delivery loop.
pub fn spawn(bot: Bot, pool: Arc<PgPool>) -> JoinHandle<()> {
    info!("Reminder scheduler started");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = process_due_reminders(&bot, &pool).await {
                error!(error = %e, "Error processing reminders");
            }
        }
    })
}

/// Send every due reminder and move it forward.
async fn process_due_reminders(bot: &Bot, pool: &PgPool) -> Result<()> {
    let now = Utc::now();
    let due = db::get_due_reminders(pool, now).await?;

    if due.is_empty() {
        return Ok(());
    }

    debug!(count = due.len(), "Delivering due reminders");

    for reminder in due {
        let language = db::get_user_language(pool, reminder.telegram_id).await?;
        let message = t_args_lang(
            "reminder-fire",
            &[("text", reminder.text.as_str())],
            language.as_deref(),
        );

        if let Err(e) = bot
            .send_message(ChatId(reminder.telegram_id), message)
            .parse_mode(ParseMode::Html)
            .await
        {
            error!(
                reminder_id = reminder.id,
                telegram_id = reminder.telegram_id,
                error = %e,
                "Failed to deliver reminder"
            );
            // Delivery will be retried next cycle; do not reschedule.
            continue;
        }

        let kind = ReminderKind::from_callback(&reminder.kind).unwrap_or(ReminderKind::Custom);
        db::reschedule_reminder(pool, reminder.id, next_occurrence(kind, now)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_one_time_fires_on_given_date() {
        let now = at(2024, 12, 1, 12, 0);
        let due = initial_due(ReminderKind::OneTime, "25.12.2024", now).unwrap();
        assert_eq!(due, at(2024, 12, 25, 9, 0));
    }

    #[test]
    fn test_daily_rolls_to_tomorrow_when_time_passed() {
        let now = at(2024, 12, 1, 12, 0);
        let today = initial_due(ReminderKind::Daily, "15:30", now).unwrap();
        assert_eq!(today, at(2024, 12, 1, 15, 30));

        let tomorrow = initial_due(ReminderKind::Daily, "09:00", now).unwrap();
        assert_eq!(tomorrow, at(2024, 12, 2, 9, 0));
    }

    #[test]
    fn test_weekly_fires_in_a_week() {
        let now = at(2024, 12, 1, 12, 0);
        let due = initial_due(ReminderKind::Weekly, "ПН,СР,ПТ", now).unwrap();
        assert_eq!(due, at(2024, 12, 8, 12, 0));
    }

    #[test]
    fn test_custom_uses_first_date_of_list() {
        let now = at(2024, 12, 1, 12, 0);
        let due = initial_due(ReminderKind::Custom, "05.12.2024, 10.12.2024", now).unwrap();
        assert_eq!(due, at(2024, 12, 5, 9, 0));
    }

    #[test]
    fn test_invalid_schedule_has_no_due_time() {
        let now = at(2024, 12, 1, 12, 0);
        assert!(initial_due(ReminderKind::OneTime, "завтра", now).is_none());
        assert!(initial_due(ReminderKind::Daily, "в обед", now).is_none());
    }

    #[test]
    fn test_repeat_rules() {
        let fired = at(2024, 12, 1, 9, 0);
        assert_eq!(
            next_occurrence(ReminderKind::Daily, fired),
            Some(at(2024, 12, 2, 9, 0))
        );
        assert_eq!(
            next_occurrence(ReminderKind::Weekly, fired),
            Some(at(2024, 12, 8, 9, 0))
        );
        assert_eq!(next_occurrence(ReminderKind::OneTime, fired), None);
        assert_eq!(next_occurrence(ReminderKind::Custom, fired), None);
    }
}
