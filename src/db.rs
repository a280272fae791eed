//! Database layer: users, pets, vet profiles, reminders, ads and symptom
//! history on Postgres via sqlx.
//!
//! All operations take a [`PgPool`] and return `anyhow::Result`, with context
//! attached where a failure message alone would not say which step broke.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use tracing::{debug, info};

/// A bot user identified by their Telegram id.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub language: String,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A pet belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Pet {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// A veterinarian profile.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VetProfileRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub city: String,
    pub specialization: String,
    pub experience: String,
    pub education: String,
    pub telegram: String,
    pub consultation_price: String,
    pub about: String,
    pub created_at: DateTime<Utc>,
}

/// A scheduled reminder.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    pub telegram_id: i64,
    pub text: String,
    pub kind: String,
    pub schedule: String,
    pub due_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A classified ad posted by a user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Ad {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: String,
    pub price: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

/// One symptom check: the report and its triage outcome, keyed by user and time.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SymptomRecord {
    pub id: i64,
    pub user_id: i64,
    pub pet_type: String,
    pub symptoms: String,
    pub category: String,
    pub is_emergency: bool,
    pub created_at: DateTime<Utc>,
}

/// Initialize the database schema.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            telegram_id BIGINT NOT NULL UNIQUE,
            language TEXT NOT NULL DEFAULT 'ru',
            owner_name TEXT,
            owner_phone TEXT,
            city TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS pets (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create pets table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS vet_profiles (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            city TEXT NOT NULL,
            specialization TEXT NOT NULL,
            experience TEXT NOT NULL,
            education TEXT NOT NULL,
            telegram TEXT NOT NULL,
            consultation_price TEXT NOT NULL,
            about TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create vet_profiles table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS reminders (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            telegram_id BIGINT NOT NULL,
            text TEXT NOT NULL,
            kind TEXT NOT NULL,
            schedule TEXT NOT NULL,
            due_at TIMESTAMPTZ,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create reminders table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ads (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            price TEXT NOT NULL,
            contact TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create ads table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS symptom_records (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            pet_type TEXT NOT NULL,
            symptoms TEXT NOT NULL,
            category TEXT NOT NULL,
            is_emergency BOOLEAN NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create symptom_records table")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Fetch a user by Telegram id, creating them on first contact.
pub async fn get_or_create_user(
    pool: &PgPool,
    telegram_id: i64,
    language: &str,
) -> Result<User> {
    if let Some(user) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE telegram_id = $1")
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
        .context("Failed to look up user")?
    {
        return Ok(user);
    }

    debug!(telegram_id, "Registering new user");

    sqlx::query_as::<_, User>(
        "INSERT INTO users (telegram_id, language) VALUES ($1, $2)
         ON CONFLICT (telegram_id) DO UPDATE SET telegram_id = EXCLUDED.telegram_id
         RETURNING *",
    )
    .bind(telegram_id)
    .bind(language)
    .fetch_one(pool)
    .await
    .context("Failed to create user")
}

/// Update a user's preferred language.
pub async fn update_user_language(pool: &PgPool, telegram_id: i64, language: &str) -> Result<()> {
    sqlx::query("UPDATE users SET language = $1 WHERE telegram_id = $2")
        .bind(language)
        .bind(telegram_id)
        .execute(pool)
        .await
        .context("Failed to update user language")?;
    Ok(())
}

/// Get a user's stored language, if they are known.
pub async fn get_user_language(pool: &PgPool, telegram_id: i64) -> Result<Option<String>> {
    let language =
        sqlx::query_scalar::<_, String>("SELECT language FROM users WHERE telegram_id = $1")
            .bind(telegram_id)
            .fetch_optional(pool)
            .await
            .context("Failed to fetch user language")?;
    Ok(language)
}

/// Store owner contact fields on the user row.
pub async fn update_owner_profile(
    pool: &PgPool,
    user_id: i64,
    owner_name: &str,
    owner_phone: &str,
    city: &str,
) -> Result<()> {
    sqlx::query("UPDATE users SET owner_name = $1, owner_phone = $2, city = $3 WHERE id = $4")
        .bind(owner_name)
        .bind(owner_phone)
        .bind(city)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to update owner profile")?;
    Ok(())
}

/// Add a pet to a user.
pub async fn create_pet(pool: &PgPool, user_id: i64, name: &str, kind: &str) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO pets (user_id, name, kind) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(name)
    .bind(kind)
    .fetch_one(pool)
    .await
    .context("Failed to create pet")?;
    Ok(id)
}

/// List a user's pets, newest first.
pub async fn list_pets(pool: &PgPool, user_id: i64) -> Result<Vec<Pet>> {
    let pets =
        sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .context("Failed to list pets")?;
    Ok(pets)
}

/// Clear owner profile fields and remove the user's pets.
pub async fn clear_owner_profile(pool: &PgPool, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET owner_name = NULL, owner_phone = NULL, city = NULL WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to clear owner profile")?;

    sqlx::query("DELETE FROM pets WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete pets")?;

    Ok(())
}

/// Create or replace a veterinarian profile.
pub async fn upsert_vet_profile(
    pool: &PgPool,
    user_id: i64,
    profile: &crate::dialogue::VetProfile,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO vet_profiles
            (user_id, name, phone, city, specialization, experience, education,
             telegram, consultation_price, about)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (user_id) DO UPDATE SET
            name = EXCLUDED.name,
            phone = EXCLUDED.phone,
            city = EXCLUDED.city,
            specialization = EXCLUDED.specialization,
            experience = EXCLUDED.experience,
            education = EXCLUDED.education,
            telegram = EXCLUDED.telegram,
            consultation_price = EXCLUDED.consultation_price,
            about = EXCLUDED.about",
    )
    .bind(user_id)
    .bind(&profile.name)
    .bind(&profile.phone)
    .bind(&profile.city)
    .bind(&profile.specialization)
    .bind(&profile.experience)
    .bind(&profile.education)
    .bind(&profile.telegram)
    .bind(&profile.consultation_price)
    .bind(&profile.about)
    .execute(pool)
    .await
    .context("Failed to upsert vet profile")?;
    Ok(())
}

/// Fetch a user's veterinarian profile, if any.
pub async fn get_vet_profile(pool: &PgPool, user_id: i64) -> Result<Option<VetProfileRecord>> {
    let profile =
        sqlx::query_as::<_, VetProfileRecord>("SELECT * FROM vet_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .context("Failed to fetch vet profile")?;
    Ok(profile)
}

/// Create a reminder.
#[allow(clippy::too_many_arguments)]
pub async fn create_reminder(
    pool: &PgPool,
    user_id: i64,
    telegram_id: i64,
    text: &str,
    kind: &str,
    schedule: &str,
    due_at: Option<DateTime<Utc>>,
) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO reminders (user_id, telegram_id, text, kind, schedule, due_at)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(user_id)
    .bind(telegram_id)
    .bind(text)
    .bind(kind)
    .bind(schedule)
    .bind(due_at)
    .fetch_one(pool)
    .await
    .context("Failed to create reminder")?;

    info!(reminder_id = id, user_id, "Reminder created");
    Ok(id)
}

/// List a user's active reminders, soonest first.
pub async fn list_reminders(pool: &PgPool, user_id: i64) -> Result<Vec<Reminder>> {
    let reminders = sqlx::query_as::<_, Reminder>(
        "SELECT * FROM reminders WHERE user_id = $1 AND active ORDER BY due_at NULLS LAST",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list reminders")?;
    Ok(reminders)
}

/// Fetch active reminders due at or before the given instant.
pub async fn get_due_reminders(pool: &PgPool, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
    let reminders = sqlx::query_as::<_, Reminder>(
        "SELECT * FROM reminders WHERE active AND due_at IS NOT NULL AND due_at <= $1",
    )
    .bind(now)
    .fetch_all(pool)
    .await
    .context("Failed to fetch due reminders")?;
    Ok(reminders)
}

/// Advance a repeating reminder to its next occurrence, or deactivate it.
pub async fn reschedule_reminder(
    pool: &PgPool,
    reminder_id: i64,
    next_due: Option<DateTime<Utc>>,
) -> Result<()> {
    match next_due {
        Some(due_at) => {
            sqlx::query("UPDATE reminders SET due_at = $1 WHERE id = $2")
                .bind(due_at)
                .bind(reminder_id)
                .execute(pool)
                .await
                .context("Failed to reschedule reminder")?;
        }
        None => {
            sqlx::query("UPDATE reminders SET active = FALSE WHERE id = $1")
                .bind(reminder_id)
                .execute(pool)
                .await
                .context("Failed to deactivate reminder")?;
        }
    }
    Ok(())
}

/// Create a classified ad.
pub async fn create_ad(
    pool: &PgPool,
    user_id: i64,
    title: &str,
    body: &str,
    price: &str,
    contact: &str,
) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO ads (user_id, title, body, price, contact)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(title)
    .bind(body)
    .bind(price)
    .bind(contact)
    .fetch_one(pool)
    .await
    .context("Failed to create ad")?;

    info!(ad_id = id, user_id, "Ad published");
    Ok(id)
}

/// List a user's ads, newest first.
pub async fn list_ads(pool: &PgPool, user_id: i64) -> Result<Vec<Ad>> {
    let ads =
        sqlx::query_as::<_, Ad>("SELECT * FROM ads WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .context("Failed to list ads")?;
    Ok(ads)
}

/// List the most recent ads across all users, newest first.
pub async fn list_all_ads(pool: &PgPool, limit: i64) -> Result<Vec<Ad>> {
    let ads = sqlx::query_as::<_, Ad>("SELECT * FROM ads ORDER BY created_at DESC LIMIT $1")
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to list all ads")?;
    Ok(ads)
}

/// Persist a symptom report together with its triage outcome.
pub async fn create_symptom_record(
    pool: &PgPool,
    user_id: i64,
    pet_type: &str,
    symptoms: &str,
    category: &str,
    is_emergency: bool,
) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO symptom_records (user_id, pet_type, symptoms, category, is_emergency)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(pet_type)
    .bind(symptoms)
    .bind(category)
    .bind(is_emergency)
    .fetch_one(pool)
    .await
    .context("Failed to create symptom record")?;
    Ok(id)
}

/// List a user's symptom history, newest first.
pub async fn list_symptom_history(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<SymptomRecord>> {
    let records = sqlx::query_as::<_, SymptomRecord>(
        "SELECT * FROM symptom_records WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list symptom history")?;
    Ok(records)
}

/// Clear a user's symptom history.
pub async fn clear_symptom_history(pool: &PgPool, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM symptom_records WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to clear symptom history")?;
    Ok(result.rows_affected())
}
