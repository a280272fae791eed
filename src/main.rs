use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pethelper::dialogue::BotDialogueState;
use pethelper::{bot, db, localization, scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting PetHelper Telegram Bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let bot_token =
        env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    info!("Connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    db::init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    localization::init_localization().context("Failed to initialize localization")?;

    let pool = Arc::new(pool);
    let bot = Bot::new(bot_token);

    // Background reminder delivery loop
    let _scheduler = scheduler::spawn(bot.clone(), Arc::clone(&pool));

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .enter_dialogue::<Update, InMemStorage<BotDialogueState>, BotDialogueState>()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            InMemStorage::<BotDialogueState>::new(),
            pool
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
