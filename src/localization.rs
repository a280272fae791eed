//! Localization support for the PetHelper bot.
//!
//! Fluent bundles are loaded once per supported language from
//! `./locales/<lang>/main.ftl`. Russian is the default language, matching the
//! bot's primary audience; unknown Telegram language codes fall back to it.

// The concurrent bundle variant is Send + Sync, which the global manager
// below requires; the default one memoizes through a RefCell and is not.
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::FluentResource;
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, OnceLock};
use unic_langid::LanguageIdentifier;

use anyhow::Result;

/// Languages the bot ships catalogs for.
pub const SUPPORTED_LANGUAGES: &[&str] = &["ru", "en", "uz"];

/// Default language when the user's Telegram locale is unknown or unsupported.
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Localization manager holding one Fluent bundle per supported language.
pub struct LocalizationManager {
    bundles: HashMap<String, Arc<FluentBundle<FluentResource>>>,
}

impl LocalizationManager {
    /// Create a new localization manager with all supported bundles loaded.
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for lang in SUPPORTED_LANGUAGES {
            let locale: LanguageIdentifier = lang.parse()?;
            let bundle = Self::create_bundle(&locale)?;
            bundles.insert(lang.to_string(), Arc::new(bundle));
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale.
    fn create_bundle(locale: &LanguageIdentifier) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);

        // Telegram renders raw text; keep bidi isolation marks out of messages.
        bundle.set_use_isolating(false);

        let resource_path = format!("./locales/{}/main.ftl", locale);
        if let Ok(content) = fs::read_to_string(&resource_path) {
            if let Ok(resource) = FluentResource::try_new(content) {
                let _ = bundle.add_resource(resource);
            }
        }

        Ok(bundle)
    }

    /// Get a localized message in the given language, falling back to the
    /// default language bundle for unsupported codes.
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
            .expect("default language bundle always loaded");

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut value = String::new();

        if let Some(args) = args {
            let fluent_args = fluent_bundle::FluentArgs::from_iter(
                args.iter()
                    .map(|(k, v)| (*k, fluent_bundle::FluentValue::from(*v))),
            );

            let _ = bundle.write_pattern(&mut value, pattern, Some(&fluent_args), &mut vec![]);
        } else {
            let _ = bundle.write_pattern(&mut value, pattern, None, &mut vec![]);
        }

        value
    }
}

/// Normalize a Telegram language code to a supported language.
///
/// Regional variants are reduced to their base tag ("ru-RU" -> "ru"); anything
/// unsupported falls back to the default language.
pub fn detect_language(language_code: Option<&str>) -> &'static str {
    let base = language_code
        .and_then(|code| code.split('-').next())
        .unwrap_or(DEFAULT_LANGUAGE);

    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| **lang == base)
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Global localization instance.
static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager. Idempotent.
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

/// Get the global localization manager.
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER
        .get()
        .expect("Localization manager not initialized")
}

/// Get a localized message for the given Telegram language code.
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message_in_language(key, detect_language(language_code), None)
}

/// Get a localized message with arguments for the given Telegram language code.
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    get_localization_manager().get_message_in_language(
        key,
        detect_language(language_code),
        Some(&args_map),
    )
}
