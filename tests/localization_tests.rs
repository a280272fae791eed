//! # Localization Tests
//!
//! Tests for Fluent message retrieval, argument formatting and language
//! detection across the three supported catalogs.

use pethelper::localization::LocalizationManager;
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("main-menu", "en", None);
        assert!(!message.is_empty());
        assert!(message.contains("Main menu"));
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();

        // Should fall back to Russian, the default language
        let message = manager.get_message_in_language("main-menu", "unsupported", None);
        assert!(!message.is_empty());
        assert!(message.contains("Главное меню"));
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("name", "Anna");

        let message = manager.get_message_in_language("welcome", "en", Some(&args));
        assert!(message.contains("Anna"));
    }

    #[test]
    fn test_no_bidi_isolation_marks() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("name", "Anna");

        let message = manager.get_message_in_language("welcome", "ru", Some(&args));
        // U+2068 / U+2069 would show up as garbage in Telegram clients
        assert!(!message.contains('\u{2068}'));
        assert!(!message.contains('\u{2069}'));
    }

    #[test]
    fn test_all_languages_have_menu_labels() {
        let manager = setup_localization();

        for lang in pethelper::localization::SUPPORTED_LANGUAGES {
            for key in ["main-menu", "symptoms", "reminders", "back-to-menu", "cancel"] {
                let message = manager.get_message_in_language(key, lang, None);
                assert!(
                    !message.starts_with("Missing translation:"),
                    "{key} missing in {lang}"
                );
            }
        }
    }

    #[test]
    fn test_uzbek_differs_from_english() {
        let manager = setup_localization();

        let uz = manager.get_message_in_language("no-reminders", "uz", None);
        let en = manager.get_message_in_language("no-reminders", "en", None);
        assert_ne!(uz, en);
    }

    #[test]
    fn test_manager_is_shareable_across_threads() {
        // The manager lives in a global static, so it must be Send + Sync.
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LocalizationManager>();
    }

    #[test]
    fn test_language_detection() {
        use pethelper::localization::detect_language;

        assert_eq!(detect_language(Some("ru")), "ru");
        assert_eq!(detect_language(Some("ru-RU")), "ru");
        assert_eq!(detect_language(Some("en-US")), "en");
        assert_eq!(detect_language(Some("uz")), "uz");
        assert_eq!(detect_language(None), "ru"); // Default to Russian
        assert_eq!(detect_language(Some("unsupported")), "ru");
    }

    #[test]
    fn test_convenience_functions() {
        pethelper::localization::init_localization().expect("Failed to initialize localization");

        let message = pethelper::localization::t_lang("help", Some("en"));
        assert!(!message.is_empty());

        let args = vec![("animal", "cat")];
        let message_with_args =
            pethelper::localization::t_args_lang("describe-symptoms", &args, Some("en"));
        assert!(message_with_args.contains("cat"));
    }
}
