//! # UI Builder Tests
//!
//! Tests for keyboard layouts and message formatters. The global localization
//! manager is initialized once per test since initialization is idempotent.

use pethelper::bot::ui_builder::{
    create_ads_menu_keyboard, create_animal_type_keyboard, create_cities_keyboard,
    create_directory_result_keyboard, create_main_menu_keyboard, format_directory_listing,
    format_history, format_owner_profile, truncate_text,
};
use pethelper::content::{DirectoryKind, CITIES};
use pethelper::db::{Pet, SymptomRecord, User};
use pethelper::localization::init_localization;
use teloxide::types::InlineKeyboardButtonKind;

#[cfg(test)]
mod tests {
    use super::*;

    fn callback_data(button: &teloxide::types::InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("expected callback button, got {other:?}"),
        }
    }

    #[test]
    fn test_main_menu_covers_all_sections() {
        init_localization().unwrap();

        let keyboard = create_main_menu_keyboard(Some("ru"));
        let data: Vec<&str> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(callback_data)
            .collect();

        for expected in [
            "menu_profile",
            "menu_ads",
            "menu_news",
            "menu_facts",
            "menu_feeding",
            "menu_symptoms",
            "menu_clinics",
            "menu_pharmacies",
            "menu_reminders",
            "menu_shelters",
            "menu_vet_chat",
            "menu_history",
            "menu_appointment",
            "menu_language",
        ] {
            assert!(data.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_animal_keyboard_lists_five_animals() {
        init_localization().unwrap();

        let keyboard = create_animal_type_keyboard(Some("ru"));
        let animals: Vec<&str> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(callback_data)
            .filter(|data| data.starts_with("animal_"))
            .collect();

        assert_eq!(
            animals,
            vec!["animal_dog", "animal_cat", "animal_rodent", "animal_bird", "animal_fish"]
        );
    }

    #[test]
    fn test_cities_keyboard_has_one_button_per_city() {
        init_localization().unwrap();

        let keyboard = create_cities_keyboard(DirectoryKind::Pharmacies, Some("en"));
        let city_buttons: Vec<&str> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(callback_data)
            .filter(|data| data.starts_with("pharmacy_city:"))
            .collect();

        assert_eq!(city_buttons.len(), CITIES.len());
        assert!(city_buttons.contains(&"pharmacy_city:tashkent"));
    }

    #[test]
    fn test_directory_listing_formats_entries_and_empty_city() {
        init_localization().unwrap();

        let entries = ["🏥 <b>Clinic A</b>", "🏥 <b>Clinic B</b>"];
        let listing =
            format_directory_listing(DirectoryKind::Clinics, "Ташкент", Some(&entries), Some("ru"));
        assert!(listing.contains("Ташкент"));
        assert!(listing.contains("Clinic A"));
        assert!(listing.contains("Clinic B"));

        let empty = format_directory_listing(DirectoryKind::Clinics, "Нукус", None, Some("ru"));
        assert!(empty.contains("обновляется"));
    }

    #[test]
    fn test_ads_menu_offers_all_ads() {
        init_localization().unwrap();

        let keyboard = create_ads_menu_keyboard(Some("ru"));
        let data: Vec<&str> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(callback_data)
            .collect();

        assert!(data.contains(&"post_ad"));
        assert!(data.contains(&"my_ads"));
        assert!(data.contains(&"all_ads"));
    }

    #[test]
    fn test_directory_keyboard_links_to_map() {
        init_localization().unwrap();

        let keyboard = create_directory_result_keyboard(DirectoryKind::Clinics, "tashkent", Some("ru"));
        let buttons: Vec<_> = keyboard.inline_keyboard.iter().flatten().collect();

        let map_button = buttons
            .iter()
            .find_map(|button| match &button.kind {
                InlineKeyboardButtonKind::Url(url) => Some(url),
                _ => None,
            })
            .expect("map link button present");
        assert!(map_button.as_str().contains("google.com/maps/search"));
        assert!(map_button.as_str().contains("tashkent"));

        assert!(buttons
            .iter()
            .any(|button| matches!(&button.kind, InlineKeyboardButtonKind::CallbackData(data) if data == "back_to_menu")));
    }

    #[test]
    fn test_history_shows_localized_category() {
        init_localization().unwrap();

        let records = vec![SymptomRecord {
            id: 1,
            user_id: 1,
            pet_type: "cat".into(),
            symptoms: "рвота с утра".into(),
            category: "digestive".into(),
            is_emergency: false,
            created_at: chrono::Utc::now(),
        }];

        let history = format_history(&records, Some("ru"));
        assert!(history.contains("Пищеварение"));
        assert!(!history.contains("digestive"));
    }

    #[test]
    fn test_owner_profile_card_requires_name() {
        init_localization().unwrap();

        let mut user = User {
            id: 1,
            telegram_id: 42,
            language: "ru".into(),
            owner_name: None,
            owner_phone: None,
            city: None,
            created_at: chrono::Utc::now(),
        };

        assert!(format_owner_profile(&user, &[], Some("ru")).is_none());

        user.owner_name = Some("Анна".into());
        let pets = vec![Pet {
            id: 1,
            user_id: 1,
            name: "Барсик".into(),
            kind: "кот".into(),
            created_at: chrono::Utc::now(),
        }];
        let card = format_owner_profile(&user, &pets, Some("ru")).unwrap();
        assert!(card.contains("Анна"));
        assert!(card.contains("Барсик (кот)"));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("короткий", 60), "короткий");
        let long = "а".repeat(100);
        let cut = truncate_text(&long, 60);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 60);
    }
}
