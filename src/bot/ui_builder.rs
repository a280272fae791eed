//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import static content
use crate::content::{map_url, DirectoryKind, CITIES};

// Import database types
use crate::db::{Ad, Pet, Reminder, SymptomRecord, User, VetProfileRecord};

// Import dialogue types
use crate::dialogue::ReminderKind;

/// Main menu keyboard with all bot sections.
pub fn create_main_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let btn = |key: &str, data: &str| {
        InlineKeyboardButton::callback(t_lang(key, language_code), data.to_string())
    };

    InlineKeyboardMarkup::new(vec![
        vec![btn("profile-big", "menu_profile")],
        vec![btn("ads", "menu_ads"), btn("news", "menu_news")],
        vec![btn("pet-facts", "menu_facts"), btn("feeding-guide", "menu_feeding")],
        vec![btn("symptoms", "menu_symptoms"), btn("clinics", "menu_clinics")],
        vec![btn("pharmacies", "menu_pharmacies"), btn("reminders", "menu_reminders")],
        vec![btn("shelters", "menu_shelters"), btn("vet-chat", "menu_vet_chat")],
        vec![btn("history", "menu_history"), btn("appointment", "menu_appointment")],
        vec![btn("language", "menu_language")],
    ])
}

/// Profile section keyboard.
pub fn create_profile_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let btn = |key: &str, data: &str| {
        InlineKeyboardButton::callback(t_lang(key, language_code), data.to_string())
    };

    InlineKeyboardMarkup::new(vec![
        vec![btn("create-profile", "create_profile")],
        vec![btn("create-vet-profile", "create_vet_profile")],
        vec![btn("view-profile", "profile_view"), btn("view-vet-profile", "vet_profile_view")],
        vec![btn("clear-profile", "profile_clear")],
        vec![btn("back-to-menu", "back_to_menu")],
    ])
}

/// Ads section keyboard.
pub fn create_ads_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let btn = |key: &str, data: &str| {
        InlineKeyboardButton::callback(t_lang(key, language_code), data.to_string())
    };

    InlineKeyboardMarkup::new(vec![
        vec![btn("post-ad", "post_ad")],
        vec![btn("my-ads", "my_ads"), btn("all-ads", "all_ads")],
        vec![btn("back-to-menu", "back_to_menu")],
    ])
}

/// Reminders section keyboard.
pub fn create_reminders_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let btn = |key: &str, data: &str| {
        InlineKeyboardButton::callback(t_lang(key, language_code), data.to_string())
    };

    InlineKeyboardMarkup::new(vec![
        vec![btn("add-reminder", "reminder_add")],
        vec![btn("my-reminders", "reminder_list")],
        vec![btn("back-to-menu", "back_to_menu")],
    ])
}

/// Reminder kind selection keyboard.
pub fn create_reminder_type_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let kind_btn = |kind: ReminderKind| {
        InlineKeyboardButton::callback(
            t_lang(kind.label_key(), language_code),
            format!("remtype_{}", kind.as_str()),
        )
    };

    InlineKeyboardMarkup::new(vec![
        vec![kind_btn(ReminderKind::OneTime), kind_btn(ReminderKind::Daily)],
        vec![kind_btn(ReminderKind::Weekly), kind_btn(ReminderKind::Custom)],
        vec![InlineKeyboardButton::callback(
            t_lang("cancel", language_code),
            "menu_reminders".to_string(),
        )],
    ])
}

/// Animal type keyboard for the symptom checker.
pub fn create_animal_type_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let animal = |emoji: &str, kind: &str| {
        InlineKeyboardButton::callback(emoji.to_string(), format!("animal_{kind}"))
    };

    InlineKeyboardMarkup::new(vec![
        vec![animal("🐕", "dog"), animal("🐱", "cat")],
        vec![animal("🐹", "rodent"), animal("🐦", "bird")],
        vec![animal("🐠", "fish")],
        vec![InlineKeyboardButton::callback(
            t_lang("back-to-menu", language_code),
            "back_to_menu".to_string(),
        )],
    ])
}

/// City selection keyboard for a directory section, two cities per row.
pub fn create_cities_keyboard(
    kind: DirectoryKind,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for pair in CITIES.chunks(2) {
        let row = pair
            .iter()
            .map(|city| {
                InlineKeyboardButton::callback(
                    t_lang(&format!("city-{city}"), language_code),
                    format!("{}:{}", kind.callback_prefix(), city),
                )
            })
            .collect();
        rows.push(row);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        t_lang("back-to-menu", language_code),
        "back_to_menu".to_string(),
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// Keyboard under a directory listing: map search link plus the back button.
pub fn create_directory_result_keyboard(
    kind: DirectoryKind,
    city: &str,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();

    if let Ok(map) = Url::parse(&map_url(kind, city)) {
        rows.push(vec![InlineKeyboardButton::url(
            t_lang("show-on-map", language_code),
            map,
        )]);
    }
    rows.push(vec![InlineKeyboardButton::callback(
        t_lang("back-to-menu", language_code),
        "back_to_menu".to_string(),
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// Feeding guide top-level keyboard.
pub fn create_feeding_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let btn = |key: &str, data: &str| {
        InlineKeyboardButton::callback(t_lang(key, language_code), data.to_string())
    };

    InlineKeyboardMarkup::new(vec![
        vec![btn("domestic-pets", "feeding_domestic")],
        vec![btn("farm-animals", "feeding_farm"), btn("exotic-animals", "feeding_exotic")],
        vec![btn("back-to-menu", "back_to_menu")],
    ])
}

/// Domestic animal selection for the feeding guide.
pub fn create_domestic_animals_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let animal = |emoji: &str, kind: &str| {
        InlineKeyboardButton::callback(emoji.to_string(), format!("feed_{kind}"))
    };

    InlineKeyboardMarkup::new(vec![
        vec![animal("🐕", "dog"), animal("🐱", "cat")],
        vec![animal("🐦", "bird")],
        vec![InlineKeyboardButton::callback(
            t_lang("back-to-menu", language_code),
            "back_to_menu".to_string(),
        )],
    ])
}

/// Language selection keyboard.
pub fn create_language_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("🇷🇺 Русский", "lang_ru".to_string())],
        vec![InlineKeyboardButton::callback("🇺🇸 English", "lang_en".to_string())],
        vec![InlineKeyboardButton::callback("🇺🇿 O'zbekcha", "lang_uz".to_string())],
        vec![InlineKeyboardButton::callback("🔙", "back_to_menu".to_string())],
    ])
}

/// Single cancel button returning to the given menu.
pub fn create_cancel_keyboard(
    back_callback: &str,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        t_lang("cancel", language_code),
        back_callback.to_string(),
    )]])
}

/// Keyboard shown under a triage response.
pub fn create_post_triage_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    let btn = |key: &str, data: &str| {
        InlineKeyboardButton::callback(t_lang(key, language_code), data.to_string())
    };

    InlineKeyboardMarkup::new(vec![
        vec![btn("find-clinic", "menu_clinics")],
        vec![btn("vet-chat", "menu_vet_chat")],
        vec![btn("back-to-menu", "back_to_menu")],
    ])
}

/// Single back-to-menu button.
pub fn create_back_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        t_lang("back-to-menu", language_code),
        "back_to_menu".to_string(),
    )]])
}

/// Format an owner profile card from the stored user and pets.
pub fn format_owner_profile(
    user: &User,
    pets: &[Pet],
    language_code: Option<&str>,
) -> Option<String> {
    let owner_name = user.owner_name.as_deref()?;

    let pets_display = if pets.is_empty() {
        "—".to_string()
    } else {
        pets.iter()
            .map(|pet| format!("{} ({})", pet.name, pet.kind))
            .collect::<Vec<_>>()
            .join(", ")
    };

    Some(t_args_lang(
        "owner-profile-card",
        &[
            ("name", owner_name),
            ("phone", user.owner_phone.as_deref().unwrap_or("—")),
            ("city", user.city.as_deref().unwrap_or("—")),
            ("pets", &pets_display),
        ],
        language_code,
    ))
}

/// Format a veterinarian profile card.
pub fn format_vet_profile(profile: &VetProfileRecord, language_code: Option<&str>) -> String {
    t_args_lang(
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
    )
}

/// Format a numbered reminder list.
pub fn format_reminder_list(reminders: &[Reminder], language_code: Option<&str>) -> String {
    reminders
        .iter()
        .enumerate()
        .map(|(i, reminder)| {
            let kind_label = ReminderKind::from_callback(&reminder.kind)
                .map(|kind| t_lang(kind.label_key(), language_code))
                .unwrap_or_else(|| reminder.kind.clone());
            format!(
                "{}. <b>{}</b> — {} ({})",
                i + 1,
                reminder.text,
                reminder.schedule,
                kind_label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a user's ads as full cards.
pub fn format_ads_list(ads: &[Ad], language_code: Option<&str>) -> String {
    ads.iter()
        .map(|ad| {
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
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format a directory listing under its localized title.
pub fn format_directory_listing(
    kind: DirectoryKind,
    city_name: &str,
    entries: Option<&[&str]>,
    language_code: Option<&str>,
) -> String {
    let title = t_args_lang(kind.title_key(), &[("city", city_name)], language_code);

    match entries {
        Some(entries) => format!("{}\n\n{}", title, entries.join("\n\n")),
        None => t_args_lang(kind.empty_key(), &[("city", city_name)], language_code),
    }
}

/// Format the symptom check history, newest first.
pub fn format_history(records: &[SymptomRecord], language_code: Option<&str>) -> String {
    records
        .iter()
        .map(|record| {
            let marker = if record.is_emergency { "🚨" } else { "🩺" };
            let category_label =
                t_lang(&format!("category-{}", record.category), language_code);
            format!(
                "{} {} — <b>{}</b>: {}",
                marker,
                record.created_at.format("%d.%m.%Y %H:%M"),
                category_label,
                truncate_text(&record.symptoms, 60),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n\n"
        + &t_lang("history-hint", language_code)
}

/// Truncate text to a maximum number of characters, appending "..." if cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
