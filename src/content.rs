//! Static informational content: city directories of clinics, pharmacies and
//! shelters, pet facts and news items.
//!
//! Sample data until the directory moves to the database; lookups return
//! `None` for cities without entries so handlers can show an
//! "information being updated" notice instead.

use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// City keys offered in the directory keyboards. Each has a `city-<key>`
/// locale entry for its display name.
pub const CITIES: &[&str] = &[
    "tashkent",
    "samarkand",
    "bukhara",
    "khiva",
    "andijan",
    "namangan",
    "fergana",
    "nukus",
    "urgench",
    "karshi",
    "jizzakh",
    "navoi",
    "termez",
];

/// Which directory a city listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    Clinics,
    Pharmacies,
    Shelters,
}

impl DirectoryKind {
    /// Callback-data prefix for city buttons of this directory.
    pub fn callback_prefix(&self) -> &'static str {
        match self {
            DirectoryKind::Clinics => "clinic_city",
            DirectoryKind::Pharmacies => "pharmacy_city",
            DirectoryKind::Shelters => "shelter_city",
        }
    }

    /// Locale key of the listing title ("Veterinary clinics in {city}" etc).
    pub fn title_key(&self) -> &'static str {
        match self {
            DirectoryKind::Clinics => "clinics-in-city",
            DirectoryKind::Pharmacies => "pharmacies-in-city",
            DirectoryKind::Shelters => "shelters-in-city",
        }
    }

    /// Locale key of the empty-city fallback notice.
    pub fn empty_key(&self) -> &'static str {
        match self {
            DirectoryKind::Clinics => "clinics-updating",
            DirectoryKind::Pharmacies => "pharmacies-updating",
            DirectoryKind::Shelters => "shelters-updating",
        }
    }

    /// Search term for the map link shown under a listing.
    pub fn map_query(&self) -> &'static str {
        match self {
            DirectoryKind::Clinics => "veterinary+clinics",
            DirectoryKind::Pharmacies => "veterinary+pharmacies",
            DirectoryKind::Shelters => "animal+shelters",
        }
    }
}

/// Google Maps search link for a directory section in a city.
pub fn map_url(kind: DirectoryKind, city: &str) -> String {
    format!(
        "https://www.google.com/maps/search/{}+{}",
        kind.map_query(),
        city
    )
}

lazy_static! {
    static ref CLINICS: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(
            "tashkent",
            vec![
                "🏥 <b>Vet Clinic 'Pet Care'</b>\n📍 Mirzo Ulug'bek tumani\n📞 +998 71 123 45 67\n🕒 24/7",
                "🏥 <b>Animal Hospital Tashkent</b>\n📍 Yunusobod tumani\n📞 +998 71 234 56 78\n🕒 08:00-22:00",
                "🏥 <b>Doctor Vet Center</b>\n📍 Shayxontohur tumani\n📞 +998 71 345 67 89\n🕒 09:00-20:00",
            ],
        );
        m.insert(
            "samarkand",
            vec![
                "🏥 <b>Samarkand Vet Clinic</b>\n📍 Registon ko'chasi\n📞 +998 66 123 45 67\n🕒 09:00-19:00",
                "🏥 <b>Animal Care Samarqand</b>\n📍 Amir Temur ko'chasi\n📞 +998 66 234 56 78\n🕒 08:00-21:00",
            ],
        );
        m
    };
    static ref PHARMACIES: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(
            "tashkent",
            vec![
                "💊 <b>Vet Pharmacy #1</b>\n📍 Chilonzor tumani\n📞 +998 71 111 22 33\n🕒 08:00-23:00",
                "💊 <b>Animal Drugs Center</b>\n📍 Yakkasaroy tumani\n📞 +998 71 222 33 44\n🕒 24/7",
                "💊 <b>Pet Med Tashkent</b>\n📍 Mirabad tumani\n📞 +998 71 333 44 55\n🕒 09:00-22:00",
            ],
        );
        m
    };
    static ref SHELTERS: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(
            "tashkent",
            vec![
                "🏠 <b>Tashkent Animal Shelter</b>\n📍 Qibray tumani\n📞 +998 71 444 55 66\n🐕 50+ animals",
                "🏠 <b>Hope for Pets Shelter</b>\n📍 Olmazor tumani\n📞 +998 71 555 66 77\n🐱 30+ animals",
            ],
        );
        m
    };
}

/// Pet facts shown in the facts section, one at random per request.
pub const ANIMAL_FACTS: &[&str] = &[
    "🐕 Собаки понимают до 250 слов и жестов, считают до пяти и могут решать простейшие математические задачи.",
    "🐱 Кошки спят около 70% своей жизни.",
    "🐰 Кролики могут видеть позади себя, не поворачивая головы.",
    "🐦 Попугаи могут жить более 80 лет.",
    "🐠 Золотые рыбки имеют память около 3 месяцев.",
    "🦜 Некоторые виды попугаев могут имитировать человеческую речь почти идеально.",
    "🐹 Хомяки могут пробежать до 8 км за ночь в своем колесе.",
    "🐢 Черепахи могут жить более 100 лет.",
    "🦎 Некоторые ящерицы могут отбрасывать хвост при опасности.",
    "🐭 Мыши могут смеяться, когда их щекочут.",
];

/// News items shown in the news section.
pub const NEWS_ITEMS: &[&str] = &[
    "📰 <b>Новость 1:</b> В Ташкенте открылся новый приют для бездомных животных",
    "📰 <b>Новость 2:</b> Бесплатная вакцинация собак от бешенства в Самарканде",
    "📰 <b>Новость 3:</b> Конкурс на лучший зоомагазин Узбекистана 2024",
    "📰 <b>Новость 4:</b> Новый закон о защите животных в Узбекистане",
];

/// Listing for the given directory and city, if any entries exist.
pub fn directory_entries(kind: DirectoryKind, city: &str) -> Option<&'static [&'static str]> {
    let map = match kind {
        DirectoryKind::Clinics => &*CLINICS,
        DirectoryKind::Pharmacies => &*PHARMACIES,
        DirectoryKind::Shelters => &*SHELTERS,
    };
    map.get(city).map(|entries| entries.as_slice())
}

/// A random pet fact.
pub fn random_fact() -> &'static str {
    ANIMAL_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(ANIMAL_FACTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_city_has_clinics() {
        let entries = directory_entries(DirectoryKind::Clinics, "tashkent").unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].contains("Pet Care"));
    }

    #[test]
    fn test_unknown_city_is_none() {
        assert!(directory_entries(DirectoryKind::Clinics, "nukus").is_none());
        assert!(directory_entries(DirectoryKind::Pharmacies, "samarkand").is_none());
    }

    #[test]
    fn test_random_fact_comes_from_table() {
        for _ in 0..20 {
            assert!(ANIMAL_FACTS.contains(&random_fact()));
        }
    }

    #[test]
    fn test_map_url_is_well_formed() {
        let url = map_url(DirectoryKind::Clinics, "tashkent");
        assert_eq!(
            url,
            "https://www.google.com/maps/search/veterinary+clinics+tashkent"
        );
        assert!(map_url(DirectoryKind::Shelters, "samarkand").contains("animal+shelters"));
    }

    #[test]
    fn test_every_city_key_is_ascii_snake() {
        for city in CITIES {
            assert!(city
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
