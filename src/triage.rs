//! # Symptom Triage Module
//!
//! Rule-based triage for free-text symptom descriptions. Two independent
//! checks run over the same input:
//!
//! - an emergency gate ([`is_emergency`]) that scans for high-urgency keywords
//!   and, when it fires, prepends an urgent-action banner;
//! - a category classifier ([`classify`]) that walks a fixed priority-ordered
//!   rule table and emits the advice block of the first matching category,
//!   falling back to general recommendations when nothing matches.
//!
//! Both are pure functions over static tables: no state, no I/O, safe to call
//! concurrently. Keywords are matched as case-insensitive substrings and carry
//! Russian and English variants as literal duplicate entries.
//!
//! This is a basic keyword system, not a diagnostic engine. Every response
//! ends with a disclaimer urging a veterinary consultation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of animal a symptom report is about.
///
/// Threaded through the classifier but does not currently change which advice
/// is returned; pet-specific advice is a known gap, not wired up yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PetType {
    Dog,
    Cat,
    Rodent,
    Bird,
    Fish,
    #[default]
    Unknown,
}

impl PetType {
    /// Parse the suffix of an `animal_*` callback payload.
    pub fn from_callback(data: &str) -> Self {
        match data {
            "dog" => PetType::Dog,
            "cat" => PetType::Cat,
            "rodent" => PetType::Rodent,
            "bird" => PetType::Bird,
            "fish" => PetType::Fish,
            _ => PetType::Unknown,
        }
    }

    /// Stable identifier used in callback data and database rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            PetType::Dog => "dog",
            PetType::Cat => "cat",
            PetType::Rodent => "rodent",
            PetType::Bird => "bird",
            PetType::Fish => "fish",
            PetType::Unknown => "unknown",
        }
    }

}

impl fmt::Display for PetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symptom category a report classifies into.
///
/// Ordering is significant: categories are tested in the order they appear in
/// [`CATEGORY_RULES`] and only the first hit is reported. `General` is the
/// zero-match fallback and owns no keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Digestive,
    Appetite,
    Skin,
    Respiratory,
    Pain,
    General,
}

impl Category {
    /// Stable identifier used in database rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Digestive => "digestive",
            Category::Appetite => "appetite",
            Category::Skin => "skin",
            Category::Respiratory => "respiratory",
            Category::Pain => "pain",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification rule: trigger keywords plus the canned advice block.
struct CategoryRule {
    category: Category,
    /// Case-insensitive substring triggers, Russian and English variants listed
    /// side by side.
    keywords: &'static [&'static str],
    advice: &'static str,
}

/// Priority-ordered rule table: digestive > appetite > skin > respiratory > pain.
/// First match wins; see [`GENERAL_ADVICE`] for the fallback.
static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Digestive,
        keywords: &["рвота", "понос", "диарея", "vomit", "diarrhea"],
        advice: "⚠️ <b>Симптомы могут указывать на отравление или инфекцию.</b>\n\
                 • Обеспечьте доступ к воде\n\
                 • Не кормите 12-24 часа\n\
                 • Срочно обратитесь к ветеринару\n\n",
    },
    CategoryRule {
        category: Category::Appetite,
        keywords: &["не ест", "аппетит", "отказ", "not eating", "appetite"],
        advice: "⚠️ <b>Отказ от еды может быть признаком различных заболеваний.</b>\n\
                 • Проверьте температуру\n\
                 • Предложите любимое лакомство\n\
                 • Если не ест более 24 часов - к врачу\n\n",
    },
    CategoryRule {
        category: Category::Skin,
        keywords: &["чешется", "зуд", "аллергия", "itching", "scratch", "allergy"],
        advice: "⚠️ <b>Возможна аллергия или кожное заболевание.</b>\n\
                 • Проверьте на блох и клещей\n\
                 • Исключите новые продукты\n\
                 • Консультация дерматолога\n\n",
    },
    CategoryRule {
        category: Category::Respiratory,
        keywords: &["кашель", "чихает", "дышит", "cough", "sneeze", "breathing"],
        advice: "⚠️ <b>Проблемы с дыханием требуют внимания.</b>\n\
                 • Проверьте температуру\n\
                 • Обеспечьте покой\n\
                 • При затрудненном дыхании - срочно к врачу\n\n",
    },
    CategoryRule {
        category: Category::Pain,
        keywords: &["боль", "хромает", "скулит", "pain", "limping", "whining"],
        advice: "⚠️ <b>Признаки боли или дискомфорта.</b>\n\
                 • Ограничьте физическую активность\n\
                 • Осмотрите на наличие травм\n\
                 • Консультация ветеринара обязательна\n\n",
    },
];

/// Fallback advice when no category keyword matches.
static GENERAL_ADVICE: &str = "ℹ️ <b>Общие рекомендации:</b>\n\
                               • Наблюдайте за состоянием\n\
                               • Измерьте температуру\n\
                               • При ухудшении - обратитесь к ветеринару\n\n";

static RESPONSE_HEADER: &str = "🩺 <b>Рекомендации по симптомам:</b>\n\n";

/// Closing line appended to every classification, matched or fallback.
static DISCLAIMER: &str = "<b>⚠️ ВНИМАНИЕ:</b> Это только общие рекомендации. \
                           Для точного диагноза обратитесь к ветеринару!";

/// Urgent-action banner prepended when the emergency gate fires.
static EMERGENCY_BANNER: &str = "🚨 <b>ЭКСТРЕННАЯ СИТУАЦИЯ!</b>\n\n\
    Обнаружены симптомы, требующие немедленной медицинской помощи!\n\n\
    ⚠️ <b>СРОЧНО обратитесь к ветеринару или в ближайшую клинику!</b>\n\n";

/// High-urgency keywords, independent of category matching.
static EMERGENCY_KEYWORDS: &[&str] = &[
    "кровь",
    "blood",
    "судороги",
    "seizure",
    "не дышит",
    "not breathing",
    "потеря сознания",
    "unconscious",
    "травма",
    "injury",
    "яд",
    "poison",
];

/// Keywords that require immediate veterinary attention.
pub fn emergency_keywords() -> &'static [&'static str] {
    EMERGENCY_KEYWORDS
}

/// Whether the symptom description contains any emergency keyword.
///
/// Case-insensitive substring containment; empty or whitespace-only text is
/// never an emergency.
pub fn is_emergency(symptoms_text: &str) -> bool {
    let lower = symptoms_text.to_lowercase();
    EMERGENCY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// First category in priority order whose keyword list hits the text.
fn match_category(lower: &str) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.category)
        .unwrap_or(Category::General)
}

/// Analyze a symptom description and return the full recommendation text.
///
/// Total over all inputs: always header + advice block + disclaimer. The
/// `_pet_type` argument does not yet influence the advice; it is accepted so
/// callers can thread it through and it lands in the saved record.
pub fn classify(symptoms_text: &str, _pet_type: PetType) -> String {
    let lower = symptoms_text.to_lowercase();

    let advice = CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.advice)
        .unwrap_or(GENERAL_ADVICE);

    let mut response = String::with_capacity(
        RESPONSE_HEADER.len() + advice.len() + DISCLAIMER.len(),
    );
    response.push_str(RESPONSE_HEADER);
    response.push_str(advice);
    response.push_str(DISCLAIMER);
    response
}

/// Outcome of running both the emergency gate and the classifier on one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageResult {
    pub is_emergency: bool,
    pub category: Category,
    /// Fully composed message: emergency banner (if any) followed by the
    /// classification recommendation.
    pub message: String,
}

/// Run the full triage: emergency gate first, classifier unconditionally.
///
/// Emergency detection never suppresses classification; it only prepends the
/// urgent-action banner to the classifier output.
pub fn triage(symptoms_text: &str, pet_type: PetType) -> TriageResult {
    let emergency = is_emergency(symptoms_text);
    let category = match_category(&symptoms_text.to_lowercase());
    let recommendations = classify(symptoms_text, pet_type);

    let message = if emergency {
        format!("{EMERGENCY_BANNER}{recommendations}")
    } else {
        recommendations
    };

    TriageResult {
        is_emergency: emergency,
        category,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_detection_bilingual() {
        assert!(is_emergency("У собаки кровь из носа"));
        assert!(is_emergency("my dog has BLOOD in stool"));
        assert!(is_emergency("судороги уже час"));
        assert!(is_emergency("the cat is not breathing"));
        assert!(!is_emergency("собака весёлая"));
        assert!(!is_emergency(""));
        assert!(!is_emergency("   \n\t"));
    }

    #[test]
    fn test_classify_is_total_and_ends_with_disclaimer() {
        for text in ["", "рвота", "питомец выглядит нормально", "🐾"] {
            let out = classify(text, PetType::Unknown);
            assert!(!out.is_empty());
            assert!(out.ends_with(DISCLAIMER));
            // Disclaimer appears exactly once.
            assert_eq!(out.matches(DISCLAIMER).count(), 1);
        }
    }

    #[test]
    fn test_priority_order_digestive_beats_skin() {
        let result = triage("рвота и чешется", PetType::Dog);
        assert_eq!(result.category, Category::Digestive);
        assert!(result.message.contains("отравление или инфекцию"));
        assert!(!result.message.contains("аллергия или кожное"));
    }

    #[test]
    fn test_fallback_for_unmatched_text() {
        let result = triage("питомец выглядит нормально", PetType::Cat);
        assert_eq!(result.category, Category::General);
        assert!(result.message.contains("Общие рекомендации"));
    }

    #[test]
    fn test_emergency_does_not_override_category() {
        let result = triage("У кота кровь и рвота", PetType::Cat);
        assert!(result.is_emergency);
        assert_eq!(result.category, Category::Digestive);
        assert!(result.message.starts_with(EMERGENCY_BANNER));
        assert!(result.message.contains("отравление или инфекцию"));
        assert!(result.message.ends_with(DISCLAIMER));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let a = classify("кашель и чихает", PetType::Bird);
        let b = classify("кашель и чихает", PetType::Bird);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pet_type_does_not_change_advice() {
        // Known gap carried over deliberately: advice is pet-type agnostic.
        let dog = classify("хромает", PetType::Dog);
        let fish = classify("хромает", PetType::Fish);
        assert_eq!(dog, fish);
    }

    #[test]
    fn test_each_category_reachable() {
        let cases = [
            ("vomit everywhere", Category::Digestive),
            ("совсем нет аппетита", Category::Appetite),
            ("постоянный зуд", Category::Skin),
            ("тяжело дышит", Category::Respiratory),
            ("limping on front leg", Category::Pain),
            ("всё хорошо", Category::General),
        ];
        for (text, expected) in cases {
            assert_eq!(triage(text, PetType::Unknown).category, expected, "{text}");
        }
    }

    #[test]
    fn test_pet_type_callback_round_trip() {
        for pet in [
            PetType::Dog,
            PetType::Cat,
            PetType::Rodent,
            PetType::Bird,
            PetType::Fish,
        ] {
            assert_eq!(PetType::from_callback(pet.as_str()), pet);
        }
        assert_eq!(PetType::from_callback("dragon"), PetType::Unknown);
    }
}
