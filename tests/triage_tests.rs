//! # Triage Engine Tests
//!
//! Behavioral tests for the symptom classifier and the emergency gate as seen
//! through the public API: category priority, bilingual matching, banner
//! composition and response invariants.

use pethelper::triage::{classify, is_emergency, triage, Category, PetType};

#[cfg(test)]
mod tests {
    use super::*;

    const DISCLAIMER_MARKER: &str = "⚠️ ВНИМАНИЕ";
    const EMERGENCY_MARKER: &str = "ЭКСТРЕННАЯ СИТУАЦИЯ";

    #[test]
    fn test_emergency_detected_in_russian_and_english() {
        assert!(is_emergency("у собаки кровь в моче"));
        assert!(is_emergency("the dog has blood in its urine"));
        assert!(is_emergency("начались судороги"));
        assert!(is_emergency("sudden seizure at night"));
        assert!(is_emergency("попугай не дышит"));
        assert!(is_emergency("cat is unconscious"));
    }

    #[test]
    fn test_emergency_is_case_insensitive() {
        assert!(is_emergency("КРОВЬ из носа"));
        assert!(is_emergency("BLOOD everywhere"));
    }

    #[test]
    fn test_no_emergency_for_mild_symptoms() {
        assert!(!is_emergency("немного чешется за ухом"));
        assert!(!is_emergency("sneezing once in the morning"));
    }

    #[test]
    fn test_every_report_gets_exactly_one_disclaimer() {
        for text in [
            "рвота и понос",
            "vomiting all day",
            "не ест вторые сутки",
            "кашель и чихание",
            "хромает на заднюю лапу",
            "просто грустный",
            "у кота кровь и судороги",
            "",
        ] {
            let result = triage(text, PetType::Dog);
            assert_eq!(
                result.message.matches(DISCLAIMER_MARKER).count(),
                1,
                "disclaimer count wrong for: {text:?}"
            );
        }
    }

    #[test]
    fn test_category_priority_digestive_over_skin() {
        // Both digestive and skin keywords present; digestive is checked first
        let result = triage("рвота и чешется", PetType::Cat);
        assert_eq!(result.category, Category::Digestive);
        assert!(!result.is_emergency);
    }

    #[test]
    fn test_category_priority_appetite_over_pain() {
        let result = triage("не ест и хромает", PetType::Dog);
        assert_eq!(result.category, Category::Appetite);
    }

    #[test]
    fn test_bilingual_keywords_reach_same_category() {
        let ru = triage("у кошки понос", PetType::Cat);
        let en = triage("the cat has diarrhea", PetType::Cat);
        assert_eq!(ru.category, Category::Digestive);
        assert_eq!(en.category, Category::Digestive);
        assert_eq!(ru.message, en.message);
    }

    #[test]
    fn test_unrecognized_text_falls_back_to_general() {
        let result = triage("он какой-то не такой сегодня", PetType::Rodent);
        assert_eq!(result.category, Category::General);
        assert!(result.message.contains("Общие рекомендации"));
    }

    #[test]
    fn test_emergency_does_not_suppress_classification() {
        // Emergency keyword plus digestive keyword: banner AND category advice
        let result = triage("У кота кровь и рвота", PetType::Cat);
        assert!(result.is_emergency);
        assert_eq!(result.category, Category::Digestive);
        assert!(result.message.contains(EMERGENCY_MARKER));
        assert!(result.message.contains("Рекомендации по симптомам"));
    }

    #[test]
    fn test_emergency_banner_comes_first() {
        let result = triage("собака не дышит", PetType::Dog);
        assert!(result.is_emergency);
        let banner_pos = result.message.find(EMERGENCY_MARKER).unwrap();
        let header_pos = result.message.find("Рекомендации по симптомам").unwrap();
        assert!(banner_pos < header_pos);
    }

    #[test]
    fn test_non_emergency_has_no_banner() {
        let result = triage("чихает по утрам", PetType::Bird);
        assert!(!result.is_emergency);
        assert!(!result.message.contains(EMERGENCY_MARKER));
    }

    #[test]
    fn test_pet_type_does_not_affect_output() {
        let reference = classify("кашель и хрип", PetType::Unknown);
        for pet_type in [
            PetType::Dog,
            PetType::Cat,
            PetType::Rodent,
            PetType::Bird,
            PetType::Fish,
        ] {
            assert_eq!(classify("кашель и хрип", pet_type), reference);
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let first = triage("рвота у щенка", PetType::Dog);
        let second = triage("рвота у щенка", PetType::Dog);
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_categories_reachable() {
        let cases = [
            ("рвота", Category::Digestive),
            ("не ест", Category::Appetite),
            ("чешется", Category::Skin),
            ("кашель", Category::Respiratory),
            ("хромает", Category::Pain),
            ("что-то странное", Category::General),
        ];
        for (text, expected) in cases {
            assert_eq!(triage(text, PetType::Dog).category, expected, "for {text:?}");
        }
    }
}
