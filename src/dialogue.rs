//! Conversation state for multi-step flows: symptom check, profile creation,
//! reminders and ads.
//!
//! Every flow is a sequential form: each incoming text message fills the next
//! missing field and the state carries the partial form between messages.
//! Pressing any menu button abandons the active form.

use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::triage::PetType;

/// Conversation state for the PetHelper dialogue.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum BotDialogueState {
    #[default]
    Start,
    /// Animal type chosen, the next message is a symptom description.
    AwaitingSymptoms { pet_type: PetType },
    OwnerProfile { form: OwnerProfileForm },
    VetProfile { form: VetProfileForm },
    /// Reminder kind chosen, waiting for the reminder text.
    ReminderText { kind: ReminderKind },
    /// Waiting for the date/time/weekday input matching the kind.
    ReminderSchedule { kind: ReminderKind, text: String },
    Ad { form: AdForm },
}

/// Type alias for the PetHelper dialogue.
pub type BotDialogue = Dialogue<BotDialogueState, InMemStorage<BotDialogueState>>;

/// Step result of feeding one input into a sequential form.
pub enum FormStep<F, C> {
    /// More fields to collect; `prompt_key` is the locale key of the next prompt.
    Next { form: F, prompt_key: &'static str },
    Complete(C),
}

/// Partially collected owner profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OwnerProfileForm {
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub city: Option<String>,
    pub pet_name: Option<String>,
}

/// Completed owner profile ready to persist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerProfile {
    pub owner_name: String,
    pub owner_phone: String,
    pub city: String,
    pub pet_name: String,
    pub pet_kind: String,
}

impl OwnerProfileForm {
    /// Locale key of the first prompt in the flow.
    pub const FIRST_PROMPT: &'static str = "enter-owner-name";

    /// Fill the next missing field with the given input.
    pub fn fill(mut self, input: String) -> FormStep<Self, OwnerProfile> {
        if self.owner_name.is_none() {
            self.owner_name = Some(input);
            return FormStep::Next {
                form: self,
                prompt_key: "enter-owner-phone",
            };
        }
        if self.owner_phone.is_none() {
            self.owner_phone = Some(input);
            return FormStep::Next {
                form: self,
                prompt_key: "enter-city",
            };
        }
        if self.city.is_none() {
            self.city = Some(input);
            return FormStep::Next {
                form: self,
                prompt_key: "enter-pet-name",
            };
        }
        if self.pet_name.is_none() {
            self.pet_name = Some(input);
            return FormStep::Next {
                form: self,
                prompt_key: "enter-pet-type",
            };
        }

        FormStep::Complete(OwnerProfile {
            owner_name: self.owner_name.expect("checked above"),
            owner_phone: self.owner_phone.expect("checked above"),
            city: self.city.expect("checked above"),
            pet_name: self.pet_name.expect("checked above"),
            pet_kind: input,
        })
    }
}

/// Partially collected veterinarian profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VetProfileForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub telegram: Option<String>,
    pub consultation_price: Option<String>,
}

/// Completed veterinarian profile ready to persist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VetProfile {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub specialization: String,
    pub experience: String,
    pub education: String,
    pub telegram: String,
    pub consultation_price: String,
    pub about: String,
}

impl VetProfileForm {
    /// Locale key of the first prompt in the flow.
    pub const FIRST_PROMPT: &'static str = "enter-vet-name";

    /// Fill the next missing field with the given input.
    pub fn fill(mut self, input: String) -> FormStep<Self, VetProfile> {
        macro_rules! step {
            ($field:ident, $next:expr) => {
                if self.$field.is_none() {
                    self.$field = Some(input);
                    return FormStep::Next {
                        form: self,
                        prompt_key: $next,
                    };
                }
            };
        }

        step!(name, "enter-vet-phone");
        step!(phone, "enter-vet-city");
        step!(city, "enter-vet-specialization");
        step!(specialization, "enter-vet-experience");
        step!(experience, "enter-vet-education");
        step!(education, "enter-vet-telegram");
        step!(telegram, "enter-vet-price");
        step!(consultation_price, "enter-vet-about");

        FormStep::Complete(VetProfile {
            name: self.name.expect("checked above"),
            phone: self.phone.expect("checked above"),
            city: self.city.expect("checked above"),
            specialization: self.specialization.expect("checked above"),
            experience: self.experience.expect("checked above"),
            education: self.education.expect("checked above"),
            telegram: self.telegram.expect("checked above"),
            consultation_price: self.consultation_price.expect("checked above"),
            about: input,
        })
    }
}

/// Partially collected classified ad.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AdForm {
    pub title: Option<String>,
    pub body: Option<String>,
    pub price: Option<String>,
}

/// Completed ad ready to publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdDraft {
    pub title: String,
    pub body: String,
    pub price: String,
    pub contact: String,
}

impl AdForm {
    /// Locale key of the first prompt in the flow.
    pub const FIRST_PROMPT: &'static str = "enter-ad-title";

    /// Fill the next missing field with the given input.
    pub fn fill(mut self, input: String) -> FormStep<Self, AdDraft> {
        if self.title.is_none() {
            self.title = Some(input);
            return FormStep::Next {
                form: self,
                prompt_key: "enter-ad-text",
            };
        }
        if self.body.is_none() {
            self.body = Some(input);
            return FormStep::Next {
                form: self,
                prompt_key: "enter-ad-price",
            };
        }
        if self.price.is_none() {
            self.price = Some(input);
            return FormStep::Next {
                form: self,
                prompt_key: "enter-ad-contact",
            };
        }

        FormStep::Complete(AdDraft {
            title: self.title.expect("checked above"),
            body: self.body.expect("checked above"),
            price: self.price.expect("checked above"),
            contact: input,
        })
    }
}

/// Repetition kind of a reminder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderKind {
    OneTime,
    Daily,
    Weekly,
    Custom,
}

impl ReminderKind {
    /// Parse the suffix of a `remtype_*` callback payload.
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "one_time" => Some(ReminderKind::OneTime),
            "daily" => Some(ReminderKind::Daily),
            "weekly" => Some(ReminderKind::Weekly),
            "custom" => Some(ReminderKind::Custom),
            _ => None,
        }
    }

    /// Stable identifier used in callback data and database rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::OneTime => "one_time",
            ReminderKind::Daily => "daily",
            ReminderKind::Weekly => "weekly",
            ReminderKind::Custom => "custom",
        }
    }

    /// Locale key of the human-readable kind name.
    pub fn label_key(&self) -> &'static str {
        match self {
            ReminderKind::OneTime => "one-time",
            ReminderKind::Daily => "daily",
            ReminderKind::Weekly => "weekly",
            ReminderKind::Custom => "custom",
        }
    }

    /// Locale key of the schedule prompt shown after the reminder text.
    pub fn schedule_prompt_key(&self) -> &'static str {
        match self {
            ReminderKind::OneTime => "enter-reminder-date",
            ReminderKind::Daily => "enter-reminder-time",
            ReminderKind::Weekly => "enter-reminder-days",
            ReminderKind::Custom => "enter-reminder-dates",
        }
    }
}

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid date regex");
    static ref TIME_RE: Regex = Regex::new(r"^\d{1,2}:\d{2}$").expect("valid time regex");
}

/// Validate a free-text form field: non-empty after trimming, at most 255 chars.
pub fn validate_field(input: &str) -> Result<String, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > 255 {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

/// Validate a DD.MM.YYYY reminder date.
pub fn validate_date(input: &str) -> Result<NaiveDate, &'static str> {
    let trimmed = input.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err("invalid-date");
    }
    NaiveDate::parse_from_str(trimmed, "%d.%m.%Y").map_err(|_| "invalid-date")
}

/// Validate an HH:MM reminder time.
pub fn validate_time(input: &str) -> Result<NaiveTime, &'static str> {
    let trimmed = input.trim();
    if !TIME_RE.is_match(trimmed) {
        return Err("invalid-time");
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M").map_err(|_| "invalid-time")
}

/// Validate the schedule input for a reminder of the given kind.
///
/// Returns the normalized schedule string to store, or the locale key of the
/// validation error to show.
pub fn validate_schedule(kind: ReminderKind, input: &str) -> Result<String, &'static str> {
    match kind {
        ReminderKind::OneTime => validate_date(input).map(|_| input.trim().to_string()),
        ReminderKind::Daily => validate_time(input).map(|_| input.trim().to_string()),
        // Weekday lists and custom date lists are stored as entered.
        ReminderKind::Weekly | ReminderKind::Custom => validate_field(input).map_err(|_| "empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_form_sequence() {
        let form = OwnerProfileForm::default();
        let form = match form.fill("Анна".into()) {
            FormStep::Next { form, prompt_key } => {
                assert_eq!(prompt_key, "enter-owner-phone");
                form
            }
            FormStep::Complete(_) => panic!("form complete too early"),
        };
        let form = match form.fill("+998901234567".into()) {
            FormStep::Next { form, prompt_key } => {
                assert_eq!(prompt_key, "enter-city");
                form
            }
            FormStep::Complete(_) => panic!("form complete too early"),
        };
        let form = match form.fill("Ташкент".into()) {
            FormStep::Next { form, prompt_key } => {
                assert_eq!(prompt_key, "enter-pet-name");
                form
            }
            FormStep::Complete(_) => panic!("form complete too early"),
        };
        let form = match form.fill("Барсик".into()) {
            FormStep::Next { form, prompt_key } => {
                assert_eq!(prompt_key, "enter-pet-type");
                form
            }
            FormStep::Complete(_) => panic!("form complete too early"),
        };
        match form.fill("кот".into()) {
            FormStep::Complete(profile) => {
                assert_eq!(profile.owner_name, "Анна");
                assert_eq!(profile.pet_name, "Барсик");
                assert_eq!(profile.pet_kind, "кот");
            }
            FormStep::Next { .. } => panic!("form should be complete"),
        }
    }

    #[test]
    fn test_vet_form_completes_after_nine_inputs() {
        let mut form = VetProfileForm::default();
        let inputs = [
            "Др. Алиев",
            "+998711234567",
            "Ташкент",
            "хирург",
            "10",
            "ТашГАУ",
            "@aliyev_vet",
            "50$",
        ];
        for input in inputs {
            form = match form.fill(input.into()) {
                FormStep::Next { form, .. } => form,
                FormStep::Complete(_) => panic!("form complete too early"),
            };
        }
        match form.fill("Опытный хирург".into()) {
            FormStep::Complete(profile) => {
                assert_eq!(profile.name, "Др. Алиев");
                assert_eq!(profile.about, "Опытный хирург");
            }
            FormStep::Next { .. } => panic!("form should be complete"),
        }
    }

    #[test]
    fn test_ad_form_sequence() {
        let form = AdForm::default();
        let form = match form.fill("Продам аквариум".into()) {
            FormStep::Next { form, prompt_key } => {
                assert_eq!(prompt_key, "enter-ad-text");
                form
            }
            FormStep::Complete(_) => panic!("form complete too early"),
        };
        let form = match form.fill("100 литров, с крышкой".into()) {
            FormStep::Next { form, prompt_key } => {
                assert_eq!(prompt_key, "enter-ad-price");
                form
            }
            FormStep::Complete(_) => panic!("form complete too early"),
        };
        let form = match form.fill("500 000 сум".into()) {
            FormStep::Next { form, prompt_key } => {
                assert_eq!(prompt_key, "enter-ad-contact");
                form
            }
            FormStep::Complete(_) => panic!("form complete too early"),
        };
        match form.fill("@seller".into()) {
            FormStep::Complete(ad) => {
                assert_eq!(ad.title, "Продам аквариум");
                assert_eq!(ad.price, "500 000 сум");
                assert_eq!(ad.contact, "@seller");
            }
            FormStep::Next { .. } => panic!("form should be complete"),
        }
    }

    #[test]
    fn test_field_validation() {
        assert_eq!(validate_field("  Барсик  ").unwrap(), "Барсик");
        assert!(validate_field("").is_err());
        assert!(validate_field("   ").is_err());
        assert!(validate_field(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_date_validation() {
        assert!(validate_date("25.12.2024").is_ok());
        assert!(validate_date(" 01.01.2025 ").is_ok());
        assert!(validate_date("31.02.2024").is_err());
        assert!(validate_date("2024-12-25").is_err());
        assert!(validate_date("завтра").is_err());
    }

    #[test]
    fn test_time_validation() {
        assert!(validate_time("09:00").is_ok());
        assert!(validate_time("23:59").is_ok());
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("9 утра").is_err());
    }

    #[test]
    fn test_schedule_validation_per_kind() {
        assert!(validate_schedule(ReminderKind::OneTime, "25.12.2024").is_ok());
        assert!(validate_schedule(ReminderKind::OneTime, "09:00").is_err());
        assert!(validate_schedule(ReminderKind::Daily, "09:00").is_ok());
        assert!(validate_schedule(ReminderKind::Daily, "25.12.2024").is_err());
        assert!(validate_schedule(ReminderKind::Weekly, "ПН,СР,ПТ").is_ok());
        assert!(validate_schedule(ReminderKind::Weekly, "  ").is_err());
    }

    #[test]
    fn test_reminder_kind_round_trip() {
        for kind in [
            ReminderKind::OneTime,
            ReminderKind::Daily,
            ReminderKind::Weekly,
            ReminderKind::Custom,
        ] {
            assert_eq!(ReminderKind::from_callback(kind.as_str()), Some(kind));
        }
        assert_eq!(ReminderKind::from_callback("yearly"), None);
    }
}
