//! Lead records.
//!
//! Two forms feed the shop's inbox:
//! - the general contact form (hardware, banking, web, consultation)
//! - the Kundli request form (birth data for an astrology report)
//!
//! Each form has a *draft* (every field as typed text) and an *accepted* record produced
//! only after the draft passes its schema. Accepted records are what go over the wire.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod cli;
pub mod form;
pub mod schema;

use schema::{FieldErrors, FieldKind, FieldRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTarget {
    Contact,
    Kundli,
}

impl LeadTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadTarget::Contact => "contact",
            LeadTarget::Kundli => "kundli",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            LeadTarget::Contact => "/api/contact",
            LeadTarget::Kundli => "/api/kundli",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactService {
    Hardware,
    Banking,
    Web,
    Consultation,
}

impl ContactService {
    pub const ALL: [ContactService; 4] = [
        ContactService::Hardware,
        ContactService::Banking,
        ContactService::Web,
        ContactService::Consultation,
    ];

    pub const CODES: &'static [&'static str] =
        &["hardware", "banking", "web", "consultation"];

    pub fn code(self) -> &'static str {
        match self {
            ContactService::Hardware => "hardware",
            ContactService::Banking => "banking",
            ContactService::Web => "web",
            ContactService::Consultation => "consultation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContactService::Hardware => "Hardware Support",
            ContactService::Banking => "Banking Support",
            ContactService::Web => "Web Development & Digital",
            ContactService::Consultation => "General Consultation",
        }
    }
}

impl FromStr for ContactService {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContactService::ALL
            .into_iter()
            .find(|service| service.code() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub const CODES: &'static [&'static str] = &["male", "female", "other"];

    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Display form: the code with its first letter upper-cased.
    pub fn display(self) -> String {
        let code = self.code();
        let mut chars = code.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.code() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KundliService {
    DetailedKundli,
    MarriageCompatibility,
    CareerAnalysis,
    HealthPrediction,
    GemstoneRecommendation,
}

impl KundliService {
    pub const ALL: [KundliService; 5] = [
        KundliService::DetailedKundli,
        KundliService::MarriageCompatibility,
        KundliService::CareerAnalysis,
        KundliService::HealthPrediction,
        KundliService::GemstoneRecommendation,
    ];

    pub const CODES: &'static [&'static str] = &[
        "detailed_kundli",
        "marriage_compatibility",
        "career_analysis",
        "health_prediction",
        "gemstone_recommendation",
    ];

    pub fn code(self) -> &'static str {
        match self {
            KundliService::DetailedKundli => "detailed_kundli",
            KundliService::MarriageCompatibility => "marriage_compatibility",
            KundliService::CareerAnalysis => "career_analysis",
            KundliService::HealthPrediction => "health_prediction",
            KundliService::GemstoneRecommendation => "gemstone_recommendation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KundliService::DetailedKundli => "Detailed Kundli Report",
            KundliService::MarriageCompatibility => "Marriage Compatibility Analysis",
            KundliService::CareerAnalysis => "Career & Finance Analysis",
            KundliService::HealthPrediction => "Health & Wellness Predictions",
            KundliService::GemstoneRecommendation => "Gemstone Recommendations",
        }
    }

    pub fn price(self) -> &'static str {
        match self {
            KundliService::DetailedKundli => "₹999",
            KundliService::MarriageCompatibility => "₹1,499",
            KundliService::CareerAnalysis => "₹799",
            KundliService::HealthPrediction => "₹699",
            KundliService::GemstoneRecommendation => "₹499",
        }
    }
}

impl FromStr for KundliService {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KundliService::ALL
            .into_iter()
            .find(|service| service.code() == s)
            .ok_or(())
    }
}

/// A form whose values are held as text until validation turns them into a typed record.
pub trait LeadDraft: Default + Clone {
    type Accepted: Serialize;

    const TARGET: LeadTarget;
    const SCHEMA: &'static [FieldRule];

    fn field(&self, name: &str) -> Option<&str>;

    fn field_mut(&mut self, name: &str) -> Option<&mut String>;

    /// Builds the typed record. Only called once every rule in `SCHEMA` has passed.
    fn to_accepted(&self) -> Result<Self::Accepted, FieldErrors>;

    fn accept(&self) -> Result<Self::Accepted, FieldErrors> {
        schema::check(self)?;
        self.to_accepted()
    }
}

fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_choice<T: FromStr>(field: &'static str, value: &str) -> Result<T, FieldErrors> {
    value
        .parse::<T>()
        .map_err(|_| FieldErrors::single(field, "Unknown choice"))
}

// --- Contact form ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: ContactService,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

const CONTACT_SCHEMA: &[FieldRule] = &[
    FieldRule {
        field: "name",
        label: "Name",
        kind: FieldKind::Required,
    },
    FieldRule {
        field: "email",
        label: "Email",
        kind: FieldKind::Email,
    },
    FieldRule {
        field: "phone",
        label: "Phone number",
        kind: FieldKind::Required,
    },
    FieldRule {
        field: "service",
        label: "Service",
        kind: FieldKind::OneOf {
            choices: ContactService::CODES,
            prompt: "Please select a service",
        },
    },
    FieldRule {
        field: "message",
        label: "Message",
        kind: FieldKind::Optional,
    },
];

impl LeadDraft for ContactDraft {
    type Accepted = ContactSubmission;

    const TARGET: LeadTarget = LeadTarget::Contact;
    const SCHEMA: &'static [FieldRule] = CONTACT_SCHEMA;

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "name" => &self.name,
            "email" => &self.email,
            "phone" => &self.phone,
            "service" => &self.service,
            "message" => &self.message,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "name" => Some(&mut self.name),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "service" => Some(&mut self.service),
            "message" => Some(&mut self.message),
            _ => None,
        }
    }

    fn to_accepted(&self) -> Result<ContactSubmission, FieldErrors> {
        Ok(ContactSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            service: parse_choice("service", &self.service)?,
            message: optional_text(&self.message),
        })
    }
}

// --- Kundli form ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KundliDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub date_of_birth: String,
    pub time_of_birth: String,
    pub place_of_birth: String,
    pub state: String,
    pub country: String,
    pub service_type: String,
    pub additional_requests: String,
}

pub const DEFAULT_COUNTRY: &str = "India";

impl Default for KundliDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            gender: String::new(),
            date_of_birth: String::new(),
            time_of_birth: String::new(),
            place_of_birth: String::new(),
            state: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            service_type: String::new(),
            additional_requests: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KundliSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: Gender,
    pub date_of_birth: String,
    pub time_of_birth: String,
    pub place_of_birth: String,
    pub state: String,
    pub country: String,
    pub service_type: KundliService,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_requests: Option<String>,
}

const KUNDLI_SCHEMA: &[FieldRule] = &[
    FieldRule {
        field: "name",
        label: "Name",
        kind: FieldKind::Text { min: 2, max: 100 },
    },
    FieldRule {
        field: "email",
        label: "Email",
        kind: FieldKind::Email,
    },
    FieldRule {
        field: "phone",
        label: "Phone number",
        kind: FieldKind::Text { min: 10, max: 15 },
    },
    FieldRule {
        field: "gender",
        label: "Gender",
        kind: FieldKind::OneOf {
            choices: Gender::CODES,
            prompt: "Please select your gender",
        },
    },
    FieldRule {
        field: "dateOfBirth",
        label: "Date of birth",
        kind: FieldKind::Required,
    },
    FieldRule {
        field: "timeOfBirth",
        label: "Time of birth",
        kind: FieldKind::Required,
    },
    FieldRule {
        field: "placeOfBirth",
        label: "Place of birth",
        kind: FieldKind::Text { min: 2, max: 100 },
    },
    FieldRule {
        field: "state",
        label: "State",
        kind: FieldKind::Text { min: 2, max: 50 },
    },
    FieldRule {
        field: "country",
        label: "Country",
        kind: FieldKind::Text { min: 2, max: 50 },
    },
    FieldRule {
        field: "serviceType",
        label: "Service type",
        kind: FieldKind::OneOf {
            choices: KundliService::CODES,
            prompt: "Please select a service type",
        },
    },
    FieldRule {
        field: "additionalRequests",
        label: "Additional requests",
        kind: FieldKind::Optional,
    },
];

impl LeadDraft for KundliDraft {
    type Accepted = KundliSubmission;

    const TARGET: LeadTarget = LeadTarget::Kundli;
    const SCHEMA: &'static [FieldRule] = KUNDLI_SCHEMA;

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "name" => &self.name,
            "email" => &self.email,
            "phone" => &self.phone,
            "gender" => &self.gender,
            "dateOfBirth" => &self.date_of_birth,
            "timeOfBirth" => &self.time_of_birth,
            "placeOfBirth" => &self.place_of_birth,
            "state" => &self.state,
            "country" => &self.country,
            "serviceType" => &self.service_type,
            "additionalRequests" => &self.additional_requests,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "name" => Some(&mut self.name),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "gender" => Some(&mut self.gender),
            "dateOfBirth" => Some(&mut self.date_of_birth),
            "timeOfBirth" => Some(&mut self.time_of_birth),
            "placeOfBirth" => Some(&mut self.place_of_birth),
            "state" => Some(&mut self.state),
            "country" => Some(&mut self.country),
            "serviceType" => Some(&mut self.service_type),
            "additionalRequests" => Some(&mut self.additional_requests),
            _ => None,
        }
    }

    fn to_accepted(&self) -> Result<KundliSubmission, FieldErrors> {
        Ok(KundliSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            gender: parse_choice("gender", &self.gender)?,
            date_of_birth: self.date_of_birth.clone(),
            time_of_birth: self.time_of_birth.clone(),
            place_of_birth: self.place_of_birth.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            service_type: parse_choice("serviceType", &self.service_type)?,
            additional_requests: optional_text(&self.additional_requests),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{contact_draft, kundli_draft};
    use super::*;

    #[test]
    fn gender_display_capitalizes_every_code() {
        assert_eq!(Gender::Male.display(), "Male");
        assert_eq!(Gender::Female.display(), "Female");
        assert_eq!(Gender::Other.display(), "Other");
        for gender in Gender::ALL {
            assert_eq!(gender.display().to_lowercase(), gender.code());
        }
    }

    #[test]
    fn codes_parse_back_to_their_variants() {
        for service in KundliService::ALL {
            assert_eq!(service.code().parse::<KundliService>(), Ok(service));
        }
        for service in ContactService::ALL {
            assert_eq!(service.code().parse::<ContactService>(), Ok(service));
        }
        assert!("astrology".parse::<ContactService>().is_err());
    }

    #[test]
    fn code_tables_match_variants() {
        let kundli: Vec<_> = KundliService::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(kundli, KundliService::CODES);
        let contact: Vec<_> = ContactService::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(contact, ContactService::CODES);
    }

    #[test]
    fn kundli_draft_defaults_to_india() {
        let draft = KundliDraft::default();
        assert_eq!(draft.country, "India");
        assert!(draft.name.is_empty());
    }

    #[test]
    fn kundli_submission_serializes_camel_case() {
        let submission = kundli_draft().accept().unwrap();
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["dateOfBirth"], "1994-03-21");
        assert_eq!(json["serviceType"], "marriage_compatibility");
        assert_eq!(json["gender"], "female");
        assert!(json.get("additionalRequests").is_none());
    }

    #[test]
    fn contact_submission_omits_blank_message() {
        let submission = contact_draft().accept().unwrap();
        assert_eq!(submission.message, None);
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["service"], "hardware");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn whitespace_only_optional_text_is_sent_as_typed() {
        let contact = ContactDraft {
            message: "  ".to_string(),
            ..contact_draft()
        }
        .accept()
        .unwrap();
        assert_eq!(contact.message.as_deref(), Some("  "));

        let kundli = KundliDraft {
            additional_requests: " ".to_string(),
            ..kundli_draft()
        }
        .accept()
        .unwrap();
        assert_eq!(kundli.additional_requests.as_deref(), Some(" "));
    }

    #[test]
    fn drafts_ignore_unknown_fields_when_deserialized() {
        let draft: ContactDraft = serde_json::from_value(serde_json::json!({
            "name": "A Kumar",
            "email": "a@x.com",
            "referrer": "flyer",
        }))
        .unwrap();
        assert_eq!(draft.name, "A Kumar");
        assert!(draft.phone.is_empty());
    }

    #[test]
    fn field_lookup_uses_wire_names() {
        let mut draft = kundli_draft();
        assert_eq!(draft.field("placeOfBirth"), Some("Sirohi"));
        assert_eq!(draft.field("place_of_birth"), None);
        *draft.field_mut("state").unwrap() = "Gujarat".to_string();
        assert_eq!(draft.state, "Gujarat");
    }
}
