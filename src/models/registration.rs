//! # Registration Models
//!
//! Form state, the typed submission request, and the routing and
//! translation results the gateway returns for a submission.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClientError, ClientResult};

/// System names used by the content-based router
pub const HOUSING_SYSTEM: &str = "Housing System";
pub const BILLING_SYSTEM: &str = "Billing System";
pub const LIBRARY_SYSTEM: &str = "Library System";

/// Year level of the registering student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YearLevel {
    #[serde(rename = "First Year")]
    First,
    #[serde(rename = "Second Year")]
    Second,
    #[serde(rename = "Third Year")]
    Third,
    #[serde(rename = "Fourth Year")]
    Fourth,
}

impl YearLevel {
    pub const ALL: [YearLevel; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "First Year",
            Self::Second => "Second Year",
            Self::Third => "Third Year",
            Self::Fourth => "Fourth Year",
        }
    }

    /// First-year students are routed to housing, everyone else to billing
    #[must_use]
    pub const fn is_first_year(self) -> bool {
        matches!(self, Self::First)
    }
}

impl fmt::Display for YearLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for YearLevel {
    type Err = ClientError;

    /// Accepts the four labels plus the shorthands the gateway itself
    /// recognises for first-year students ("1", "1st year", "freshman").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "first year" | "1" | "1st year" | "freshman" => Ok(Self::First),
            "second year" | "2" | "2nd year" | "sophomore" => Ok(Self::Second),
            "third year" | "3" | "3rd year" | "junior" => Ok(Self::Third),
            "fourth year" | "4" | "4th year" | "senior" => Ok(Self::Fourth),
            _ => Err(ClientError::InvalidInput(format!(
                "Invalid year level '{}'. Valid: First Year, Second Year, Third Year, Fourth Year",
                s
            ))),
        }
    }
}

/// Registration form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    StudentName,
    StudentId,
    Email,
    Program,
    YearLevel,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 5] = [
        Self::StudentName,
        Self::StudentId,
        Self::Email,
        Self::Program,
        Self::YearLevel,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StudentName => "Full Name",
            Self::StudentId => "Student ID",
            Self::Email => "Email Address",
            Self::Program => "Program",
            Self::YearLevel => "Year Level",
        }
    }
}

/// Registration form state as typed by the user
///
/// Every field is required; nothing here is validated until
/// [`RegistrationInput::validate`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    pub student_name: String,
    pub student_id: String,
    pub email: String,
    pub program: String,
    pub year_level: String,
}

impl RegistrationInput {
    pub fn set_field(&mut self, field: RegistrationField, value: impl Into<String>) {
        let value = value.into();
        match field {
            RegistrationField::StudentName => self.student_name = value,
            RegistrationField::StudentId => self.student_id = value,
            RegistrationField::Email => self.email = value,
            RegistrationField::Program => self.program = value,
            RegistrationField::YearLevel => self.year_level = value,
        }
    }

    #[must_use]
    pub fn field(&self, field: RegistrationField) -> &str {
        match field {
            RegistrationField::StudentName => &self.student_name,
            RegistrationField::StudentId => &self.student_id,
            RegistrationField::Email => &self.email,
            RegistrationField::Program => &self.program,
            RegistrationField::YearLevel => &self.year_level,
        }
    }

    /// Fields left blank (whitespace counts as blank)
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RegistrationField> {
        RegistrationField::ALL
            .into_iter()
            .filter(|f| self.field(*f).trim().is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.missing_fields().len() == RegistrationField::ALL.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Turn the form state into a submittable request
    pub fn validate(&self) -> ClientResult<RegistrationRequest> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
            return Err(ClientError::InvalidInput(format!(
                "Required fields missing: {}",
                names.join(", ")
            )));
        }

        Ok(RegistrationRequest {
            student_name: self.student_name.trim().to_string(),
            student_id: self.student_id.trim().to_string(),
            email: self.email.trim().to_string(),
            program: self.program.trim().to_string(),
            year_level: self.year_level.parse()?,
        })
    }
}

/// Validated registration, the body of `POST /registrations/submit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub student_name: String,
    pub student_id: String,
    pub email: String,
    pub program: String,
    pub year_level: YearLevel,
}

/// One conversion applied by the translation chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStep {
    pub translator_name: String,
    pub from_format: String,
    pub to_format: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Ordered format conversions a submission went through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationChain {
    pub original_format: String,
    #[serde(rename = "translationSteps", alias = "steps", default)]
    pub steps: Vec<TranslationStep>,
    #[serde(default)]
    pub total_translation_time_ms: u64,
    #[serde(default)]
    pub successful: bool,
}

impl TranslationChain {
    /// Format path in application order, e.g. `JSON → XML → CSV`
    #[must_use]
    pub fn format_path(&self) -> String {
        let mut formats = vec![self.original_format.as_str()];
        formats.extend(self.steps.iter().map(|s| s.to_format.as_str()));
        formats.join(" → ")
    }

    /// Sum of per-step durations; may differ from the reported total
    #[must_use]
    pub fn summed_step_time_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }
}

/// Content-based routing result for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    pub is_first_year: bool,
    pub routed_to: Vec<String>,
    pub routing_message: String,
}

impl RoutingDecision {
    /// Systems the routing rule selects for a student
    #[must_use]
    pub fn expected_systems(is_first_year: bool) -> Vec<&'static str> {
        if is_first_year {
            vec![HOUSING_SYSTEM, LIBRARY_SYSTEM]
        } else {
            vec![BILLING_SYSTEM, LIBRARY_SYSTEM]
        }
    }

    #[must_use]
    pub fn includes(&self, system: &str) -> bool {
        self.routed_to.iter().any(|s| s == system)
    }

    /// Library always; housing iff first-year; billing iff returning
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.includes(LIBRARY_SYSTEM)
            && self.includes(HOUSING_SYSTEM) == self.is_first_year
            && self.includes(BILLING_SYSTEM) != self.is_first_year
    }
}

/// Response of `POST /registrations/submit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub registration_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_first_year: bool,
    #[serde(default)]
    pub routed_to: Vec<String>,
    #[serde(default)]
    pub routing_message: Option<String>,
    #[serde(default)]
    pub translation_chain: Option<TranslationChain>,
}

fn default_true() -> bool {
    true
}

impl RegistrationReceipt {
    /// Routing decision, present only when the gateway routed somewhere
    #[must_use]
    pub fn routing_decision(&self) -> Option<RoutingDecision> {
        if self.routed_to.is_empty() {
            return None;
        }
        Some(RoutingDecision {
            is_first_year: self.is_first_year,
            routed_to: self.routed_to.clone(),
            routing_message: self.routing_message.clone().unwrap_or_default(),
        })
    }
}

/// Response of `GET /registrations/status/{studentId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatus {
    pub registered: bool,
    #[serde(default)]
    pub registration_status: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub year_level: Option<String>,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub retry_status: Option<crate::models::RetryStatus>,
    #[serde(default)]
    pub retry_attempts: Option<u32>,
    #[serde(default)]
    pub max_retry_attempts: Option<u32>,
    #[serde(default)]
    pub in_dead_letter_queue: Option<bool>,
    #[serde(default)]
    pub user_message: Option<String>,
}
