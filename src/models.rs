//! Declared schemas for the six desk documents.
//!
//! Each document is one JSON file in the data repository. The record types
//! here are the boundary: a document that does not decode into its type is
//! reported and treated as absent rather than read field-by-field with
//! defaults.
//!
//! | Document | Type |
//! |----------|------|
//! | `dashboard_data` | [`DashboardData`] |
//! | `weekly_reports` | `Vec<`[`WeeklyReport`]`>` |
//! | `schedules` | `Vec<`[`ScheduleEntry`]`>` |
//! | `staff_profiles` | `Vec<`[`StaffProfile`]`>` |
//! | `evaluation_manual` | `Vec<`[`EvaluationItem`]`>` |
//! | `business_cards` | `Vec<`[`BusinessCard`]`>` |

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum serialized size of any document (10 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

// ============ Document names ============

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("document name is empty")]
    Empty,
    #[error("document name '{0}' must not contain path separators or '..'")]
    Path(String),
    #[error("document '{0}' must be a .json file")]
    Extension(String),
}

/// A document identifier such as `weekly_reports`.
///
/// Accepts the bare table name or the file name with a `.json` suffix;
/// any other extension is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentName(String);

impl DocumentName {
    pub fn new(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        let stem = trimmed.strip_suffix(".json").unwrap_or(trimmed);
        if stem.is_empty() {
            return Err(NameError::Empty);
        }
        if stem.contains('/') || stem.contains('\\') || stem.contains("..") {
            return Err(NameError::Path(trimmed.to_string()));
        }
        if stem.contains('.') {
            return Err(NameError::Extension(trimmed.to_string()));
        }
        Ok(Self(stem.to_string()))
    }

    /// Table name without extension.
    pub fn stem(&self) -> &str {
        &self.0
    }

    /// File name, e.g. `weekly_reports.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }

    /// Path of the document inside the data repository.
    pub fn repo_path(&self) -> String {
        format!("data/{}", self.file_name())
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// The documents the desk knows about, in admin listing order.
pub const KNOWN_DOCUMENTS: [&str; 6] = [
    <DashboardData as Table>::NAME,
    <Vec<WeeklyReport> as Table>::NAME,
    <Vec<ScheduleEntry> as Table>::NAME,
    <Vec<StaffProfile> as Table>::NAME,
    <Vec<EvaluationItem> as Table>::NAME,
    <Vec<BusinessCard> as Table>::NAME,
];

// ============ Table trait ============

/// A document type bound to its table name.
pub trait Table: Serialize + DeserializeOwned {
    const NAME: &'static str;

    fn document_name() -> DocumentName {
        DocumentName(Self::NAME.to_string())
    }
}

impl Table for DashboardData {
    const NAME: &'static str = "dashboard_data";
}
impl Table for Vec<WeeklyReport> {
    const NAME: &'static str = "weekly_reports";
}
impl Table for Vec<ScheduleEntry> {
    const NAME: &'static str = "schedules";
}
impl Table for Vec<StaffProfile> {
    const NAME: &'static str = "staff_profiles";
}
impl Table for Vec<EvaluationItem> {
    const NAME: &'static str = "evaluation_manual";
}
impl Table for Vec<BusinessCard> {
    const NAME: &'static str = "business_cards";
}

/// Check that `value` decodes into the schema of a known table.
///
/// Returns `Ok(false)` when `name` is not a known table.
pub fn check_schema(
    name: &DocumentName,
    value: &serde_json::Value,
) -> Result<bool, serde_json::Error> {
    fn decode<T: Table>(value: &serde_json::Value) -> Result<bool, serde_json::Error> {
        T::deserialize(value).map(|_| true)
    }

    match name.stem() {
        "dashboard_data" => decode::<DashboardData>(value),
        "weekly_reports" => decode::<Vec<WeeklyReport>>(value),
        "schedules" => decode::<Vec<ScheduleEntry>>(value),
        "staff_profiles" => decode::<Vec<StaffProfile>>(value),
        "evaluation_manual" => decode::<Vec<EvaluationItem>>(value),
        "business_cards" => decode::<Vec<BusinessCard>>(value),
        _ => Ok(false),
    }
}

// ============ Dashboard ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub kpi: Kpi,
    #[serde(default)]
    pub students_by_region: Vec<RegionCount>,
    #[serde(default)]
    pub mou_partners: Vec<MouPartner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub total_students: u64,
    pub partners: u64,
    pub employment_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouPartner {
    pub name: String,
    pub country: String,
    pub year: i32,
}

// ============ Weekly reports ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    pub department: String,
    pub summary: String,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl WeeklyReport {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

// ============ Schedules ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub name: String,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// Booked hourly slots such as `"9:00"`.
    #[serde(default)]
    pub time_slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

// ============ Staff ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub name: String,
    pub dept: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ============ Evaluation manual ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub category: String,
    pub criteria: String,
    pub guide: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_feedback: Option<String>,
}

// ============ Business cards ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCard {
    pub name: String,
    pub org: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
}

impl BusinessCard {
    /// Whether the contact field looks like an e-mail address.
    pub fn has_email(&self) -> bool {
        self.contact.as_deref().is_some_and(|c| c.contains('@'))
    }
}
