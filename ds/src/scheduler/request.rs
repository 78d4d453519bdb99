//! Scheduler request body

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::wire::ConstraintSpecification;

/// Opaque bearer credential from the identity provider
///
/// Passed through to the scheduler untouched; never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<redacted>)")
    }
}

/// The spreadsheet the items were read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSource {
    #[serde(rename = "spreadsheetId")]
    pub spreadsheet_id: String,
    #[serde(rename = "sheetName")]
    pub sheet_name: String,
}

impl SheetSource {
    pub fn new(spreadsheet_id: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        }
    }
}

/// Body of a scheduling request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub token: Credential,
    #[serde(flatten)]
    pub source: SheetSource,
    pub preferences: ConstraintSpecification,
}
