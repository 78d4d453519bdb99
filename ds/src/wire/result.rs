//! Scheduler response parsing
//!
//! The scheduler answers with `{ "results": [ { schedule, cost, collisions } ] }`.
//! Parsing is strict about the fields the editor displays so that a broken
//! response is reported instead of half-rendered.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Errors from parsing a scheduler response
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field '{field}' in {location}")]
    MissingField { field: &'static str, location: String },

    #[error("Malformed collision {index} in results[{entry}]")]
    MalformedCollision { entry: usize, index: usize },

    #[error("Invalid field '{field}' in {location}: {reason}")]
    InvalidField {
        field: &'static str,
        location: String,
        reason: String,
    },
}

/// A performer appearing in two consecutive items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub member: String,
    #[serde(rename = "previousItem")]
    pub previous_item: String,
    #[serde(rename = "currentItem")]
    pub current_item: String,
}

/// One ordered arrangement proposed by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub schedule: Vec<String>,
    pub cost: u64,
    pub collisions: Vec<Collision>,
}

impl ScheduleResult {
    /// 1-based slot of an item in the schedule
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.schedule.iter().position(|n| n == name).map(|i| i + 1)
    }
}

/// Full response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub results: Vec<ScheduleResult>,
}

// Field names the scheduler has used for the two collision endpoints
const PREVIOUS_KEYS: [&str; 3] = ["previousItem", "previousDance", "previous_dance"];
const CURRENT_KEYS: [&str; 3] = ["currentItem", "currentDance", "current_dance"];

/// Parse a scheduler response body into results
pub fn parse_results(payload: &str) -> Result<Vec<ScheduleResult>, ParseError> {
    debug!(payload_len = payload.len(), "parse_results: called");
    let root: Value = serde_json::from_str(payload)?;

    let entries = match root.get("results") {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ParseError::InvalidField {
                field: "results",
                location: "response".to_string(),
                reason: "expected an array".to_string(),
            });
        }
        None => {
            debug!("parse_results: no results field");
            return Err(ParseError::MissingField {
                field: "results",
                location: "response".to_string(),
            });
        }
    };

    let results = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_entry(i, entry))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = results.len(), "parse_results: parsed");
    Ok(results)
}

fn parse_entry(entry: usize, value: &Value) -> Result<ScheduleResult, ParseError> {
    let location = format!("results[{}]", entry);
    let object = value.as_object().ok_or_else(|| ParseError::InvalidField {
        field: "results",
        location: location.clone(),
        reason: "expected an object".to_string(),
    })?;

    let schedule = require(object, "schedule", &location)?
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| ParseError::InvalidField {
            field: "schedule",
            location: location.clone(),
            reason: "expected an array of names".to_string(),
        })?;

    let cost = require(object, "cost", &location)?
        .as_u64()
        .ok_or_else(|| ParseError::InvalidField {
            field: "cost",
            location: location.clone(),
            reason: "expected a non-negative integer".to_string(),
        })?;

    let collisions = require(object, "collisions", &location)?
        .as_array()
        .ok_or_else(|| ParseError::InvalidField {
            field: "collisions",
            location: location.clone(),
            reason: "expected an array".to_string(),
        })?
        .iter()
        .enumerate()
        .map(|(index, c)| parse_collision(c).ok_or(ParseError::MalformedCollision { entry, index }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScheduleResult {
        schedule,
        cost,
        collisions,
    })
}

fn require<'a>(object: &'a Map<String, Value>, field: &'static str, location: &str) -> Result<&'a Value, ParseError> {
    object.get(field).ok_or_else(|| {
        debug!(field, %location, "require: missing field");
        ParseError::MissingField {
            field,
            location: location.to_string(),
        }
    })
}

fn parse_collision(value: &Value) -> Option<Collision> {
    let object = value.as_object()?;
    // First key holding a string wins; null or non-string values fall through to the next spelling
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| object.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    };

    Some(Collision {
        member: text(&["member"])?,
        previous_item: text(&PREVIOUS_KEYS)?,
        current_item: text(&CURRENT_KEYS)?,
    })
}
