//! Item registry
//!
//! The authoritative set of item names for one editing session. Names come
//! either from a caller-supplied list or from the rows of a spreadsheet,
//! where one labeled column holds the item names.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Section-header rows that sit in the item column but are not items
pub const DEFAULT_SKIP_LABELS: [&str; 2] = ["Season Dances", "Side Projects"];

/// Errors from building a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Item registry is empty")]
    Empty,

    #[error("Duplicate item: '{0}'")]
    DuplicateItem(String),

    #[error("Blank item name at position {0}")]
    BlankName(usize),

    #[error("Column '{0}' not found in sheet header")]
    MissingColumn(String),

    #[error("Sheet has no header row")]
    EmptySheet,
}

/// Raw cell values of a sheet, as returned by a spreadsheet values read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Ordered set of unique item names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRegistry {
    items: Vec<String>,
}

impl ItemRegistry {
    /// Build a registry from item names
    ///
    /// Names are trimmed. Fails on empty input, blank names and duplicates.
    pub fn new<I, S>(items: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for (position, raw) in items.into_iter().enumerate() {
            let name = raw.as_ref().trim();
            if name.is_empty() {
                debug!(position, "ItemRegistry::new: blank name");
                return Err(RegistryError::BlankName(position));
            }
            if !seen.insert(name.to_string()) {
                debug!(%name, "ItemRegistry::new: duplicate name");
                return Err(RegistryError::DuplicateItem(name.to_string()));
            }
            names.push(name.to_string());
        }

        if names.is_empty() {
            debug!("ItemRegistry::new: no items");
            return Err(RegistryError::Empty);
        }

        debug!(count = names.len(), "ItemRegistry::new: built registry");
        Ok(Self { items: names })
    }

    /// Build a registry from sheet rows
    ///
    /// The first row is the header. Each following row contributes the cell
    /// under `column`; blank cells and `skip_labels` are ignored.
    pub fn from_sheet_rows<S: AsRef<str>>(
        rows: &[Vec<String>],
        column: &str,
        skip_labels: &[S],
    ) -> Result<Self, RegistryError> {
        debug!(row_count = rows.len(), %column, "ItemRegistry::from_sheet_rows: called");
        let (header, body) = rows.split_first().ok_or(RegistryError::EmptySheet)?;

        let column_index = header
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| RegistryError::MissingColumn(column.to_string()))?;

        let names: Vec<&str> = body
            .iter()
            .filter_map(|row| row.get(column_index))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .filter(|cell| !skip_labels.iter().any(|label| label.as_ref() == *cell))
            .collect();

        debug!(count = names.len(), "ItemRegistry::from_sheet_rows: extracted names");
        Self::new(names)
    }

    /// Build a registry from a sheet values payload
    pub fn from_sheet<S: AsRef<str>>(
        sheet: &SheetValues,
        column: &str,
        skip_labels: &[S],
    ) -> Result<Self, RegistryError> {
        Self::from_sheet_rows(&sheet.values, column, skip_labels)
    }

    /// Item names in registry order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed registry
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }
}
