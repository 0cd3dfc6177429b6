use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Work item as delivered by the work queue. `section` historically arrived
/// in several shapes (plain string, comma-separated string, list, or absent)
/// so it is normalized at this boundary; the pipeline only ever sees a list
/// of section names, empty meaning "all sections".
#[derive(Debug, Deserialize)]
struct RawWorkItem {
    phrase: String,
    #[serde(default)]
    section: SectionField,
    months: i32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SectionField {
    One(String),
    Many(Vec<String>),
}

impl Default for SectionField {
    fn default() -> Self {
        SectionField::One(String::new())
    }
}

/// Normalizes a comma-separated section string the same way the work-item
/// loader does. Used by callers that accept sections outside the work-item
/// file, e.g. command-line overrides.
pub fn parse_sections(raw: &str) -> Vec<String> {
    SectionField::One(raw.to_string()).normalize()
}

impl SectionField {
    fn normalize(self) -> Vec<String> {
        let parts: Vec<String> = match self {
            SectionField::One(s) => s.split(',').map(str::to_string).collect(),
            SectionField::Many(list) => list,
        };
        parts
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct WorkItem {
    pub phrase: String,
    pub sections: Vec<String>,
    /// How many months back to keep, 0 meaning the current month only.
    /// Validated by the date-window builder, not here, so a bad value is
    /// reported against the window it would have produced.
    pub months: i32,
}

impl WorkItem {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawWorkItem = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("malformed work item: {e}")))?;
        if raw.phrase.trim().is_empty() {
            return Err(Error::InvalidInput("phrase must not be empty".to_string()));
        }
        Ok(Self {
            phrase: raw.phrase,
            sections: raw.section.normalize(),
            months: raw.months,
        })
    }
}
