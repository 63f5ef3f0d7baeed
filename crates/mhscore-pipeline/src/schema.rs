//! Fixed feature schema shared by training and inference.
//!
//! The registry is the single source of truth for the feature column order
//! handed to the model, which columns are categorical, and the target name.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Labels known to be valid even if the training sample never contains them.
    pub supplemental: &'static [&'static str],
}

impl ColumnSpec {
    const fn numeric(name: &'static str) -> Self {
        ColumnSpec {
            name,
            kind: ColumnKind::Numeric,
            supplemental: &[],
        }
    }

    const fn categorical(name: &'static str, supplemental: &'static [&'static str]) -> Self {
        ColumnSpec {
            name,
            kind: ColumnKind::Categorical,
            supplemental,
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.kind == ColumnKind::Categorical
    }
}

pub const AGE: &str = "AGE";
pub const GENDER: &str = "GENDER";
pub const ANXIETY: &str = "ANXIETY";
pub const DEPRESSION: &str = "DEPRESSION";
pub const SLEEP_ISSUES: &str = "SLEEP_ISSUES";
pub const SOCIAL_WITHDRAWAL: &str = "SOCIAL_WITHDRAWAL";
pub const STRESS_LEVEL: &str = "STRESS_LEVEL";
pub const WORK_STUDY_PRESSURE: &str = "WORK_STUDY_PRESSURE";
pub const FAMILY_HISTORY: &str = "FAMILY_HISTORY";
pub const PHYSICAL_ACTIVITY: &str = "PHYSICAL_ACTIVITY";
pub const SOCIAL_SUPPORT: &str = "SOCIAL_SUPPORT";

/// Name of the regression target. Never part of the feature vector.
pub const TARGET: &str = "SCORE";

/// Feature columns in the order the model consumes them.
pub static FEATURE_COLUMNS: [ColumnSpec; 11] = [
    ColumnSpec::numeric(AGE),
    ColumnSpec::categorical(GENDER, &[]),
    ColumnSpec::categorical(ANXIETY, &[]),
    ColumnSpec::categorical(DEPRESSION, &[]),
    ColumnSpec::categorical(SLEEP_ISSUES, &["No", "Yes", "Sometimes"]),
    ColumnSpec::categorical(SOCIAL_WITHDRAWAL, &[]),
    ColumnSpec::categorical(STRESS_LEVEL, &[]),
    ColumnSpec::categorical(WORK_STUDY_PRESSURE, &[]),
    ColumnSpec::categorical(FAMILY_HISTORY, &[]),
    ColumnSpec::categorical(PHYSICAL_ACTIVITY, &["High", "Low", "Medium", "Regular"]),
    ColumnSpec::categorical(SOCIAL_SUPPORT, &[]),
];

/// Misspelled headers found in circulating copies of the dataset.
const LEGACY_ALIASES: &[(&str, &str)] = &[("SLEEP_ISSUESS", SLEEP_ISSUES)];

/// Normalize a column name: trim, join inner whitespace with `_`, uppercase,
/// then map known legacy misspellings to their canonical name.
pub fn normalize_column_name(raw: &str) -> String {
    let normalized = raw
        .trim()
        .replace(' ', "_")
        .to_uppercase();

    LEGACY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == normalized)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(normalized)
}

pub fn feature_names() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|c| c.name.to_string()).collect()
}

pub fn categorical_columns() -> impl Iterator<Item = &'static ColumnSpec> {
    FEATURE_COLUMNS.iter().filter(|c| c.is_categorical())
}

pub fn column(name: &str) -> Option<&'static ColumnSpec> {
    FEATURE_COLUMNS.iter().find(|c| c.name == name)
}

pub fn position(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|c| c.name == name)
}
