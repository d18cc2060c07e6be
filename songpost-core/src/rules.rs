//! Edit rules for the search form.
//!
//! Each editable input maps to one rule. A rule looks at the current
//! [`FilterSpec`] and the raw input and either returns the update to apply
//! or the reason the edit is rejected. Rejected edits never touch the filters.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::filter::{FilterKey, FilterSpec, YearRange};

/// Year input rejections, displayed inline under the year inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YearError {
    #[error("Year start must be numbers only, defaulting to an empty field")]
    StartNotNumeric,
    #[error("Year end must be numbers only, defaulting to an empty field")]
    EndNotNumeric,
    #[error("Year start needed for year end to be included")]
    StartRequired,
}

/// One input of the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Track,
    Artist,
    Album,
    Genre,
    YearStart,
    YearEnd,
}

impl EditField {
    /// The query parameter this input feeds.
    pub fn key(&self) -> FilterKey {
        match self {
            EditField::Track => FilterKey::Track,
            EditField::Artist => FilterKey::Artist,
            EditField::Album => FilterKey::Album,
            EditField::Genre => FilterKey::Genre,
            EditField::YearStart | EditField::YearEnd => FilterKey::Year,
        }
    }

    pub fn is_year(&self) -> bool {
        matches!(self, EditField::YearStart | EditField::YearEnd)
    }
}

/// An accepted edit, ready to be written into the filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Track(String),
    Artist(String),
    Album(String),
    Genre(String),
    Year(YearRange),
}

impl FieldUpdate {
    pub fn apply(self, spec: &mut FilterSpec) {
        match self {
            FieldUpdate::Track(value) => spec.track = value,
            FieldUpdate::Artist(value) => spec.artist = value,
            FieldUpdate::Album(value) => spec.album = value,
            FieldUpdate::Genre(value) => spec.genre = value,
            FieldUpdate::Year(year) => spec.year = year,
        }
    }
}

/// Run the rule for `field` against the current filters.
pub fn evaluate(field: EditField, spec: &FilterSpec, raw: String) -> Result<FieldUpdate, YearError> {
    match field {
        EditField::Track => Ok(FieldUpdate::Track(raw)),
        EditField::Artist => Ok(FieldUpdate::Artist(raw)),
        EditField::Album => Ok(FieldUpdate::Album(raw)),
        EditField::Genre => Ok(FieldUpdate::Genre(raw)),
        EditField::YearStart => year_start(spec, raw),
        EditField::YearEnd => year_end(spec, raw),
    }
}

fn alphabetic() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\p{Alphabetic}").expect("Failed to compile year pattern"))
}

fn year_start(spec: &FilterSpec, raw: String) -> Result<FieldUpdate, YearError> {
    if alphabetic().is_match(&raw) {
        return Err(YearError::StartNotNumeric);
    }
    let year = match &spec.year.end {
        Some(end) => YearRange::range(raw, end.clone()),
        None => YearRange::single(raw),
    };
    Ok(FieldUpdate::Year(year))
}

fn year_end(spec: &FilterSpec, raw: String) -> Result<FieldUpdate, YearError> {
    // Missing start wins over a malformed end.
    if spec.year.is_empty() {
        return Err(YearError::StartRequired);
    }
    if alphabetic().is_match(&raw) {
        return Err(YearError::EndNotNumeric);
    }
    Ok(FieldUpdate::Year(YearRange::range(
        spec.year.start.clone(),
        raw,
    )))
}
