//! Search filters for song queries.
//!
//! The backend takes a flat set of query parameters. Internally the year
//! filter is an explicit start/end pair and is only flattened into the
//! single `year` parameter when the request is built.

use serde::{Deserialize, Serialize};

/// Separator between the two tokens of a year range on the wire.
pub const YEAR_RANGE_SEPARATOR: char = '-';

/// Query parameter names accepted by `/songs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKey {
    Track,
    Artist,
    Album,
    Genre,
    Year,
}

impl FilterKey {
    pub const ALL: [FilterKey; 5] = [
        FilterKey::Track,
        FilterKey::Artist,
        FilterKey::Album,
        FilterKey::Genre,
        FilterKey::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Track => "track",
            FilterKey::Artist => "artist",
            FilterKey::Album => "album",
            FilterKey::Genre => "genre",
            FilterKey::Year => "year",
        }
    }
}

/// Year filter being assembled from two separately edited inputs.
///
/// `end` is `Some` once a range has been formed, even if the end token is
/// still empty. A start-only value is a valid single-year filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearRange {
    pub start: String,
    pub end: Option<String>,
}

impl YearRange {
    /// A single year, not yet a range.
    pub fn single(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: None,
        }
    }

    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: Some(end.into()),
        }
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    /// True when the serialized `year` parameter would be empty.
    pub fn is_empty(&self) -> bool {
        self.start.is_empty() && self.end.is_none()
    }

    /// Flatten into the wire form: `""`, `"1990"` or `"1990-2000"`.
    pub fn to_query_value(&self) -> String {
        match &self.end {
            Some(end) => format!("{}{}{}", self.start, YEAR_RANGE_SEPARATOR, end),
            None => self.start.clone(),
        }
    }
}

/// Accumulated search filters for one workflow instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub track: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub year: YearRange,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a filter as it would be sent.
    pub fn value(&self, key: FilterKey) -> String {
        match key {
            FilterKey::Track => self.track.clone(),
            FilterKey::Artist => self.artist.clone(),
            FilterKey::Album => self.album.clone(),
            FilterKey::Genre => self.genre.clone(),
            FilterKey::Year => self.year.to_query_value(),
        }
    }

    /// True when no filter would be sent at all.
    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.iter().all(|key| self.value(*key).is_empty())
    }

    /// Non-empty filters as `/songs` query parameters, in key order.
    pub fn query_params(&self) -> Vec<(String, String)> {
        FilterKey::ALL
            .iter()
            .filter_map(|key| {
                let value = self.value(*key);
                if value.is_empty() {
                    None
                } else {
                    Some((key.as_str().to_string(), value))
                }
            })
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_serializes_to_wire_form() {
        assert_eq!(YearRange::default().to_query_value(), "");
        assert_eq!(YearRange::single("1990").to_query_value(), "1990");
        assert_eq!(
            YearRange::range("1990", "2000").to_query_value(),
            "1990-2000"
        );
        assert_eq!(YearRange::range("", "2000").to_query_value(), "-2000");
        assert_eq!(YearRange::range("1990", "").to_query_value(), "1990-");
    }

    #[test]
    fn year_range_with_empty_tokens_is_not_empty() {
        assert!(YearRange::default().is_empty());
        assert!(YearRange::single("").is_empty());
        assert!(!YearRange::range("", "").is_empty());
    }

    #[test]
    fn query_params_skip_empty_fields() {
        let spec = FilterSpec {
            artist: "Giant Rooks".to_string(),
            genre: String::new(),
            year: YearRange::range("2017", "2020"),
            ..Default::default()
        };
        assert_eq!(
            spec.query_params(),
            vec![
                ("artist".to_string(), "Giant Rooks".to_string()),
                ("year".to_string(), "2017-2020".to_string()),
            ]
        );
    }

    #[test]
    fn empty_spec_sends_nothing() {
        let spec = FilterSpec::new();
        assert!(spec.is_empty());
        assert!(spec.query_params().is_empty());
    }

    #[test]
    fn clear_resets_every_field() {
        let mut spec = FilterSpec {
            track: "Wild Stare".to_string(),
            album: "Rookery".to_string(),
            year: YearRange::single("2022"),
            ..Default::default()
        };
        spec.clear();
        assert_eq!(spec, FilterSpec::default());
    }
}
