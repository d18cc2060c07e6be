use serde::{Deserialize, Deserializer, Serialize};

/// Artist credit on a song
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// A catalog entry returned by `/songs`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Song {
    #[serde(rename = "spotifyId")]
    pub spotify_id: String,
    pub name: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub artists: Vec<SongArtist>,
}

impl Song {
    /// "Name by First and Second", as shown in the result list.
    pub fn display_label(&self) -> String {
        let mut label = self.name.clone();
        let mut artists = self.artists.iter();
        if let Some(first) = artists.next() {
            label.push_str(" by ");
            label.push_str(&first.name);
        }
        for artist in artists {
            label.push_str(" and ");
            label.push_str(&artist.name);
        }
        label
    }
}

/// One page of search results plus the backend's continuation cursors.
///
/// Cursors are stored exactly as received. An empty string from the
/// backend means the same as an absent field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SongPage {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(
        rename = "showMore",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_more: Option<String>,
    #[serde(
        rename = "showPrevious",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_previous: Option<String>,
}

impl SongPage {
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
