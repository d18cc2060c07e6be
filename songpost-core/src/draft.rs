//! The record a chosen song ends up attached to.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Song;

/// Receives the song the user picked. Selection is one-way: once handed
/// over, the search workflow is done with it.
pub trait SongSink {
    fn song_selected(&mut self, song: Song);
}

/// A post being composed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub score: Option<u8>,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub song: Option<Song>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn has_song(&self) -> bool {
        self.song.is_some()
    }
}

impl SongSink for PostDraft {
    fn song_selected(&mut self, song: Song) {
        info!("Attaching \"{}\" to post draft", song.display_label());
        self.song = Some(song);
    }
}
