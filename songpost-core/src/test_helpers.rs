//! Shared test helpers: a scripted in-memory transport and song fixtures.
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::models::{Song, SongArtist};
use crate::transport::{SongTransport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Request {
        method: Method,
        path: String,
        query: Vec<(String, String)>,
    },
    Url(String),
}

/// Answers requests from a queue, in order, and records what was asked.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn push_err(&self, err: TransportError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<Value, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Rejected {
                    message: "no scripted response".to_string(),
                })
            })
    }
}

#[async_trait]
impl SongTransport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        _body: Option<Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall::Request {
            method,
            path: path.to_string(),
            query: query.to_vec(),
        });
        self.next_response()
    }

    async fn fetch_url(&self, url: &str) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::Url(url.to_string()));
        self.next_response()
    }
}

/// A song whose id and name are derived from `id`.
pub fn song(id: &str) -> Song {
    Song {
        spotify_id: id.to_string(),
        name: format!("Song {}", id),
        link: format!("https://open.spotify.com/track/{}", id),
        popularity: 42,
        image: format!("https://i.scdn.co/image/{}", id),
        artists: vec![SongArtist {
            id: format!("artist-{}", id),
            name: format!("Artist {}", id),
            url: String::new(),
        }],
    }
}

/// A `/songs` response body with the given song ids and cursors.
pub fn page_json(ids: &[&str], show_more: Option<&str>, show_previous: Option<&str>) -> Value {
    let songs: Vec<Song> = ids.iter().map(|id| song(id)).collect();
    let mut body = json!({ "songs": songs });
    if let Some(url) = show_more {
        body["showMore"] = json!(url);
    }
    if let Some(url) = show_previous {
        body["showPrevious"] = json!(url);
    }
    body
}
