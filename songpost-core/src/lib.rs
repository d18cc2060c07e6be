//! Song search and selection for composing posts.
//!
//! Build a filter incrementally, search the song catalog, page through
//! results with backend-issued cursors, and hand one song to the post
//! being drafted.

pub mod config;
pub mod draft;
pub mod filter;
pub mod models;
pub mod rules;
pub mod search;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use config::{Config, ConfigError};
pub use draft::{PostDraft, SongSink};
pub use filter::{FilterKey, FilterSpec, YearRange};
pub use models::{Song, SongArtist, SongPage};
pub use rules::{EditField, YearError};
pub use search::{
    Direction, FetchError, Outcome, PendingRequest, RequestTicket, ResultSet, SelectError,
    SongSearch, ValidationState,
};
pub use transport::{HttpTransport, SongTransport, TransportError};
