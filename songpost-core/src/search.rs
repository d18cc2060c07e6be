//! Song search workflow
//!
//! One [`SongSearch`] backs one selection task (e.g. picking the song for a
//! single post). It owns the filters being built, the current page of
//! results with its continuation cursors, and the inline error messages.
//!
//! Every request runs under a [`RequestTicket`]. A completion is only
//! applied when no newer ticket has already been applied, so overlapping
//! responses can never replace results out of order.

use reqwest::Method;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::draft::SongSink;
use crate::filter::FilterSpec;
use crate::models::{Song, SongPage};
use crate::rules::{self, EditField, YearError};
use crate::transport::{SongTransport, TransportError};

pub const SONGS_PATH: &str = "/songs";
pub const NO_RESULTS_MESSAGE: &str = "No Songs Found";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Message carried by the failure, for display.
    pub fn carried_message(&self) -> String {
        match self {
            FetchError::Transport(e) => e.message(),
            FetchError::Decode(_) => self.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("No song at position {index} ({available} shown)")]
    OutOfRange { index: usize, available: usize },
}

/// Inline error slots shown beneath the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    pub year_error: Option<YearError>,
    pub search_error: Option<String>,
}

impl ValidationState {
    pub fn is_clear(&self) -> bool {
        self.year_error.is_none() && self.search_error.is_none()
    }

    pub fn clear(&mut self) {
        self.year_error = None;
        self.search_error = None;
    }
}

/// The page of songs currently shown, with the cursors that came with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub songs: Vec<Song>,
    pub previous_page_url: Option<String>,
    pub next_page_url: Option<String>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

impl From<SongPage> for ResultSet {
    fn from(page: SongPage) -> Self {
        Self {
            songs: page.songs,
            previous_page_url: page.show_previous,
            next_page_url: page.show_more,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    Page(Direction),
}

/// Identifies one issued request and what kind of completion it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    kind: RequestKind,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// `GET /songs` with the non-empty filters
    Search { query: Vec<(String, String)> },
    /// A cursor URL exactly as the backend returned it
    Cursor { url: String },
}

/// A request that has been issued but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: RequestTicket,
    pub target: RequestTarget,
}

impl PendingRequest {
    pub async fn send<T>(&self, transport: &T) -> Result<SongPage, FetchError>
    where
        T: SongTransport + ?Sized,
    {
        let body = match &self.target {
            RequestTarget::Search { query } => {
                transport
                    .request(Method::GET, SONGS_PATH, query, None)
                    .await?
            }
            RequestTarget::Cursor { url } => transport.fetch_url(url).await?,
        };
        Ok(SongPage::from_json(body)?)
    }
}

/// What a completed request did to the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A fresh search replaced the results.
    ResultsLoaded { count: usize },
    /// Cursor navigation replaced the results. The owner should scroll the
    /// result list back to the top.
    PageLoaded { count: usize },
    /// The search succeeded with zero songs. Prior results are kept.
    NoResults,
    /// The request failed; the message is now the search error.
    Failed(String),
    /// A newer request already landed, so this response was dropped.
    Stale,
    /// There is no cursor in the requested direction.
    NoPage,
}

/// Search and selection state for one workflow instance.
pub struct SongSearch<T> {
    transport: T,
    filters: FilterSpec,
    results: ResultSet,
    errors: ValidationState,
    /// Generation of the newest issued request
    issued: u64,
    /// Generation of the newest applied completion
    applied: u64,
}

impl<T: SongTransport> SongSearch<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            filters: FilterSpec::default(),
            results: ResultSet::default(),
            errors: ValidationState::default(),
            issued: 0,
            applied: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn errors(&self) -> &ValidationState {
        &self.errors
    }

    /// Whether the result list (rather than the filter form) is showing.
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.results.next_page_url.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.results.previous_page_url.is_some()
    }

    /// True while the newest issued request has not completed.
    pub fn is_busy(&self) -> bool {
        self.applied < self.issued
    }

    // --- Query building ---

    /// Apply one form edit. Rejected year edits leave the filters untouched
    /// and set the year error; accepted year edits clear it.
    pub fn edit(&mut self, field: EditField, raw: impl Into<String>) -> Result<(), YearError> {
        match rules::evaluate(field, &self.filters, raw.into()) {
            Ok(update) => {
                update.apply(&mut self.filters);
                if field.is_year() {
                    self.errors.year_error = None;
                }
                Ok(())
            }
            Err(e) => {
                debug!("Rejected {:?} edit: {}", field, e);
                self.errors.year_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn edit_track(&mut self, value: impl Into<String>) {
        let _ = self.edit(EditField::Track, value);
    }

    pub fn edit_artist(&mut self, value: impl Into<String>) {
        let _ = self.edit(EditField::Artist, value);
    }

    pub fn edit_album(&mut self, value: impl Into<String>) {
        let _ = self.edit(EditField::Album, value);
    }

    pub fn edit_genre(&mut self, value: impl Into<String>) {
        let _ = self.edit(EditField::Genre, value);
    }

    pub fn edit_year_start(&mut self, value: impl Into<String>) -> Result<(), YearError> {
        self.edit(EditField::YearStart, value)
    }

    pub fn edit_year_end(&mut self, value: impl Into<String>) -> Result<(), YearError> {
        self.edit(EditField::YearEnd, value)
    }

    /// Reset the filters and both error slots. Results are left alone.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.errors.clear();
    }

    // --- Requests ---

    fn next_ticket(&mut self, kind: RequestKind) -> RequestTicket {
        self.issued += 1;
        RequestTicket {
            generation: self.issued,
            kind,
        }
    }

    /// Issue a fresh search from the current filters.
    pub fn begin_search(&mut self) -> PendingRequest {
        let query = self.filters.query_params();
        info!("🔍 Song search: {:?}", query);
        PendingRequest {
            ticket: self.next_ticket(RequestKind::Search),
            target: RequestTarget::Search { query },
        }
    }

    /// Issue a cursor request, or `None` when there is no page that way.
    pub fn begin_page(&mut self, direction: Direction) -> Option<PendingRequest> {
        let url = match direction {
            Direction::Next => self.results.next_page_url.clone(),
            Direction::Previous => self.results.previous_page_url.clone(),
        }?;
        debug!("Paging {:?} via {}", direction, url);
        Some(PendingRequest {
            ticket: self.next_ticket(RequestKind::Page(direction)),
            target: RequestTarget::Cursor { url },
        })
    }

    /// Merge a finished request into the workflow state.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<SongPage, FetchError>,
    ) -> Outcome {
        if ticket.generation <= self.applied {
            debug!(
                "Discarding stale response (generation {}, applied {})",
                ticket.generation, self.applied
            );
            return Outcome::Stale;
        }
        self.applied = ticket.generation;

        match (ticket.kind, result) {
            (RequestKind::Search, Ok(page)) => {
                if page.songs.is_empty() {
                    info!("Song search returned no results");
                    self.errors.search_error = Some(NO_RESULTS_MESSAGE.to_string());
                    return Outcome::NoResults;
                }
                let count = page.songs.len();
                info!("✓ Song search returned {} result(s)", count);
                self.results = ResultSet::from(page);
                self.errors.search_error = None;
                Outcome::ResultsLoaded { count }
            }
            (RequestKind::Search, Err(e)) => {
                warn!("✗ Song search failed: {}", e);
                let message = e.carried_message();
                self.errors.search_error = Some(message.clone());
                Outcome::Failed(message)
            }
            (RequestKind::Page(direction), Ok(page)) => {
                let count = page.songs.len();
                info!("✓ Loaded {:?} page with {} result(s)", direction, count);
                self.results = ResultSet::from(page);
                self.errors.search_error = None;
                Outcome::PageLoaded { count }
            }
            (RequestKind::Page(direction), Err(e)) => {
                warn!("✗ Loading {:?} page failed: {}", direction, e);
                let message = e.to_string();
                self.errors.search_error = Some(message.clone());
                Outcome::Failed(message)
            }
        }
    }

    /// Fresh search with the current filters. The filters are not modified.
    pub async fn submit(&mut self) -> Outcome {
        let pending = self.begin_search();
        let result = pending.send(&self.transport).await;
        self.complete(pending.ticket, result)
    }

    pub async fn next_page(&mut self) -> Outcome {
        self.navigate(Direction::Next).await
    }

    pub async fn previous_page(&mut self) -> Outcome {
        self.navigate(Direction::Previous).await
    }

    /// Follow the stored cursor in `direction`. The filters are not read.
    pub async fn navigate(&mut self, direction: Direction) -> Outcome {
        let Some(pending) = self.begin_page(direction) else {
            return Outcome::NoPage;
        };
        let result = pending.send(&self.transport).await;
        self.complete(pending.ticket, result)
    }

    /// Back to the entry state. Responses to requests issued before the
    /// clear are discarded when they arrive.
    pub fn clear(&mut self) {
        self.filters.clear();
        self.results = ResultSet::default();
        self.errors.clear();
        self.issued += 1;
        self.applied = self.issued;
    }

    // --- Selection ---

    /// Hand the song at `index` on the current page to `sink`.
    pub fn select(&self, index: usize, sink: &mut dyn SongSink) -> Result<(), SelectError> {
        let song = self
            .results
            .songs
            .get(index)
            .cloned()
            .ok_or(SelectError::OutOfRange {
                index,
                available: self.results.songs.len(),
            })?;
        info!("Selected {} ({})", song.display_label(), song.spotify_id);
        sink.song_selected(song);
        Ok(())
    }
}
