use clap::Parser;
use songpost_core::{
    Config, HttpTransport, Outcome, PostDraft, ResultSet, SongSearch, SongTransport,
};
use tracing::{error, info, warn};

/// songpost: find a song and attach it to a post draft from the terminal.
#[derive(Parser)]
#[command(name = "songpost")]
#[command(group(
    clap::ArgGroup::new("filters")
        .required(true)
        .multiple(true)
        .args(["track", "artist", "album", "genre", "year_start"]),
))]
struct Args {
    /// Track title to search for.
    #[arg(long)]
    track: Option<String>,

    #[arg(long)]
    artist: Option<String>,

    #[arg(long)]
    album: Option<String>,

    #[arg(long)]
    genre: Option<String>,

    /// First year of the release window (or the only year).
    #[arg(long)]
    year_start: Option<String>,

    /// Last year of the release window. Needs --year-start.
    #[arg(long)]
    year_end: Option<String>,

    /// How many pages to walk through via the backend's cursors.
    #[arg(long, default_value = "1")]
    pages: u32,

    /// Attach the song at this position of the last page to a new draft.
    #[arg(long)]
    select: Option<usize>,

    /// Title of the post draft the selected song is attached to.
    #[arg(long, default_value = "Untitled post")]
    title: String,

    /// Base URL of the songpost API.
    #[arg(long, env = "SONGPOST_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "SONGPOST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn load_config(args: &Args) -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load config: {e}");
        std::process::exit(1);
    });
    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }
    config
}

/// Apply the filter flags in form order so the year range can be built.
fn apply_filters<T: SongTransport>(search: &mut SongSearch<T>, args: &Args) {
    if let Some(track) = &args.track {
        search.edit_track(track.as_str());
    }
    if let Some(artist) = &args.artist {
        search.edit_artist(artist.as_str());
    }
    if let Some(album) = &args.album {
        search.edit_album(album.as_str());
    }
    if let Some(genre) = &args.genre {
        search.edit_genre(genre.as_str());
    }
    if let Some(start) = &args.year_start {
        if let Err(e) = search.edit_year_start(start.as_str()) {
            error!("Rejected --year-start {start:?}: {e}");
            eprintln!("{e}");
            std::process::exit(2);
        }
    }
    if let Some(end) = &args.year_end {
        if let Err(e) = search.edit_year_end(end.as_str()) {
            error!("Rejected --year-end {end:?}: {e}");
            eprintln!("{e}");
            std::process::exit(2);
        }
    }
}

fn print_page(page_number: u32, results: &ResultSet) {
    println!("--- page {page_number} ---");
    for (i, song) in results.songs.iter().enumerate() {
        println!(
            "{:>3}. {} (popularity {})",
            i,
            song.display_label(),
            song.popularity
        );
    }
}

fn exit_on_failure(outcome: &Outcome, search_error: Option<&str>) {
    match outcome {
        Outcome::Failed(_) | Outcome::NoResults => {
            eprintln!("{}", search_error.unwrap_or("Search failed"));
            std::process::exit(1);
        }
        _ => {}
    }
}

#[tokio::main]
async fn main() {
    configure_logging();
    let args = Args::parse();
    let config = load_config(&args);

    info!("songpost using API at {}", config.api_base_url);
    let transport = HttpTransport::from_config(&config).unwrap_or_else(|e| {
        error!("Failed to create HTTP client: {e}");
        std::process::exit(1);
    });
    let mut search = SongSearch::new(transport);

    apply_filters(&mut search, &args);

    let outcome = search.submit().await;
    exit_on_failure(&outcome, search.errors().search_error.as_deref());
    print_page(1, search.results());

    for page_number in 2..=args.pages.max(1) {
        if !search.has_next() {
            info!("No more pages after page {}", page_number - 1);
            break;
        }
        let outcome = search.next_page().await;
        exit_on_failure(&outcome, search.errors().search_error.as_deref());
        print_page(page_number, search.results());
    }

    let Some(index) = args.select else {
        return;
    };
    let mut draft = PostDraft::new(args.title.clone());
    if let Err(e) = search.select(index, &mut draft) {
        warn!("Selection failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
    match serde_json::to_string_pretty(&draft) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to serialize draft: {e}");
            std::process::exit(1);
        }
    }
}
