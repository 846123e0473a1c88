//! CLI - Command Line Interface for marquee
//!
//! Every catalog query is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! marquee trending
//! marquee search "the batman" --type movie
//! marquee episode 1396 5 14
//! marquee xref --title "Inception" --year 2010
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::MediaType;
use crate::xref::{is_valid_xref_id, normalize_xref_id};

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit status, stable so scripts can branch on the failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Anything not covered below
    Error = 1,
    /// Bad flags or a malformed ID
    InvalidArgs = 2,
    /// Transport failure or non-success upstream status
    NetworkError = 3,
    /// Upstream has no such title
    NotFound = 4,
    /// Missing or rejected credentials
    ConfigError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Marquee - movie and TV catalog queries
#[derive(Parser, Debug)]
#[command(
    name = "marquee",
    version,
    about = "Movie and TV catalog queries with IMDb cross-references",
    long_about = "Fetches trending lists, search results and title details from TMDB, \
                  normalized and enriched with IMDb IDs.\n\n\
                  Needs TMDB_API_KEY. Set OMDB_API_KEY to resolve missing IMDb IDs.",
    after_help = "EXAMPLES:\n\
                  marquee trending                     Weekly trending titles\n\
                  marquee search \"blade runner\"        Search movies and shows\n\
                  marquee show 1396                    Show with all seasons\n\
                  marquee xref tt1375666 --verify      Confirm an IMDb ID"
)]
pub struct Cli {
    /// Wrap results in a JSON envelope (implied when stdout is piped)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// No progress notes on stderr
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// JSON when asked for or when stdout is not a terminal
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Weekly trending movies and shows
    #[command(visible_alias = "tr")]
    Trending(TrendingCmd),

    /// Movies now playing
    Movies(ListCmd),

    /// Shows currently on the air
    Shows(ListCmd),

    /// Top rated movies
    #[command(visible_alias = "top")]
    TopRated(ListCmd),

    /// Enriched title search across movies and shows
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Quick unenriched search for type-ahead
    #[command(visible_alias = "p")]
    Preview(PreviewCmd),

    /// List genres for movies or shows
    Genres(GenresCmd),

    /// Movie details
    Movie(MovieCmd),

    /// Show details with every season
    Show(ShowCmd),

    /// One episode with show and season context
    #[command(visible_alias = "ep")]
    Episode(EpisodeCmd),

    /// Resolve or verify an IMDb cross-reference ID
    Xref(XrefCmd),
}

/// `--type` values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTypeFilter {
    Movie,
    Tv,
}

impl From<MediaTypeFilter> for MediaType {
    fn from(filter: MediaTypeFilter) -> Self {
        match filter {
            MediaTypeFilter::Movie => MediaType::Movie,
            MediaTypeFilter::Tv => MediaType::Tv,
        }
    }
}

// =============================================================================
// List Commands
// =============================================================================

/// Arguments for `trending`
#[derive(Args, Debug)]
pub struct TrendingCmd {
    /// Keep at most this many results
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Only movies or only shows
    #[arg(long = "type", short = 't', value_enum)]
    pub media_type: Option<MediaTypeFilter>,
}

/// Shared arguments for the single-type lists
#[derive(Args, Debug)]
pub struct ListCmd {
    /// Keep at most this many results
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

// =============================================================================
// Search Commands
// =============================================================================

/// Arguments for `search`
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Title text; surrounding whitespace is ignored
    #[arg(required = true)]
    pub query: String,

    /// Keep at most this many results
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Only movies or only shows
    #[arg(long = "type", short = 't', value_enum)]
    pub media_type: Option<MediaTypeFilter>,

    /// Drop results released before this year
    #[arg(long)]
    pub year_from: Option<u16>,

    /// Drop results released after this year
    #[arg(long)]
    pub year_to: Option<u16>,
}

/// Type-ahead search
#[derive(Args, Debug)]
pub struct PreviewCmd {
    /// Search query
    #[arg(required = true)]
    pub query: String,
}

// =============================================================================
// Detail Commands
// =============================================================================

#[derive(Args, Debug)]
pub struct GenresCmd {
    /// Which genre list to fetch
    #[arg(value_enum, default_value = "movie")]
    pub kind: MediaTypeFilter,
}

#[derive(Args, Debug)]
pub struct MovieCmd {
    /// TMDB movie ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct ShowCmd {
    /// TMDB show ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct EpisodeCmd {
    /// TMDB show ID
    pub id: u64,

    /// Season number
    pub season: u16,

    /// Episode number
    pub episode: u16,
}

// =============================================================================
// Xref Command
// =============================================================================

/// Resolve an IMDb ID from a title, or check an existing one
#[derive(Args, Debug)]
pub struct XrefCmd {
    /// Existing ID to normalize or verify (e.g. tt1375666)
    pub id: Option<String>,

    /// Title to look up when no valid ID is given
    #[arg(long)]
    pub title: Option<String>,

    /// Release year for the title lookup
    #[arg(long, short = 'y')]
    pub year: Option<u16>,

    /// Media type for the title lookup
    #[arg(long = "type", short = 't', value_enum, default_value = "movie")]
    pub kind: MediaTypeFilter,

    /// Confirm the ID exists upstream instead of only checking its shape
    #[arg(long)]
    pub verify: bool,
}

impl XrefCmd {
    /// Validate the argument combination before any network call
    pub fn validate(&self) -> Result<(), &'static str> {
        let has_title = self.title.as_deref().is_some_and(|t| !t.trim().is_empty());
        match (&self.id, has_title) {
            (None, false) => Err("Provide an ID or --title"),
            (None, true) if self.verify => Err("--verify needs an ID"),
            (Some(id), _) if self.verify => parse_xref_id(id).map(|_| ()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Envelope for `--json` output: `{"data": ...}` on success,
/// `{"error": ..., "exit_code": n}` on failure
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn failure(msg: impl Into<String>, code: ExitCode) -> Self {
        Self {
            data: None,
            error: Some(msg.into()),
            exit_code: Some(code.into()),
        }
    }
}

/// Result of the `xref` command
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct XrefResponse {
    pub xref_id: Option<String>,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Where catalog results and diagnostics go. Results on stdout, everything
/// else on stderr.
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Write a result to stdout, wrapped in the envelope under `--json`
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let rendered = if self.json {
            serde_json::to_string_pretty(&JsonOutput::success(data))?
        } else {
            serde_json::to_string_pretty(&data)?
        };
        println!("{}", rendered);
        Ok(())
    }

    /// Report a failed command on stderr and hand back its exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        match (self.json, self.quiet) {
            (true, _) => {
                if let Ok(body) = serde_json::to_string_pretty(&JsonOutput::failure(msg, code)) {
                    eprintln!("{}", body);
                }
            }
            (false, false) => eprintln!("marquee: {}", msg),
            (false, true) => {}
        }
        code
    }

    /// Progress note for interactive use; silent with `--quiet` or `--json`
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !(self.quiet || self.json) {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// ID Validation
// =============================================================================

/// Validate and normalize a cross-reference ID argument
pub fn parse_xref_id(id: &str) -> Result<String, &'static str> {
    if is_valid_xref_id(id) {
        Ok(normalize_xref_id(id))
    } else {
        Err("Invalid IMDb ID format (expected two letters followed by 5+ digits)")
    }
}

// =============================================================================
// Tests
// =============================================================================
