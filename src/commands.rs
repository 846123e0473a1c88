//! CLI Command Handlers
//!
//! Implements all CLI commands on top of [`Catalog`].
//! Each handler takes CLI args, the catalog and Output, returns ExitCode.

use serde::Serialize;
use tracing::info;

use crate::api::TmdbError;
use crate::catalog::Catalog;
use crate::cli::{
    parse_xref_id, Cli, Command, EpisodeCmd, ExitCode, GenresCmd, ListCmd, MediaTypeFilter,
    MovieCmd, Output, PreviewCmd, SearchCmd, ShowCmd, TrendingCmd, XrefCmd, XrefResponse,
};
use crate::config::Config;
use crate::models::{MediaSummary, MediaType};

/// Load config, build the catalog and dispatch the subcommand
pub async fn run(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);
    let config = load_config(&cli);
    let catalog = Catalog::from_config(&config);

    info!(command = ?cli.command, xref_enabled = catalog.xref().is_enabled(), "running command");

    match cli.command {
        Command::Trending(cmd) => trending_cmd(cmd, &catalog, &output).await,
        Command::Movies(cmd) => latest_movies_cmd(cmd, &catalog, &output).await,
        Command::Shows(cmd) => latest_shows_cmd(cmd, &catalog, &output).await,
        Command::TopRated(cmd) => top_rated_cmd(cmd, &catalog, &output).await,
        Command::Search(cmd) => search_cmd(cmd, &catalog, &output).await,
        Command::Preview(cmd) => preview_cmd(cmd, &catalog, &output).await,
        Command::Genres(cmd) => genres_cmd(cmd, &catalog, &output).await,
        Command::Movie(cmd) => movie_cmd(cmd, &catalog, &output).await,
        Command::Show(cmd) => show_cmd(cmd, &catalog, &output).await,
        Command::Episode(cmd) => episode_cmd(cmd, &catalog, &output).await,
        Command::Xref(cmd) => xref_cmd(cmd, &catalog, &output).await,
    }
}

/// `--config` wins over the default location; env keys win over both
pub fn load_config(cli: &Cli) -> Config {
    match &cli.config {
        Some(path) => {
            let mut config = Config::load_from(path);
            config.apply_env();
            config
        }
        None => Config::load(),
    }
}

/// Map a failed query to its exit code
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<TmdbError>() {
        Some(TmdbError::Configuration(_)) => ExitCode::ConfigError,
        Some(TmdbError::NotFound) => ExitCode::NotFound,
        Some(_) => ExitCode::NetworkError,
        None => ExitCode::Error,
    }
}

/// Print a query result or its error
fn respond<T: Serialize>(result: anyhow::Result<T>, what: &str, output: &Output) -> ExitCode {
    match result {
        Ok(data) => {
            if let Err(e) = output.print(&data) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("{} failed: {}", what, e), exit_code_for(&e)),
    }
}

fn retain_kind(items: &mut Vec<MediaSummary>, filter: Option<MediaTypeFilter>) {
    if let Some(filter) = filter {
        let kind = MediaType::from(filter);
        items.retain(|r| r.kind == kind);
    }
}

fn truncate(mut items: Vec<MediaSummary>, limit: Option<usize>) -> Vec<MediaSummary> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

// =============================================================================
// List Commands
// =============================================================================

pub async fn trending_cmd(cmd: TrendingCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    output.info("Fetching trending...");

    let result = catalog.get_trending().await.map(|mut items| {
        retain_kind(&mut items, cmd.media_type);
        truncate(items, cmd.limit)
    });
    respond(result, "Trending fetch", output)
}

pub async fn latest_movies_cmd(cmd: ListCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    output.info("Fetching movies now playing...");
    let result = catalog
        .get_latest_movies()
        .await
        .map(|items| truncate(items, cmd.limit));
    respond(result, "Movie list", output)
}

pub async fn latest_shows_cmd(cmd: ListCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    output.info("Fetching shows on the air...");
    let result = catalog
        .get_latest_tv_shows()
        .await
        .map(|items| truncate(items, cmd.limit));
    respond(result, "Show list", output)
}

pub async fn top_rated_cmd(cmd: ListCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    output.info("Fetching top rated movies...");
    let result = catalog
        .get_top_rated_movies()
        .await
        .map(|items| truncate(items, cmd.limit));
    respond(result, "Top rated", output)
}

// =============================================================================
// Search Commands
// =============================================================================

pub async fn search_cmd(cmd: SearchCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    if cmd.query.trim().is_empty() {
        return output.error("Search query is empty", ExitCode::InvalidArgs);
    }
    output.info(format!("Searching for: {}", cmd.query));

    let result = catalog.search_titles(&cmd.query).await.map(|mut items| {
        retain_kind(&mut items, cmd.media_type);

        // Filter by year range
        if let Some(year_from) = cmd.year_from {
            items.retain(|r| r.year.map(|y| y >= year_from).unwrap_or(false));
        }
        if let Some(year_to) = cmd.year_to {
            items.retain(|r| r.year.map(|y| y <= year_to).unwrap_or(false));
        }

        truncate(items, cmd.limit)
    });
    respond(result, "Search", output)
}

pub async fn preview_cmd(cmd: PreviewCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    respond(catalog.search_previews(&cmd.query).await, "Preview", output)
}

// =============================================================================
// Detail Commands
// =============================================================================

pub async fn genres_cmd(cmd: GenresCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    let kind = MediaType::from(cmd.kind);
    respond(catalog.get_genres(kind).await, "Genre list", output)
}

pub async fn movie_cmd(cmd: MovieCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    output.info(format!("Getting movie: {}", cmd.id));
    respond(catalog.get_movie_details(cmd.id).await, "Movie info", output)
}

pub async fn show_cmd(cmd: ShowCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    output.info(format!("Getting show: {}", cmd.id));
    respond(
        catalog.get_tv_show_with_seasons(cmd.id).await,
        "Show info",
        output,
    )
}

pub async fn episode_cmd(cmd: EpisodeCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    output.info(format!(
        "Getting episode: {} S{:02}E{:02}",
        cmd.id, cmd.season, cmd.episode
    ));
    respond(
        catalog
            .get_tv_episode_details(cmd.id, cmd.season, cmd.episode)
            .await,
        "Episode info",
        output,
    )
}

// =============================================================================
// Xref Command
// =============================================================================

pub async fn xref_cmd(cmd: XrefCmd, catalog: &Catalog, output: &Output) -> ExitCode {
    if let Err(msg) = cmd.validate() {
        return output.error(msg, ExitCode::InvalidArgs);
    }

    let xref = catalog.xref();
    let title = cmd.title.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let response = if cmd.verify {
        if !xref.is_enabled() {
            return output.error("OMDB_API_KEY not set", ExitCode::ConfigError);
        }
        // validate() already rejected a missing or malformed ID
        let Some(id) = cmd.id.as_deref().and_then(|id| parse_xref_id(id).ok()) else {
            return output.error("--verify needs a valid ID", ExitCode::InvalidArgs);
        };
        let xref_id = xref.verify(&id).await;
        XrefResponse {
            verified: xref_id.is_some(),
            xref_id,
            title: None,
        }
    } else if let Some(title) = title {
        let kind = MediaType::from(cmd.kind);
        let xref_id = xref
            .ensure_xref_id(cmd.id.as_deref(), title, cmd.year, kind)
            .await;
        XrefResponse {
            xref_id,
            verified: false,
            title: Some(title.to_string()),
        }
    } else {
        let id = cmd.id.as_deref().unwrap_or_default();
        match parse_xref_id(id) {
            Ok(id) => XrefResponse {
                xref_id: Some(id),
                verified: false,
                title: None,
            },
            Err(msg) => return output.error(msg, ExitCode::InvalidArgs),
        }
    };

    if response.xref_id.is_none() {
        return output.error("No cross-reference found", ExitCode::NotFound);
    }
    respond(Ok(response), "Cross-reference", output)
}
