//! cinecat - terminal movie catalog browser backed by TMDB.

/// Application configuration (TOML).
mod config;
/// Terminal UI components.
mod tui;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cinecat_api::tmdb::{Credential, ImageSize, MoviePage, Section, TmdbApi, TmdbClient};
use cinecat_store::{
    LocalStorage, MAX_RATING, ReviewStore, load_credential, remove_credential, save_credential,
};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::tui::present::{
    cast_line, date_label, overview_text, page_status, people_list, poster_label, rating_label,
    runtime_label, section_label, title_with_year, votes_label,
};
use crate::tui::run_browser;

/// Environment variable that overrides the stored credential.
const CREDENTIAL_ENV: &str = "TMDB_API_KEY";

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "cinecat", about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog interactively.
    Browse,
    /// Print one page of a catalog section.
    List(ListArgs),
    /// Search movies by title.
    Search(SearchArgs),
    /// Print details of a movie.
    Details(DetailsArgs),
    /// Manage local movie reviews.
    Reviews(ReviewsCommand),
    /// Manage the stored TMDB credential.
    Key(KeyCommand),
    /// Manage the configuration file.
    Config(ConfigCommand),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Catalog sections selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SectionArg {
    /// Popular movies.
    Popular,
    /// Movies now in theaters (region-restricted).
    NowPlaying,
    /// Best-rated movies.
    TopRated,
    /// Upcoming releases (region-restricted).
    Upcoming,
    /// All movies sorted by popularity.
    Discover,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Popular => Self::Popular,
            SectionArg::NowPlaying => Self::NowPlaying,
            SectionArg::TopRated => Self::TopRated,
            SectionArg::Upcoming => Self::Upcoming,
            SectionArg::Discover => Self::Discover,
        }
    }
}

/// Arguments for the `list` subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Catalog section.
    #[arg(long, value_enum, default_value_t = SectionArg::Popular)]
    section: SectionArg,
    /// Page number (1-500).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=500))]
    page: u32,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Title to search for (e.g. "Matrix").
    query: String,
    /// Page number (1-500).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=500))]
    page: u32,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `reviews` subcommand.
#[derive(clap::Args)]
struct ReviewsCommand {
    /// Reviews subcommand to run.
    #[command(subcommand)]
    command: ReviewsSubcommands,
}

/// Available reviews subcommands.
#[derive(Subcommand)]
enum ReviewsSubcommands {
    /// Add a review to a movie.
    Add(ReviewAddArgs),
    /// List reviews of a movie.
    List(ReviewListArgs),
}

/// Arguments for the `reviews add` subcommand.
#[derive(clap::Args)]
struct ReviewAddArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: u64,
    /// Star rating (0-7).
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_RATING)))]
    rating: u8,
    /// Review text.
    #[arg(long, required = true)]
    comment: String,
}

/// Arguments for the `reviews list` subcommand.
#[derive(clap::Args)]
struct ReviewListArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `key` subcommand.
#[derive(clap::Args)]
struct KeyCommand {
    /// Key subcommand to run.
    #[command(subcommand)]
    command: KeySubcommands,
}

/// Available key subcommands.
#[derive(Subcommand)]
enum KeySubcommands {
    /// Store a v3 API key or v4 read access token.
    Set(KeySetArgs),
    /// Show the active credential (masked).
    Show,
    /// Delete the stored credential.
    Clear,
}

/// Arguments for the `key set` subcommand.
#[derive(clap::Args)]
struct KeySetArgs {
    /// Credential value.
    credential: String,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a default config file if none exists.
    Init,
    /// Print the effective configuration.
    Show,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: Shell,
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = AppConfig::locate(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Reads `TMDB_API_KEY` from the process environment.
fn credential_from_env() -> Option<String> {
    std::env::var(CREDENTIAL_ENV).ok()
}

/// Resolves the active credential: `env_value` (from `TMDB_API_KEY`), then
/// the stored one. A blank `env_value` falls through to storage.
///
/// # Errors
///
/// Returns an error if the stored credential cannot be read.
fn resolve_credential(
    storage: &LocalStorage,
    env_value: Option<&str>,
) -> Result<Option<(Credential, &'static str)>> {
    if let Some(credential) = env_value.and_then(Credential::new) {
        return Ok(Some((credential, "environment")));
    }
    let stored = load_credential(storage).context("failed to read stored credential")?;
    Ok(stored
        .and_then(|raw| Credential::new(&raw))
        .map(|c| (c, "local storage")))
}

/// Builds a `TmdbClient` from config and the active credential.
///
/// # Errors
///
/// Returns an error if no credential is configured or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(dir: Option<&PathBuf>) -> Result<TmdbClient> {
    let config = load_config(dir)?;
    let storage = LocalStorage::open(dir).context("failed to open local storage")?;
    let env_value = credential_from_env();
    let Some((credential, _)) = resolve_credential(&storage, env_value.as_deref())? else {
        bail!("no TMDB credential configured (set {CREDENTIAL_ENV} or run `cinecat key set`)");
    };
    config.tmdb.build_client(credential)
}

/// Logs one listing page as a table.
fn log_page(heading: &str, page: u32, listing: &MoviePage) {
    tracing::info!("{heading}");
    tracing::info!("ID\tRating\tRelease\t\tTitle");
    for movie in &listing.results {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            movie.id,
            rating_label(movie.vote_average),
            date_label(movie.release_date()),
            title_with_year(movie),
        );
    }
    tracing::info!(
        "{} ({} results)",
        page_status(page, listing.total_pages()),
        listing.total_results.unwrap_or_default()
    );
}

/// Runs the `list` subcommand.
///
/// # Errors
///
/// Returns an error if no credential is configured or the API request fails.
#[instrument(skip_all)]
async fn run_list(args: &ListArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let section = Section::from(args.section);
    let endpoint = client
        .queries()
        .listing(true, section, args.page, "")
        .context("failed to build listing URL")?;

    let listing = client
        .fetch_listing(&endpoint)
        .await
        .with_context(|| format!("TMDB {section} request failed"))?;

    log_page(section_label(section), args.page, &listing);
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if no credential is configured or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let endpoint = client
        .queries()
        .listing(true, Section::Search, args.page, &args.query)
        .context("failed to build search URL")?;

    let listing = client
        .fetch_listing(&endpoint)
        .await
        .context("TMDB search request failed")?;

    log_page(
        &format!("Búsqueda: {}", args.query.trim()),
        args.page,
        &listing,
    );
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if no credential is configured or the API request fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let region = client.queries().region_tag().to_owned();

    let details = client
        .movie_details(args.id)
        .await
        .context("TMDB movie details request failed")?;

    tracing::info!("ID: {}", details.id);
    tracing::info!("Title: {}", details.title);
    if let Some(original) = details.original_title.as_deref() {
        tracing::info!("Original Title: {original}");
    }
    tracing::info!("Release: {}", date_label(details.release_date()));
    tracing::info!("Runtime: {}", runtime_label(details.runtime));
    tracing::info!(
        "Certification ({region}): {}",
        details.certification(&region).unwrap_or("-")
    );
    tracing::info!("Genres: {}", people_list(details.genre_names()));
    tracing::info!(
        "Rating: {} ({})",
        rating_label(details.vote_average),
        votes_label(details.vote_count)
    );
    tracing::info!(
        "Poster: {}",
        poster_label(details.poster_path(), ImageSize::Medium)
    );
    tracing::info!("Overview: {}", overview_text(details.overview()));
    tracing::info!(
        "Directors: {}",
        people_list(details.directors().iter().map(|d| d.name.as_str()))
    );
    tracing::info!("Cast:");
    for member in details.top_cast() {
        tracing::info!("  {}", cast_line(member));
    }
    tracing::info!("TMDB: {}", details.tmdb_url());
    if let Some(imdb) = details.imdb_url() {
        tracing::info!("IMDb: {imdb}");
    }
    if let Some(homepage) = details.homepage() {
        tracing::info!("Homepage: {homepage}");
    }

    Ok(())
}

/// Runs the `reviews add` subcommand.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or written.
#[instrument(skip_all)]
fn run_reviews_add(args: &ReviewAddArgs, dir: Option<&PathBuf>) -> Result<()> {
    let storage = LocalStorage::open(dir).context("failed to open local storage")?;
    let mut reviews = ReviewStore::load_all(storage).context("failed to load reviews")?;

    if !reviews
        .add_review(Some(args.id), args.rating, &args.comment)
        .context("failed to save review")?
    {
        bail!("review comment must not be empty");
    }

    tracing::info!(
        "Saved review for movie {} ({} total)",
        args.id,
        reviews.reviews_for(args.id).len()
    );
    Ok(())
}

/// Runs the `reviews list` subcommand.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or read.
#[instrument(skip_all)]
fn run_reviews_list(args: &ReviewListArgs, dir: Option<&PathBuf>) -> Result<()> {
    let storage = LocalStorage::open(dir).context("failed to open local storage")?;
    let reviews = ReviewStore::load_all(storage).context("failed to load reviews")?;

    let stored = reviews.reviews_for(args.id);
    if stored.is_empty() {
        tracing::info!("No reviews for movie {}", args.id);
        return Ok(());
    }
    for review in stored {
        tracing::info!("{} {}", review.stars(), review.comment);
    }
    tracing::info!("Total: {} reviews", stored.len());
    Ok(())
}

/// Runs the `key` subcommands.
///
/// # Errors
///
/// Returns an error if storage cannot be opened, read, or written.
#[instrument(skip_all)]
fn run_key(command: &KeySubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let storage = LocalStorage::open(dir).context("failed to open local storage")?;
    match command {
        KeySubcommands::Set(args) => {
            if !save_credential(&storage, &args.credential).context("failed to save credential")?
            {
                bail!("credential must not be empty");
            }
            tracing::info!("Credential saved to {}", storage.root().display());
        }
        KeySubcommands::Show => {
            let env_value = credential_from_env();
            match resolve_credential(&storage, env_value.as_deref())? {
                Some((credential, source)) => {
                    let scheme = if credential.bearer_token().is_some() {
                        "bearer token"
                    } else {
                        "API key"
                    };
                    tracing::info!("{} ({scheme}, from {source})", credential.masked());
                }
                None => tracing::info!("No credential configured"),
            }
        }
        KeySubcommands::Clear => {
            remove_credential(&storage).context("failed to remove credential")?;
            tracing::info!("Stored credential removed");
        }
    }
    Ok(())
}

/// Runs the `config` subcommands.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
#[instrument(skip_all)]
fn run_config(command: &ConfigSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = AppConfig::locate(dir).context("failed to resolve config path")?;
    match command {
        ConfigSubcommands::Init => {
            if config_path.exists() {
                tracing::info!("Config already exists at {}", config_path.display());
                return Ok(());
            }
            AppConfig::default()
                .save(&config_path)
                .context("failed to save config")?;
            tracing::info!("Wrote default config to {}", config_path.display());
        }
        ConfigSubcommands::Show => {
            let config = AppConfig::load(&config_path).context("failed to load config")?;
            let content =
                toml::to_string_pretty(&config).context("failed to serialize config to TOML")?;
            tracing::info!("# {}", config_path.display());
            for line in content.lines() {
                tracing::info!("{line}");
            }
        }
    }
    Ok(())
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if config, storage, or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let storage = LocalStorage::open(dir).context("failed to open local storage")?;
    let reviews = ReviewStore::load_all(storage.clone()).context("failed to load reviews")?;
    let env_value = credential_from_env();
    let credential = resolve_credential(&storage, env_value.as_deref())?.map(|(c, _)| c);

    run_browser(config.tmdb, storage, reviews, credential)
        .await
        .context("browser TUI failed")
}

/// Runs the `completions` subcommand.
fn run_completions(args: &CompletionsArgs) {
    let mut command = Cli::command();
    let name = command.get_name().to_owned();
    clap_complete::generate(args.shell, &mut command, name, &mut std::io::stdout());
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Browse => run_browse(dir).await,
        Commands::List(args) => run_list(&args, dir).await,
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Details(args) => run_details(&args, dir).await,
        Commands::Reviews(cmd) => match cmd.command {
            ReviewsSubcommands::Add(args) => run_reviews_add(&args, dir),
            ReviewsSubcommands::List(args) => run_reviews_list(&args, dir),
        },
        Commands::Key(cmd) => run_key(&cmd.command, dir),
        Commands::Config(cmd) => run_config(&cmd.command, dir),
        Commands::Completions(args) => {
            run_completions(&args);
            Ok(())
        }
    }
}
