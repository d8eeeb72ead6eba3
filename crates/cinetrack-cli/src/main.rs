use clap::{ArgAction, Args, Parser, Subcommand};
use cinetrack_core::{MovieFilter, Provenance};
use cinetrack_models::{Answer, ReviewType, WatchStatus};
use commands::{auth, cinemas, clear, comment, config, movies, playlist, review, tag};
use context::AppContext;
use std::path::PathBuf;

mod commands;
mod context;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "cinetrack")]
#[command(about = "CineTrack - Keep track of the movies you watched, loved and want to see")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to a daily rolling file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, sign in and manage the account
    Auth {
        #[command(subcommand)]
        cmd: AuthCommands,
    },
    /// Browse the catalog and manage your own movies
    #[command(long_about = "Browse popular TMDB movies, search the catalog and manage the movies you registered yourself. Every listed movie carries your review status.")]
    Movies {
        #[command(subcommand)]
        cmd: MovieCommands,
    },
    /// Like, dislike or favorite a movie
    Review {
        #[command(subcommand)]
        cmd: ReviewCommands,
    },
    /// Record whether you watched a movie and whether you'd watch it (again)
    Tag {
        #[command(subcommand)]
        cmd: TagCommands,
    },
    /// Comment threads attached to reviews
    Comment {
        #[command(subcommand)]
        cmd: CommentCommands,
    },
    /// Named movie lists
    Playlist {
        #[command(subcommand)]
        cmd: PlaylistCommands,
    },
    /// Find cinemas around a location
    #[command(long_about = "List cinemas near a coordinate using OpenStreetMap data, nearest first.", allow_negative_numbers = true)]
    Cinemas {
        /// Latitude in decimal degrees
        latitude: f64,

        /// Longitude in decimal degrees
        longitude: f64,

        /// Search radius in meters (defaults to the configured radius)
        #[arg(long)]
        radius: Option<u32>,

        /// Show at most this many cinemas
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear stored data
    #[command(long_about = "Clear the stored session (--credentials), the local document store (--store) or both (--all).")]
    Clear {
        /// Clear the session and the local store
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["credentials", "store"])]
        all: bool,

        /// Clear the stored session
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,

        /// Delete the local document store
        #[arg(long, action = ArgAction::SetTrue)]
        store: bool,

        /// Don't ask for confirmation
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Update display name or photo
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Change the password
    Password,
    /// Permanently delete the account
    DeleteAccount {
        /// Don't ask for confirmation
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

/// Client-side filters shared by the listing commands
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Title contains (case-insensitive)
    #[arg(long)]
    pub title: Option<String>,

    /// Director contains (case-insensitive)
    #[arg(long)]
    pub director: Option<String>,

    /// Genre contains (case-insensitive)
    #[arg(long)]
    pub genre: Option<String>,

    /// Exact release year
    #[arg(long)]
    pub year: Option<String>,

    /// Only movies you reviewed this way (like, dislike, favorite)
    #[arg(long)]
    pub status: Option<ReviewType>,

    /// Only movies from this source (external, tmdb)
    #[arg(long)]
    pub source: Option<Provenance>,
}

impl FilterArgs {
    pub fn into_filter(self) -> MovieFilter {
        MovieFilter {
            title: self.title,
            director: self.director,
            genre: self.genre,
            release_year: self.year,
            status: self.status.map(Into::into),
            provenance: self.source,
        }
    }
}

/// Fields of a movie you registered yourself
#[derive(Args, Debug, Default)]
pub struct MovieFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub director: Option<String>,

    /// Free-form duration, e.g. "2h 19m"
    #[arg(long)]
    pub duration: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub synopsis: Option<String>,

    #[arg(long)]
    pub poster_url: Option<String>,
}

#[derive(Subcommand)]
pub enum MovieCommands {
    /// Popular movies from TMDB
    Popular {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Search TMDB by title; without a query, search interactively
    Search {
        query: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one movie
    Show { id: String },
    /// Register a movie that isn't in the catalog
    Add {
        #[command(flatten)]
        fields: MovieFields,

        /// Id of the movie elsewhere (e.g. its IMDb id) when known
        #[arg(long)]
        external_id: Option<String>,
    },
    /// Edit a movie you registered
    Edit {
        id: String,

        #[command(flatten)]
        fields: MovieFields,

        /// Remove the poster
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "poster_url")]
        clear_poster: bool,
    },
    /// Delete a movie you registered, together with its reviews
    Delete {
        id: String,

        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Movies you registered yourself
    Mine {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Set your review of a movie (replaces an earlier one)
    Set {
        movie_id: String,

        /// like, dislike or favorite
        review_type: ReviewType,

        /// Optional review text
        #[arg(long)]
        content: Option<String>,
    },
    /// Show your review of a movie and its comments
    Show { movie_id: String },
    /// All your reviews, most recent first
    List,
    /// Delete a review and its comment thread
    Delete {
        id: String,

        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Set tag fields for a movie; unspecified fields are kept
    Set {
        movie_id: String,

        /// watched, watched-long-ago, dropped, not-watched
        #[arg(long)]
        watched: Option<WatchStatus>,

        /// Would you like to watch it (yes/no)
        #[arg(long)]
        interest: Option<Answer>,

        /// Would you watch it again (yes/no)
        #[arg(long)]
        rewatch: Option<Answer>,
    },
    /// Show the tag of a movie
    Show { movie_id: String },
    /// All your tags
    List,
    /// Delete a tag
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Comment on a review
    Add { review_id: String, text: Vec<String> },
    /// Comments on a review, oldest first
    List { review_id: String },
    /// Edit one of your comments
    Edit { id: String, text: Vec<String> },
    /// Delete one of your comments
    Delete {
        id: String,

        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum PlaylistCommands {
    /// Create a playlist
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        cover_url: Option<String>,
    },
    /// Your playlists
    List,
    /// A playlist with its movies
    Show { id: String },
    /// Rename or describe a playlist
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long, conflicts_with = "clear_cover")]
        cover_url: Option<String>,

        #[arg(long, action = ArgAction::SetTrue)]
        clear_description: bool,

        #[arg(long, action = ArgAction::SetTrue)]
        clear_cover: bool,
    },
    /// Add a movie to a playlist
    Add { id: String, movie_id: String },
    /// Remove a movie from a playlist
    Remove { id: String, movie_id: String },
    /// Delete a playlist
    Delete {
        id: String,

        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Include partially masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a configuration file
    #[command(long_about = "Create the configuration file. Values not given as flags are asked for; leave the Firebase fields empty to keep working offline with the local store.")]
    Init {
        /// TMDB API read access token
        #[arg(long)]
        tmdb_token: Option<String>,

        #[arg(long)]
        firebase_api_key: Option<String>,

        #[arg(long)]
        firebase_project_id: Option<String>,

        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let ctx = AppContext::load()?;

    let result = match cli.command {
        Commands::Auth { cmd } => auth::run_auth(cmd, &ctx, &output).await,
        Commands::Movies { cmd } => movies::run_movies(cmd, &ctx, &output).await,
        Commands::Review { cmd } => review::run_review(cmd, &ctx, &output).await,
        Commands::Tag { cmd } => tag::run_tag(cmd, &ctx, &output).await,
        Commands::Comment { cmd } => comment::run_comment(cmd, &ctx, &output).await,
        Commands::Playlist { cmd } => playlist::run_playlist(cmd, &ctx, &output).await,
        Commands::Cinemas { latitude, longitude, radius, limit } => {
            cinemas::run_cinemas(latitude, longitude, radius, limit, &ctx, &output).await
        }
        Commands::Config { cmd } => config::run_config(cmd, &ctx, &output),
        Commands::Clear { all, credentials, store, yes } => clear::run_clear(all, credentials, store, yes, &ctx, &output),
    };

    // JSON consumers get the failure on stdout as well
    if let Err(e) = &result {
        if !output.is_human() {
            output.error(e.to_string());
        }
    }
    result
}
