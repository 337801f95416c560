pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storyline")]
#[command(about = "Browse, post and bookmark stories, with offline bookmarks", long_about = None)]
pub struct Cli {
    /// Database file for bookmarked stories (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Base URL of the story API (overrides config)
    #[arg(long, global = true)]
    pub api: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        email: String,
        password: String,
    },
    /// Create a new account
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// List stories, falling back to bookmarks when offline
    Stories {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Stories per page (default: from config)
        #[arg(long)]
        size: Option<u32>,

        /// Only stories with a location
        #[arg(long)]
        location: bool,
    },
    /// Show one story
    Show {
        id: String,
    },
    /// Toggle the bookmark on a story
    Bookmark {
        id: String,
    },
    /// List bookmarked stories (works offline)
    Bookmarks,
    /// Post a new story
    Post {
        /// JPG or PNG photo, at most 1MB
        photo: PathBuf,

        description: String,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Remove unbookmarked leftovers from the local store
    Sweep,
    /// Remove every story from the local store
    Clear,
}
