//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use floodcare_common::intake::QuickStatus;
use floodcare_common::{AnnouncementKind, Category};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:7870";

/// FloodCare CLI
#[derive(Debug, Parser)]
#[command(name = "floodctl")]
#[command(about = "FloodCare - flood emergency reports and school announcements", long_about = None)]
#[command(version = floodcare_common::VERSION)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// floodcared base URL
    #[arg(long, global = true, env = "FLOODCTL_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Output raw JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a report (the message is the trailing words)
    Report {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        /// Dormitory or zone
        #[arg(long, default_value = "")]
        dorm: String,

        /// FOOD, MEDICAL, EVACUATION, OTHER or SAFE_CHECKIN
        #[arg(long, default_value = "OTHER")]
        category: Category,

        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// One-tap status: SAFE, ANXIOUS or HUNGRY
    Quick {
        status: QuickStatus,

        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,
    },

    /// Emergency signal; without --lat/--lng the daemon tries to locate
    Sos {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// Staff priority queue
    Queue {
        /// Hide resolved reports
        #[arg(long)]
        pending: bool,
    },

    /// Mark a report resolved
    Resolve { id: String },

    /// Delete a report
    Delete { id: String },

    /// Post an announcement
    Announce {
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        /// INFO, WARNING or EMERGENCY
        #[arg(long = "type", default_value = "INFO")]
        kind: AnnouncementKind,
    },

    /// List announcements
    Announcements,

    /// Remove an announcement
    Unannounce { id: String },

    /// Open the staff session (prompts when no password is given)
    Login {
        #[arg(long, env = "FLOODCTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Close the staff session
    Logout,

    /// Pull from the sheet now
    Sync,

    /// Ask the flood safety assistant
    Advise {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Show daemon health
    Health,
}
