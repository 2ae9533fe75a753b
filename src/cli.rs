//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for CardForge.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CardForge - turn a photo of an object into a trading card
///
/// A panel of four evaluator personas discusses the photographed object and
/// decides the card's name, flavor text, attribute, color and rarity.
#[derive(Parser, Debug)]
#[command(name = "cardforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "CARDFORGE_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Forge a card from a photo
    Forge {
        /// Photo of the object (png, jpg, webp, gif)
        image: PathBuf,

        /// Do not add the card to the collection
        #[arg(long)]
        no_save: bool,

        /// Print the card as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Inspect the evaluator panel
    Personas {
        #[command(subcommand)]
        subcommand: PersonasSubcommand,
    },

    /// Browse the saved card collection
    Collection {
        #[command(subcommand)]
        subcommand: CollectionSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonasSubcommand {
    /// Show who holds each responsibility
    List,

    /// Validate a persona file (or the configured panel)
    Validate {
        /// Persona TOML file to check
        #[arg(short, long)]
        file: Option<String>,
    },
}

/// Collection subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CollectionSubcommand {
    /// List saved cards, newest first
    List,

    /// Show one card with its discussion log
    Show {
        /// Card id
        id: String,
    },

    /// Remove a card from the collection
    Delete {
        /// Card id
        id: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}
