//! CardForge - turn a photo of an object into a trading card
//!
//! Entry point for the `cardforge` binary.

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};
use uuid::Uuid;

use cardforge::backend::OpenAiBackend;
use cardforge::config::{self, ForgeConfig};
use cardforge::error::{Error, Result};
use cardforge::logging::{self, LogGuards};
use cardforge::persona::{PersonaRegistry, PersonaSet, PersonaSource};
use cardforge::pipeline::CardForge;
use cardforge::storage::{CardStore, JsonCollectionStore};
use cardforge::types::{CardRecord, ImageAsset};
use cardforge::version::{self, BuildInfo};

use crate::cli::{Cli, CollectionSubcommand, Commands, ConfigSubcommand, PersonasSubcommand};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        version::print_version();
        return Ok(());
    }

    // `config init` must work before any configuration exists
    if let Commands::Config {
        subcommand: ConfigSubcommand::Init { path, force },
    } = &cli.command
    {
        let written = config::init_config(path.as_deref(), *force)?;
        println!("Configuration written to {}", written.display());
        return Ok(());
    }

    let config = ForgeConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;

    let build = BuildInfo::current();
    debug!(version = %build.full_version(), target = build.target, "Starting CardForge");

    match cli.command {
        Commands::Forge { image, no_save, json } => run_forge(&config, image, no_save, json),
        Commands::Personas { subcommand } => handle_personas_command(&config, subcommand),
        Commands::Collection { subcommand } => handle_collection_command(&config, subcommand),
        Commands::Config { subcommand } => handle_config_command(&config, subcommand),
        Commands::Version => Ok(()),
    }
}

fn init_logging_from_config(config: &ForgeConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

fn open_store(config: &ForgeConfig) -> JsonCollectionStore {
    JsonCollectionStore::new(config.collection_path(), config.storage.max_cards)
}

fn load_panel(config: &ForgeConfig) -> Result<PersonaSet> {
    PersonaRegistry::from_optional_file(config.personas.file.as_deref()).load_personas()
}

// ─────────────────────────────────────────────────────────────────
// forge
// ─────────────────────────────────────────────────────────────────

fn run_forge(config: &ForgeConfig, image_path: PathBuf, no_save: bool, json: bool) -> Result<()> {
    // Panel and image are checked before any model is contacted
    let personas = load_panel(config)?;
    let image = ImageAsset::from_path(&image_path)?;

    let backend = Arc::new(OpenAiBackend::new((&config.model).into())?);
    let mut forge = CardForge::with_params(
        backend.clone(),
        config.vision.params(),
        backend.clone(),
        config.generation.params(),
        personas,
    );
    if !no_save {
        forge = forge.with_store(Arc::new(open_store(config)));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    let outcome = runtime.block_on(forge.forge(&image))?;

    info!(
        requests = backend.total_requests(),
        tokens = backend.total_tokens(),
        "Model usage"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.card)?);
        return Ok(());
    }

    print_card(&outcome.card);
    if !outcome.fallbacks.is_empty() {
        let missing: Vec<_> = outcome.fallbacks.iter().map(|r| r.slug()).collect();
        println!("\nNote: default values used for {}", missing.join(", "));
    }
    if outcome.saved {
        println!("\nSaved to collection as {}", outcome.card.id);
    }
    Ok(())
}

fn print_card(card: &CardRecord) {
    println!("╔═ {} ", card.name);
    println!("║ {} · {}", card.attribute, card.rarity);
    if let Some(color) = &card.color {
        println!("║ Color: {}", color);
    }
    println!("║");
    println!("║ {}", card.effect);
    println!("║");
    println!("║ \"{}\"", card.flavor_text);
    println!("╚═ {}", card.description);

    if !card.discussion_log.is_empty() {
        println!("\nDiscussion:");
        for entry in &card.discussion_log {
            println!("  {}: {}", entry.persona_display_name, entry.text);
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// personas
// ─────────────────────────────────────────────────────────────────

fn handle_personas_command(config: &ForgeConfig, subcommand: PersonasSubcommand) -> Result<()> {
    match subcommand {
        PersonasSubcommand::List => {
            let panel = load_panel(config)?;
            for seat in PersonaRegistry::describe(&panel) {
                println!("{:<14} {:<12} {}", seat.responsibility, seat.id, seat.display_name);
            }
        }
        PersonasSubcommand::Validate { file } => {
            let file = file.or_else(|| config.personas.file.clone());
            let registry = PersonaRegistry::from_optional_file(file.as_deref());
            let panel = registry.load_personas()?;
            let origin = match registry.source() {
                PersonaSource::Bundled => "bundled panel".to_string(),
                PersonaSource::File(path) => path.display().to_string(),
                PersonaSource::Inline(_) => "inline panel".to_string(),
            };
            println!("Persona panel is valid ({} personas, {}).", panel.len(), origin);
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// collection
// ─────────────────────────────────────────────────────────────────

fn parse_card_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| Error::Storage {
        path: PathBuf::from(id),
        message: format!("'{}' is not a card id: {}", id, e),
    })
}

fn handle_collection_command(config: &ForgeConfig, subcommand: CollectionSubcommand) -> Result<()> {
    let store = open_store(config);

    match subcommand {
        CollectionSubcommand::List => {
            let cards = store.load_all()?;
            if cards.is_empty() {
                println!("The collection at {} is empty.", store.path().display());
                return Ok(());
            }
            println!(
                "{} of {} cards in {}",
                cards.len(),
                store.max_cards(),
                store.path().display()
            );
            for card in cards {
                println!(
                    "{}  {:<10} {:<6} {}  ({})",
                    card.id,
                    card.rarity,
                    card.attribute,
                    card.name,
                    card.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        CollectionSubcommand::Show { id } => {
            let id = parse_card_id(&id)?;
            match store.get(id)? {
                Some(card) => print_card(&card),
                None => println!("No card with id {}", id),
            }
        }
        CollectionSubcommand::Delete { id } => {
            let id = parse_card_id(&id)?;
            if store.delete(id)? {
                println!("Deleted {}", id);
            } else {
                println!("No card with id {}", id);
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// config
// ─────────────────────────────────────────────────────────────────

fn handle_config_command(config: &ForgeConfig, subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let mut shown = config.clone();
            if !shown.model.api_key.is_empty() {
                shown.model.api_key = "********".to_string();
            }
            println!("{}", toml::to_string_pretty(&shown)?);
        }
        ConfigSubcommand::Validate => {
            // Loading already validated; the panel is part of a usable setup
            load_panel(config)?;
            println!("Configuration is valid.");
        }
        ConfigSubcommand::Init { .. } => {}
    }
    Ok(())
}
