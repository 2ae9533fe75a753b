//! CardForge turns a photographed object into a trading card.
//!
//! One attempt extracts visual features once, lets four evaluator personas
//! decide the card's name, flavor, attribute and color/rarity in parallel,
//! and merges their contributions into a [`types::CardRecord`].

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod persona;
pub mod pipeline;
pub mod storage;
pub mod types;
pub mod version;

pub use error::{Error, Result};
