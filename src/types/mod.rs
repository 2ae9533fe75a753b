//! Type definitions for CardForge
//!
//! The records that flow through one card-generation attempt: the feature
//! record extracted from the photo, the per-persona contributions, the
//! discussion log, and the finished card.

mod card;
mod contribution;
mod feature;
mod image;

pub use card::*;
pub use contribution::*;
pub use feature::*;
pub use image::*;
