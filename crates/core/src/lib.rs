//! Flip Seven rules engine. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod deck;
pub mod events;
pub mod game;
pub mod pending;
pub mod player;
pub mod rng;
pub mod snapshot;

pub use cards::*;
pub use config::*;
pub use deck::*;
pub use events::*;
pub use game::*;
pub use pending::*;
pub use player::*;
pub use rng::*;
pub use snapshot::*;
