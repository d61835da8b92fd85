//! Loading and validation for rules files and scripted decks.

pub mod load;

pub use load::*;
