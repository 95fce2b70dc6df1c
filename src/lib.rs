//! Opponent modeling from a player's game history.
//!
//! Provider game records are normalized into [`GameRecord`]s, from which the
//! crate derives a per-color opening trie, a per-phase error profile, style
//! scores and an over-the-board rating estimate. Everything here is a pure
//! function of its inputs; fetching, caching and rendering live elsewhere.

pub mod chess;

pub use chess::*;
