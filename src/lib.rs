//! Client-side coordination for a two-player networked chess match.
//!
//! The [`ConnectionManager`] actor receives transport events and view-layer
//! actions, drives the lobby, challenge, and session state machines, merges
//! authoritative board pushes with the local drag, and checks for
//! checkmate locally so the loser can announce the result immediately.

pub mod config;
pub mod connection;
pub mod error;
pub mod game;
pub mod models;

pub use config::ClientConfig;
pub use connection::ConnectionManager;
pub use error::{ClientError, Result};
