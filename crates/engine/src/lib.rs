//! Execution context for gridlock games.
//!
//! [`spawn`] moves a [`Playable`] game onto a tokio task that owns the
//! life-loss deadline and the start-up piece requests. Everything else talks
//! to it through an [`EngineHandle`].

pub mod config;
pub mod runtime;

pub use config::EngineConfig;
pub use runtime::{spawn, EngineCommand, EngineError, EngineHandle, Playable};
