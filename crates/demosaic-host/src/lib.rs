//! Reference host for demosaic.
//!
//! Loads a TOML config and a JSON scene script, builds an in-memory world
//! and drives the sweep scheduler on a tokio tick loop.

pub mod config;
pub mod run;
pub mod scene;

pub use config::HostConfig;
pub use run::{run, RunOptions, RunReport};
pub use scene::{Scene, SceneAction, SceneEvent};
