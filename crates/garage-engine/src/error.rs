use garage_store::StoreError;
use garage_world::WorldError;
use thiserror::Error;

/// Failures the engine cannot express as an outcome.
///
/// Business results (out of range, garage full, site blocked, ...) are
/// returned as outcome values, never as errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The garage configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A world collaborator call failed.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// The record store failed during a maintenance operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
