//! Error types for the streaming engine.

use crate::section::SectionStep;
use std::path::PathBuf;
use thiserror::Error;

/// Errors a section renderer can report.
///
/// These are caught at the sequencer boundary and converted into a
/// deterministic error fragment so the state machine still reaches its
/// terminal step; they never abort the connection on their own.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A collaborator the renderer depends on is missing.
    #[error("required collaborator is not available: {0}")]
    Unavailable(&'static str),

    /// Rendering failed for an internal reason.
    #[error("section rendering failed: {0}")]
    Failed(String),
}

/// Errors that are fatal to a render pass.
///
/// Backpressure is deliberately absent here: a full buffer is the designed
/// pause path, not a failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Scratch-storage failure in the spill strategy.
    #[error("scratch storage failure: {0}")]
    Spill(#[from] SpillError),

    /// A renderer produced a single fragment that can never fit the buffer,
    /// even when the buffer is completely empty.
    #[error("section {section:?} produced a fragment larger than the buffer capacity of {capacity} bytes")]
    FragmentOverflow {
        section: SectionStep,
        capacity: usize,
    },

    /// A renderer broke the backpressure contract.
    #[error("section {section:?} violated the backpressure contract: {reason}")]
    ContractViolation {
        section: SectionStep,
        reason: &'static str,
    },
}

/// Errors touching the durable scratch file used by the spill strategy.
///
/// Any of these is fatal to the render pass; the engine releases the scratch
/// handle and reports the failure upstream instead of retrying.
#[derive(Debug, Error)]
pub enum SpillError {
    #[error("failed to create scratch file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write scratch file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to reopen scratch file {path} for replay: {source}")]
    Reopen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read scratch file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove scratch file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
