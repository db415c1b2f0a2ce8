//! # confportal-core
//!
//! Incremental, bounded-memory page generation engine for embedded
//! configuration portals.
//!
//! This crate provides:
//! - A fixed-capacity chunk buffer with backpressure-aware appends
//! - A linear section state machine over the configuration page layout
//! - A pull adapter that answers "give me up to N bytes" transport callbacks
//! - An optional scratch-file spill strategy for hosts that cannot hold
//!   even one buffer's worth of page reliably
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable both behind a tokio web server and on embedded
//! (esp-idf style) targets. The engine never initiates I/O on its own: it
//! only reacts to pull calls from the transport.

pub mod buffer;
pub mod error;
pub mod render;
pub mod section;
pub mod sequencer;
pub mod spill;

pub use buffer::ChunkBuffer;
pub use error::{EngineError, RenderError, SpillError};
pub use render::{FragmentSink, PageSource, RenderProgress, SectionRenderer};
pub use section::{SectionKind, SectionStep};
pub use sequencer::{
    DeliveryStrategy, EngineConfig, PageStream, RenderStats, DEFAULT_BUFFER_CAPACITY,
};
