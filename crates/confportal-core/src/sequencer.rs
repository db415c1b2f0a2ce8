//! The section sequencer and pull adapter.
//!
//! [`PageStream`] is the engine driven by the transport's pull callback: it
//! drains the chunk buffer into the transport-supplied destination, refills
//! the buffer from the current page section when it runs dry, and walks the
//! section state machine strictly forward. All transitions happen
//! synchronously inside a pull call; pausing a dynamic section is state kept
//! across calls, never a blocked call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::buffer::ChunkBuffer;
use crate::error::EngineError;
use crate::render::{FragmentSink, PageSource, RenderProgress};
use crate::section::{SectionKind, SectionStep};
use crate::spill::SpillState;

/// Default chunk buffer capacity in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 2048;

/// Emitted when a section renderer fails or is missing. Dynamic sections
/// only occur inside the form, so closing the form and the document keeps
/// the short error page well-formed.
const ERROR_FRAGMENT: &str = "<div class=\"em\">Internal Server Error: \
the configuration form could not be rendered.</div></form></body></html>";

/// How produced bytes travel from the sections to the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DeliveryStrategy {
    /// Hold pending bytes in the fixed in-memory chunk buffer.
    Memory,
    /// Stage the whole document through an append-only scratch file and
    /// replay it from storage. Trades memory bound for two passes and
    /// storage I/O latency.
    Spill { scratch_path: PathBuf },
}

/// Engine configuration, fixed for the lifetime of a [`PageStream`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Chunk buffer capacity in bytes. Never resized during a pass.
    pub buffer_capacity: usize,
    /// Delivery strategy, selected here rather than via divergent types.
    pub strategy: DeliveryStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            strategy: DeliveryStrategy::Memory,
        }
    }
}

/// Per-pass observability counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// Total bytes handed to the transport this pass.
    pub total_bytes_emitted: u64,
    /// Largest single pull answered this pass.
    pub max_chunk_observed: usize,
}

/// Pending static content with a read position, kept across pulls while a
/// section larger than the buffer streams through it.
#[derive(Debug)]
struct StaticCursor {
    content: Vec<u8>,
    pos: usize,
}

impl StaticCursor {
    fn new(content: Vec<u8>) -> Self {
        Self { content, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.content.len() - self.pos
    }

    fn chunk(&self, len: usize) -> &[u8] {
        &self.content[self.pos..self.pos + len]
    }

    fn advance(&mut self, len: usize) {
        self.pos += len;
    }

    fn is_exhausted(&self) -> bool {
        self.pos >= self.content.len()
    }
}

enum Produce {
    /// The buffer gained bytes, or the section completed.
    Produced,
    /// The renderer produced nothing and is not finished; yield to the
    /// transport instead of busy-looping.
    Stalled,
}

/// The streaming engine for one render pass over a [`PageSource`].
///
/// Single active render per instance: a second concurrent request must use
/// its own `PageStream` or be serialized by the request-handling
/// collaborator.
pub struct PageStream<S: PageSource> {
    source: S,
    buffer: ChunkBuffer,
    step: SectionStep,
    cursor: Option<StaticCursor>,
    section_complete: bool,
    /// Overrides the linear successor once, set by the error path.
    jump: Option<SectionStep>,
    /// False after a pass has fully drained or aborted; pulls then return 0
    /// until `reset_state` arms the next pass.
    active: bool,
    stats: RenderStats,
    scratch: Option<PathBuf>,
    spill: Option<SpillState>,
}

impl<S: PageSource> PageStream<S> {
    /// Create an engine ready to stream one pass of `source`.
    pub fn new(config: EngineConfig, source: S) -> Self {
        let scratch = match config.strategy {
            DeliveryStrategy::Memory => None,
            DeliveryStrategy::Spill { scratch_path } => Some(scratch_path),
        };
        Self {
            source,
            buffer: ChunkBuffer::new(config.buffer_capacity),
            step: SectionStep::FIRST,
            cursor: None,
            section_complete: false,
            jump: None,
            active: true,
            stats: RenderStats::default(),
            scratch,
            spill: None,
        }
    }

    /// Answer one transport pull: copy up to `dest.len()` bytes into `dest`
    /// and return how many were written. Returning 0 signals end-of-stream.
    ///
    /// Resilient to destinations as small as one byte; output never exceeds
    /// the destination length and sections are emitted strictly in order.
    pub fn pull(&mut self, dest: &mut [u8]) -> Result<usize, EngineError> {
        if dest.is_empty() || !self.active {
            return Ok(0);
        }
        let pulled = if self.scratch.is_some() {
            self.pull_spill(dest)
        } else {
            self.pull_memory(dest)
        };
        let written = match pulled {
            Ok(n) => n,
            Err(err) => {
                // Engine-fatal: terminate the pass cleanly, releasing any
                // scratch handle, and report upstream. All-or-nothing.
                self.reset_internal();
                self.active = false;
                return Err(err);
            }
        };
        if self.scratch.is_none() && written == 0 && self.step.is_done() {
            self.finish_pass();
        }
        if written > 0 {
            self.stats.total_bytes_emitted += written as u64;
            if written > self.stats.max_chunk_observed {
                self.stats.max_chunk_observed = written;
            }
        }
        Ok(written)
    }

    /// Counters for the current pass. Reset when the pass completes.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// True once a pass has fully drained or aborted and the engine is
    /// waiting for `reset_state`.
    pub fn is_idle(&self) -> bool {
        !self.active
    }

    /// Discard all pass state and arm the engine for a new render pass.
    ///
    /// The request handler must call this before starting a pass that reuses
    /// the instance, so no stale section or cursor state leaks across
    /// requests.
    pub fn reset_state(&mut self) {
        self.reset_internal();
        self.active = true;
    }

    /// Transport-initiated cancellation: release any scratch handle and
    /// reset to initial state, all-or-nothing.
    pub fn abort(&mut self) {
        if self.active && self.stats.total_bytes_emitted > 0 {
            tracing::debug!(
                emitted = self.stats.total_bytes_emitted,
                step = ?self.step,
                "render pass aborted mid-stream"
            );
        }
        self.reset_internal();
        self.active = false;
    }

    fn reset_internal(&mut self) {
        self.step = SectionStep::FIRST;
        self.cursor = None;
        self.section_complete = false;
        self.jump = None;
        self.buffer.clear();
        self.stats = RenderStats::default();
        // Dropping the spill state closes and removes the scratch file.
        self.spill = None;
        self.source.reset();
    }

    fn finish_pass(&mut self) {
        tracing::debug!(
            total_bytes = self.stats.total_bytes_emitted,
            max_chunk = self.stats.max_chunk_observed,
            "page fully drained, parking engine until reset"
        );
        self.reset_internal();
        self.active = false;
    }

    /// In-memory delivery: drain, refill from the current section, repeat.
    /// Yields at a section boundary once any bytes have been written, so a
    /// pull never mixes the tail of one section fill with the next.
    fn pull_memory(&mut self, dest: &mut [u8]) -> Result<usize, EngineError> {
        let mut written = 0;
        loop {
            written += self.buffer.drain(&mut dest[written..]);
            if written == dest.len() {
                break;
            }
            // The buffer is now empty and the destination has room.
            if self.section_complete {
                self.advance();
                if written > 0 {
                    break;
                }
                continue;
            }
            if self.step.is_done() {
                break;
            }
            if let Produce::Stalled = self.produce()? {
                break;
            }
        }
        Ok(written)
    }

    fn advance(&mut self) {
        self.section_complete = false;
        self.step = match self.jump.take() {
            Some(target) => target,
            None => self.step.next(),
        };
        tracing::trace!(step = ?self.step, "advanced to next section");
    }

    fn produce(&mut self) -> Result<Produce, EngineError> {
        // A pending cursor (static remainder or installed error fragment)
        // always drains before anything else is produced.
        if self.cursor.is_none() && self.step.kind() == SectionKind::Dynamic {
            return self.produce_dynamic();
        }
        self.produce_static()
    }

    fn produce_static(&mut self) -> Result<Produce, EngineError> {
        if self.cursor.is_none() {
            let content = self.source.static_fragment(self.step);
            if content.is_empty() {
                // Zero-length section: advance in the same call, no wasted
                // pull.
                self.section_complete = true;
                return Ok(Produce::Produced);
            }
            self.cursor = Some(StaticCursor::new(content.into_bytes()));
        }
        if let Some(cursor) = self.cursor.as_mut() {
            // Splitting static content at buffer-capacity boundaries is the
            // one place a fragment may be cut.
            let take = cursor.remaining().min(self.buffer.free());
            let appended = self.buffer.append(cursor.chunk(take));
            debug_assert!(appended, "slice bounded by free space must fit");
            cursor.advance(take);
            let exhausted = cursor.is_exhausted();
            if exhausted {
                self.cursor = None;
                self.section_complete = true;
            }
        }
        Ok(Produce::Produced)
    }

    fn produce_dynamic(&mut self) -> Result<Produce, EngineError> {
        let step = self.step;
        let (outcome, accepted, rejected) = match self.source.renderer_mut(step) {
            None => (None, 0, false),
            Some(renderer) => {
                let mut sink = FragmentSink::new(&mut self.buffer);
                let outcome = renderer.render(&mut sink);
                (Some(outcome), sink.accepted(), sink.was_rejected())
            }
        };
        match outcome {
            None => {
                tracing::warn!(section = ?step, "no renderer attached, emitting error page");
                self.install_error_tail();
                Ok(Produce::Produced)
            }
            Some(Err(err)) => {
                tracing::warn!(section = ?step, error = %err, "section renderer failed, emitting error page");
                self.install_error_tail();
                Ok(Produce::Produced)
            }
            Some(Ok(RenderProgress::Finished)) => {
                if rejected {
                    return Err(EngineError::ContractViolation {
                        section: step,
                        reason: "renderer reported finished after a rejected write",
                    });
                }
                self.section_complete = true;
                Ok(Produce::Produced)
            }
            Some(Ok(RenderProgress::NotFinished)) => {
                if accepted > 0 {
                    Ok(Produce::Produced)
                } else if rejected {
                    // The pending fragment does not fit even an empty
                    // buffer; retrying can never succeed.
                    Err(EngineError::FragmentOverflow {
                        section: step,
                        capacity: self.buffer.capacity(),
                    })
                } else {
                    Ok(Produce::Stalled)
                }
            }
        }
    }

    /// Replace the rest of the page with a deterministic error fragment and
    /// route the machine straight to the terminal step. The client gets a
    /// short, well-formed document instead of a hung or truncated stream.
    fn install_error_tail(&mut self) {
        self.buffer.clear();
        self.cursor = Some(StaticCursor::new(ERROR_FRAGMENT.as_bytes().to_vec()));
        self.jump = Some(SectionStep::Done);
    }

    /// Scratch-file delivery: stage the whole document on the first pull,
    /// then answer subsequent pulls from storage.
    fn pull_spill(&mut self, dest: &mut [u8]) -> Result<usize, EngineError> {
        if self.spill.is_none() {
            let path = match self.scratch.clone() {
                Some(path) => path,
                None => return Ok(0),
            };
            let state = self.stage_document(&path)?;
            self.spill = Some(state);
        }
        let read = match self.spill.as_mut() {
            Some(state) => state.read(dest),
            None => return Ok(0),
        };
        match read {
            Ok(0) => {
                if let Some(mut state) = self.spill.take() {
                    state.remove()?;
                }
                self.finish_pass();
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(err) => Err(err.into()),
        }
    }

    fn stage_document(&mut self, path: &Path) -> Result<SpillState, EngineError> {
        tracing::debug!(path = %path.display(), "staging page through scratch storage");
        let mut state = SpillState::create(path)?;
        let mut chunk = vec![0u8; self.buffer.capacity()];
        loop {
            let n = self.pull_memory(&mut chunk)?;
            if n == 0 {
                if self.step.is_done() {
                    break;
                }
                return Err(EngineError::ContractViolation {
                    section: self.step,
                    reason: "no progress while staging to scratch storage",
                });
            }
            state.write(&chunk[..n])?;
        }
        state.finish_write()?;
        Ok(state)
    }
}
