//! Producer-side contracts: the backpressure sink and the renderer traits.
//!
//! A dynamic section's renderer receives a [`FragmentSink`] lending it the
//! chunk buffer for the duration of a single produce call. The sink enforces
//! the backpressure contract: a fragment is accepted whole or not at all,
//! and once a write has been refused every further write is refused too,
//! so a renderer cannot accidentally interleave partial output.

use crate::buffer::ChunkBuffer;
use crate::error::RenderError;
use crate::section::SectionStep;

/// Progress report from a dynamic-section renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderProgress {
    /// All content for this section has been emitted.
    Finished,
    /// More content remains; the renderer will be called again after the
    /// buffer has drained and must resume where it stopped.
    NotFinished,
}

/// Write access to the chunk buffer, lent to a renderer for one call.
///
/// The sink must not be retained past the renderer's return; the borrow
/// makes that impossible to get wrong.
pub struct FragmentSink<'a> {
    buffer: &'a mut ChunkBuffer,
    accepted: usize,
    rejected: bool,
}

impl<'a> FragmentSink<'a> {
    /// Lend `buffer` to a renderer for one produce call. Mostly useful for
    /// unit-testing renderer implementations; the engine constructs sinks
    /// itself during a render pass.
    pub fn new(buffer: &'a mut ChunkBuffer) -> Self {
        Self {
            buffer,
            accepted: 0,
            rejected: false,
        }
    }

    /// Append a text fragment. See [`FragmentSink::write_bytes`].
    pub fn write(&mut self, fragment: &str) -> bool {
        self.write_bytes(fragment.as_bytes())
    }

    /// Append a fragment atomically.
    ///
    /// Returns `false` the instant the buffer cannot take the entire
    /// fragment. The renderer must then stop producing and report
    /// [`RenderProgress::NotFinished`]; it will be re-invoked with the same
    /// pending item once the buffer has drained. After the first refusal
    /// every subsequent write is refused as well.
    pub fn write_bytes(&mut self, fragment: &[u8]) -> bool {
        if self.rejected {
            return false;
        }
        if fragment.is_empty() {
            return true;
        }
        if self.buffer.append(fragment) {
            self.accepted += fragment.len();
            true
        } else {
            self.rejected = true;
            false
        }
    }

    /// Bytes accepted through this sink so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub(crate) fn was_rejected(&self) -> bool {
        self.rejected
    }
}

/// Renderer driving one dynamic section.
///
/// The renderer owns its own positional state: after returning
/// [`RenderProgress::NotFinished`] it is re-invoked and must continue from
/// the exact point it stopped, with no duplicated and no dropped output.
pub trait SectionRenderer {
    /// Emit as much content as fits, stopping at the first refused write.
    fn render(&mut self, sink: &mut FragmentSink<'_>) -> Result<RenderProgress, RenderError>;

    /// Drop positional state so the next pass starts from the beginning.
    fn reset(&mut self) {}
}

/// Supplies the content of every page section to the engine.
///
/// Static sections are fetched once per pass as a string; dynamic sections
/// hand out a renderer. Returning `None` for a dynamic section means the
/// collaborator is missing, which the engine reports to the client as a
/// deterministic error fragment rather than a silent empty stream.
pub trait PageSource {
    /// Content for a static step. An empty string skips the section.
    fn static_fragment(&self, step: SectionStep) -> String;

    /// Renderer for a dynamic step.
    fn renderer_mut(&mut self, step: SectionStep) -> Option<&mut dyn SectionRenderer>;

    /// Called when a render pass completes or aborts.
    fn reset(&mut self) {}
}
