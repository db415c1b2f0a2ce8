//! Resumable form renderer.
//!
//! Emits parameter groups one fragment at a time through the engine's
//! backpressure sink. The renderer owns its positional cursor: when a write
//! is refused it stops, and the next invocation resumes at exactly the
//! fragment that did not fit.

use confportal_core::{FragmentSink, RenderError, RenderProgress, SectionRenderer};

use crate::params::ParameterGroup;

/// Position inside the group list: `item` 0 is the fieldset opener, then
/// one item per parameter row, then the fieldset closer.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    group: usize,
    item: usize,
}

/// Streams a list of parameter groups as form rows.
#[derive(Debug, Default)]
pub struct GroupRenderer {
    groups: Vec<ParameterGroup>,
    cursor: Cursor,
}

impl GroupRenderer {
    pub fn new(groups: Vec<ParameterGroup>) -> Self {
        Self {
            groups,
            cursor: Cursor::default(),
        }
    }

    pub fn groups(&self) -> &[ParameterGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut Vec<ParameterGroup> {
        &mut self.groups
    }

    fn fragment_at(&self, cursor: Cursor) -> String {
        let group = &self.groups[cursor.group];
        if cursor.item == 0 {
            group.open_html()
        } else if cursor.item <= group.params.len() {
            group.params[cursor.item - 1].render_row()
        } else {
            group.close_html()
        }
    }
}

impl SectionRenderer for GroupRenderer {
    fn render(&mut self, sink: &mut FragmentSink<'_>) -> Result<RenderProgress, RenderError> {
        while self.cursor.group < self.groups.len() {
            let items = self.groups[self.cursor.group].params.len() + 2;
            while self.cursor.item < items {
                let fragment = self.fragment_at(self.cursor);
                if !sink.write(&fragment) {
                    return Ok(RenderProgress::NotFinished);
                }
                self.cursor.item += 1;
            }
            self.cursor.group += 1;
            self.cursor.item = 0;
        }
        Ok(RenderProgress::Finished)
    }

    fn reset(&mut self) {
        self.cursor = Cursor::default();
    }
}
