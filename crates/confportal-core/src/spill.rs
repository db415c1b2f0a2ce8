//! Durable scratch-file staging for the spill delivery strategy.
//!
//! When memory cannot hold even one buffer's worth of page reliably, the
//! engine stages the entire document through an append-only scratch file
//! and replays it from storage on the response pass. The scratch file is
//! closed and removed on success, on error and on abort: dropping a
//! [`SpillState`] always cleans up whatever is left on disk.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::SpillError;

enum SpillPhase {
    /// First pass: sections are appended to the scratch file.
    Writing(BufWriter<File>),
    /// Second pass: pulls are answered by sequential reads.
    Reading(File),
    /// Handle released.
    Closed,
}

/// One scratch file's lifecycle, from creation through replay to removal.
pub(crate) struct SpillState {
    path: PathBuf,
    phase: SpillPhase,
    removed: bool,
}

impl SpillState {
    /// Create (or truncate) the scratch file and enter the write phase.
    pub(crate) fn create(path: &Path) -> Result<Self, SpillError> {
        let file = File::create(path).map_err(|source| SpillError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            phase: SpillPhase::Writing(BufWriter::new(file)),
            removed: false,
        })
    }

    /// Append produced bytes during the staging pass.
    pub(crate) fn write(&mut self, data: &[u8]) -> Result<(), SpillError> {
        match &mut self.phase {
            SpillPhase::Writing(writer) => {
                writer.write_all(data).map_err(|source| SpillError::Write {
                    path: self.path.clone(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    /// Flush the staging pass and reopen the file for sequential replay.
    pub(crate) fn finish_write(&mut self) -> Result<(), SpillError> {
        if let SpillPhase::Writing(writer) = &mut self.phase {
            writer.flush().map_err(|source| SpillError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        // Drop the writer before reopening.
        self.phase = SpillPhase::Closed;
        let file = File::open(&self.path).map_err(|source| SpillError::Reopen {
            path: self.path.clone(),
            source,
        })?;
        self.phase = SpillPhase::Reading(file);
        Ok(())
    }

    /// Read the next run of bytes during the replay pass. Returns 0 at
    /// end-of-file.
    pub(crate) fn read(&mut self, dest: &mut [u8]) -> Result<usize, SpillError> {
        match &mut self.phase {
            SpillPhase::Reading(file) => file.read(dest).map_err(|source| SpillError::Read {
                path: self.path.clone(),
                source,
            }),
            _ => Ok(0),
        }
    }

    /// Release the handle and delete the scratch file.
    pub(crate) fn remove(&mut self) -> Result<(), SpillError> {
        self.phase = SpillPhase::Closed;
        if self.removed {
            return Ok(());
        }
        std::fs::remove_file(&self.path).map_err(|source| SpillError::Remove {
            path: self.path.clone(),
            source,
        })?;
        self.removed = true;
        Ok(())
    }
}

impl Drop for SpillState {
    fn drop(&mut self) {
        self.phase = SpillPhase::Closed;
        if !self.removed {
            if let Err(err) = std::fs::remove_file(&self.path) {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %err,
                    "could not remove scratch file on drop"
                );
            }
        }
    }
}
