//! Binary log position bookkeeping.
//!
//! The tracker holds the position where the next segment starts. After each
//! batch the caller reads the server's new position and asks the tracker for
//! the window between the two:
//!
//! ```text
//! start ──batch 1──▶ p1 ──batch 2──▶ p2 ──batch 3──▶ p3
//!       [window 1 )     [window 2 )     [window 3 )
//! ```
//!
//! Windows are contiguous: the stop of window *i* is the start of window
//! *i + 1*. A window is only well defined inside one log file, so a file
//! name change between two reads ends the sequence.

use crate::database::Database;
use crate::error::{BenchError, BenchResult};
use crate::types::{LogPosition, LogWindow};

/// Outcome of advancing the tracker past one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The batch lies inside the tracked file.
    Window(LogWindow),
    /// The server switched files during the batch.
    Rotated {
        /// File that was being tracked.
        from: String,
        /// File the server reports now.
        to: String,
    },
}

/// Tracks the start of the next log segment.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    current: LogPosition,
    segments: u32,
}

impl PositionTracker {
    /// Starts tracking at `position`.
    pub fn new(position: LogPosition) -> Self {
        Self {
            current: position,
            segments: 0,
        }
    }

    /// Starts tracking at the server's current position.
    pub fn start<D: Database>(db: &mut D) -> BenchResult<Self> {
        Ok(Self::new(db.log_position()?))
    }

    /// Position where the next window will start.
    pub fn current(&self) -> &LogPosition {
        &self.current
    }

    /// Number of windows handed out so far.
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Closes the window that ends at `end`.
    ///
    /// On success the tracker moves to `end`. On rotation it stays where it
    /// was, so no window ever spans two files.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::LogRegressed`] if `end` lies before the current
    /// position in the same file.
    pub fn advance(&mut self, end: LogPosition) -> BenchResult<Advance> {
        if end.file != self.current.file {
            return Ok(Advance::Rotated {
                from: self.current.file.clone(),
                to: end.file,
            });
        }
        if end.offset < self.current.offset {
            return Err(BenchError::LogRegressed {
                file: end.file,
                start: self.current.offset,
                stop: end.offset,
            });
        }
        let window = LogWindow {
            file: end.file.clone(),
            start: self.current.offset,
            stop: end.offset,
        };
        self.current = end;
        self.segments += 1;
        Ok(Advance::Window(window))
    }
}
