//! Deferred cursor relocation
//!
//! A rebuild never moves the cursor itself. It schedules the target offset
//! here and the host applies it at the start of its next frame, replacing the
//! selection with a collapsed one at that offset.

/// Single-slot relocation queue; a newer request replaces a pending one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorSnap {
    pending: Option<usize>,
}

impl CursorSnap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a move to `offset` on the next frame
    pub fn schedule(&mut self, offset: usize) {
        if let Some(previous) = self.pending.replace(offset) {
            tracing::trace!("cursor snap to {} superseded by {}", previous, offset);
        }
    }

    /// Drain the pending relocation, if any
    pub fn take(&mut self) -> Option<usize> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
