//! Progress tracking for a single load call.

use tracing::debug;

/// Discrete stages a load passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Options applied, nothing resolved yet.
    Created,
    /// Field tags turned into path bindings.
    Resolved,
    /// Every provider partition fetched.
    Fetched,
    /// Required bindings confirmed to have values.
    Validated,
    /// Raw values written into the destination fields.
    Coerced,
    /// Load returned successfully.
    Done,
    /// Load aborted with an error.
    Failed,
}

impl LoadPhase {
    /// Returns the phase reached on success from this one, if any.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Resolved),
            Self::Resolved => Some(Self::Fetched),
            Self::Fetched => Some(Self::Validated),
            Self::Validated => Some(Self::Coerced),
            Self::Coerced => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Returns `true` once the load has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Phase tracker owned by one load call.
#[derive(Debug, Clone, Copy)]
pub struct LoadProgress {
    phase: LoadPhase,
}

impl Default for LoadProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadProgress {
    /// Starts tracking in [`LoadPhase::Created`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: LoadPhase::Created,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Moves to the next phase. Terminal phases are sticky.
    pub fn advance(&mut self) -> LoadPhase {
        if let Some(next) = self.phase.successor() {
            debug!(from = ?self.phase, to = ?next, "load phase transition");
            self.phase = next;
        }
        self.phase
    }

    /// Marks the load as failed. Has no effect once terminal.
    pub fn fail(&mut self) -> LoadPhase {
        if !self.phase.is_terminal() {
            debug!(from = ?self.phase, "load failed");
            self.phase = LoadPhase::Failed;
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_phase_to_done() {
        let mut progress = LoadProgress::new();
        assert_eq!(progress.phase(), LoadPhase::Created);

        let visited: Vec<LoadPhase> = (0..5).map(|_| progress.advance()).collect();
        assert_eq!(
            visited,
            vec![
                LoadPhase::Resolved,
                LoadPhase::Fetched,
                LoadPhase::Validated,
                LoadPhase::Coerced,
                LoadPhase::Done,
            ]
        );
        assert!(progress.phase().is_terminal());
        assert_eq!(progress.advance(), LoadPhase::Done);
    }

    #[test]
    fn failure_is_reachable_from_any_running_phase() {
        let mut progress = LoadProgress::new();
        progress.advance();
        progress.advance();
        assert_eq!(progress.fail(), LoadPhase::Failed);
        assert_eq!(progress.advance(), LoadPhase::Failed);
    }

    #[test]
    fn done_cannot_fail() {
        let mut progress = LoadProgress::new();
        while !progress.phase().is_terminal() {
            progress.advance();
        }
        assert_eq!(progress.fail(), LoadPhase::Done);
    }
}
