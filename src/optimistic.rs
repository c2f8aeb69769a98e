// SPDX-License-Identifier: MPL-2.0

//! Optimistic local state for counters and flags.
//!
//! The displayed value changes as soon as the user acts. The backend call
//! then either commits it or rolls it back to the value from before the
//! action. Server snapshots that arrive while a mutation is in flight are
//! held back so they cannot overwrite the optimistic value.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<T> {
    Idle,
    Pending { previous: T },
    Committed,
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct Optimistic<T: Clone> {
    value: T,
    phase: Phase<T>,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            phase: Phase::Idle,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    /// Show `value` now. A second `begin` while pending keeps the oldest
    /// confirmed value as the rollback target.
    pub fn begin(&mut self, value: T) {
        let previous = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Pending { previous } => previous,
            _ => self.value.clone(),
        };
        self.phase = Phase::Pending { previous };
        self.value = value;
    }

    pub fn commit(&mut self) {
        if self.is_pending() {
            self.phase = Phase::Committed;
        }
    }

    /// Restore the value from before the pending mutation.
    pub fn rollback(&mut self) {
        if let Phase::Pending { previous } = std::mem::replace(&mut self.phase, Phase::RolledBack)
        {
            self.value = previous;
        } else {
            self.phase = Phase::RolledBack;
        }
    }

    /// Apply a server snapshot unless a mutation is still pending.
    pub fn reconcile(&mut self, server: T) -> bool {
        if self.is_pending() {
            return false;
        }
        self.value = server;
        true
    }
}

/// State behind a like, repost or follow button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleState {
    pub active: bool,
    pub count: u32,
}

impl ToggleState {
    pub fn new(active: bool, count: u32) -> Self {
        Self { active, count }
    }

    /// The state after the user presses the button.
    pub fn toggled(self) -> Self {
        if self.active {
            Self {
                active: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                active: true,
                count: self.count + 1,
            }
        }
    }
}
