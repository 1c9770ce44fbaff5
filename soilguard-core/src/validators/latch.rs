//! Sticky error flag

/// Latches on the first fault of a run and clears on recovery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultLatch {
    active: bool,
}

impl FaultLatch {
    /// A clear latch
    pub const fn new() -> Self {
        Self { active: false }
    }

    /// Record a fault; `true` only on the clear→set edge
    pub fn raise(&mut self) -> bool {
        let edge = !self.active;
        self.active = true;
        edge
    }

    /// Record a valid reading; `true` if this ended a fault run
    pub fn clear(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }

    /// Whether a fault run is in progress
    pub const fn is_active(&self) -> bool {
        self.active
    }
}
