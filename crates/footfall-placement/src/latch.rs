/// One-shot flag set when the animation system has written this frame's
/// pose and cleared when the placement tick consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoseLatch {
    ready: bool,
}

impl PoseLatch {
    #[must_use]
    pub const fn new() -> Self {
        Self { ready: false }
    }

    /// Mark the pose ready. Repeated notifications before a tick collapse
    /// into one.
    pub fn notify(&mut self) {
        self.ready = true;
    }

    /// Consume the flag, returning whether it was set.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.ready)
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.ready
    }
}
