//! Resize debouncing.
//!
//! Window resizes arrive in bursts while the user drags a window edge. The
//! debouncer applies the first size at once, then waits for the size to stay
//! put for a quiet window before reporting the next one.

/// Default quiet window in milliseconds.
pub const DEFAULT_QUIET_MS: f64 = 16.0;

/// Surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSize {
    pub width: f64,
    pub height: f64,
}

/// Coalesces bursts of size observations into occasional updates.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet_ms: f64,
    applied: Option<PendingSize>,
    pending: Option<(PendingSize, f64)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_MS)
    }
}

impl ResizeDebouncer {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms: quiet_ms.max(0.0),
            applied: None,
            pending: None,
        }
    }

    /// The size most recently reported to the caller.
    #[cfg(test)]
    pub fn applied(&self) -> Option<PendingSize> {
        self.applied
    }

    /// Whether a size is waiting for the quiet window to pass.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the current surface size.
    ///
    /// Returns a size to apply now: the very first observation, or a pending
    /// size whose quiet window has elapsed.
    pub fn observe(&mut self, width: f64, height: f64, now_ms: f64) -> Option<PendingSize> {
        let size = PendingSize { width, height };

        let Some(applied) = self.applied else {
            self.applied = Some(size);
            return Some(size);
        };

        match self.pending {
            Some((pending, since)) if pending == size => {
                if now_ms - since >= self.quiet_ms {
                    self.pending = None;
                    self.applied = Some(size);
                    log::trace!("Applying debounced size {}x{}", width, height);
                    return Some(size);
                }
                None
            }
            _ if size == applied => {
                // Bounced back to the applied size
                self.pending = None;
                None
            }
            _ => {
                self.pending = Some((size, now_ms));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_size_applies_immediately() {
        let mut debouncer = ResizeDebouncer::default();
        let applied = debouncer.observe(800.0, 600.0, 0.0);
        assert_eq!(
            applied,
            Some(PendingSize {
                width: 800.0,
                height: 600.0
            })
        );
        assert_eq!(debouncer.observe(800.0, 600.0, 1.0), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_burst_is_coalesced() {
        let mut debouncer = ResizeDebouncer::default();
        debouncer.observe(800.0, 600.0, 0.0);

        assert_eq!(debouncer.observe(810.0, 600.0, 100.0), None);
        assert_eq!(debouncer.observe(820.0, 600.0, 105.0), None);
        assert_eq!(debouncer.observe(830.0, 600.0, 110.0), None);
        assert!(debouncer.is_pending());

        // Still inside the quiet window
        assert_eq!(debouncer.observe(830.0, 600.0, 120.0), None);

        let applied = debouncer.observe(830.0, 600.0, 126.0);
        assert_eq!(applied.map(|s| s.width), Some(830.0));
        assert_eq!(debouncer.applied().map(|s| s.width), Some(830.0));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_return_to_applied_size_cancels_pending() {
        let mut debouncer = ResizeDebouncer::default();
        debouncer.observe(800.0, 600.0, 0.0);
        debouncer.observe(900.0, 600.0, 10.0);
        assert!(debouncer.is_pending());

        assert_eq!(debouncer.observe(800.0, 600.0, 12.0), None);
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.observe(800.0, 600.0, 100.0), None);
    }

    #[test]
    fn test_zero_quiet_window() {
        let mut debouncer = ResizeDebouncer::new(-5.0);
        debouncer.observe(800.0, 600.0, 0.0);
        assert_eq!(debouncer.observe(700.0, 600.0, 1.0), None);
        assert!(debouncer.observe(700.0, 600.0, 1.0).is_some());
    }
}
