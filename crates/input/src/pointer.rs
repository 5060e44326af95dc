/// Turns absolute pointer positions into per-sample deltas.
///
/// The first sample after construction or [`PointerTracker::reset`] only seeds
/// the last position, so a freshly captured pointer never snaps the camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    last: Option<(f64, f64)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last position; the next sample seeds again.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn is_seeded(&self) -> bool {
        self.last.is_some()
    }

    /// Feed a position and get the delta `(dx, dy)` since the previous sample.
    pub fn sample(&mut self, x: f64, y: f64) -> (f32, f32) {
        let delta = match self.last {
            Some((lx, ly)) => ((x - lx) as f32, (y - ly) as f32),
            None => {
                tracing::trace!(x, y, "pointer tracker seeded");
                (0.0, 0.0)
            }
        };
        self.last = Some((x, y));
        delta
    }
}

/// Unbounded pointer position accumulated from raw device motion.
///
/// Captured cursors stop producing window positions at the screen edge; raw
/// motion keeps flowing, so it is summed here and fed to a [`PointerTracker`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualPointer {
    x: f64,
    y: f64,
}

impl VirtualPointer {
    pub fn accumulate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_without_delta() {
        let mut tracker = PointerTracker::new();
        assert!(!tracker.is_seeded());
        assert_eq!(tracker.sample(640.0, 360.0), (0.0, 0.0));
        assert!(tracker.is_seeded());
        assert_eq!(tracker.sample(650.0, 355.0), (10.0, -5.0));
    }

    #[test]
    fn reset_reseeds_on_next_sample() {
        let mut tracker = PointerTracker::new();
        tracker.sample(0.0, 0.0);
        tracker.sample(5.0, 5.0);
        tracker.reset();
        assert_eq!(tracker.sample(900.0, -40.0), (0.0, 0.0));
        assert_eq!(tracker.sample(901.0, -40.0), (1.0, 0.0));
    }

    #[test]
    fn virtual_pointer_sums_motion() {
        let mut pointer = VirtualPointer::default();
        pointer.accumulate(3.0, -1.0);
        pointer.accumulate(-0.5, 4.0);
        assert_eq!(pointer.position(), (2.5, 3.0));
    }

    #[test]
    fn repeated_identical_samples_are_still() {
        let mut tracker = PointerTracker::new();
        let mut pointer = VirtualPointer::default();
        tracker.sample(pointer.position().0, pointer.position().1);
        pointer.accumulate(0.0, 0.0);
        let (x, y) = pointer.position();
        assert_eq!(tracker.sample(x, y), (0.0, 0.0));
    }
}
