//! Low-latency jitter filter for per-frame rotation deltas.
//!
//! Each sample is converted to a rate, averaged with the last `window`
//! rates, and the average is blended 50/50 with the newest rate. The blend
//! keeps more of the current motion than a plain moving average would.

/// Moving-average smoother over a fixed-capacity ring of recent rates.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    samples: Box<[f32]>,
    /// Number of valid entries, never above `samples.len()`.
    len: usize,
    /// Slot the next rate is written to.
    next: usize,
}

impl SmoothingFilter {
    /// Create a filter averaging the last `window` rates. A zero window is
    /// treated as 1.
    pub fn new(window: usize) -> Self {
        Self {
            samples: vec![0.0; window.max(1)].into_boxed_slice(),
            len: 0,
            next: 0,
        }
    }

    /// Feed one per-frame delta covering `dt` seconds and return the smoothed delta.
    ///
    /// Non-positive or non-finite input is not recorded and yields `0.0`.
    pub fn observe(&mut self, value: f32, dt: f32) -> f32 {
        if !(dt > 0.0 && dt.is_finite() && value.is_finite()) {
            tracing::trace!(value, dt, "Skipping unusable smoothing sample");
            return 0.0;
        }

        let rate = value / dt;
        self.push(rate);

        let mean = self.samples[..self.len].iter().sum::<f32>() / self.len as f32;
        (rate + mean) / 2.0 * dt
    }

    fn push(&mut self, rate: f32) {
        // Overwrites the oldest entry once the ring is full.
        self.samples[self.next] = rate;
        self.next = (self.next + 1) % self.samples.len();
        self.len = (self.len + 1).min(self.samples.len());
    }

    /// Change the window size. History is discarded.
    pub fn resize(&mut self, window: usize) {
        *self = Self::new(window);
    }

    pub fn window(&self) -> usize {
        self.samples.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(4)
    }
}
