//! Fixed-length circular delay line

/// Longest delay accepted, in seconds
pub const MAX_DELAY_SECONDS: f32 = 5.0;

/// Circular delay line whose length is derived from a time and a sample rate
///
/// The length is always at least one sample, so a configured line never
/// passes its input straight through.
#[derive(Debug, Clone, Default)]
pub struct TimeConstDelay {
    samples: Vec<f32>,
    offset: usize,
}

impl TimeConstDelay {
    pub fn new(sample_rate: u32, delay_seconds: f32) -> Self {
        let mut delay = Self::default();
        delay.configure(sample_rate, delay_seconds);
        delay
    }

    /// Resize for `delay_seconds` at `sample_rate` and clear the line
    ///
    /// Non-finite delays count as zero; delays are clamped to
    /// [0, `MAX_DELAY_SECONDS`].
    pub fn configure(&mut self, sample_rate: u32, delay_seconds: f32) {
        let seconds = if delay_seconds.is_finite() {
            delay_seconds.clamp(0.0, MAX_DELAY_SECONDS)
        } else {
            0.0
        };

        let length = if sample_rate > 0 {
            ((f64::from(sample_rate) * f64::from(seconds)) as usize).max(1)
        } else {
            1
        };

        self.samples.clear();
        self.samples.resize(length, 0.0);
        self.offset = 0;
    }

    /// Delay length in samples (0 before the first `configure`)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Zero the contents, keep the length
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.offset = 0;
    }

    /// Push one sample and return the one written `len()` samples ago
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        if self.samples.is_empty() {
            return sample;
        }
        let out = self.samples[self.offset];
        self.samples[self.offset] = sample;
        self.offset += 1;
        if self.offset >= self.samples.len() {
            self.offset = 0;
        }
        out
    }
}
