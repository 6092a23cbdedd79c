//! Fractional delay line — fixed-capacity circular buffer with linear
//! interpolation between adjacent samples.
//!
//! `write` pushes one sample and advances the cursor; `read` returns the
//! sample `delay` steps behind the newest one. Changing the delay length
//! never clears the buffer, so automating it sweeps through old content.

/// Longest delay the band chains are sized for.
pub const MAX_DELAY_MS: f64 = 30.0;

pub struct DelayLine {
    buffer: Vec<f64>,
    write_pos: usize,
    delay_int: usize,
    delay_frac: f64,
}

impl DelayLine {
    /// Delay line holding `capacity` samples (at least 2).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(2)],
            write_pos: 0,
            delay_int: 0,
            delay_frac: 0.0,
        }
    }

    /// Delay line long enough for `max_ms` at `sample_rate`, plus two guard
    /// samples for interpolation.
    pub fn with_max_ms(max_ms: f64, sample_rate: f64) -> Self {
        let samples = (max_ms * 0.001 * sample_rate).ceil().max(0.0) as usize;
        Self::new(samples + 2)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Set the delay length in samples, clamped to `[0, capacity - 1]`.
    pub fn set_delay(&mut self, samples: f64) {
        let max = (self.buffer.len() - 1) as f64;
        // max/min rather than clamp: NaN collapses to 0
        let delay = samples.max(0.0).min(max);
        self.delay_int = delay as usize;
        self.delay_frac = delay - self.delay_int as f64;
    }

    /// Current delay length in samples.
    pub fn delay(&self) -> f64 {
        self.delay_int as f64 + self.delay_frac
    }

    pub fn write(&mut self, sample: f64) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    pub fn read(&self) -> f64 {
        let len = self.buffer.len();
        // write_pos - 1 is the newest sample
        let a = self.buffer[(self.write_pos + len - 1 - self.delay_int) % len];
        let b = self.buffer[(self.write_pos + 2 * len - 2 - self.delay_int) % len];
        a + (b - a) * self.delay_frac
    }

    /// Write then read: one sample through the delay.
    pub fn process(&mut self, sample: f64) -> f64 {
        self.write(sample);
        self.read()
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_arrives_after_delay() {
        let mut line = DelayLine::new(64);
        line.set_delay(10.0);

        let mut out = Vec::new();
        out.push(line.process(1.0));
        for _ in 0..20 {
            out.push(line.process(0.0));
        }

        for (i, &y) in out.iter().enumerate() {
            let expected = if i == 10 { 1.0 } else { 0.0 };
            assert_eq!(y, expected, "sample {i}");
        }
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let mut line = DelayLine::new(64);
        line.set_delay(3.25);

        let mut out = Vec::new();
        out.push(line.process(1.0));
        for _ in 0..8 {
            out.push(line.process(0.0));
        }

        assert!((out[3] - 0.75).abs() < 1e-12, "out[3] = {}", out[3]);
        assert!((out[4] - 0.25).abs() < 1e-12, "out[4] = {}", out[4]);
        let rest: f64 = out
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 3 && *i != 4)
            .map(|(_, y)| y.abs())
            .sum();
        assert_eq!(rest, 0.0);
    }

    #[test]
    fn test_delay_clamped_to_capacity() {
        let mut line = DelayLine::new(16);
        line.set_delay(1000.0);
        assert_eq!(line.delay(), 15.0);
        line.set_delay(-3.0);
        assert_eq!(line.delay(), 0.0);
        line.set_delay(f64::NAN);
        assert_eq!(line.delay(), 0.0);
    }

    #[test]
    fn test_longest_delay_reads_oldest_sample() {
        let mut line = DelayLine::new(16);
        line.set_delay(15.0);
        let mut out = Vec::new();
        out.push(line.process(1.0));
        for _ in 0..20 {
            out.push(line.process(0.0));
        }
        assert_eq!(out[15], 1.0);
        assert_eq!(out.iter().filter(|y| **y != 0.0).count(), 1);
    }

    #[test]
    fn test_capacity_covers_max_delay() {
        let line = DelayLine::with_max_ms(MAX_DELAY_MS, 48000.0);
        assert!((1442..=1443).contains(&line.capacity()), "{}", line.capacity());
        let line = DelayLine::with_max_ms(MAX_DELAY_MS, 96000.0);
        assert!(line.capacity() as f64 > MAX_DELAY_MS * 0.001 * 96000.0);
    }

    #[test]
    fn test_length_change_keeps_contents() {
        let mut line = DelayLine::new(32);
        line.set_delay(8.0);
        line.process(1.0);
        for _ in 0..3 {
            line.process(0.0);
        }
        // Impulse is now 3 samples old; shorten the delay onto it
        line.set_delay(4.0);
        assert_eq!(line.process(0.0), 1.0);
    }

    #[test]
    fn test_reset_clears_buffer() {
        let mut line = DelayLine::new(8);
        line.set_delay(2.0);
        for _ in 0..8 {
            line.process(1.0);
        }
        line.reset();
        assert_eq!(line.process(0.0), 0.0);
        assert_eq!(line.delay(), 2.0);
    }
}
