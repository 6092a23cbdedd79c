//! Band summing with hard per-band mute gates.
//!
//! Gates switch at block boundaries without any crossfade.

/// Sum low + mid + high, skipping muted bands.
#[inline]
pub fn mix(bands: [f64; 3], mutes: [bool; 3]) -> f64 {
    let mut out = 0.0;
    for (sample, muted) in bands.into_iter().zip(mutes) {
        if !muted {
            out += sample;
        }
    }
    out
}
