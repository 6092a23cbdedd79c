//! Control parameter set: schema, lock-free storage, and the pure
//! parameter -> coefficient mappings.
//!
//! A UI or automation thread writes values through [`ControlParams`]; the
//! audio thread calls [`ControlParams::snapshot`] once per block and works
//! from the returned [`ControlSnapshot`] for every sample of that block.

use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;
use thiserror::Error;

pub const PARAM_COUNT: usize = 18;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter id `{0}`")]
    UnknownId(String),
    #[error("invalid value `{value}` for parameter `{id}`")]
    InvalidValue { id: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamKind {
    Bool,
    Float { min: f32, max: f32 },
}

/// Declared range and default of one parameter. Bools are stored as 0.0/1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: f32,
}

impl ParamSpec {
    const fn toggle(id: &'static str, name: &'static str) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Bool,
            default: 0.0,
        }
    }

    const fn float(id: &'static str, name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            id,
            name,
            kind: ParamKind::Float { min, max },
            default,
        }
    }

    /// Amount controls share one range: [0, 0.999], default 0.5.
    const fn amount(id: &'static str, name: &'static str) -> Self {
        Self::float(id, name, 0.0, 0.999, 0.5)
    }

    /// Value range; bools report `(0.0, 1.0)`.
    pub fn range(&self) -> (f32, f32) {
        match self.kind {
            ParamKind::Bool => (0.0, 1.0),
            ParamKind::Float { min, max } => (min, max),
        }
    }

    /// Bring any value into range. Bools snap at 0.5, NaN falls back to the
    /// default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        match self.kind {
            ParamKind::Bool => {
                if value >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParamKind::Float { min, max } => value.clamp(min, max),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    MuteLow,
    MuteMid,
    MuteHigh,
    LowMidFreq,
    MidHighFreq,
    Resonance,
    LowDrive,
    MidDrive,
    HighDrive,
    LowFoldOffset,
    MidFoldOffset,
    HighFoldOffset,
    LowDelayTime,
    MidDelayTime,
    HighDelayTime,
    LowDelayFeedback,
    MidDelayFeedback,
    HighDelayFeedback,
}

impl Param {
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::MuteLow,
        Param::MuteMid,
        Param::MuteHigh,
        Param::LowMidFreq,
        Param::MidHighFreq,
        Param::Resonance,
        Param::LowDrive,
        Param::MidDrive,
        Param::HighDrive,
        Param::LowFoldOffset,
        Param::MidFoldOffset,
        Param::HighFoldOffset,
        Param::LowDelayTime,
        Param::MidDelayTime,
        Param::HighDelayTime,
        Param::LowDelayFeedback,
        Param::MidDelayFeedback,
        Param::HighDelayFeedback,
    ];

    pub const fn spec(self) -> ParamSpec {
        match self {
            Param::MuteLow => ParamSpec::toggle("mute-low", "Mute Low"),
            Param::MuteMid => ParamSpec::toggle("mute-mid", "Mute Mid"),
            Param::MuteHigh => ParamSpec::toggle("mute-high", "Mute High"),
            Param::LowMidFreq => {
                ParamSpec::float("low-mid-freq", "Low/Mid Crossover", 16.0, 799.99, 320.0)
            }
            Param::MidHighFreq => {
                ParamSpec::float("mid-high-freq", "Mid/High Crossover", 800.0, 16000.0, 1600.0)
            }
            Param::Resonance => ParamSpec::float("res", "Resonance", 0.0, 1.0, 0.5),
            Param::LowDrive => ParamSpec::amount("low-band", "Low Drive"),
            Param::MidDrive => ParamSpec::amount("mid-band", "Mid Drive"),
            Param::HighDrive => ParamSpec::amount("high-band", "High Drive"),
            Param::LowFoldOffset => ParamSpec::amount("low-wf-offset", "Low Fold Offset"),
            Param::MidFoldOffset => ParamSpec::amount("mid-wf-offset", "Mid Fold Offset"),
            Param::HighFoldOffset => ParamSpec::amount("high-wf-offset", "High Fold Offset"),
            Param::LowDelayTime => ParamSpec::amount("low-del-time", "Low Delay Time"),
            Param::MidDelayTime => ParamSpec::amount("mid-del-time", "Mid Delay Time"),
            Param::HighDelayTime => ParamSpec::amount("high-del-time", "High Delay Time"),
            Param::LowDelayFeedback => ParamSpec::amount("low-del-fbk", "Low Delay Feedback"),
            Param::MidDelayFeedback => ParamSpec::amount("mid-del-fbk", "Mid Delay Feedback"),
            Param::HighDelayFeedback => ParamSpec::amount("high-del-fbk", "High Delay Feedback"),
        }
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn from_id(id: &str) -> Option<Param> {
        Param::ALL.into_iter().find(|p| p.id() == id)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Index into per-band arrays: 0 = low, 1 = mid, 2 = high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Low, Band::Mid, Band::High];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn mute(self) -> Param {
        [Param::MuteLow, Param::MuteMid, Param::MuteHigh][self.index()]
    }

    pub fn drive(self) -> Param {
        [Param::LowDrive, Param::MidDrive, Param::HighDrive][self.index()]
    }

    pub fn fold_offset(self) -> Param {
        [Param::LowFoldOffset, Param::MidFoldOffset, Param::HighFoldOffset][self.index()]
    }

    pub fn delay_time(self) -> Param {
        [Param::LowDelayTime, Param::MidDelayTime, Param::HighDelayTime][self.index()]
    }

    pub fn delay_feedback(self) -> Param {
        [
            Param::LowDelayFeedback,
            Param::MidDelayFeedback,
            Param::HighDelayFeedback,
        ][self.index()]
    }
}

/// Per-band values of one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandControls {
    pub mute: bool,
    /// Drive amount, also the wavefolder gain
    pub drive: f32,
    pub fold_offset: f32,
    /// Normalized 0..1, see [`delay_time_ms`]
    pub delay_time: f32,
    pub delay_feedback: f32,
}

/// Every control value effective for one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSnapshot {
    pub low_mid_freq: f32,
    pub mid_high_freq: f32,
    pub resonance: f32,
    pub bands: [BandControls; 3],
}

impl ControlSnapshot {
    /// Build a snapshot from any per-parameter reader. `read` is called
    /// exactly once per parameter.
    pub fn from_fn(mut read: impl FnMut(Param) -> f32) -> Self {
        let low_mid_freq = read(Param::LowMidFreq);
        let mid_high_freq = read(Param::MidHighFreq);
        let resonance = read(Param::Resonance);
        let bands = Band::ALL.map(|band| BandControls {
            mute: read(band.mute()) >= 0.5,
            drive: read(band.drive()),
            fold_offset: read(band.fold_offset()),
            delay_time: read(band.delay_time()),
            delay_feedback: read(band.delay_feedback()),
        });
        Self {
            low_mid_freq,
            mid_high_freq,
            resonance,
            bands,
        }
    }

    pub fn band(&self, band: Band) -> &BandControls {
        &self.bands[band.index()]
    }

    pub fn band_mut(&mut self, band: Band) -> &mut BandControls {
        &mut self.bands[band.index()]
    }
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self::from_fn(|p| p.spec().default)
    }
}

/// Lock-free parameter storage: one atomic per parameter, single writer,
/// single reader.
pub struct ControlParams {
    values: [AtomicF32; PARAM_COUNT],
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicF32::new(Param::ALL[i].spec().default)),
        }
    }
}

impl ControlParams {
    /// Store a value, clamped into the parameter's range.
    pub fn set(&self, param: Param, value: f32) {
        self.values[param.index()].store(param.spec().clamp(value), Ordering::Relaxed);
    }

    pub fn get(&self, param: Param) -> f32 {
        self.values[param.index()].load(Ordering::Relaxed)
    }

    pub fn set_by_id(&self, id: &str, value: f32) -> Result<(), ParamError> {
        let param = Param::from_id(id).ok_or_else(|| ParamError::UnknownId(id.to_string()))?;
        self.set(param, value);
        Ok(())
    }

    /// Parse and store a textual value. Bools accept true/false, on/off and
    /// 1/0; floats accept anything `f32` parses.
    pub fn set_str(&self, id: &str, text: &str) -> Result<(), ParamError> {
        let param = Param::from_id(id).ok_or_else(|| ParamError::UnknownId(id.to_string()))?;
        let spec = param.spec();
        let invalid = || ParamError::InvalidValue {
            id: spec.id,
            value: text.to_string(),
        };
        let value = match spec.kind {
            ParamKind::Bool => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => 1.0,
                "false" | "off" | "0" => 0.0,
                _ => return Err(invalid()),
            },
            ParamKind::Float { .. } => text.trim().parse::<f32>().map_err(|_| invalid())?,
        };
        self.set(param, value);
        Ok(())
    }

    pub fn reset_to_defaults(&self) {
        for param in Param::ALL {
            self.set(param, param.spec().default);
        }
    }

    /// One atomic load per parameter.
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot::from_fn(|p| self.get(p))
    }
}

/// Normalized delay time -> milliseconds: 0.1 ms at 0, 30 ms at 1.
pub fn delay_time_ms(normalized: f32) -> f64 {
    0.1 + normalized as f64 * 29.9
}

/// Milliseconds -> samples, never shorter than 0.1 ms.
pub fn delay_ms_to_samples(ms: f64, sample_rate: f64) -> f64 {
    ms.max(0.1) * 0.001 * sample_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_resolve() {
        for param in Param::ALL {
            assert_eq!(Param::from_id(param.id()), Some(param));
        }
        let mut ids: Vec<_> = Param::ALL.iter().map(|p| p.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PARAM_COUNT);
    }

    #[test]
    fn test_all_is_in_declaration_order() {
        for (i, param) in Param::ALL.into_iter().enumerate() {
            assert_eq!(param.index(), i, "{param:?}");
        }
    }

    #[test]
    fn test_defaults_lie_in_range() {
        for param in Param::ALL {
            let spec = param.spec();
            let (min, max) = spec.range();
            assert!(
                (min..=max).contains(&spec.default),
                "{}: {} not in [{min}, {max}]",
                spec.id,
                spec.default
            );
        }
    }

    #[test]
    fn test_default_snapshot_matches_schema() {
        let snap = ControlSnapshot::default();
        assert_eq!(snap.low_mid_freq, 320.0);
        assert_eq!(snap.mid_high_freq, 1600.0);
        assert_eq!(snap.resonance, 0.5);
        for band in snap.bands {
            assert!(!band.mute);
            assert_eq!(band.drive, 0.5);
            assert_eq!(band.fold_offset, 0.5);
            assert_eq!(band.delay_time, 0.5);
            assert_eq!(band.delay_feedback, 0.5);
        }
    }

    #[test]
    fn test_set_clamps_into_range() {
        let params = ControlParams::default();
        params.set(Param::LowMidFreq, 5.0);
        assert_eq!(params.get(Param::LowMidFreq), 16.0);
        params.set(Param::MidHighFreq, 96000.0);
        assert_eq!(params.get(Param::MidHighFreq), 16000.0);
        params.set(Param::HighDrive, 1.0);
        assert_eq!(params.get(Param::HighDrive), 0.999);
        params.set(Param::MuteMid, 0.7);
        assert_eq!(params.get(Param::MuteMid), 1.0);
        params.set(Param::Resonance, f32::NAN);
        assert_eq!(params.get(Param::Resonance), 0.5);
    }

    #[test]
    fn test_set_str_parses_bools_and_floats() {
        let params = ControlParams::default();
        params.set_str("mute-high", "on").unwrap();
        params.set_str("low-del-time", " 0.25 ").unwrap();
        let snap = params.snapshot();
        assert!(snap.band(Band::High).mute);
        assert_eq!(snap.band(Band::Low).delay_time, 0.25);

        params.set_str("mute-high", "FALSE").unwrap();
        assert!(!params.snapshot().band(Band::High).mute);
    }

    #[test]
    fn test_set_str_rejects_bad_input() {
        let params = ControlParams::default();
        assert_eq!(
            params.set_str("gain", "1.0"),
            Err(ParamError::UnknownId("gain".to_string()))
        );
        assert_eq!(
            params.set_str("mute-low", "maybe"),
            Err(ParamError::InvalidValue {
                id: "mute-low",
                value: "maybe".to_string()
            })
        );
        assert!(params.set_str("res", "loud").is_err());
    }

    #[test]
    fn test_snapshot_reads_each_param_once() {
        let mut reads = [0usize; PARAM_COUNT];
        ControlSnapshot::from_fn(|p| {
            reads[p.index()] += 1;
            p.spec().default
        });
        assert!(reads.iter().all(|&n| n == 1), "{reads:?}");
    }

    #[test]
    fn test_reset_to_defaults() {
        let params = ControlParams::default();
        params.set(Param::MidDrive, 0.1);
        params.set(Param::MuteLow, 1.0);
        params.reset_to_defaults();
        assert_eq!(params.snapshot(), ControlSnapshot::default());
    }

    #[test]
    fn test_delay_time_mapping() {
        assert!((delay_time_ms(0.0) - 0.1).abs() < 1e-9);
        assert!((delay_time_ms(0.5) - 15.05).abs() < 1e-6);
        assert!((delay_time_ms(1.0) - 30.0).abs() < 1e-6);
        assert!((delay_ms_to_samples(15.05, 48000.0) - 722.4).abs() < 1e-6);
        // Shorter than 0.1 ms is floored
        assert!((delay_ms_to_samples(0.0, 48000.0) - 4.8).abs() < 1e-9);
    }
}
