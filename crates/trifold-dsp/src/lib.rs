//! TriFold DSP library — three-band split, per-band delay/drive/fold
//! chains, and the block engine that ties them together.
//!
//! Pure DSP with no audio framework dependencies.

// Building blocks
pub mod delay;
pub mod drive;
pub mod svf;
pub mod wavefolder;

// Band split and per-band processing
pub mod band_chain;
pub mod crossover;
pub mod mix;

// Control values and the block controller
pub mod controls;
pub mod engine;

pub use band_chain::ChainTopology;
pub use controls::{Band, ControlParams, ControlSnapshot, Param, ParamError};
pub use engine::TriBandEngine;
