// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This namespace contains the per-sample signal generators.
//!
//! Every generator is advanced by calling it exactly once per output sample.
//! Configuration is validated up front, after which generating a sample never fails.

pub mod envelope;
pub mod oscillator;

use std::fmt;

use snafu::Snafu;

pub use envelope::{EnvelopeGenerator, EnvelopeParams, EnvelopeState};
pub use oscillator::{BandLimitedOscillator, Waveform};

/// The configurable parts of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Attack,
    Decay,
    Sustain,
    Release,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Segment::Attack => "attack",
            Segment::Decay => "decay",
            Segment::Sustain => "sustain",
            Segment::Release => "release",
        };
        f.write_str(name)
    }
}

#[derive(Debug, PartialEq, Snafu)]
pub enum ConfigError {
    #[snafu(display("The {} segment must last at least one sample, got {}", segment, samples))]
    InvalidDuration { segment: Segment, samples: usize },
    #[snafu(display("The {} shape must be a positive exponent, got {}", segment, shape))]
    InvalidShape { segment: Segment, shape: f64 },
    #[snafu(display("The decay level must lie between 0 and 1, got {}", level))]
    InvalidLevel { level: f64 },
    #[snafu(display("The sample rate must be positive, got {}", rate))]
    InvalidSampleRate { rate: f64 },
}
