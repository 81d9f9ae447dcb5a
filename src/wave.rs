// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

use crate::synth::ConfigError;

/// Number of samples per second, guaranteed to be finite and positive.
///
/// # Example
///
/// ```
/// # use syn_blep::wave::*;
/// let rate = SampleRate::new(44100.0).unwrap();
/// assert_eq!(rate.hz(), 44100.0);
/// assert_eq!(rate.samples(0.5), 22050);
///
/// assert!(SampleRate::new(0.0).is_err());
/// assert!(SampleRate::new(f64::NAN).is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct SampleRate(f64);

impl SampleRate {
    pub fn new(rate: f64) -> Result<SampleRate, ConfigError> {
        if rate.is_finite() && rate > 0.0 {
            Ok(SampleRate(rate))
        } else {
            Err(ConfigError::InvalidSampleRate { rate })
        }
    }

    pub fn hz(self) -> f64 {
        self.0
    }

    /// Number of whole samples covering `seconds`, rounded to the nearest sample.
    /// Negative durations count as zero.
    pub fn samples(self, seconds: f64) -> usize {
        (seconds * self.0).round().max(0.0) as usize
    }

    /// Phase increment per sample for a wave of the given frequency.
    pub fn phase_increment(self, frequency: f64) -> f64 {
        frequency.abs() / self.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        SampleRate(44100.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_non_positive_rates() {
        assert_eq!(
            SampleRate::new(-1.0),
            Err(ConfigError::InvalidSampleRate { rate: -1.0 })
        );
        assert!(SampleRate::new(f64::INFINITY).is_err());
        assert!(SampleRate::new(1.0).is_ok());
    }

    #[test]
    fn phase_increment_ignores_sign() {
        let rate = SampleRate::new(1000.0).unwrap();
        assert_eq!(rate.phase_increment(250.0), 0.25);
        assert_eq!(rate.phase_increment(-250.0), 0.25);
    }
}
