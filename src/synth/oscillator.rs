// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Band-limited oscillator using polynomial band-limited steps (polyBLEP).

use std::f64::consts::PI;

use crate::wave::SampleRate;

/// Position within one period of a wave, always in `[0, 1)`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Phase(f64);

impl Phase {
    pub const ZERO: Phase = Phase(0.0);

    /// Fold an arbitrary offset into a single period.
    /// Offsets that are not finite map to the start of the period.
    ///
    /// # Example
    ///
    /// ```
    /// # use syn_blep::synth::oscillator::*;
    /// assert_eq!(Phase::new(0.25).offset(), 0.25);
    /// assert_eq!(Phase::new(2.5).offset(), 0.5);
    /// assert_eq!(Phase::new(-0.25).offset(), 0.75);
    /// assert_eq!(Phase::new(f64::NAN).offset(), 0.0);
    /// ```
    pub fn new(mut offset: f64) -> Phase {
        if !offset.is_finite() {
            return Phase::ZERO;
        }
        if offset >= 1.0 || offset < 0.0 {
            offset -= offset.floor();
        }
        // Tiny negative offsets round up to exactly one.
        if offset >= 1.0 {
            offset = 0.0;
        }
        Phase(offset)
    }

    pub fn offset(self) -> f64 {
        self.0
    }

    pub fn step(self, amount: f64) -> Phase {
        Phase::new(self.0 + amount)
    }
}

/// Wave shapes the oscillator can produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    /// Leaky integration of the band-limited square.
    Triangle,
}

impl std::str::FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" => Ok(Waveform::Sine),
            "saw" => Ok(Waveform::Saw),
            "square" => Ok(Waveform::Square),
            "triangle" => Ok(Waveform::Triangle),
            other => Err(format!("unknown waveform {:?}", other)),
        }
    }
}

/// Correction for a unit step at phase zero, for a wave advancing by `dt` per sample.
///
/// Non-zero only within one sample on either side of the step.
///
/// # Example
///
/// ```
/// # use syn_blep::synth::oscillator::*;
/// assert_eq!(poly_blep(0.0, 0.1), -1.0);
/// assert_eq!(poly_blep(0.5, 0.1), 0.0);
/// assert!(poly_blep(0.95, 0.1) > 0.0);
/// ```
pub fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

/// An oscillator producing one band-limited sample per call to [`BandLimitedOscillator::generate`].
///
/// Frequency, phase offset and sample rate are supplied with every sample, so they can be
/// modulated freely. The output is not clamped and may overshoot `[-1, 1]` slightly
/// right after a discontinuity.
///
/// # Example
///
/// ```
/// use syn_blep::synth::oscillator::*;
/// use syn_blep::wave::SampleRate;
///
/// let rate = SampleRate::new(8.0).unwrap();
/// let mut osc = BandLimitedOscillator::new(Waveform::Sine);
/// assert_eq!(osc.generate(1.0, 0.0, rate), 0.0);
/// assert!((osc.generate(1.0, 0.0, rate) - 0.5f64.sqrt()).abs() < 1e-12);
/// assert!((osc.generate(1.0, 0.0, rate) - 1.0).abs() < 1e-12);
/// assert_eq!(osc.phase().offset(), 0.375);
/// ```
#[derive(Debug, Clone)]
pub struct BandLimitedOscillator {
    mode: Waveform,
    phase: Phase,
    /// State of the integrator turning the square into a triangle.
    last_output: f64,
}

impl BandLimitedOscillator {
    pub fn new(mode: Waveform) -> Self {
        Self {
            mode,
            phase: Phase::ZERO,
            last_output: 0.0,
        }
    }

    pub fn mode(&self) -> Waveform {
        self.mode
    }

    /// Switch the wave shape without resetting the phase.
    pub fn set_mode(&mut self, mode: Waveform) {
        self.mode = mode;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Restart at the beginning of the period with a discharged integrator.
    pub fn reset(&mut self) {
        self.phase = Phase::ZERO;
        self.last_output = 0.0;
    }

    /// Compute the sample at the current phase shifted by `phase_offset` periods,
    /// then advance by one sample of `frequency`.
    /// Negative frequencies run at the same speed as positive ones.
    pub fn generate(&mut self, frequency: f64, phase_offset: f64, sample_rate: SampleRate) -> f64 {
        let dt = sample_rate.phase_increment(frequency);
        let t = self.phase.step(phase_offset).offset();

        let mut v = match self.mode {
            Waveform::Sine => (t * 2.0 * PI).sin(),
            Waveform::Saw => 2.0 * t - 1.0 - poly_blep(t, dt),
            Waveform::Square | Waveform::Triangle => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 0.5) % 1.0, dt)
            }
        };

        if self.mode == Waveform::Triangle {
            v = dt * v + (1.0 - dt) * self.last_output;
            self.last_output = v;
            v *= 2.0;
        }

        self.phase = self.phase.step(dt);
        v
    }

    /// Fill the buffer with consecutive samples at a fixed frequency.
    pub fn render(
        &mut self,
        frequency: f64,
        phase_offset: f64,
        sample_rate: SampleRate,
        output: &mut [f64],
    ) {
        for sample in output.iter_mut() {
            *sample = self.generate(frequency, phase_offset, sample_rate);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use expect_test::{expect, Expect};

    fn rate(hz: f64) -> SampleRate {
        SampleRate::new(hz).unwrap()
    }

    fn first_samples(mode: Waveform, count: usize) -> Vec<f64> {
        let mut osc = BandLimitedOscillator::new(mode);
        let mut buffer = vec![0.0; count];
        osc.render(5000.0, 0.0, rate(44100.0), &mut buffer);
        buffer
    }

    fn check(mode: Waveform, expect: Expect) {
        let actual = first_samples(mode, 10)
            .iter()
            .map(|v| format!("{:.6}", v))
            .collect::<Vec<_>>()
            .join(" ");
        expect.assert_eq(&actual);
    }

    /// Naive wave evaluated at the same phases the oscillator visits.
    fn naive_samples(mode: Waveform, count: usize) -> Vec<f64> {
        let dt = 5000.0 / 44100.0;
        let mut phase = Phase::ZERO;
        (0..count)
            .map(|_| {
                let t = phase.offset();
                phase = phase.step(dt);
                match mode {
                    Waveform::Saw => 2.0 * t - 1.0,
                    _ => {
                        if t < 0.5 {
                            1.0
                        } else {
                            -1.0
                        }
                    }
                }
            })
            .collect()
    }

    fn max_jump(samples: &[f64]) -> f64 {
        samples
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn reference_samples() {
        check(
            Waveform::Saw,
            expect![[
                r#"0.000000 -0.773243 -0.546485 -0.319728 -0.092971 0.133787 0.360544 0.587302 0.781659 -0.286784"#
            ]],
        );
        check(
            Waveform::Square,
            expect![[
                r#"0.000000 1.000000 1.000000 1.000000 0.651900 -0.831900 -1.000000 -1.000000 -0.967600 0.327600"#
            ]],
        );
        check(
            Waveform::Triangle,
            expect![[
                r#"0.000000 0.226757 0.427805 0.606059 0.685168 0.418845 0.144599 -0.098553 -0.306789 -0.197720"#
            ]],
        );
        check(
            Waveform::Sine,
            expect![[
                r#"0.000000 0.653636 0.989355 0.843870 0.287940 -0.408038 -0.905554 -0.962624 -0.551491 0.127877"#
            ]],
        );
    }

    #[test]
    fn corrected_steps_are_smaller_than_naive() {
        for &mode in &[Waveform::Saw, Waveform::Square] {
            let corrected = first_samples(mode, 40);
            let naive = naive_samples(mode, 40);
            assert!(
                max_jump(&corrected) < max_jump(&naive),
                "{:?}: {} >= {}",
                mode,
                max_jump(&corrected),
                max_jump(&naive)
            );
        }
    }

    #[test]
    fn phase_stays_in_period() {
        for &mode in &[Waveform::Sine, Waveform::Saw, Waveform::Square, Waveform::Triangle] {
            for &frequency in &[0.0, 1.0, 440.0, -440.0, 22050.0, 44100.0, 100_000.0, 1e-300] {
                for &offset in &[0.0, 0.5, -0.3, 1.0, 7.25, -1e-20, -123.456, f64::NAN] {
                    for &hz in &[1.0, 8000.0, 44100.0, 192_000.0] {
                        let mut osc = BandLimitedOscillator::new(mode);
                        for _ in 0..64 {
                            osc.generate(frequency, offset, rate(hz));
                            let phase = osc.phase().offset();
                            assert!((0.0..1.0).contains(&phase), "phase {}", phase);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn sine_returns_after_one_period() {
        let mut osc = BandLimitedOscillator::new(Waveform::Sine);
        let start = osc.generate(441.0, 0.0, rate(44100.0));
        for _ in 1..100 {
            osc.generate(441.0, 0.0, rate(44100.0));
        }
        let phase = osc.phase().offset();
        assert!(phase < 1e-9 || phase > 1.0 - 1e-9);
        let again = osc.generate(441.0, 0.0, rate(44100.0));
        assert!((again - start).abs() < 1e-9);
    }

    #[test]
    fn offset_shifts_the_wave() {
        let mut plain = BandLimitedOscillator::new(Waveform::Sine);
        let mut shifted = BandLimitedOscillator::new(Waveform::Sine);
        plain.generate(1000.0, 0.0, rate(48000.0));
        let a = plain.generate(1000.0, 0.25, rate(48000.0));
        let b = shifted.generate(1000.0, 1000.0 / 48000.0 + 1.25, rate(48000.0));
        assert!((a - b).abs() < 1e-9);
        // The offset does not accumulate into the phase.
        shifted.generate(1000.0, 0.0, rate(48000.0));
        assert_eq!(plain.phase(), shifted.phase());
    }
}
