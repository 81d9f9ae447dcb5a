// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Sample-exact Attack-Decay-Sustain-Release envelope driven by a gate signal.

use log::{debug, trace};
use snafu::ensure;

use super::{ConfigError, InvalidDuration, InvalidLevel, InvalidShape, Segment};

/// The phase an envelope is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    /// No note is playing. This is where every envelope starts and ends.
    Idle,
    /// Rising towards full amplitude.
    Attack,
    /// Falling towards the decay level.
    Decay,
    /// Holding the decay level.
    Sustain,
    /// Falling towards silence.
    Release,
}

impl EnvelopeState {
    /// The state entered when the segment of this state runs out.
    pub fn next(self) -> EnvelopeState {
        match self {
            EnvelopeState::Idle => EnvelopeState::Idle,
            EnvelopeState::Attack => EnvelopeState::Decay,
            EnvelopeState::Decay => EnvelopeState::Sustain,
            EnvelopeState::Sustain => EnvelopeState::Release,
            EnvelopeState::Release => EnvelopeState::Idle,
        }
    }
}

/// Configuration of an envelope. Durations are measured in samples.
///
/// The shapes are exponents applied to the linear progress through a segment:
/// `1.0` gives a straight line, smaller values rise quickly and then flatten,
/// larger values start slowly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    /// When set, the envelope holds in sustain until it is gated off.
    /// Otherwise the sustain lasts `sustain` samples and gating off has no effect.
    pub gated: bool,
    pub attack: usize,
    pub attack_shape: f64,
    pub decay: usize,
    pub decay_shape: f64,
    /// Amplitude reached at the end of the decay.
    pub decay_level: f64,
    /// Only used by envelopes that are not gated.
    pub sustain: usize,
    pub release: usize,
    pub release_shape: f64,
}

impl EnvelopeParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.attack > 0,
            InvalidDuration {
                segment: Segment::Attack,
                samples: self.attack,
            }
        );
        ensure!(
            self.decay > 0,
            InvalidDuration {
                segment: Segment::Decay,
                samples: self.decay,
            }
        );
        ensure!(
            self.release > 0,
            InvalidDuration {
                segment: Segment::Release,
                samples: self.release,
            }
        );
        check_shape(Segment::Attack, self.attack_shape)?;
        check_shape(Segment::Decay, self.decay_shape)?;
        check_shape(Segment::Release, self.release_shape)?;
        ensure!(
            (0.0..=1.0).contains(&self.decay_level),
            InvalidLevel {
                level: self.decay_level,
            }
        );
        Ok(())
    }
}

fn check_shape(segment: Segment, shape: f64) -> Result<(), ConfigError> {
    ensure!(
        shape.is_finite() && shape > 0.0,
        InvalidShape { segment, shape }
    );
    Ok(())
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        EnvelopeParams {
            gated: false,
            attack: 10,
            attack_shape: 0.5,
            decay: 6,
            decay_shape: 0.8,
            decay_level: 0.4,
            sustain: 30,
            release: 30,
            release_shape: 0.8,
        }
    }
}

/// An envelope generator producing one amplitude in `[0, 1]` per call to [`EnvelopeGenerator::step`].
///
/// Each segment ramps from the last emitted amplitude towards its target, so neither segment
/// transitions nor gate changes cause jumps in the output.
///
/// # Example
///
/// ```
/// use syn_blep::synth::envelope::*;
/// let mut env = EnvelopeGenerator::new(EnvelopeParams {
///     gated: true,
///     attack: 4,
///     attack_shape: 1.0,
///     decay: 2,
///     decay_shape: 1.0,
///     decay_level: 0.5,
///     sustain: 0,
///     release: 4,
///     release_shape: 1.0,
/// })
/// .unwrap();
///
/// assert_eq!(env.step(), 0.0);
/// env.gate(true);
/// assert_eq!(env.step(), 0.25);
/// assert_eq!(env.step(), 0.5);
/// assert_eq!(env.step(), 0.75);
/// assert_eq!(env.step(), 1.0);
/// assert_eq!(env.step(), 0.75);
/// assert_eq!(env.step(), 0.5);
/// assert_eq!(env.state(), EnvelopeState::Sustain);
/// assert_eq!(env.step(), 0.5);
/// assert_eq!(env.step(), 0.5);
///
/// env.gate(false);
/// assert_eq!(env.step(), 0.375);
/// assert_eq!(env.step(), 0.25);
/// assert_eq!(env.step(), 0.125);
/// assert_eq!(env.step(), 0.0);
/// assert!(env.is_idle());
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    params: EnvelopeParams,
    state: EnvelopeState,
    /// Samples left in the current segment.
    remaining: usize,
    /// Total change of amplitude over the current segment.
    delta: f64,
    /// Per-sample advance of `ramp`.
    increment: f64,
    shape: f64,
    /// Linear progress through the current segment, from 0 to 1.
    ramp: f64,
    /// Amplitude the current segment started from.
    base: f64,
    /// Last emitted amplitude.
    output: f64,
}

impl EnvelopeGenerator {
    pub fn new(params: EnvelopeParams) -> Result<Self, ConfigError> {
        params.validate()?;
        debug!("new envelope {:?}", params);
        Ok(EnvelopeGenerator {
            params,
            state: EnvelopeState::Idle,
            remaining: 0,
            delta: 0.0,
            increment: 0.0,
            shape: 1.0,
            ramp: 0.0,
            base: 0.0,
            output: 0.0,
        })
    }

    /// Replace the configuration. The running segment keeps its parameters,
    /// the new ones apply from the next segment on.
    pub fn set_params(&mut self, params: EnvelopeParams) -> Result<(), ConfigError> {
        params.validate()?;
        debug!("reconfigured envelope {:?}", params);
        self.params = params;
        Ok(())
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// The amplitude returned by the last call to `step`.
    pub fn amplitude(&self) -> f64 {
        self.output
    }

    /// The envelope is idle when all subsequent `step` calls return zero until it is gated on.
    pub fn is_idle(&self) -> bool {
        self.state == EnvelopeState::Idle
    }

    /// Gate on (re)starts the attack from the current amplitude, whatever state the envelope is in.
    /// Gate off starts the release from the current amplitude, but only for gated envelopes
    /// that are in attack, decay or sustain. In all other cases it is ignored.
    pub fn gate(&mut self, on: bool) {
        if on {
            self.base = self.output;
            self.enter(EnvelopeState::Attack);
        } else if self.params.gated
            && matches!(
                self.state,
                EnvelopeState::Attack | EnvelopeState::Decay | EnvelopeState::Sustain
            )
        {
            self.base = self.output;
            self.enter(EnvelopeState::Release);
        } else {
            trace!("ignoring gate off in {:?}", self.state);
        }
    }

    /// Called for every sample, returning the envelope amplitude at that sample.
    pub fn step(&mut self) -> f64 {
        let holding = match self.state {
            EnvelopeState::Idle => true,
            EnvelopeState::Sustain => self.params.gated,
            _ => false,
        };
        if holding {
            return self.output;
        }

        self.ramp += self.increment;
        self.remaining = self.remaining.saturating_sub(1);

        let output = (self.base + self.delta * self.ramp.powf(self.shape))
            .max(0.0)
            .min(1.0);
        self.output = output;

        if self.remaining == 0 {
            self.base = output;
            self.enter(self.state.next());
        }
        output
    }

    /// Fill the buffer with consecutive envelope amplitudes.
    pub fn render(&mut self, output: &mut [f64]) {
        for sample in output.iter_mut() {
            *sample = self.step();
        }
    }

    /// Silence the envelope immediately.
    pub fn reset(&mut self) {
        self.enter(EnvelopeState::Idle);
    }

    /// Set up the segment belonging to `state`, starting from `self.base`.
    fn enter(&mut self, state: EnvelopeState) {
        trace!("{:?} -> {:?} at {}", self.state, state, self.base);
        let params = self.params;
        self.state = state;
        self.ramp = 0.0;
        match state {
            EnvelopeState::Attack => {
                self.begin_segment(params.attack, params.attack_shape, 1.0 - self.base)
            }
            EnvelopeState::Decay => self.begin_segment(
                params.decay,
                params.decay_shape,
                -(self.base - params.decay_level),
            ),
            EnvelopeState::Sustain => {
                // Flat, and only counting down when the envelope is not gated.
                self.remaining = params.sustain;
                self.shape = 1.0;
                self.delta = 0.0;
                self.increment = 0.0;
            }
            EnvelopeState::Release => {
                self.begin_segment(params.release, params.release_shape, -self.base)
            }
            EnvelopeState::Idle => {
                self.remaining = 0;
                self.shape = 1.0;
                self.delta = 0.0;
                self.increment = 0.0;
                self.base = 0.0;
                self.output = 0.0;
            }
        }
    }

    fn begin_segment(&mut self, samples: usize, shape: f64, delta: f64) {
        self.remaining = samples;
        self.shape = shape;
        self.delta = delta;
        self.increment = 1.0 / samples as f64;
    }
}
