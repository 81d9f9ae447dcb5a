// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `sigdump` - run a single generator and write one `index value` line per sample.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use log::{debug, info};
use structopt::StructOpt;

use syn_blep::synth::{
    BandLimitedOscillator, ConfigError, EnvelopeGenerator, EnvelopeParams, Waveform,
};
use syn_blep::wave::SampleRate;

#[derive(Debug, StructOpt)]
#[structopt(name = "sigdump", about = "Dumping generated signals sample by sample")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// Output file. Samples are written to stdout if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// How many samples to generate.
    #[structopt(short = "n", long, default_value = "120")]
    samples: usize,

    #[structopt(subcommand)]
    generator: Generator,
}

#[derive(Debug, StructOpt)]
enum Generator {
    /// Gate an ADSR envelope on at the first sample.
    Envelope {
        /// Hold the sustain until the gate is turned off.
        #[structopt(long)]
        gated: bool,
        #[structopt(long, default_value = "10")]
        attack: usize,
        #[structopt(long, default_value = "0.5")]
        attack_shape: f64,
        #[structopt(long, default_value = "6")]
        decay: usize,
        #[structopt(long, default_value = "0.8")]
        decay_shape: f64,
        #[structopt(long, default_value = "0.4")]
        decay_level: f64,
        #[structopt(long, default_value = "30")]
        sustain: usize,
        #[structopt(long, default_value = "30")]
        release: usize,
        #[structopt(long, default_value = "0.8")]
        release_shape: f64,
        /// Sample at which the gate is turned off again.
        #[structopt(long)]
        release_at: Option<usize>,
    },
    /// Run a band-limited oscillator at a fixed frequency.
    Oscillator {
        /// One of sine, saw, square, triangle.
        #[structopt(short, long, default_value = "saw")]
        waveform: Waveform,
        #[structopt(short, long, default_value = "5000")]
        frequency: f64,
        /// Shift of the wave in periods.
        #[structopt(long, default_value = "0")]
        phase_offset: f64,
        #[structopt(long, default_value = "44100")]
        sample_rate: f64,
    },
}

fn invalid(err: ConfigError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let mut values = vec![0.0; opt.samples];
    match opt.generator {
        Generator::Envelope {
            gated,
            attack,
            attack_shape,
            decay,
            decay_shape,
            decay_level,
            sustain,
            release,
            release_shape,
            release_at,
        } => {
            let mut envelope = EnvelopeGenerator::new(EnvelopeParams {
                gated,
                attack,
                attack_shape,
                decay,
                decay_shape,
                decay_level,
                sustain,
                release,
                release_shape,
            })
            .map_err(invalid)?;
            info!("envelope {:?}", envelope.params());

            envelope.gate(true);
            for (i, value) in values.iter_mut().enumerate() {
                if release_at == Some(i) {
                    envelope.gate(false);
                }
                *value = envelope.step();
            }
        }
        Generator::Oscillator {
            waveform,
            frequency,
            phase_offset,
            sample_rate,
        } => {
            let sample_rate = SampleRate::new(sample_rate).map_err(invalid)?;
            info!(
                "{:?} at {} Hz sampled at {} Hz",
                waveform,
                frequency,
                sample_rate.hz()
            );
            let mut oscillator = BandLimitedOscillator::new(waveform);
            oscillator.render(frequency, phase_offset, sample_rate, &mut values);
        }
    }

    let mut out: Box<dyn Write> = match &opt.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    for (i, value) in values.iter().enumerate() {
        debug!("i = {} - value {}", i, value);
        writeln!(out, "{} {}", i, value)?;
    }
    out.flush()
}
