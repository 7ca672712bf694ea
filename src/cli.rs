use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::simulate::Gesture;
use crate::utils::version;

#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: `$XDG_CONFIG_HOME/overscroll/config.kdl`).
    ///
    /// This can also be set with the `OVERSCROLL_CONFIG` environment variable. If both are set,
    /// the command line argument takes precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Simulate a fling gesture.
    Fling {
        /// Starting position.
        #[arg(long, allow_negative_numbers = true)]
        start: f64,
        /// Initial velocity in units per second.
        #[arg(long, allow_negative_numbers = true)]
        velocity: f64,
        /// Lower edge of the valid range (default: unbounded).
        #[arg(long, allow_negative_numbers = true)]
        min: Option<f64>,
        /// Upper edge of the valid range (default: unbounded).
        #[arg(long, allow_negative_numbers = true)]
        max: Option<f64>,
        /// How far the fling may overshoot an edge (default: from the config).
        #[arg(long)]
        over: Option<f64>,
        #[command(flatten)]
        output: Output,
    },
    /// Simulate a fixed-duration scroll.
    Scroll {
        /// Starting position.
        #[arg(long, allow_negative_numbers = true)]
        start: f64,
        /// Distance to scroll.
        #[arg(long, allow_negative_numbers = true)]
        delta: f64,
        /// Scroll duration (default: from the config).
        #[arg(long)]
        duration_ms: Option<u64>,
        #[command(flatten)]
        output: Output,
    },
    /// Simulate bringing an out-of-range position back into range.
    SpringBack {
        /// Starting position.
        #[arg(long, allow_negative_numbers = true)]
        start: f64,
        /// Lower edge of the valid range.
        #[arg(long, allow_negative_numbers = true)]
        min: f64,
        /// Upper edge of the valid range.
        #[arg(long, allow_negative_numbers = true)]
        max: f64,
        #[command(flatten)]
        output: Output,
    },
    /// Validate the config file.
    Validate,
}

/// How to print the simulated frames.
#[derive(Args, Clone, Copy)]
pub struct Output {
    /// Interval between frames.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,
    /// Format output as JSON lines.
    #[arg(short, long)]
    pub json: bool,
}

impl Sub {
    /// Returns the gesture to simulate and how to print it, if this is a simulation command.
    pub fn gesture(&self) -> Option<(Gesture, Output)> {
        match *self {
            Sub::Fling {
                start,
                velocity,
                min,
                max,
                over,
                output,
            } => Some((
                Gesture::Fling {
                    start,
                    velocity,
                    min: min.unwrap_or(f64::NEG_INFINITY),
                    max: max.unwrap_or(f64::INFINITY),
                    over,
                },
                output,
            )),
            Sub::Scroll {
                start,
                delta,
                duration_ms,
                output,
            } => Some((
                Gesture::Scroll {
                    start,
                    delta,
                    duration_ms,
                },
                output,
            )),
            Sub::SpringBack {
                start,
                min,
                max,
                output,
            } => Some((Gesture::SpringBack { start, min, max }, output)),
            Sub::Validate => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_fling() {
        let cli = Cli::try_parse_from([
            "overscroll",
            "fling",
            "--start",
            "-5",
            "--velocity",
            "-1200",
            "--min",
            "-100",
            "--max",
            "100",
            "--json",
        ])
        .unwrap();

        let (gesture, output) = cli.subcommand.gesture().unwrap();
        assert_eq!(
            gesture,
            Gesture::Fling {
                start: -5.,
                velocity: -1200.,
                min: -100.,
                max: 100.,
                over: None,
            }
        );
        assert!(output.json);
        assert_eq!(output.frame_ms, 16);
    }

    #[test]
    fn parse_validate_with_config() {
        let cli = Cli::try_parse_from(["overscroll", "validate", "--config", "/tmp/a.kdl"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/a.kdl")));
        assert!(cli.subcommand.gesture().is_none());
    }

    #[test]
    fn zero_frame_interval_is_rejected() {
        assert!(Cli::try_parse_from([
            "overscroll",
            "scroll",
            "--start",
            "0",
            "--delta",
            "10",
            "--frame-ms",
            "0",
        ])
        .is_err());
    }
}
