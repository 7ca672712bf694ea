#[macro_use]
extern crate tracing;

use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use overscroll::cli::{Cli, Output};
use overscroll::simulate::{Frame, Gesture, Simulation};
use overscroll::utils::{config_path, version};
use overscroll_config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| "overscroll=debug,info".to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let _client = tracy_client::Client::start();

    debug!("overscroll {}", version());

    let path = config_path(cli.config)?;

    let Some((gesture, output)) = cli.subcommand.gesture() else {
        // The only non-simulation command.
        path.load()?;
        info!("config is valid");
        return Ok(());
    };

    let config = match path.load() {
        Ok(config) => config,
        Err(err) => {
            warn!("{err:?}");
            warn!("using the default config");
            Config::default()
        }
    };

    simulate(&config, gesture, output)
}

fn simulate(config: &Config, gesture: Gesture, output: Output) -> Result<(), Box<dyn Error>> {
    let _span = tracy_client::span!("simulate");

    let mut sim = Simulation::new(config, Duration::from_millis(output.frame_ms));
    if !sim.start(gesture) {
        info!("nothing to animate");
    }

    let mut stdout = io::stdout().lock();
    if !output.json {
        writeln!(stdout, "{:>6}  {:<9}  {:>12}  {:>12}", "ms", "phase", "position", "velocity")?;
    }

    for frame in sim {
        if output.json {
            serde_json::to_writer(&mut stdout, &frame)?;
            writeln!(stdout)?;
        } else {
            write_row(&mut stdout, &frame)?;
        }
    }

    Ok(())
}

fn write_row(w: &mut impl Write, frame: &Frame) -> io::Result<()> {
    write!(
        w,
        "{:>6}  {:<9}  {:>12.3}  {:>12.3}",
        frame.time_ms, frame.kind, frame.position, frame.velocity
    )?;
    if frame.finished {
        write!(w, "  finished")?;
    } else if frame.overscrolled {
        write!(w, "  overscrolled")?;
    }
    writeln!(w)
}
