//! hexctl - Hexapod robot driver CLI
//!
//! Loads a robot definition (servo table, standby pose, gait tables) and
//! either validates it or drives it in real time against a console pulse
//! sink, reading mode commands from stdin the way the firmware reads them
//! from its serial port.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod robot;
mod sink;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hexapod_sequencer::{command_queue, CommandSender, Mode, PulseSink, Sequencer};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::robot::RobotConfig;
use crate::sink::ConsoleSink;

#[derive(Parser)]
#[command(name = "hexctl")]
#[command(about = "Drive and validate hexapod robot definitions")]
#[command(version)]
struct Cli {
    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a robot definition and print a summary
    Check {
        /// Robot definition file (JSON)
        file: PathBuf,
    },
    /// Drive a robot definition in real time, reading mode commands from stdin
    Run {
        /// Robot definition file (JSON)
        file: PathBuf,
        /// Tick interval in milliseconds
        #[arg(long, default_value_t = 20)]
        tick_ms: u64,
        /// Gait to start in (defaults to standby)
        #[arg(long)]
        mode: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Run { file, tick_ms, mode } => run(&file, tick_ms, mode),
    }
}

fn check(file: &PathBuf) -> Result<()> {
    let config = RobotConfig::load(file)?;
    let name = config.name.clone();
    let gait_summary: Vec<String> = config
        .gaits
        .iter()
        .map(|g| format!("{} ({})", g.name, if g.looping { "looping" } else { "one-shot" }))
        .collect();
    let (sequencer, pulse) = config.into_sequencer()?;

    println!("robot `{name}`: ok");
    println!("  servos: {}", sequencer.live_angles().len());
    println!("  pulse:  {}..{} counts @ {} Hz", pulse.min_counts, pulse.max_counts, pulse.freq_hz);
    println!("  gaits:  {}", gait_summary.join(", "));
    Ok(())
}

fn run(file: &PathBuf, tick_ms: u64, initial_mode: Option<String>) -> Result<()> {
    let config = RobotConfig::load(file)?;
    let (mut sequencer, pulse) = config.into_sequencer()?;

    let mut sink = ConsoleSink::new(pulse);
    sink.set_frequency(pulse.freq_hz);

    if let Some(mode) = initial_mode {
        sequencer.select_mode(parse_mode(&mode))?;
    }

    let (commands, receiver) = command_queue();
    let stop = Arc::new(AtomicBool::new(false));
    spawn_stdin_reader(commands, Arc::clone(&stop));

    info!(tick_ms, "running; type a gait name, `standby`, or `quit`");
    let period = Duration::from_millis(tick_ms.max(1));
    let mut next = Instant::now() + period;
    while !stop.load(Ordering::Relaxed) {
        sequencer.tick_with_commands(&receiver, &mut sink);
        let now = Instant::now();
        if next > now {
            std::thread::sleep(next - now);
        }
        next += period;
    }

    settle(&mut sequencer, &mut sink, period);
    let diag = sequencer.diagnostics();
    info!(
        emitted = diag.pulses_emitted,
        suppressed = diag.pulses_suppressed,
        clamped = diag.clamp_events,
        rejected = diag.rejected_selections,
        "shutdown"
    );
    Ok(())
}

/// Returns the robot to standby before exiting, like the firmware does on
/// shutdown: keep ticking until the pose stops producing bus writes.
fn settle(sequencer: &mut Sequencer, sink: &mut ConsoleSink, period: Duration) {
    if sequencer.select_mode(Mode::Standby).is_err() {
        return;
    }
    let mut quiet_ticks = 0;
    for _ in 0..1000 {
        let before = sequencer.diagnostics().pulses_emitted;
        sequencer.tick(sink);
        if sequencer.diagnostics().pulses_emitted == before {
            quiet_ticks += 1;
            if quiet_ticks >= 3 {
                break;
            }
        } else {
            quiet_ticks = 0;
        }
        std::thread::sleep(period);
    }
}

fn parse_mode(word: &str) -> Mode {
    match word {
        "standby" | "stop" => Mode::Standby,
        gait => Mode::Gait(gait.into()),
    }
}

fn spawn_stdin_reader(commands: CommandSender, stop: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let word = line.trim();
            if word.is_empty() {
                continue;
            }
            if word == "quit" || word == "exit" {
                stop.store(true, Ordering::Relaxed);
                break;
            }
            if !commands.select(parse_mode(word)) {
                warn!("sequencer gone; stopping command reader");
                break;
            }
        }
        stop.store(true, Ordering::Relaxed);
    });
}
