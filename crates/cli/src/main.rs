//! MIPS machine simulator CLI.
//!
//! This binary provides a single entry point for the simulator. It performs:
//! 1. **User programs:** Boot the machine and run a NOFF executable with a demonstration
//!    syscall handler installed.
//! 2. **Thread tests:** Boot the machine with kernel threads only and run the classic
//!    yield and semaphore tests.
//! 3. **Debug output:** Map single-letter debug flags onto tracing targets.

mod demo;
mod syscall;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use mipsim_core::sim::ProcessAddressSpace;
use mipsim_core::{Config, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Instructional MIPS whole-machine simulator",
    long_about = "Run user programs or kernel thread tests on a simulated MIPS machine.\n\nDebug flags (-d) select tracing channels: t threads, i interrupts, m machine, a address spaces, s semaphores, + everything.\n\nExamples:\n  sim run -x test/halt.noff\n  sim run -x test/printer.noff --rs 7 -d ti\n  sim threads -n 3 -i 5"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug)]
struct Common {
    /// JSON configuration file; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Randomize timer intervals with this seed.
    #[arg(long = "rs")]
    random_seed: Option<u64>,

    /// Debug flags (t, i, m, a, s, or + for all).
    #[arg(short, long)]
    debug: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot the machine, optionally running a user program as the main thread.
    Run {
        /// NOFF executable to run.
        #[arg(short = 'x', long)]
        exec: Option<PathBuf>,

        #[command(flatten)]
        common: Common,
    },

    /// Run the kernel thread tests.
    Threads {
        /// Number of yielding threads.
        #[arg(short = 'n', long, default_value_t = 2)]
        threads: u32,

        /// Iterations per thread.
        #[arg(short, long, default_value_t = 5)]
        iterations: u32,

        #[command(flatten)]
        common: Common,
    },
}

/// Builds a tracing filter from debug flags, falling back to `RUST_LOG`.
fn filter_for(flags: Option<&str>) -> EnvFilter {
    let Some(flags) = flags else {
        return EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    };
    if flags.contains('+') {
        return EnvFilter::new("warn,mipsim=trace");
    }

    let mut directives = vec!["warn".to_owned()];
    for flag in flags.chars() {
        let target = match flag {
            't' => "mipsim::threads",
            'i' => "mipsim::interrupt",
            'm' => "mipsim::machine",
            'a' => "mipsim::addrspace",
            's' => "mipsim::sync",
            _ => continue,
        };
        directives.push(format!("{target}=trace"));
    }
    EnvFilter::new(directives.join(","))
}

fn init_tracing(flags: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(flags))
        .with_target(true)
        .without_time()
        .init();
}

fn load_config(common: &Common) -> Config {
    let mut config = match &common.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config {}: {e}", path.display());
                process::exit(1);
            });
            Config::from_json(&text).unwrap_or_else(|e| {
                eprintln!("Error in config {}: {e}", path.display());
                process::exit(1);
            })
        }
        None => Config::default(),
    };
    if common.random_seed.is_some() {
        config.timer.random_seed = common.random_seed;
    }
    config
}

fn main() {
    let cli = Cli::parse();

    let (common, boot): (&Common, Box<dyn FnOnce(&Simulator) + Send>) = match &cli.command {
        Commands::Run { exec, common } => {
            let exec = exec.clone();
            (
                common,
                Box::new(move |sim: &Simulator| {
                    if let Some(path) = exec {
                        start_process(sim, &path);
                    }
                }),
            )
        }
        Commands::Threads {
            threads,
            iterations,
            common,
        } => {
            let (threads, iterations) = (*threads, *iterations);
            (
                common,
                Box::new(move |sim: &Simulator| {
                    demo::yield_test(sim, threads, iterations);
                    demo::ping_pong(sim, iterations);
                }),
            )
        }
    };

    init_tracing(common.debug.as_deref());
    let sim = Simulator::new(load_config(common)).with_trap_handler(syscall::handle);

    match sim.run(boot) {
        Ok(_) => process::exit(0),
        Err(e) => {
            error!("{e}");
            eprintln!("\n[!] FATAL: {e}");
            process::exit(1);
        }
    }
}

/// Loads `path` into a fresh address space and runs it on the current thread.
fn start_process(sim: &Simulator, path: &std::path::Path) {
    match ProcessAddressSpace::load(sim, path) {
        Ok(space) => sim.exec(Box::new(space)),
        Err(e) => {
            eprintln!("Unable to open file {}: {e}", path.display());
            process::exit(1);
        }
    }
}
