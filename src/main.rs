//! Tandem - SPSC Transfer Stress Harness
//!
//! Kirim jutaan nilai acak lewat satu Session per kapasitas, lalu verifikasi
//! output consumer sama persis dengan input producer.
//!
//! Usage:
//!   cargo run --release -- [OPTIONS]
//!
//! Logging diatur lewat `RUST_LOG` (default: `tandem=info`).

use std::process::ExitCode;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tandem::{CpuTopology, PinningStrategy, Session, SessionConfig, WaitPolicy};

const RANDOM_MIN: i32 = 1;
const RANDOM_MAX: i32 = 1000;

/// Konfigurasi stress run
struct StressConfig {
    elements: usize,
    min_capacity: usize,
    max_capacity: usize,
    seed: u64,
    wait: WaitPolicy,
    pinning: PinningStrategy,
    verbose: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            elements: 10_000_000,
            min_capacity: 1,
            max_capacity: 19,
            seed: 0x7a4d_e3,
            wait: WaitPolicy::BusySpin,
            pinning: PinningStrategy::Auto,
            verbose: false,
        }
    }
}

/// Hasil satu session
struct RunReport {
    capacity: usize,
    elapsed_ms: f64,
    mismatch: Option<usize>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tandem=debug" } else { "tandem=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .init();
}

fn random_values(len: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.gen_range(RANDOM_MIN..=RANDOM_MAX))
        .collect()
}

fn run_once(input: &[i32], capacity: usize, config: &StressConfig) -> Result<RunReport, String> {
    let session_config = SessionConfig::new(capacity)
        .with_wait_policy(config.wait)
        .with_pinning(config.pinning);

    let start = Instant::now();
    let mut session = Session::with_config(input, session_config)
        .map_err(|e| format!("create failed: {}", e))?;
    tracing::debug!(capacity, placement = %session.placement(), "session running");

    let output = session
        .destroy()
        .map_err(|e| format!("destroy failed: {}", e))?;
    let elapsed = start.elapsed();

    let mismatch = input
        .iter()
        .zip(&output)
        .position(|(a, b)| a != b)
        .or((input.len() != output.len()).then(|| input.len().min(output.len())));

    Ok(RunReport {
        capacity,
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        mismatch,
    })
}

fn run_stress(config: &StressConfig) -> Result<usize, String> {
    let topology = CpuTopology::detect();
    println!("🚀 Tandem SPSC Stress Harness");
    println!("=============================\n");
    println!(
        "  Cores:     {} logical / {} physical (smt: {})",
        topology.logical_cores, topology.physical_cores, topology.has_smt
    );
    println!("  Elements:  {}", config.elements);
    println!(
        "  Capacity:  {}..={}",
        config.min_capacity, config.max_capacity
    );
    println!("  Wait:      {}", config.wait);
    println!("  Pinning:   {}\n", config.pinning);

    let input = random_values(config.elements, config.seed);
    let mut failures = 0;

    for capacity in config.min_capacity..=config.max_capacity {
        let report = run_once(&input, capacity, config)?;
        let rate = config.elements as f64 / (report.elapsed_ms / 1000.0) / 1_000_000.0;

        match report.mismatch {
            None => println!(
                "  ✅ capacity {:>3}: {:>9.1} ms  ({:.2} M values/sec)",
                report.capacity, report.elapsed_ms, rate
            ),
            Some(index) => {
                failures += 1;
                println!(
                    "  ❌ capacity {:>3}: value under index {} wasn't written into the buffer",
                    report.capacity, index
                );
            }
        }
    }

    Ok(failures)
}

fn parse_wait(value: &str) -> Option<WaitPolicy> {
    match value {
        "spin" => Some(WaitPolicy::BusySpin),
        "yield" => Some(WaitPolicy::SpinThenYield { spin_limit: 128 }),
        other => other
            .strip_prefix("yield:")
            .and_then(|n| n.parse().ok())
            .map(|spin_limit| WaitPolicy::SpinThenYield { spin_limit }),
    }
}

fn parse_pinning(value: &str) -> Option<PinningStrategy> {
    match value {
        "auto" => Some(PinningStrategy::Auto),
        "strict" => Some(PinningStrategy::Strict),
        "off" => Some(PinningStrategy::Disabled),
        other => {
            let (producer, consumer) = other.split_once(',')?;
            Some(PinningStrategy::Manual {
                producer: producer.trim().parse().ok()?,
                consumer: consumer.trim().parse().ok()?,
            })
        }
    }
}

fn parse_args() -> StressConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = StressConfig::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).map(String::as_str);
        match args[i].as_str() {
            "--elements" | "-n" => {
                if let Some(v) = value {
                    config.elements = v.parse().unwrap_or(config.elements);
                    i += 1;
                }
            }
            "--min-capacity" => {
                if let Some(v) = value {
                    config.min_capacity = v.parse().unwrap_or(config.min_capacity);
                    i += 1;
                }
            }
            "--max-capacity" => {
                if let Some(v) = value {
                    config.max_capacity = v.parse().unwrap_or(config.max_capacity);
                    i += 1;
                }
            }
            "--seed" => {
                if let Some(v) = value {
                    config.seed = v.parse().unwrap_or(config.seed);
                    i += 1;
                }
            }
            "--wait" | "-w" => {
                if let Some(v) = value {
                    config.wait = parse_wait(v).unwrap_or(config.wait);
                    i += 1;
                }
            }
            "--pin" | "-p" => {
                if let Some(v) = value {
                    config.pinning = parse_pinning(v).unwrap_or(config.pinning);
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                println!("Tandem - lock-free SPSC transfer stress harness\n");
                println!("Usage: tandem [OPTIONS]\n");
                println!("Options:");
                println!("  -n, --elements <N>      Values per session (default: 10000000)");
                println!("      --min-capacity <N>  Smallest ring capacity (default: 1)");
                println!("      --max-capacity <N>  Largest ring capacity (default: 19)");
                println!("      --seed <N>          RNG seed for the workload");
                println!("  -w, --wait <POLICY>     spin | yield | yield:<spins> (default: spin)");
                println!("  -p, --pin <STRATEGY>    auto | strict | off | <producer>,<consumer>");
                println!("  -v, --verbose           Debug logging");
                println!("  -h, --help              Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn main() -> ExitCode {
    let config = parse_args();
    init_tracing(config.verbose);

    if config.min_capacity == 0 || config.min_capacity > config.max_capacity {
        eprintln!(
            "❌ Invalid capacity range {}..={}",
            config.min_capacity, config.max_capacity
        );
        return ExitCode::FAILURE;
    }

    match run_stress(&config) {
        Ok(0) => {
            println!("\n✅ All capacities transferred every value in order");
            ExitCode::SUCCESS
        }
        Ok(failures) => {
            println!("\n⚠️  {} capacities lost or reordered values", failures);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("❌ Stress run error: {}", e);
            ExitCode::FAILURE
        }
    }
}
