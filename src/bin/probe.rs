use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use ct_memcmp::arch::pin_to_cpu;
use ct_memcmp::{Comparator, EarlyExit, Harness, HarnessConfig, InputPattern, Strategy};

/// Measures per-pattern timing of the constant-time comparators
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bytes compared per call
    #[arg(short, long, default_value_t = 64)]
    len: usize,
    /// Timing samples per pattern
    #[arg(short, long, default_value_t = 10_000)]
    repetitions: usize,
    /// Calls per timing sample
    #[arg(short, long, default_value_t = 32)]
    batch: usize,
    /// Untimed calls per pattern before sampling
    #[arg(long, default_value_t = 1_000)]
    warmup: usize,
    /// Seed for buffer contents
    #[arg(long, default_value_t = 0x5EED_C0DE)]
    seed: u64,
    /// Strategies to measure (repeatable); all when omitted
    #[arg(short, long = "strategy", action = clap::ArgAction::Append)]
    strategies: Vec<Strategy>,
    /// Also measure the variable-time early-exit reference
    #[arg(long)]
    leaky: bool,
    /// Pin the process to this CPU before measuring
    #[arg(long)]
    cpu: Option<usize>,
    /// Flag a comparator whose pattern means differ by more than this many pooled stddevs
    #[arg(short, long, default_value_t = 0.5)]
    threshold: f64,
    /// Print the pattern buffers before measuring
    #[arg(long)]
    show_inputs: bool,
}

fn hex(bytes: Option<&[u8]>) -> String {
    match bytes {
        None => "NULL".to_string(),
        Some(bytes) if bytes.len() > 32 => format!("data[{}] too long", bytes.len()),
        Some(bytes) => bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();

    if !args.threshold.is_finite() || args.threshold <= 0.0 {
        bail!("threshold must be a positive number, got {}", args.threshold);
    }

    if let Some(cpu) = args.cpu {
        if !pin_to_cpu(cpu) {
            warn!("continuing unpinned; expect noisier numbers");
        }
    }

    let config = HarnessConfig::default()
        .len(args.len)
        .repetitions(args.repetitions)
        .batch(args.batch)
        .warmup(args.warmup)
        .seed(args.seed);
    let harness = Harness::new(config).context("invalid harness configuration")?;

    let strategies = if args.strategies.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        args.strategies.clone()
    };
    let mut engines: Vec<Box<dyn Comparator>> = strategies
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn Comparator>)
        .collect();
    if args.leaky {
        engines.push(Box::new(EarlyExit));
    }

    println!("Running constant-time comparison probe...");
    println!("Buffer size: {} bytes", args.len);
    println!("Repetitions: {}", args.repetitions);
    println!("Batch: {}", args.batch);
    println!();

    if args.show_inputs {
        for pattern in InputPattern::ALL {
            let inputs = harness.inputs(pattern);
            println!("{:<12} a = {}", pattern.name(), hex(Some(&inputs.a[..])));
            println!("{:<12} b = {}", "", hex(Some(&inputs.b[..])));
        }
        println!();
    }

    let mut flagged = 0;
    for engine in &engines {
        info!("measuring {}", engine.name());
        let report = harness.run(engine.as_ref());
        println!("{}", report);
        let verdict = if report.is_uniform(args.threshold) {
            "uniform"
        } else {
            flagged += 1;
            "DISTINGUISHABLE"
        };
        println!("  timing: {}", verdict);
        println!();
    }

    println!("{} of {} comparators distinguishable", flagged, engines.len());
    Ok(())
}
