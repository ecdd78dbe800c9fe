use std::time::Instant;

use risk_lottery::config::SessionConfig;
use risk_lottery::session::LotterySession;
use risk_lottery::simulation::{aggregate_statistics, save_statistics, simulate_batch};

fn parse_args() -> (usize, u64, Option<String>) {
    let args: Vec<String> = std::env::args().collect();
    let mut num_participants = 1000usize;
    let mut seed = 42u64;
    let mut output: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                if i < args.len() {
                    num_participants = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --participants value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --seed value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--output" => {
                i += 1;
                if i < args.len() {
                    output = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                println!("Usage: lottery-simulate [--participants N] [--seed S] [--output DIR]");
                println!();
                println!("Options:");
                println!("  --participants N  Number of participants to simulate (default: 1000)");
                println!("  --seed S          RNG seed (default: 42)");
                println!("  --output DIR      Write statistics JSON to DIR");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: lottery-simulate [--participants N] [--seed S] [--output DIR]");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    (num_participants, seed, output)
}

fn main() {
    let (num_participants, seed, output) = parse_args();

    // Configure rayon thread pool
    let num_threads = std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .unwrap();

    println!("Holt-Laury Lottery Simulation ({} participants)", num_participants);

    let t0 = Instant::now();
    let session = LotterySession::create(SessionConfig::default_experiment()).unwrap_or_else(|e| {
        eprintln!("Session setup failed: {}", e);
        std::process::exit(1);
    });
    let setup_ms = t0.elapsed().as_secs_f64() * 1000.0;
    println!("  Session setup:  {:.1} ms", setup_ms);
    println!(
        "  Ladder:         {} rows, treatments: {}",
        session.ladder().len(),
        session
            .treatment_names()
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    println!(
        "Simulating {} participants ({} threads)...",
        num_participants, num_threads
    );
    let result = simulate_batch(&session, num_participants, seed).unwrap_or_else(|e| {
        eprintln!("Simulation failed: {}", e);
        std::process::exit(1);
    });

    let per_participant_us =
        result.elapsed.as_secs_f64() * 1e6 / num_participants as f64;
    println!(
        "  Elapsed:        {:.1} ms",
        result.elapsed.as_secs_f64() * 1000.0
    );
    println!("  Per participant: {:.1} \u{00b5}s", per_participant_us);
    println!();

    let stats = aggregate_statistics(&session, &result.records, seed);

    println!("Results:");
    println!("  Mean switch row: {:.2}", stats.mean_switch_row);
    println!(
        "  High-draw rate:  {:.3} (expected {:.3})",
        stats.high_draw_rate, stats.expected_high_rate
    );
    println!(
        "  Gamble split:    A {:.1}% / B {:.1}%",
        stats.gamble_split.chose_a * 100.0,
        stats.gamble_split.chose_b * 100.0
    );
    for treatment in &stats.treatments {
        println!(
            "  Treatment {:>3}:   {} participants",
            treatment.name, treatment.num_participants
        );
        for round in &treatment.rounds {
            println!(
                "    round {}: mean {:8.2}  sd {:8.2}  zero-rate {:.2}",
                round.round, round.mean_payoff, round.std_dev, round.zero_rate
            );
        }
    }

    // The high-draw rate should sit near the ladder mean; a large z-score
    // indicates a biased draw path.
    let draws = (num_participants * session.config().num_rounds as usize) as f64;
    let p = stats.expected_high_rate;
    let se = (p * (1.0 - p) / draws).sqrt();
    let z = (stats.high_draw_rate - p) / se;
    println!();
    println!("  Std error:       {:.4}  (z = {:+.2}, |z| < 3.0 expected)", se, z);
    if z.abs() > 3.5 {
        eprintln!(
            "WARNING: High-draw rate deviates from expectation by {:.1} standard errors — possible bug!",
            z.abs()
        );
    }

    if let Some(ref output_dir) = output {
        let json_path = format!("{}/lottery_statistics.json", output_dir);
        save_statistics(&stats, &json_path);
        println!();
        println!("  Statistics saved: {}", json_path);
    }
}
