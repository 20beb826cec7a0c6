//! Diamond Sim CLI - Run Monte Carlo games or calibrate weights from JSON.

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;

use diamond_sim::{
    compute::{GameSimulator, calibration::CalibrationEngine},
    schema::{CalibrationConfig, Roster, SimulationConfig, TargetDistribution},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--example" => print_example_config(),
        "--calibrate" => {
            if args.len() < 4 {
                print_usage(&args[0]);
                std::process::exit(1);
            }
            run_calibration(Path::new(&args[2]), Path::new(&args[3]));
        }
        roster_path => {
            let games: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);
            run_simulation(Path::new(roster_path), games);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <roster.json> [games]", program);
    eprintln!("       {} --calibrate <roster.json> <target.json>", program);
    eprintln!();
    eprintln!("Run Monte Carlo baseball simulations from a JSON roster.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  roster.json  Path to roster file (batters and pitchers)");
    eprintln!("  games        Number of simulated games (default: 1000)");
    eprintln!("  target.json  Calibration configuration with target distribution");
    eprintln!();
    eprintln!("Example files are generated with --example flag.");
}

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> T {
    let contents = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {} file: {}", what, e);
        std::process::exit(1);
    });
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Error parsing {}: {}", what, e);
        std::process::exit(1);
    })
}

fn run_simulation(roster_path: &Path, games: usize) {
    let roster: Roster = load_json(roster_path, "roster");

    // Optional simulation settings next to the roster
    let config_path = roster_path.with_extension("config.json");
    let config: SimulationConfig = if config_path.exists() {
        load_json(&config_path, "config")
    } else {
        SimulationConfig::default()
    };

    println!("Diamond Sim");
    println!("===========");
    println!(
        "Roster: {} batters, {} pitchers",
        roster.batters.len(),
        roster.pitchers.len()
    );
    println!("Innings: {}", config.innings);
    println!("Games: {}", games);
    println!();

    let innings = config.innings;
    let mut simulator = GameSimulator::new(roster, &config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let start = Instant::now();
    let summary = simulator
        .monte_carlo_game_simulation(games, innings)
        .unwrap_or_else(|e| {
            eprintln!("Simulation aborted: {}", e);
            std::process::exit(1);
        });
    let elapsed = start.elapsed();

    println!("Runs per game:");
    println!("  Mean: {:.3}", summary.mean);
    println!("  Std dev: {:.3}", summary.std_dev);
    println!("  Range: {}..={}", summary.min, summary.max);
    println!();
    println!("Distribution:");
    for (runs, count) in summary.bins.iter().zip(&summary.histogram) {
        let bar = "#".repeat((60 * count).div_ceil(games.max(1)));
        println!("  {:>3} {:>6} {}", runs, count, bar);
    }
    println!();

    println!("Batting:");
    println!(
        "  {:<20} {:>6} {:>6} {:>7} {:>6} {:>6} {:>7}",
        "Name", "AVG", "XBH%", "RBI/G", "K%", "BB%", "Clutch"
    );
    for (name, rates) in simulator.player_statistics() {
        println!(
            "  {:<20} {:>6.3} {:>6.3} {:>7.3} {:>6.3} {:>6.3} {:>7.3}",
            name,
            rates.batting_average,
            rates.extra_base_pct,
            rates.rbi_per_game,
            rates.strikeout_rate,
            rates.walk_rate,
            rates.clutch_hit_rate
        );
    }
    println!();

    println!("Pitching:");
    println!(
        "  {:<20} {:>6} {:>6} {:>6} {:>6} {:>5} {:>5}",
        "Name", "IP", "ERA", "WHIP", "K/9", "W", "L"
    );
    for (name, rates) in simulator.pitcher_statistics() {
        println!(
            "  {:<20} {:>6} {:>6.2} {:>6.2} {:>6.2} {:>5} {:>5}",
            name,
            rates.innings_pitched,
            rates.era,
            rates.whip,
            rates.k_per_9,
            rates.wins,
            rates.losses
        );
    }
    println!();
    println!(
        "Time: {:.2}s ({:.1} games/s)",
        elapsed.as_secs_f32(),
        games as f32 / elapsed.as_secs_f32()
    );
}

fn run_calibration(roster_path: &Path, config_path: &Path) {
    let roster: Roster = load_json(roster_path, "roster");
    let config: CalibrationConfig = load_json(config_path, "calibration config");

    println!("Diamond Sim Calibration");
    println!("=======================");
    println!(
        "Target: mean {:.3}, std dev {:.3}{}",
        config.target.mean,
        config.target.std_dev,
        if config.target.has_histogram() {
            " (with histogram)"
        } else {
            ""
        }
    );
    println!(
        "Population: {}, generations: {}, games per candidate: {}",
        config.population.size, config.population.max_generations, config.evaluation.games
    );
    println!();

    let mut engine = CalibrationEngine::new(config, roster).unwrap_or_else(|e| {
        eprintln!("Invalid calibration configuration: {}", e);
        std::process::exit(1);
    });

    let result = engine.evolve_with_callback(|progress| {
        println!(
            "  Generation {}/{}: best={:.4}, gen best={:.4}, avg={:.4}",
            progress.generation,
            progress.total_generations,
            progress.best_fitness,
            progress.generation_best,
            progress.avg_fitness
        );
    });

    println!();
    println!("Stopped: {:?}", result.stats.stop_reason);
    println!(
        "Best fitness: {:.4} (simulated mean {:.3}, std dev {:.3})",
        result.best_fitness, result.best.simulated_mean, result.best.simulated_std_dev
    );
    println!(
        "Evaluations: {} ({} failed) in {:.2}s",
        result.stats.total_evaluations,
        result.stats.failed_evaluations,
        result.stats.elapsed_seconds
    );
    println!();
    println!("Best weights:");
    print_json(&result.best_weights);
}

fn print_example_config() {
    let roster = Roster::example();
    let config = CalibrationConfig {
        target: TargetDistribution::from_runs(&[4, 2, 7, 3, 5, 0, 6, 4, 9, 1, 3, 5]),
        ..Default::default()
    };

    println!("Example roster (roster.json):");
    print_json(&roster);
    println!();
    println!("Example simulation settings (roster.config.json):");
    print_json(&SimulationConfig::default());
    println!();
    println!("Example calibration (target.json):");
    print_json(&config);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing: {}", e),
    }
}
