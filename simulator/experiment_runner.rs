// Experiment Runner - Load and execute RDS experiment YAML files
//
// Usage:
//   cargo run --bin experiment_runner scenarios/baseline.yaml
//   cargo run --bin experiment_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin experiment_runner scenarios/baseline.yaml --seed 0x1234...
//   cargo run --bin experiment_runner scenarios/baseline.yaml --tables --yaml

use log::{error, LevelFilter};
use rds_sim::{ExperimentConfig, ExperimentDriver, InverseDegreeEstimator, NaiveEstimator};
use simple_logger::SimpleLogger;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    meta: ScenarioMeta,

    /// Experiment configuration (missing fields take their defaults)
    #[serde(default)]
    config: ExperimentConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScenarioMeta {
    name: Option<String>,
    description: Option<String>,
    hypothesis: Option<String>,
}

#[derive(Debug, Default)]
struct Options {
    seed: Option<[u8; 32]>,
    print_tables: bool,
    yaml_report: bool,
}

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX] [--tables] [--yaml]",
            args[0]
        );
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/baseline.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/baseline.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let options = parse_options(&args[2..]);

    if path.is_file() {
        run_scenario_file(path, &options);
    } else if path.is_dir() {
        run_scenario_directory(path, &options);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" if i + 1 < args.len() => {
                options.seed = Some(parse_seed_hex(&args[i + 1]));
                i += 1;
            }
            "--tables" => options.print_tables = true,
            "--yaml" => options.yaml_report = true,
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn run_scenario_directory(dir: &Path, options: &Options) {
    let mut scenarios: Vec<PathBuf> = Vec::new();

    // Find all .yaml files
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml") | Some("yml")
            ) {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  EXPERIMENT RUNNER - Multiple Scenarios                ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, options);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All scenarios complete!                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
}

fn run_scenario_file(path: &Path, options: &Options) {
    println!("Loading scenario from: {}", path.display());

    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let scenario: ScenarioFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    // Print scenario header
    let title = scenario.meta.name.clone().unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scenario")
            .to_string()
    });
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  {}{}║", title, " ".repeat(54_usize.saturating_sub(title.len())));
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    let mut config = scenario.config;
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    println!("Configuration:");
    println!("  Nodes: {} (attachment {})", config.network.n_nodes, config.network.attachment);
    println!("  Seeds per trial: {}", config.trial.initial_sample_size);
    println!("  Participation probability: {}", config.trial.participation_prob);
    println!("  Alpha: {}  Bias exponent: {}", config.trial.alpha, config.trial.bias_expo);
    println!("  Minimum survey size: {}", config.trial.min_survey_size);
    println!("  Platforms: {}", config.platforms.join(", "));
    println!("  Trials: {}", config.n_simulations);
    println!("\nStarting experiment...\n");

    let driver = match ExperimentDriver::new(config) {
        Ok(driver) => driver,
        Err(e) => {
            error!("{}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    let result = match driver.run(&NaiveEstimator, &InverseDegreeEstimator) {
        Ok(result) => result,
        Err(e) => {
            error!("{}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    if options.print_tables {
        for table in &result.tables {
            table.print();
            println!();
        }
    }

    result.print_summary();

    if options.yaml_report {
        match serde_yaml::to_string(&result.errors) {
            Ok(report) => println!("{}", report),
            Err(e) => error!("Failed to serialize error table: {}", e),
        }
    }

    println!("\n✓ Scenario complete!\n");
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte = std::str::from_utf8(chunk)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok());
        seed[i] = byte.unwrap_or_else(|| {
            eprintln!("Invalid hex seed: {}", hex);
            std::process::exit(1);
        });
    }

    seed
}
