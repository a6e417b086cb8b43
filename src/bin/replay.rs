// Standalone replay tool for analyzing Battlesnake debug logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all turns
//   --turns <turn1,turn2>  Replay specific turns (comma-separated)
//   --validate             Check logged moves against expected ones
//   --verbose              Show detailed output for each turn
//   --config <path>        Path to Snake.toml (default: Snake.toml)

use std::env;
use std::process;

use minimax_snake::config::Config;
use minimax_snake::grid::Direction;
use minimax_snake::replay::ReplayEngine;

enum Mode {
    All,
    Turns(String),
    Validate(String),
}

fn print_usage() {
    eprintln!("Battlesnake Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all turns in the log");
    eprintln!("  --turns <T1,T2,...>     Replay specific turns (comma-separated)");
    eprintln!("  --validate <T:M,...>    Validate logged moves (format: turn:move|move,...)");
    eprintln!("  --verbose               Show detailed output for each turn");
    eprintln!("  --config <path>         Path to Snake.toml (default: Snake.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay battlesnake_debug.jsonl --all");
    eprintln!("  replay battlesnake_debug.jsonl --turns 5,10,15");
    eprintln!("  replay battlesnake_debug.jsonl --validate 5:up,10:right|down");
}

fn parse_turns(s: &str) -> Result<Vec<i32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<i32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

fn parse_expected_moves(s: &str) -> Result<Vec<(i32, Vec<Direction>)>, String> {
    s.split(',')
        .map(|pair| {
            let (turn, moves) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'turn:move'", pair))?;

            let turn = turn
                .parse::<i32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", turn, e))?;

            // Multiple acceptable moves are separated by '|'
            let moves = moves
                .split('|')
                .map(|m| m.parse::<Direction>().map_err(|e| e.to_string()))
                .collect::<Result<Vec<_>, _>>()?;

            Ok((turn, moves))
        })
        .collect()
}

fn take_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    }
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(if args.iter().any(|a| a == "--help") { 0 } else { 1 });
    }

    let log_file = &args[1];
    let mut config_path = "Snake.toml".to_string();
    let mut verbose = false;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => mode = Some(Mode::All),
            "--turns" => {
                mode = Some(Mode::Turns(take_value(&args, i, "--turns")));
                i += 1;
            }
            "--validate" => {
                mode = Some(Mode::Validate(take_value(&args, i, "--validate")));
                i += 1;
            }
            "--config" => {
                config_path = take_value(&args, i, "--config");
                i += 1;
            }
            "--verbose" => verbose = true,
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(mode) = mode else {
        eprintln!("Error: Must specify --all, --turns, or --validate");
        print_usage();
        process::exit(1);
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let engine = ReplayEngine::new(config, verbose);

    let entries = match engine.load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    match mode {
        Mode::All => {
            println!("Replaying all {} turns...\n", entries.len());
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Turns(turn_arg) => {
            let turns = parse_turns(&turn_arg).unwrap_or_else(|e| {
                eprintln!("Error parsing turns: {}", e);
                process::exit(1);
            });

            println!("Replaying {} specific turn(s)...\n", turns.len());
            match engine.replay_turns(&entries, &turns) {
                Ok(results) => engine.print_report(&results),
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
        Mode::Validate(validate_arg) => {
            let expected_moves = parse_expected_moves(&validate_arg).unwrap_or_else(|e| {
                eprintln!("Error parsing expected moves: {}", e);
                process::exit(1);
            });

            println!("Validating {} expected move(s)...\n", expected_moves.len());
            match engine.validate_expected_moves(&entries, &expected_moves) {
                Ok(()) => println!("✓ All expected moves validated successfully!"),
                Err(e) => {
                    eprintln!("✗ Validation failed: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
