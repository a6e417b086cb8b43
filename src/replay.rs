// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Replay the search on historical states
// 3. Compare logged vs replayed moves
// 4. Generate summary reports

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::bot::Bot;
use crate::config::Config;
use crate::error::EngineError;
use crate::grid::Direction;
use crate::types::{Board, Game};

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub turn: i32,
    /// Older logs lack the id; the first snake on the board is assumed then
    #[serde(default)]
    pub you_id: String,
    pub chosen_move: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub depth: u8,
    pub board: Board,
    pub timestamp: String,
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub replayed_value: f64,
    pub search_depth: u8,
    pub used_fallback: bool,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    bot: Bot,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            bot: Bot::new(config),
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, EngineError> {
        let file = File::open(log_path.as_ref()).map_err(EngineError::LogRead)?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(EngineError::LogRead)?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line).map_err(|source| EngineError::LogParse {
                line: line_num + 1,
                source,
            })?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, EngineError> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let you = if entry.you_id.is_empty() {
            entry.board.snakes.first()
        } else {
            entry.board.snakes.iter().find(|s| s.id == entry.you_id)
        }
        .ok_or_else(|| EngineError::UnknownEntity(entry.you_id.clone()))?;

        let original_move: Direction = entry.chosen_move.parse()?;

        let game = Game {
            id: "replay".to_string(),
            ruleset: HashMap::new(),
            timeout: self.bot.config().timing.response_time_budget_ms as u32,
            source: None,
        };
        let decision = self.bot.compute_move(&game, entry.turn, &entry.board, you);
        let outcome = decision.outcome.as_ref();

        let result = ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move: decision.direction,
            matches: original_move == decision.direction,
            replayed_value: outcome.map_or(f64::NEG_INFINITY, |o| o.value),
            search_depth: outcome.map_or(0, |o| o.depth),
            used_fallback: decision.used_fallback,
            computation_time_ms: decision.elapsed_ms,
        };

        if self.verbose {
            if result.matches {
                info!(
                    "Turn {}: ✓ MATCH - {} (score: {}, depth: {}, time: {}ms)",
                    result.turn,
                    result.replayed_move,
                    result.replayed_value,
                    result.search_depth,
                    result.computation_time_ms
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} (score: {}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_value,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file. Turns are independent, so they run in parallel.
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results: Vec<ReplayResult> = entries
            .par_iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                    None
                }
            })
            .collect();

        results.sort_by_key(|r| r.turn);
        results
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, EngineError> {
        let mut results = Vec::new();

        for &turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == turn_num)
                .ok_or(EngineError::TurnNotFound(turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!(
            "Fallbacks:      {}",
            results.iter().filter(|r| r.used_fallback).count()
        );
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>()
                / results.len() as f64;
            let avg_depth: f64 =
                results.iter().map(|r| r.search_depth as f64).sum::<f64>() / results.len() as f64;

            println!("Average Search Depth:       {:.1}", avg_depth);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (score: {}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_value,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that the logged moves are among the acceptable ones
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(i32, Vec<Direction>)],
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| EngineError::TurnNotFound(*turn).to_string())?;

            let actual_move: Direction = entry.chosen_move.parse().map_err(|e: EngineError| e.to_string())?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move
                ));
            }
        }

        Ok(())
    }
}
