//! Statistics aggregation from simulated participants.
//!
//! Computes per-treatment, per-round payoff distributions, the realized
//! high-draw rate, the chosen-gamble split at paid rows, and row-to-pay
//! occupancy, and serializes the lot as JSON for offline analysis.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::session::LotterySession;
use crate::types::Gamble;

use super::engine::ParticipantRecord;

// ── Top-level statistics ────────────────────────────────────────────

#[derive(Serialize)]
pub struct LotteryStatistics {
    pub num_participants: u64,
    pub seed: u64,
    /// Mean of the ladder's A-probabilities: the expected high-draw rate
    /// when rows are paid uniformly and the draw is tied to gamble A.
    pub expected_high_rate: f64,
    pub high_draw_rate: f64,
    pub gamble_split: GambleSplit,
    pub mean_switch_row: f64,
    pub row_to_pay: Vec<RowOccupancyEntry>,
    pub treatments: Vec<TreatmentStatistics>,
}

/// Fraction of paid rows where each gamble was the recorded choice.
#[derive(Serialize)]
pub struct GambleSplit {
    pub chose_a: f64,
    pub chose_b: f64,
}

/// How often each ladder row was drawn to pay, across all rounds.
#[derive(Serialize)]
pub struct RowOccupancyEntry {
    pub row: u32,
    pub probability: f64,
}

// ── Per-treatment statistics ────────────────────────────────────────

#[derive(Serialize)]
pub struct TreatmentStatistics {
    pub name: String,
    pub num_participants: u64,
    pub rounds: Vec<RoundStatistics>,
}

#[derive(Serialize)]
pub struct RoundStatistics {
    pub round: u32,
    pub mean_payoff: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Fraction of participants whose final payoff was zero (test and
    /// hypothetical rounds null every payoff).
    pub zero_rate: f64,
}

// ── Aggregation ─────────────────────────────────────────────────────

/// Aggregate statistics from a batch of simulated participants.
pub fn aggregate_statistics(
    session: &LotterySession,
    records: &[ParticipantRecord],
    seed: u64,
) -> LotteryStatistics {
    let num_participants = records.len() as u64;
    let role = session.config().primary_role().clone();

    let expected_high_rate = {
        let ladder = session.ladder();
        ladder.iter().map(|r| r.probability_a).sum::<f64>() / ladder.len().max(1) as f64
    };

    // ── Draw-level tallies across all rounds ────────────────────
    let mut total_draws = 0u64;
    let mut high_draws = 0u64;
    let mut chose_a = 0u64;
    let mut row_counts: BTreeMap<u32, u64> = BTreeMap::new();

    for record in records {
        for (round_idx, outcome) in record.rounds.iter().enumerate() {
            let round = round_idx as u32 + 1;
            total_draws += 1;
            *row_counts.entry(outcome.row_to_pay).or_insert(0) += 1;
            if outcome.chosen_gamble == Gamble::A {
                chose_a += 1;
            }
            // An outcome is a high draw iff it equals the chosen gamble's
            // pre-scaled high amount for that treatment and round.
            if let Ok(spec) = session.gamble_spec(&record.treatment, round, &role) {
                if outcome.drawn_amount == spec.outcome(outcome.chosen_gamble).high {
                    high_draws += 1;
                }
            }
        }
    }

    let draws = total_draws.max(1) as f64;
    let high_draw_rate = high_draws as f64 / draws;
    let gamble_split = GambleSplit {
        chose_a: chose_a as f64 / draws,
        chose_b: (total_draws - chose_a) as f64 / draws,
    };

    let row_to_pay: Vec<RowOccupancyEntry> = row_counts
        .iter()
        .map(|(&row, &count)| RowOccupancyEntry {
            row,
            probability: count as f64 / draws,
        })
        .collect();

    let switch_sum: f64 = records.iter().map(|r| r.switch_row as f64).sum();
    let mean_switch_row = switch_sum / records.len().max(1) as f64;

    // ── Per-treatment, per-round payoffs ────────────────────────
    let mut by_treatment: BTreeMap<&str, Vec<&ParticipantRecord>> = BTreeMap::new();
    for record in records {
        by_treatment
            .entry(record.treatment.as_str())
            .or_default()
            .push(record);
    }

    let treatments: Vec<TreatmentStatistics> = by_treatment
        .into_iter()
        .map(|(name, group)| {
            let num_rounds = session.config().num_rounds;
            let rounds = (1..=num_rounds)
                .map(|round| {
                    let payoffs: Vec<f64> = group
                        .iter()
                        .filter_map(|r| r.rounds.get(round as usize - 1))
                        .map(|o| o.final_payoff)
                        .collect();
                    let n = payoffs.len().max(1) as f64;
                    let mean = payoffs.iter().sum::<f64>() / n;
                    let variance =
                        payoffs.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
                    let zero_count = payoffs.iter().filter(|&&p| p == 0.0).count();
                    RoundStatistics {
                        round,
                        mean_payoff: mean,
                        std_dev: variance.sqrt(),
                        min: payoffs.iter().copied().fold(f64::INFINITY, f64::min),
                        max: payoffs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                        zero_rate: zero_count as f64 / n,
                    }
                })
                .collect();
            TreatmentStatistics {
                name: name.to_string(),
                num_participants: group.len() as u64,
                rounds,
            }
        })
        .collect();

    LotteryStatistics {
        num_participants,
        seed,
        expected_high_rate,
        high_draw_rate,
        gamble_split,
        mean_switch_row,
        row_to_pay,
        treatments,
    }
}

/// Save aggregated statistics as JSON.
pub fn save_statistics(stats: &LotteryStatistics, path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(stats).expect("Failed to serialize statistics");
    std::fs::write(path, json).expect("Failed to write statistics file");
}
