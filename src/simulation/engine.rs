//! Lottery simulation engine — runs N synthetic participants per batch.
//!
//! Each synthetic participant behaves like a single-crossing Holt-Laury
//! subject: a switch row is drawn uniformly, the choice vector picks gamble
//! A below it and gamble B from it onward, and the participant then plays
//! every round of a randomly assigned treatment. Batches run in parallel
//! with one deterministic RNG per participant, so a (seed, index) pair
//! reproduces a participant exactly.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;

use crate::error::LotteryError;
use crate::prng::DrawSource;
use crate::session::LotterySession;
use crate::types::{ChoiceVector, ResolvedOutcome};

/// One simulated participant: assigned treatment, behavior parameter, and
/// the outcome of every round.
#[derive(Clone, Debug)]
pub struct ParticipantRecord {
    pub treatment: String,
    pub switch_row: u32,
    pub rounds: Vec<ResolvedOutcome>,
}

/// Results of a batch simulation.
pub struct SimulationResult {
    pub records: Vec<ParticipantRecord>,
    pub seed: u64,
    pub elapsed: std::time::Duration,
}

/// Run one synthetic participant through every round of the experiment.
pub fn simulate_participant(
    session: &LotterySession,
    rng: &mut impl DrawSource,
) -> Result<ParticipantRecord, LotteryError> {
    let config = session.config();
    let n = config.num_choices;
    let role = config.primary_role().clone();

    let treatment = session.assign_treatment(rng).to_string();
    // Switch row in [1, N+1]: N+1 means the participant never switches to B.
    let switch_row = 1 + rng.uniform_below(n + 1);
    let choices = ChoiceVector::from_switch_row(n, switch_row);

    let mut rounds = Vec::with_capacity(config.num_rounds as usize);
    for round in 1..=config.num_rounds {
        let mut lottery = session.enroll_participant(&treatment, rng)?;
        lottery.record_choices(choices.clone())?;
        let outcome = session.resolve_round(&mut lottery, round, &role, rng)?;
        rounds.push(outcome);
    }

    Ok(ParticipantRecord {
        treatment,
        switch_row,
        rounds,
    })
}

/// Simulate N participants in parallel.
///
/// Participant `i` draws from `SmallRng::seed_from_u64(seed + i)`, the same
/// per-item seeding the batch is reproducible under regardless of thread
/// scheduling.
pub fn simulate_batch(
    session: &LotterySession,
    num_participants: usize,
    seed: u64,
) -> Result<SimulationResult, LotteryError> {
    let start = Instant::now();

    let records: Result<Vec<ParticipantRecord>, LotteryError> = (0..num_participants)
        .into_par_iter()
        .map(|i| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
            simulate_participant(session, &mut rng)
        })
        .collect();

    Ok(SimulationResult {
        records: records?,
        seed,
        elapsed: start.elapsed(),
    })
}
