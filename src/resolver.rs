//! Lottery Resolver: row-to-pay selection, the weighted outcome draw, and
//! the per-participant-round state machine.
//!
//! A participant-round moves through
//! `AwaitingChoices -> ChoiceRecorded -> RowSelected -> OutcomeDrawn ->
//! Finalized`. The row-to-pay is *fixed* at enrollment, before any choice is
//! collected (it does not depend on the choice vector, and fixing it early
//! removes any appearance of outcome-dependent selection), but its identity
//! is revealed to the participant only after choices are recorded.
//!
//! Resolution is idempotent: once finalized, repeat calls return the cached
//! [`ResolvedOutcome`] and never redraw.

use crate::config::WinProbabilityRule;
use crate::error::LotteryError;
use crate::ladder::ChoiceRow;
use crate::prng::DrawSource;
use crate::types::{ChoiceVector, Gamble, GambleSpec, PayTreatmentFlags, ResolvedOutcome};

/// Draw the row that will pay, uniform over the inclusive range `[1, N]`.
///
/// Every row can be drawn, including the last one. Drawn once per
/// participant per round, before choices are submitted.
pub fn select_row_to_pay(num_choices: u32, rng: &mut impl DrawSource) -> u32 {
    debug_assert!(num_choices >= 2, "ladder has at least 2 rows");
    1 + rng.uniform_below(num_choices)
}

/// High-outcome probability for the chosen gamble at a ladder row.
#[inline(always)]
fn high_probability(row: &ChoiceRow, chosen: Gamble, rule: WinProbabilityRule) -> f64 {
    match rule {
        WinProbabilityRule::TiedToGambleA => row.probability_a,
        WinProbabilityRule::PerGambleColumn => match chosen {
            Gamble::A => row.probability_a,
            Gamble::B => row.probability_b,
        },
    }
}

/// Resolve one participant-round: look up the choice at the paid row, draw
/// high or low from the chosen gamble, and null the payoff on test or
/// hypothetical rounds.
///
/// Amounts in `spec` arrive pre-scaled by the payoff-table builder; no
/// multiplier is applied here. Fails with `MissingChoice` before consuming
/// any draw if the paid row has no recorded choice.
pub fn resolve(
    choices: &ChoiceVector,
    row_to_pay: u32,
    spec: &GambleSpec,
    ladder: &[ChoiceRow],
    flags: &PayTreatmentFlags,
    rule: WinProbabilityRule,
    rng: &mut impl DrawSource,
) -> Result<ResolvedOutcome, LotteryError> {
    let chosen_gamble = choices
        .get(row_to_pay)
        .ok_or(LotteryError::MissingChoice { row: row_to_pay })?;

    let row = ladder
        .get(row_to_pay as usize - 1)
        .filter(|row| row.index == row_to_pay)
        .ok_or_else(|| {
            LotteryError::InvalidConfiguration(format!(
                "row {} outside ladder of {} rows",
                row_to_pay,
                ladder.len()
            ))
        })?;

    let p = high_probability(row, chosen_gamble, rule);
    let outcome = spec.outcome(chosen_gamble);
    let drawn_amount = if rng.unit() < p {
        outcome.high
    } else {
        outcome.low
    };

    let final_payoff = if flags.pays_out() { drawn_amount } else { 0.0 };

    Ok(ResolvedOutcome {
        row_to_pay,
        chosen_gamble,
        drawn_amount,
        final_payoff,
    })
}

/// Lifecycle of one participant-round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LotteryPhase {
    AwaitingChoices,
    ChoiceRecorded,
    RowSelected,
    OutcomeDrawn,
    Finalized,
}

/// One participant's lottery for one round: the fixed row-to-pay, the
/// collected choices, and (after resolution) the cached outcome.
#[derive(Clone, Debug)]
pub struct ParticipantLottery {
    treatment: String,
    row_to_pay: u32,
    choices: ChoiceVector,
    phase: LotteryPhase,
    outcome: Option<ResolvedOutcome>,
}

impl ParticipantLottery {
    /// Start a participant-round with an already-drawn row-to-pay.
    pub fn new(treatment: impl Into<String>, num_choices: u32, row_to_pay: u32) -> Self {
        debug_assert!(
            row_to_pay >= 1 && row_to_pay <= num_choices,
            "row_to_pay {} out of range 1..={}",
            row_to_pay,
            num_choices
        );
        ParticipantLottery {
            treatment: treatment.into(),
            row_to_pay,
            choices: ChoiceVector::new(num_choices),
            phase: LotteryPhase::AwaitingChoices,
            outcome: None,
        }
    }

    pub fn treatment(&self) -> &str {
        &self.treatment
    }

    pub fn phase(&self) -> LotteryPhase {
        self.phase
    }

    pub fn choices(&self) -> &ChoiceVector {
        &self.choices
    }

    /// The paid row, for the host's persistence slot. Fixed at enrollment;
    /// must not be shown to the participant before choices are recorded
    /// (use [`ParticipantLottery::revealed_row`] for display).
    pub fn row_to_pay(&self) -> u32 {
        self.row_to_pay
    }

    /// The paid row, gated on the reveal policy: `None` until choices have
    /// been recorded, so a host cannot leak it onto the decision page.
    pub fn revealed_row(&self) -> Option<u32> {
        if self.phase >= LotteryPhase::ChoiceRecorded {
            Some(self.row_to_pay)
        } else {
            None
        }
    }

    /// Record one row's decision. The round advances to `ChoiceRecorded`
    /// once every row is answered.
    pub fn record_choice(&mut self, row: u32, gamble: Gamble) -> Result<(), LotteryError> {
        if self.phase == LotteryPhase::Finalized {
            return Err(LotteryError::AlreadyResolved);
        }
        self.choices.record(row, gamble);
        if self.choices.is_complete() {
            self.phase = LotteryPhase::ChoiceRecorded;
        }
        Ok(())
    }

    /// Replace the whole choice vector (full form submission).
    pub fn record_choices(&mut self, choices: ChoiceVector) -> Result<(), LotteryError> {
        if self.phase == LotteryPhase::Finalized {
            return Err(LotteryError::AlreadyResolved);
        }
        debug_assert_eq!(choices.len(), self.choices.len());
        self.choices = choices;
        if self.choices.is_complete() {
            self.phase = LotteryPhase::ChoiceRecorded;
        }
        Ok(())
    }

    /// Resolve this round, or return the cached outcome if already
    /// finalized. The draw happens at most once per participant-round; a
    /// `MissingChoice` failure leaves the phase unchanged and consumes no
    /// draw, so the caller can re-prompt and retry.
    pub fn resolve_with(
        &mut self,
        spec: &GambleSpec,
        ladder: &[ChoiceRow],
        flags: &PayTreatmentFlags,
        rule: WinProbabilityRule,
        rng: &mut impl DrawSource,
    ) -> Result<ResolvedOutcome, LotteryError> {
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }

        // The row identity becomes revealable from here on; a failed
        // resolution rolls the phase back so the caller can re-prompt.
        let entry_phase = self.phase;
        self.phase = LotteryPhase::RowSelected;
        let outcome = match resolve(
            &self.choices,
            self.row_to_pay,
            spec,
            ladder,
            flags,
            rule,
            rng,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.phase = entry_phase;
                return Err(err);
            }
        };
        self.phase = LotteryPhase::OutcomeDrawn;
        self.outcome = Some(outcome.clone());
        self.phase = LotteryPhase::Finalized;
        Ok(outcome)
    }

    /// The cached outcome, if finalized.
    pub fn outcome(&self) -> Option<&ResolvedOutcome> {
        self.outcome.as_ref()
    }
}
