//! Session-scope setup and participant enrollment.
//!
//! [`LotterySession::create`] is the single-writer phase: it validates the
//! configuration and eagerly builds the ladder plus one payoff table per
//! treatment. The finished session is read-only and can be shared across
//! all participant resolutions without synchronization. It must complete
//! before any decision page is served.

use std::collections::BTreeMap;

use crate::config::SessionConfig;
use crate::error::LotteryError;
use crate::ladder::{build_ladder, ChoiceRow};
use crate::payoff_tables::{build_payoff_table, PayoffTable};
use crate::prng::DrawSource;
use crate::resolver::{select_row_to_pay, ParticipantLottery};
use crate::types::{GambleSpec, PayTreatmentFlags, ResolvedOutcome, Role};

/// Immutable session state: the ladder and the per-treatment payoff tables.
pub struct LotterySession {
    config: SessionConfig,
    ladder: Vec<ChoiceRow>,
    tables: BTreeMap<String, PayoffTable>,
}

impl LotterySession {
    /// Validate the configuration and build all session-scope data.
    /// Fails with `InvalidConfiguration` and aborts session creation on any
    /// malformed input.
    pub fn create(config: SessionConfig) -> Result<Self, LotteryError> {
        config.validate()?;
        let ladder = build_ladder(&config)?;
        let mut tables = BTreeMap::new();
        for schedule in &config.treatments {
            let table = build_payoff_table(&config, schedule)?;
            tables.insert(schedule.name.clone(), table);
        }
        Ok(LotterySession {
            config,
            ladder,
            tables,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn ladder(&self) -> &[ChoiceRow] {
        &self.ladder
    }

    pub fn treatment_names(&self) -> impl Iterator<Item = &str> {
        self.config.treatments.iter().map(|t| t.name.as_str())
    }

    /// Uniform random treatment assignment, done once per participant at
    /// the start of the experiment.
    pub fn assign_treatment(&self, rng: &mut impl DrawSource) -> &str {
        let index = rng.uniform_below(self.config.treatments.len() as u32);
        self.config.treatments[index as usize].name.as_str()
    }

    /// Payoff table for a treatment.
    pub fn payoff_table(&self, treatment: &str) -> Result<&PayoffTable, LotteryError> {
        self.tables.get(treatment).ok_or_else(|| {
            LotteryError::InvalidConfiguration(format!("unknown treatment {}", treatment))
        })
    }

    /// Pre-scaled amounts for (treatment, round, role): what the decision
    /// page displays and the resolver draws from.
    pub fn gamble_spec(
        &self,
        treatment: &str,
        round: u32,
        role: &Role,
    ) -> Result<&GambleSpec, LotteryError> {
        self.payoff_table(treatment)?
            .get(round, role)
            .ok_or_else(|| {
                LotteryError::InvalidConfiguration(format!(
                    "no payoffs for treatment {} round {} role {}",
                    treatment, round, role
                ))
            })
    }

    /// Payment flags for (treatment, round).
    pub fn flags(&self, treatment: &str, round: u32) -> Result<&PayTreatmentFlags, LotteryError> {
        let schedule = self
            .config
            .treatments
            .iter()
            .find(|t| t.name == treatment)
            .ok_or_else(|| {
                LotteryError::InvalidConfiguration(format!("unknown treatment {}", treatment))
            })?;
        schedule.flags_for_round(round).ok_or_else(|| {
            LotteryError::InvalidConfiguration(format!(
                "treatment {} has no round {}",
                treatment, round
            ))
        })
    }

    /// Enroll one participant-round: draw its row-to-pay (fixed before any
    /// choice is collected) and hand back the lottery in `AwaitingChoices`.
    pub fn enroll_participant(
        &self,
        treatment: &str,
        rng: &mut impl DrawSource,
    ) -> Result<ParticipantLottery, LotteryError> {
        // Reject unknown treatments at enrollment, not at resolution.
        self.payoff_table(treatment)?;
        let row_to_pay = select_row_to_pay(self.config.num_choices, rng);
        Ok(ParticipantLottery::new(
            treatment,
            self.config.num_choices,
            row_to_pay,
        ))
    }

    /// Resolve one enrolled participant-round against this session's data.
    pub fn resolve_round(
        &self,
        lottery: &mut ParticipantLottery,
        round: u32,
        role: &Role,
        rng: &mut impl DrawSource,
    ) -> Result<ResolvedOutcome, LotteryError> {
        let treatment = lottery.treatment().to_string();
        let spec = self.gamble_spec(&treatment, round, role)?;
        let flags = self.flags(&treatment, round)?;
        lottery.resolve_with(
            spec,
            &self.ladder,
            flags,
            self.config.probability_rule,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::SplitMix64;
    use crate::types::ChoiceVector;

    #[test]
    fn test_create_builds_all_tables() {
        let session = LotterySession::create(SessionConfig::default_experiment()).unwrap();
        assert_eq!(session.ladder().len(), 10);
        let names: Vec<&str> = session.treatment_names().collect();
        assert_eq!(names, vec!["lo", "hi"]);
        for name in names {
            let table = session.payoff_table(name).unwrap();
            assert_eq!(table.len(), 3);
        }
    }

    #[test]
    fn test_create_rejects_bad_config() {
        let mut config = SessionConfig::default_experiment();
        config.num_choices = 0;
        assert!(LotterySession::create(config).is_err());
    }

    #[test]
    fn test_assign_treatment_hits_both() {
        let session = LotterySession::create(SessionConfig::default_experiment()).unwrap();
        let mut rng = SplitMix64::new(3);
        let mut saw_lo = false;
        let mut saw_hi = false;
        for _ in 0..100 {
            match session.assign_treatment(&mut rng) {
                "lo" => saw_lo = true,
                "hi" => saw_hi = true,
                other => panic!("unexpected treatment {}", other),
            }
        }
        assert!(saw_lo && saw_hi);
    }

    #[test]
    fn test_unknown_treatment_rejected() {
        let session = LotterySession::create(SessionConfig::default_experiment()).unwrap();
        let mut rng = SplitMix64::new(3);
        assert!(session.enroll_participant("mid", &mut rng).is_err());
        assert!(session.payoff_table("mid").is_err());
        assert!(session.flags("mid", 1).is_err());
    }

    #[test]
    fn test_enroll_and_resolve_round() {
        let session = LotterySession::create(SessionConfig::default_experiment()).unwrap();
        let role = session.config().primary_role().clone();
        let mut rng = SplitMix64::new(11);

        let mut lottery = session.enroll_participant("lo", &mut rng).unwrap();
        lottery
            .record_choices(ChoiceVector::from_switch_row(10, 5))
            .unwrap();

        // Round 1 is the test round: drawn but unpaid.
        let outcome = session
            .resolve_round(&mut lottery, 1, &role, &mut rng)
            .unwrap();
        assert_eq!(outcome.final_payoff, 0.0);
        assert!(outcome.drawn_amount > 0.0);

        // A separate participant-round for round 2 pays the drawn amount.
        let mut lottery2 = session.enroll_participant("lo", &mut rng).unwrap();
        lottery2
            .record_choices(ChoiceVector::from_switch_row(10, 5))
            .unwrap();
        let outcome2 = session
            .resolve_round(&mut lottery2, 2, &role, &mut rng)
            .unwrap();
        assert_eq!(outcome2.final_payoff, outcome2.drawn_amount);
    }
}
