//! # risk-lottery — Holt-Laury Multiple-Price-List Lottery Core
//!
//! Implements the Holt/Laury (2002) risk-elicitation lottery: participants
//! face a list of binary choices between a "safe" gamble A and a "risky"
//! gamble B whose win probability climbs row by row; one row is drawn at
//! random to pay, and the chosen gamble's outcome is drawn with that row's
//! probability.
//!
//! ## Pipeline
//!
//! | Stage | Rust module | Description |
//! |-------|-------------|-------------|
//! | 1 | [`ladder`] | Build the N-row win-probability ladder and display percents |
//! | 2 | [`payoff_tables`] | Expand base payoffs into per-(round, role) amounts under the treatment's scaling rule |
//! | 3 | [`resolver`] | Draw the row-to-pay, look up the choice, draw high/low, null test/hypothetical rounds |
//!
//! Stages 1-2 run once per session ([`session::LotterySession::create`]) and
//! are then shared read-only across all participant resolutions; stage 3
//! runs once per participant per round and caches its [`types::ResolvedOutcome`]
//! so a retry can never redraw.
//!
//! ## Randomness
//!
//! The only nondeterministic steps are the row-to-pay draw and the high/low
//! outcome draw, both behind [`prng::DrawSource`]. Seeded sources reproduce
//! any resolution exactly; the scaled payoff amounts, ladder, and display
//! strings are pure functions of configuration.
//!
//! Page routing, form handling, and participant persistence belong to the
//! host experiment framework: it supplies choice vectors and configuration
//! and stores the resolved outcomes this crate returns.

pub mod config;
pub mod constants;
pub mod error;
pub mod ladder;
pub mod payoff_tables;
pub mod prng;
pub mod resolver;
pub mod session;
pub mod simulation;
pub mod types;
