//! Scenario runner for batches and strategy comparisons
//!
//! Each run stays single-threaded and deterministic; batches spread whole
//! households across threads, never the months of one household.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::loan::{FinanceProfile, Household, LoanAccount, PrepaymentStrategy};
use crate::schedule::{AmortizationSimulator, ScheduleSummary, SimulationConfig, SimulationResult};

/// One strategy measured against the no-prepayment baseline
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub strategy: PrepaymentStrategy,
    pub summary: ScheduleSummary,
    pub interest_saved: f64,
    /// None when either run hit the month cap
    pub months_saved: Option<i64>,
}

/// Baseline plus both strategies on identical inputs
#[derive(Debug, Clone, Serialize)]
pub struct StrategyComparison {
    pub baseline: ScheduleSummary,
    pub shorten_term: StrategyReport,
    pub reduce_payment: StrategyReport,
}

impl StrategyComparison {
    /// Strategy with the lower total interest (shorten term on ties)
    pub fn cheaper(&self) -> PrepaymentStrategy {
        if self.reduce_payment.summary.total_interest < self.shorten_term.summary.total_interest {
            PrepaymentStrategy::ReducePayment
        } else {
            PrepaymentStrategy::ShortenTerm
        }
    }
}

/// Runs simulations with a shared configuration
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: SimulationConfig,
}

impl ScenarioRunner {
    /// Create runner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    /// Run a single simulation
    pub fn run(&self, loans: &[LoanAccount], profile: &FinanceProfile) -> Result<SimulationResult> {
        AmortizationSimulator::new(self.config.clone()).simulate(loans, profile)
    }

    /// Run many households in parallel; results keep input order
    pub fn run_batch(&self, households: &[Household]) -> Vec<Result<SimulationResult>> {
        let simulator = AmortizationSimulator::new(self.config.clone());
        households
            .par_iter()
            .map(|h| simulator.simulate(&h.loans, &h.profile))
            .collect()
    }

    /// Run the same household under several profiles (e.g. threshold sweeps)
    pub fn run_profiles(
        &self,
        loans: &[LoanAccount],
        profiles: &[FinanceProfile],
    ) -> Vec<Result<SimulationResult>> {
        let simulator = AmortizationSimulator::new(self.config.clone());
        profiles
            .par_iter()
            .map(|profile| simulator.simulate(loans, profile))
            .collect()
    }

    /// Compare both strategies against a run with prepayments disabled
    pub fn compare_strategies(
        &self,
        loans: &[LoanAccount],
        profile: &FinanceProfile,
    ) -> Result<StrategyComparison> {
        let baseline = AmortizationSimulator::new(SimulationConfig {
            allow_prepayment: false,
            ..self.config.clone()
        })
        .simulate(loans, profile)?
        .summary();

        let report = |strategy: PrepaymentStrategy| -> Result<StrategyReport> {
            let summary = self.run(loans, &profile.with_strategy(strategy))?.summary();
            let months_saved = match (baseline.months_to_payoff, summary.months_to_payoff) {
                (Some(base), Some(months)) => Some(base as i64 - months as i64),
                _ => None,
            };
            Ok(StrategyReport {
                strategy,
                interest_saved: baseline.total_interest - summary.total_interest,
                months_saved,
                summary,
            })
        };

        Ok(StrategyComparison {
            shorten_term: report(PrepaymentStrategy::ShortenTerm)?,
            reduce_payment: report(PrepaymentStrategy::ReducePayment)?,
            baseline,
        })
    }
}
