//! Month-by-month amortization simulator

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::loan::{FinanceProfile, LoanAccount};
use super::prepayment::{AllocationRounding, PrepaymentPolicy, DEFAULT_PREPAYMENT_LOT};
use super::records::{LoanMonthDetail, MonthlyRecord, SimulationOutcome, SimulationResult};
use super::state::{total_installment, total_outstanding, InstallmentSplit, LoanState};

/// Hard cap on simulated months
pub const DEFAULT_MAX_MONTHS: u32 = 1000;

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Stop after this many months even if debt remains
    pub max_months: u32,

    /// Minimum-lot unit for partial prepayments
    pub prepayment_lot: f64,

    /// Rounding treatment when splitting a prepayment across loans
    pub allocation_rounding: AllocationRounding,

    /// Disable to get the plain amortization baseline
    pub allow_prepayment: bool,

    /// Keep a per-loan breakdown on every record
    pub detailed_output: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
            prepayment_lot: DEFAULT_PREPAYMENT_LOT,
            allocation_rounding: AllocationRounding::ReconcileToLargest,
            allow_prepayment: true,
            detailed_output: false,
        }
    }
}

impl SimulationConfig {
    /// Baseline configuration: scheduled installments only
    pub fn without_prepayment() -> Self {
        Self {
            allow_prepayment: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_months == 0 {
            return Err(SimulationError::invalid("max_months", "must be at least 1"));
        }
        if !self.prepayment_lot.is_finite() || self.prepayment_lot <= 0.0 {
            return Err(SimulationError::invalid(
                "prepayment_lot",
                format!("must be positive, got {}", self.prepayment_lot),
            ));
        }
        Ok(())
    }
}

/// Drives the monthly loop: installments, savings, prepayment, record
#[derive(Debug, Clone, Default)]
pub struct AmortizationSimulator {
    config: SimulationConfig,
}

impl AmortizationSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate the payoff schedule of `loans` funded by `profile`
    ///
    /// Inputs are validated up front; once they pass, the run always completes,
    /// either debt-free or at the month cap.
    pub fn simulate(&self, loans: &[LoanAccount], profile: &FinanceProfile) -> Result<SimulationResult> {
        self.config.validate()?;
        profile.validate()?;
        let mut states = seed_loans(loans)?;
        let policy = self.policy_for(profile);

        let mut savings = profile.initial_savings;
        let mut records = Vec::new();
        let mut month = 1;

        while total_outstanding(&states) > 0.0 && month <= self.config.max_months {
            let record = self.simulate_month(month, &mut states, &mut savings, profile, &policy);
            records.push(record);
            month += 1;
        }

        let months = records.len() as u32;
        let remaining_balance = total_outstanding(&states);
        let outcome = if remaining_balance > 0.0 {
            warn!(
                "no payoff within {} months, {:.2} still outstanding",
                self.config.max_months, remaining_balance
            );
            SimulationOutcome::CapReached { months, remaining_balance }
        } else {
            SimulationOutcome::PaidOff { months }
        };

        info!(
            "simulated {} loan(s) under {}: {:?}",
            loans.len(),
            profile.prepayment_strategy.as_str(),
            outcome
        );

        Ok(SimulationResult {
            strategy: profile.prepayment_strategy,
            outcome,
            records,
        })
    }

    fn policy_for(&self, profile: &FinanceProfile) -> PrepaymentPolicy {
        PrepaymentPolicy {
            lot_size: self.config.prepayment_lot,
            rounding: self.config.allocation_rounding,
            enabled: self.config.allow_prepayment,
            ..PrepaymentPolicy::from_profile(profile)
        }
    }

    /// Calculate a single month
    fn simulate_month(
        &self,
        month: u32,
        loans: &mut [LoanState],
        savings: &mut f64,
        profile: &FinanceProfile,
        policy: &PrepaymentPolicy,
    ) -> MonthlyRecord {
        let mut record = MonthlyRecord::new(month);

        // Installments due this month, fixed before anything is paid
        let scheduled: f64 = loans
            .iter()
            .filter(|l| l.is_active())
            .map(|l| l.monthly_installment)
            .sum();

        let splits: Vec<InstallmentSplit> = loans
            .iter_mut()
            .map(|loan| loan.apply_installment(profile.prepayment_strategy))
            .collect();
        record.interest_paid = splits.iter().map(|s| s.interest).sum();
        record.principal_paid = splits.iter().map(|s| s.principal).sum();

        record.monthly_balance = profile.disposable_income() - scheduled;
        *savings += record.monthly_balance;

        let prepayment = policy.apply(*savings, loans);
        if let Some(executed) = &prepayment {
            debug!(
                "month {}: {} prepayment of {:.2}",
                month,
                if executed.full_payoff { "full" } else { "partial" },
                executed.amount
            );
            *savings -= executed.amount;
            record.is_prepayment = true;
            record.prepayment_amount = executed.amount;
            record.principal_paid += executed.applied;
        }

        record.total_payment = record.principal_paid + record.interest_paid;
        record.remaining_loan_balance = total_outstanding(loans);
        record.total_savings = *savings;
        record.current_monthly_installment = total_installment(loans);

        if self.config.detailed_output {
            record.loans = loans
                .iter()
                .zip(&splits)
                .enumerate()
                .map(|(i, (loan, split))| LoanMonthDetail {
                    kind: loan.kind,
                    interest_paid: split.interest,
                    principal_paid: split.principal,
                    prepayment_share: prepayment.as_ref().map_or(0.0, |p| p.shares[i]),
                    remaining_balance: loan.remaining_balance,
                    monthly_installment: loan.monthly_installment,
                    remaining_months: loan.remaining_months,
                })
                .collect();
        }

        record
    }
}

/// Validate the caller's loans and build fresh run-state for each
fn seed_loans(loans: &[LoanAccount]) -> Result<Vec<LoanState>> {
    if loans.is_empty() {
        return Err(SimulationError::NoLoans);
    }

    loans
        .iter()
        .enumerate()
        .map(|(index, loan)| {
            loan.validate(index)?;
            let state = LoanState::from_loan(loan);
            let interest = state.interest_due();
            if !state.monthly_installment.is_finite() || state.monthly_installment <= interest {
                return Err(SimulationError::NonAmortizing {
                    index,
                    installment: state.monthly_installment,
                    interest,
                });
            }
            Ok(state)
        })
        .collect()
}

/// Simulate with the default configuration
pub fn simulate(loans: &[LoanAccount], profile: &FinanceProfile) -> Result<SimulationResult> {
    AmortizationSimulator::default().simulate(loans, profile)
}
