//! Monthly schedule records and run results

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::loan::{LoanKind, PrepaymentStrategy};

/// Per-loan breakdown of one month (only kept with detailed output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanMonthDetail {
    pub kind: LoanKind,
    pub interest_paid: f64,
    /// Regular principal from the installment
    pub principal_paid: f64,
    /// This loan's share of the month's prepayment
    pub prepayment_share: f64,
    pub remaining_balance: f64,
    pub monthly_installment: f64,
    pub remaining_months: u32,
}

impl LoanMonthDetail {
    /// All principal retired this month, regular plus prepaid
    pub fn total_principal(&self) -> f64 {
        self.principal_paid + self.prepayment_share
    }
}

/// One simulated month, totals across all loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// 1-based month index
    pub month: u32,

    /// Regular plus prepaid principal
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub total_payment: f64,

    /// Sum of balances after this month's activity
    pub remaining_loan_balance: f64,

    /// Income minus expense minus scheduled installments
    pub monthly_balance: f64,

    /// Cash buffer after accrual and any prepayment
    pub total_savings: f64,

    pub is_prepayment: bool,
    pub prepayment_amount: f64,

    /// Sum of current installments after this month
    pub current_monthly_installment: f64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loans: Vec<LoanMonthDetail>,
}

impl MonthlyRecord {
    pub fn new(month: u32) -> Self {
        Self {
            month,
            principal_paid: 0.0,
            interest_paid: 0.0,
            total_payment: 0.0,
            remaining_loan_balance: 0.0,
            monthly_balance: 0.0,
            total_savings: 0.0,
            is_prepayment: false,
            prepayment_amount: 0.0,
            current_monthly_installment: 0.0,
            loans: Vec::new(),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationOutcome {
    /// Every loan reached zero in month `months`
    PaidOff { months: u32 },
    /// Stopped at the month cap with debt still outstanding
    CapReached { months: u32, remaining_balance: f64 },
}

impl SimulationOutcome {
    pub fn is_paid_off(&self) -> bool {
        matches!(self, SimulationOutcome::PaidOff { .. })
    }
}

/// Complete schedule of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub strategy: PrepaymentStrategy,
    pub outcome: SimulationOutcome,
    pub records: Vec<MonthlyRecord>,
}

impl SimulationResult {
    /// Month in which the last loan was paid off, if it was
    pub fn months_to_payoff(&self) -> Option<u32> {
        match self.outcome {
            SimulationOutcome::PaidOff { months } => Some(months),
            SimulationOutcome::CapReached { .. } => None,
        }
    }

    pub fn prepayments(&self) -> impl Iterator<Item = &MonthlyRecord> {
        self.records.iter().filter(|r| r.is_prepayment)
    }

    /// Total principal retired for the loan at `index` (needs detailed output)
    pub fn principal_paid_for_loan(&self, index: usize) -> f64 {
        self.records
            .iter()
            .filter_map(|r| r.loans.get(index))
            .map(LoanMonthDetail::total_principal)
            .sum()
    }

    pub fn summary(&self) -> ScheduleSummary {
        let total_interest: f64 = self.records.iter().map(|r| r.interest_paid).sum();
        let total_principal: f64 = self.records.iter().map(|r| r.principal_paid).sum();
        let total_prepaid: f64 = self.records.iter().map(|r| r.prepayment_amount).sum();
        let last = self.records.last();

        ScheduleSummary {
            total_months: self.records.len() as u32,
            months_to_payoff: self.months_to_payoff(),
            total_interest,
            total_principal,
            total_prepaid,
            total_paid: total_interest + total_principal,
            prepayment_count: self.prepayments().count() as u32,
            final_savings: last.map(|r| r.total_savings).unwrap_or(0.0),
            final_balance: last.map(|r| r.remaining_loan_balance).unwrap_or(0.0),
            final_installment: last.map(|r| r.current_monthly_installment).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_months: u32,
    pub months_to_payoff: Option<u32>,
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_prepaid: f64,
    pub total_paid: f64,
    pub prepayment_count: u32,
    pub final_savings: f64,
    pub final_balance: f64,
    pub final_installment: f64,
}

/// Calendar date of a 1-based schedule month, given the first payment date
pub fn payment_date(start: NaiveDate, month: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(month.saturating_sub(1)))
}
