//! Per-loan run-state tracked during a simulation

use crate::loan::{LoanAccount, LoanKind, PrepaymentStrategy};
use super::installment::{compute_fixed_installment, recompute_installment};

/// Balances below this are floating-point residue, not debt
pub const BALANCE_EPSILON: f64 = 1e-6;

/// Mutable state of one loan, created fresh for every run
#[derive(Debug, Clone)]
pub struct LoanState {
    pub kind: LoanKind,

    /// Monthly interest rate as a decimal
    pub periodic_rate: f64,

    pub original_principal: f64,

    pub remaining_balance: f64,

    /// Current fixed installment (0 once the loan is paid off)
    pub monthly_installment: f64,

    /// Scheduled months left; only counted down under REDUCE_PAYMENT
    pub remaining_months: u32,
}

/// Split of one regular installment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InstallmentSplit {
    pub interest: f64,
    pub principal: f64,
}

impl LoanState {
    /// Seed run-state from a caller-supplied loan
    pub fn from_loan(loan: &LoanAccount) -> Self {
        let term_months = loan.term_months();
        Self {
            kind: loan.kind,
            periodic_rate: loan.periodic_rate(),
            original_principal: loan.principal,
            remaining_balance: loan.principal,
            monthly_installment: compute_fixed_installment(
                loan.principal,
                loan.annual_rate_percent,
                term_months,
            ),
            remaining_months: term_months,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining_balance > 0.0
    }

    /// Interest accrued on the current balance for one month
    pub fn interest_due(&self) -> f64 {
        self.remaining_balance * self.periodic_rate
    }

    /// Apply this month's scheduled installment
    ///
    /// Interest is charged on the balance before any principal is removed.
    pub fn apply_installment(&mut self, strategy: PrepaymentStrategy) -> InstallmentSplit {
        if !self.is_active() {
            return InstallmentSplit::default();
        }

        let interest = self.interest_due();
        let mut principal = (self.monthly_installment - interest).min(self.remaining_balance);

        let mut final_scheduled_month = false;
        if strategy == PrepaymentStrategy::ReducePayment {
            self.remaining_months = self.remaining_months.saturating_sub(1);
            final_scheduled_month = self.remaining_months == 0;
        }

        // Last scheduled payment settles any residue left by re-amortization
        if final_scheduled_month || self.remaining_balance - principal < BALANCE_EPSILON {
            principal = self.remaining_balance;
        }

        self.remaining_balance -= principal;
        self.settle_if_paid();

        InstallmentSplit { interest, principal }
    }

    /// Reduce the balance by a prepayment share, returning the amount applied
    pub fn apply_prepayment(&mut self, amount: f64) -> f64 {
        let applied = amount.clamp(0.0, self.remaining_balance.max(0.0));
        self.remaining_balance -= applied;
        if self.remaining_balance < BALANCE_EPSILON {
            self.remaining_balance = 0.0;
        }
        self.settle_if_paid();
        applied
    }

    /// Re-amortize the balance over the months left, keeping the payoff date
    pub fn reamortize(&mut self) {
        self.monthly_installment = recompute_installment(
            self.remaining_balance,
            self.periodic_rate,
            self.remaining_months,
        );
    }

    fn settle_if_paid(&mut self) {
        if self.remaining_balance <= 0.0 {
            self.remaining_balance = 0.0;
            self.monthly_installment = 0.0;
        }
    }
}

/// Sum of outstanding balances across loans
pub fn total_outstanding(loans: &[LoanState]) -> f64 {
    loans.iter().map(|l| l.remaining_balance).sum()
}

/// Sum of current installments across loans
pub fn total_installment(loans: &[LoanState]) -> f64 {
    loans.iter().map(|l| l.monthly_installment).sum()
}
