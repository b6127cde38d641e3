//! Prepayment policy: when to prepay, how much, and how it is split across loans
//!
//! Evaluated once per month after the regular installments and savings accrual.
//! A prepayment fires when savings reach the threshold or can clear all debt.
//! Full payoffs are never rounded; partial prepayments are whole lots only.

use serde::{Deserialize, Serialize};

use crate::loan::{FinanceProfile, PrepaymentStrategy};
use super::state::{total_outstanding, LoanState};

/// Default minimum-lot unit for partial prepayments
pub const DEFAULT_PREPAYMENT_LOT: f64 = 10_000.0;

/// How per-loan rounding of a partial prepayment is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AllocationRounding {
    /// Round each share independently; the whole lot is still recorded and
    /// debited, so loan balances may move by a unit more or less than that
    PreserveDrift,
    /// Give the rounding remainder to the loan with the largest balance
    #[default]
    ReconcileToLargest,
}

/// Outcome of the monthly evaluation, before anything is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrepaymentDecision {
    None,
    /// Savings cover everything owed: clear every loan, no rounding
    FullPayoff { amount: f64 },
    /// Whole number of lots, split proportionally to balances
    Partial { amount: f64 },
}

/// A prepayment that was executed this month
#[derive(Debug, Clone, PartialEq)]
pub struct PrepaymentOutcome {
    pub full_payoff: bool,

    /// Amount recorded for the month and debited from savings
    pub amount: f64,

    /// Principal actually removed from the loans
    pub applied: f64,

    /// Amount applied to each loan, in input order
    pub shares: Vec<f64>,
}

/// Prepayment rules for one simulation run
#[derive(Debug, Clone)]
pub struct PrepaymentPolicy {
    pub threshold: f64,
    pub strategy: PrepaymentStrategy,
    pub lot_size: f64,
    pub rounding: AllocationRounding,
    pub enabled: bool,
}

impl PrepaymentPolicy {
    pub fn new(threshold: f64, strategy: PrepaymentStrategy) -> Self {
        Self {
            threshold,
            strategy,
            lot_size: DEFAULT_PREPAYMENT_LOT,
            rounding: AllocationRounding::default(),
            enabled: true,
        }
    }

    pub fn from_profile(profile: &FinanceProfile) -> Self {
        Self::new(profile.prepayment_threshold, profile.prepayment_strategy)
    }

    /// Decide whether a prepayment fires and how large it is
    pub fn decide(&self, savings: f64, outstanding: f64) -> PrepaymentDecision {
        if !self.enabled || outstanding <= 0.0 {
            return PrepaymentDecision::None;
        }

        let triggered = savings >= self.threshold || savings >= outstanding;
        if !triggered {
            return PrepaymentDecision::None;
        }

        let candidate = savings.min(outstanding);
        if candidate >= outstanding {
            PrepaymentDecision::FullPayoff { amount: outstanding }
        } else if candidate >= self.lot_size {
            PrepaymentDecision::Partial {
                amount: (candidate / self.lot_size).floor() * self.lot_size,
            }
        } else {
            PrepaymentDecision::None
        }
    }

    /// Split `amount` across loans in proportion to `balances`
    ///
    /// Shares are rounded to whole units and never exceed a loan's balance.
    pub fn allocate(&self, amount: f64, balances: &[f64]) -> Vec<f64> {
        let total: f64 = balances.iter().filter(|b| **b > 0.0).sum();
        if total <= 0.0 || amount <= 0.0 {
            return vec![0.0; balances.len()];
        }

        let mut shares: Vec<f64> = balances
            .iter()
            .map(|&balance| {
                if balance > 0.0 {
                    (amount * balance / total).round().min(balance)
                } else {
                    0.0
                }
            })
            .collect();

        if self.rounding == AllocationRounding::ReconcileToLargest {
            let remainder = amount - shares.iter().sum::<f64>();
            if remainder != 0.0 {
                if let Some(largest) = largest_balance_index(balances) {
                    shares[largest] = (shares[largest] + remainder).clamp(0.0, balances[largest]);
                }
            }
        }

        shares
    }

    /// Evaluate and execute this month's prepayment against the loans
    ///
    /// All shares are computed from one snapshot of balances taken before any
    /// loan is touched.
    pub fn apply(&self, savings: f64, loans: &mut [LoanState]) -> Option<PrepaymentOutcome> {
        match self.decide(savings, total_outstanding(loans)) {
            PrepaymentDecision::None => None,
            PrepaymentDecision::FullPayoff { .. } => {
                let shares: Vec<f64> = loans
                    .iter_mut()
                    .map(|loan| {
                        let balance = loan.remaining_balance;
                        loan.apply_prepayment(balance)
                    })
                    .collect();
                let applied = shares.iter().sum();
                Some(PrepaymentOutcome {
                    full_payoff: true,
                    amount: applied,
                    applied,
                    shares,
                })
            }
            PrepaymentDecision::Partial { amount } => {
                let balances: Vec<f64> = loans.iter().map(|l| l.remaining_balance).collect();
                let planned = self.allocate(amount, &balances);

                let shares: Vec<f64> = loans
                    .iter_mut()
                    .zip(planned)
                    .map(|(loan, share)| loan.apply_prepayment(share))
                    .collect();

                if self.strategy == PrepaymentStrategy::ReducePayment {
                    for (loan, share) in loans.iter_mut().zip(&shares) {
                        if *share > 0.0 && loan.is_active() {
                            loan.reamortize();
                        }
                    }
                }

                let applied: f64 = shares.iter().sum();
                let amount = match self.rounding {
                    AllocationRounding::ReconcileToLargest => applied,
                    AllocationRounding::PreserveDrift => amount,
                };
                Some(PrepaymentOutcome {
                    full_payoff: false,
                    amount,
                    applied,
                    shares,
                })
            }
        }
    }
}

/// First index holding the largest positive balance
fn largest_balance_index(balances: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &balance) in balances.iter().enumerate() {
        if balance <= 0.0 {
            continue;
        }
        match best {
            Some(b) if balances[b] >= balance => {}
            _ => best = Some(i),
        }
    }
    best
}
