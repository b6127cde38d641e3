//! Loan Prepay - month-by-month payoff simulation for household loans
//!
//! This library provides:
//! - Equal-installment payment calculation and re-amortization
//! - A prepayment policy that turns surplus savings into lump-sum prepayments
//! - The monthly simulator producing one record per month until debt-free
//! - Strategy comparison and parallel batch runs

pub mod error;
pub mod loan;
pub mod schedule;
pub mod scenario;

// Re-export commonly used types
pub use error::{LoadError, SimulationError};
pub use loan::{FinanceProfile, Household, LoanAccount, LoanKind, PrepaymentStrategy};
pub use schedule::{
    simulate, AmortizationSimulator, MonthlyRecord, SimulationConfig, SimulationOutcome,
    SimulationResult,
};
pub use scenario::{ScenarioRunner, StrategyComparison};
