//! Amortization engine: installment math, prepayment policy, and the monthly loop

pub mod installment;
mod state;
mod prepayment;
mod engine;
mod records;

pub use installment::{compute_fixed_installment, periodic_rate, recompute_installment};
pub use state::{LoanState, InstallmentSplit, BALANCE_EPSILON};
pub use prepayment::{
    AllocationRounding, PrepaymentDecision, PrepaymentOutcome, PrepaymentPolicy,
    DEFAULT_PREPAYMENT_LOT,
};
pub use engine::{simulate, AmortizationSimulator, SimulationConfig, DEFAULT_MAX_MONTHS};
pub use records::{
    payment_date, LoanMonthDetail, MonthlyRecord, ScheduleSummary, SimulationOutcome,
    SimulationResult,
};
