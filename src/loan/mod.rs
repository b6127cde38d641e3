//! Loan definitions, household profiles, and input loading

mod data;
pub mod loader;

pub use data::{FinanceProfile, Household, LoanAccount, LoanKind, PrepaymentStrategy};
pub use loader::{load_household, load_households, load_loans, load_loans_from_reader};
