//! Loan and household finance data structures

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result, SimulationError};
use crate::schedule::installment::periodic_rate;

/// Kind of loan. Informational only, it never changes the math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanKind {
    /// Housing provident fund loan
    HousingFund,
    /// Commercial bank loan
    Commercial,
}

impl LoanKind {
    /// Wire name used in CSV and JSON files
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanKind::HousingFund => "HOUSING_FUND",
            LoanKind::Commercial => "COMMERCIAL",
        }
    }
}

impl FromStr for LoanKind {
    type Err = LoadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "HOUSING_FUND" => Ok(LoanKind::HousingFund),
            "COMMERCIAL" => Ok(LoanKind::Commercial),
            _ => Err(LoadError::UnknownLoanKind(s.to_string())),
        }
    }
}

/// What a partial prepayment does to the loan afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrepaymentStrategy {
    /// Keep the installment, pay off earlier
    ShortenTerm,
    /// Keep the payoff date, lower the installment
    ReducePayment,
}

impl PrepaymentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrepaymentStrategy::ShortenTerm => "SHORTEN_TERM",
            PrepaymentStrategy::ReducePayment => "REDUCE_PAYMENT",
        }
    }
}

impl FromStr for PrepaymentStrategy {
    type Err = LoadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SHORTEN_TERM" => Ok(PrepaymentStrategy::ShortenTerm),
            "REDUCE_PAYMENT" => Ok(PrepaymentStrategy::ReducePayment),
            _ => Err(LoadError::UnknownStrategy(s.to_string())),
        }
    }
}

/// A loan as supplied by the caller. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAccount {
    pub kind: LoanKind,

    /// Original borrowed amount
    pub principal: f64,

    /// Nominal annual rate as a percentage (4.5 means 4.5%)
    pub annual_rate_percent: f64,

    pub term_years: u32,
}

impl LoanAccount {
    pub fn new(kind: LoanKind, principal: f64, annual_rate_percent: f64, term_years: u32) -> Self {
        Self {
            kind,
            principal,
            annual_rate_percent,
            term_years,
        }
    }

    /// Original term in months
    pub fn term_months(&self) -> u32 {
        self.term_years.saturating_mul(12)
    }

    /// Monthly interest rate as a decimal
    pub fn periodic_rate(&self) -> f64 {
        periodic_rate(self.annual_rate_percent)
    }

    /// Check the loan definition. `index` is its position in the caller's list.
    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(SimulationError::NonPositivePrincipal {
                index,
                value: self.principal,
            });
        }
        if self.term_years == 0 {
            return Err(SimulationError::ZeroTerm { index });
        }
        if !self.annual_rate_percent.is_finite() {
            return Err(SimulationError::invalid(
                "annual_rate_percent",
                format!("loan {index}: rate must be finite"),
            ));
        }
        if self.annual_rate_percent < 0.0 {
            return Err(SimulationError::NegativeRate {
                index,
                value: self.annual_rate_percent,
            });
        }
        Ok(())
    }
}

/// Household cashflow profile, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceProfile {
    pub monthly_income: f64,
    pub monthly_expense: f64,

    /// Cash buffer at the start of month 1
    #[serde(default)]
    pub initial_savings: f64,

    /// Savings level at which a prepayment is evaluated
    pub prepayment_threshold: f64,

    pub prepayment_strategy: PrepaymentStrategy,
}

impl FinanceProfile {
    /// Income left after living expenses, before any installment
    pub fn disposable_income(&self) -> f64 {
        self.monthly_income - self.monthly_expense
    }

    /// Same profile with a different strategy
    pub fn with_strategy(&self, strategy: PrepaymentStrategy) -> Self {
        Self {
            prepayment_strategy: strategy,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("monthly_income", self.monthly_income),
            ("monthly_expense", self.monthly_expense),
            ("initial_savings", self.initial_savings),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(SimulationError::invalid(field, "must be a finite number"));
            }
        }
        // An infinite threshold is a legitimate "never by threshold" setting
        if self.prepayment_threshold.is_nan() || self.prepayment_threshold < 0.0 {
            return Err(SimulationError::invalid(
                "prepayment_threshold",
                format!("must be non-negative, got {}", self.prepayment_threshold),
            ));
        }
        Ok(())
    }
}

/// A named set of loans plus the profile that pays them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    #[serde(default)]
    pub name: String,
    pub loans: Vec<LoanAccount>,
    pub profile: FinanceProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> FinanceProfile {
        FinanceProfile {
            monthly_income: 20_000.0,
            monthly_expense: 6_000.0,
            initial_savings: 0.0,
            prepayment_threshold: 50_000.0,
            prepayment_strategy: PrepaymentStrategy::ShortenTerm,
        }
    }

    #[test]
    fn test_loan_validation() {
        assert!(LoanAccount::new(LoanKind::Commercial, 100_000.0, 4.9, 20).validate(0).is_ok());
        assert!(LoanAccount::new(LoanKind::HousingFund, 100_000.0, 0.0, 1).validate(0).is_ok());

        assert_eq!(
            LoanAccount::new(LoanKind::Commercial, 0.0, 4.9, 20).validate(2),
            Err(SimulationError::NonPositivePrincipal { index: 2, value: 0.0 })
        );
        assert_eq!(
            LoanAccount::new(LoanKind::Commercial, 1_000.0, 4.9, 0).validate(1),
            Err(SimulationError::ZeroTerm { index: 1 })
        );
        assert_eq!(
            LoanAccount::new(LoanKind::Commercial, 1_000.0, -0.1, 5).validate(0),
            Err(SimulationError::NegativeRate { index: 0, value: -0.1 })
        );
        assert!(matches!(
            LoanAccount::new(LoanKind::Commercial, 1_000.0, f64::NAN, 5).validate(0),
            Err(SimulationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile().validate().is_ok());

        // Spending more than earning is allowed
        let deficit = FinanceProfile { monthly_expense: 30_000.0, ..profile() };
        assert!(deficit.validate().is_ok());

        let unreachable = FinanceProfile { prepayment_threshold: f64::INFINITY, ..profile() };
        assert!(unreachable.validate().is_ok());

        let negative = FinanceProfile { prepayment_threshold: -1.0, ..profile() };
        assert!(matches!(negative.validate(), Err(SimulationError::InvalidInput { .. })));

        let nan_income = FinanceProfile { monthly_income: f64::NAN, ..profile() };
        assert!(nan_income.validate().is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("HOUSING_FUND".parse::<LoanKind>().unwrap(), LoanKind::HousingFund);
        assert_eq!("commercial".parse::<LoanKind>().unwrap(), LoanKind::Commercial);
        assert!("mortgage".parse::<LoanKind>().is_err());

        assert_eq!(
            "reduce-payment".parse::<PrepaymentStrategy>().unwrap(),
            PrepaymentStrategy::ReducePayment
        );
        assert_eq!(
            PrepaymentStrategy::ShortenTerm.as_str().parse::<PrepaymentStrategy>().unwrap(),
            PrepaymentStrategy::ShortenTerm
        );
    }

    #[test]
    fn test_term_and_rate() {
        let loan = LoanAccount::new(LoanKind::Commercial, 1_000_000.0, 4.5, 30);
        assert_eq!(loan.term_months(), 360);
        assert!((loan.periodic_rate() - 0.00375).abs() < 1e-12);
    }
}
