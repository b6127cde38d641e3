//! Load loan tables (CSV) and household files (JSON)

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::Reader;

use super::{Household, LoanAccount, LoanKind};
use crate::error::LoadError;

/// Raw CSV row: `Kind,Principal,AnnualRatePercent,TermYears`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Kind")]
    kind: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "AnnualRatePercent")]
    annual_rate_percent: f64,
    #[serde(rename = "TermYears")]
    term_years: u32,
}

impl CsvRow {
    fn to_loan(self) -> Result<LoanAccount, LoadError> {
        let kind: LoanKind = self.kind.parse()?;
        Ok(LoanAccount::new(
            kind,
            self.principal,
            self.annual_rate_percent,
            self.term_years,
        ))
    }
}

/// Load loans from a CSV file, keeping file order
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanAccount>, LoadError> {
    let file = File::open(path)?;
    load_loans_from_reader(file)
}

/// Load loans from any reader (string buffer, stdin)
pub fn load_loans_from_reader<R: Read>(reader: R) -> Result<Vec<LoanAccount>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut loans = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.to_loan()?);
    }

    Ok(loans)
}

/// Load a single household from a JSON file
pub fn load_household<P: AsRef<Path>>(path: P) -> Result<Household, LoadError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Load either a JSON list of households or a single household object
pub fn load_households<P: AsRef<Path>>(path: P) -> Result<Vec<Household>, LoadError> {
    let file = File::open(path)?;
    load_households_from_reader(BufReader::new(file))
}

pub fn load_households_from_reader<R: Read>(reader: R) -> Result<Vec<Household>, LoadError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Household>),
        One(Household),
    }

    Ok(match serde_json::from_reader(reader)? {
        OneOrMany::Many(households) => households,
        OneOrMany::One(household) => vec![household],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::PrepaymentStrategy;

    const LOANS_CSV: &str = "\
Kind,Principal,AnnualRatePercent,TermYears
HOUSING_FUND,600000,3.1,30
COMMERCIAL,400000,4.9,25
";

    const HOUSEHOLD_JSON: &str = r#"{
        "name": "two loans",
        "loans": [
            {"kind": "HOUSING_FUND", "principal": 600000, "annual_rate_percent": 3.1, "term_years": 30},
            {"kind": "COMMERCIAL", "principal": 400000, "annual_rate_percent": 4.9, "term_years": 25}
        ],
        "profile": {
            "monthly_income": 30000,
            "monthly_expense": 9000,
            "prepayment_threshold": 100000,
            "prepayment_strategy": "REDUCE_PAYMENT"
        }
    }"#;

    #[test]
    fn test_load_loans_from_reader() {
        let loans = load_loans_from_reader(LOANS_CSV.as_bytes()).expect("valid CSV");
        assert_eq!(loans.len(), 2);
        assert_eq!(loans[0].kind, LoanKind::HousingFund);
        assert_eq!(loans[0].principal, 600_000.0);
        assert_eq!(loans[1].kind, LoanKind::Commercial);
        assert_eq!(loans[1].term_years, 25);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let csv = "Kind,Principal,AnnualRatePercent,TermYears\nCAR,10000,5,3\n";
        let err = load_loans_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownLoanKind(ref k) if k == "CAR"));
    }

    #[test]
    fn test_load_single_household() {
        let households = load_households_from_reader(HOUSEHOLD_JSON.as_bytes()).expect("valid JSON");
        assert_eq!(households.len(), 1);

        let household = &households[0];
        assert_eq!(household.name, "two loans");
        assert_eq!(household.loans.len(), 2);
        assert_eq!(household.profile.initial_savings, 0.0);
        assert_eq!(household.profile.prepayment_strategy, PrepaymentStrategy::ReducePayment);
    }

    #[test]
    fn test_load_household_list() {
        let json = format!("[{HOUSEHOLD_JSON}, {HOUSEHOLD_JSON}]");
        let households = load_households_from_reader(json.as_bytes()).expect("valid JSON");
        assert_eq!(households.len(), 2);
    }
}
