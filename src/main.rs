//! Loan Prepay CLI
//!
//! Simulates a household's loan payoff schedule and compares prepayment strategies

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use loan_prepay::loan::{load_household, load_households, load_loans};
use loan_prepay::schedule::{
    payment_date, AllocationRounding, DEFAULT_MAX_MONTHS, DEFAULT_PREPAYMENT_LOT,
};
use loan_prepay::{
    FinanceProfile, Household, PrepaymentStrategy, ScenarioRunner, SimulationConfig,
    SimulationError, SimulationResult, StrategyComparison,
};

/// Household loan payoff simulator
#[derive(Parser)]
#[command(
    name = "loan_prepay",
    version,
    about = "Simulate loan payoff with savings-funded prepayments",
    long_about = "Simulates the month-by-month payoff of one or more amortizing loans, \
                  diverting surplus savings into lump-sum prepayments under a \
                  shorten-term or reduce-payment strategy."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce the monthly payoff schedule
    Simulate(RunArgs),
    /// Compare both strategies against no prepayment
    Compare(RunArgs),
    /// Summarize every household in a JSON file, run in parallel
    Batch(BatchArgs),
}

#[derive(Debug, Clone, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    ShortenTerm,
    ReducePayment,
}

impl From<StrategyArg> for PrepaymentStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::ShortenTerm => PrepaymentStrategy::ShortenTerm,
            StrategyArg::ReducePayment => PrepaymentStrategy::ReducePayment,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Household JSON file with loans and profile
    #[arg(long, conflicts_with = "loans")]
    scenario: Option<PathBuf>,

    /// Loan table CSV (Kind,Principal,AnnualRatePercent,TermYears)
    #[arg(long)]
    loans: Option<PathBuf>,

    /// Monthly income
    #[arg(long)]
    income: Option<f64>,

    /// Monthly living expense
    #[arg(long)]
    expense: Option<f64>,

    /// Savings at the start of month 1
    #[arg(long)]
    savings: Option<f64>,

    /// Savings level that triggers a prepayment
    #[arg(long)]
    threshold: Option<f64>,

    /// Prepayment strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    #[command(flatten)]
    engine: EngineArgs,

    /// Include a per-loan breakdown (JSON output only)
    #[arg(long)]
    detailed: bool,

    /// Date of the first payment, labels months in table and CSV output
    #[arg(long)]
    start: Option<NaiveDate>,
}

#[derive(Args)]
struct BatchArgs {
    /// JSON file holding one household or a list of households
    #[arg(long)]
    scenarios: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,
}

/// Simulator settings shared by every subcommand
#[derive(Args)]
struct EngineArgs {
    /// Month cap
    #[arg(long, default_value_t = DEFAULT_MAX_MONTHS)]
    max_months: u32,

    /// Minimum prepayment lot
    #[arg(long, default_value_t = DEFAULT_PREPAYMENT_LOT)]
    lot: f64,

    /// Round each loan's share independently instead of reconciling to the lot
    #[arg(long)]
    preserve_drift: bool,
}

impl EngineArgs {
    fn config(&self, detailed_output: bool) -> SimulationConfig {
        SimulationConfig {
            max_months: self.max_months,
            prepayment_lot: self.lot,
            allocation_rounding: if self.preserve_drift {
                AllocationRounding::PreserveDrift
            } else {
                AllocationRounding::ReconcileToLargest
            },
            allow_prepayment: true,
            detailed_output,
        }
    }
}

impl RunArgs {
    fn config(&self) -> SimulationConfig {
        self.engine.config(self.detailed)
    }

    /// The per-loan breakdown only has a place in JSON output
    fn check_format(&self, format: &OutputFormat) -> Result<()> {
        if self.detailed && *format != OutputFormat::Json {
            bail!("--detailed requires --output json");
        }
        Ok(())
    }

    /// Build the household from a scenario file or from a loan table plus flags
    fn household(&self) -> Result<Household> {
        let mut household = match (&self.scenario, &self.loans) {
            (Some(path), _) => load_household(path)
                .with_context(|| format!("reading scenario {}", path.display()))?,
            (None, Some(path)) => {
                let loans = load_loans(path)
                    .with_context(|| format!("reading loans {}", path.display()))?;
                let (Some(income), Some(expense), Some(threshold)) =
                    (self.income, self.expense, self.threshold)
                else {
                    bail!("--income, --expense and --threshold are required with --loans");
                };
                Household {
                    name: path.display().to_string(),
                    loans,
                    profile: FinanceProfile {
                        monthly_income: income,
                        monthly_expense: expense,
                        initial_savings: 0.0,
                        prepayment_threshold: threshold,
                        prepayment_strategy: PrepaymentStrategy::ShortenTerm,
                    },
                }
            }
            (None, None) => bail!("either --scenario or --loans is required"),
        };

        // Flags override the file
        let profile = &mut household.profile;
        if let Some(income) = self.income {
            profile.monthly_income = income;
        }
        if let Some(expense) = self.expense {
            profile.monthly_expense = expense;
        }
        if let Some(savings) = self.savings {
            profile.initial_savings = savings;
        }
        if let Some(threshold) = self.threshold {
            profile.prepayment_threshold = threshold;
        }
        if let Some(strategy) = self.strategy {
            profile.prepayment_strategy = strategy.into();
        }

        Ok(household)
    }
}

/// Flat CSV row for one month
#[derive(Serialize)]
struct CsvRow {
    month: u32,
    payment_date: Option<NaiveDate>,
    principal_paid: f64,
    interest_paid: f64,
    total_payment: f64,
    remaining_loan_balance: f64,
    monthly_balance: f64,
    total_savings: f64,
    is_prepayment: bool,
    prepayment_amount: f64,
    current_monthly_installment: f64,
}

/// One line of batch output per household
#[derive(Debug, Serialize)]
struct BatchRow {
    name: String,
    status: &'static str,
    months: Option<u32>,
    months_to_payoff: Option<u32>,
    total_interest: Option<f64>,
    total_prepaid: Option<f64>,
    prepayment_count: Option<u32>,
    final_balance: Option<f64>,
    error: Option<String>,
}

impl BatchRow {
    fn new(household: &Household, result: &Result<SimulationResult, SimulationError>) -> Self {
        match result {
            Ok(result) => {
                let summary = result.summary();
                Self {
                    name: household.name.clone(),
                    status: if result.outcome.is_paid_off() { "paid_off" } else { "cap_reached" },
                    months: Some(summary.total_months),
                    months_to_payoff: summary.months_to_payoff,
                    total_interest: Some(summary.total_interest),
                    total_prepaid: Some(summary.total_prepaid),
                    prepayment_count: Some(summary.prepayment_count),
                    final_balance: Some(summary.final_balance),
                    error: None,
                }
            }
            Err(e) => Self {
                name: household.name.clone(),
                status: "invalid",
                months: None,
                months_to_payoff: None,
                total_interest: None,
                total_prepaid: None,
                prepayment_count: None,
                final_balance: None,
                error: Some(e.to_string()),
            },
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut out: Box<dyn Write> = match &cli.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match &cli.command {
        Commands::Simulate(args) => {
            args.check_format(&cli.output)?;
            let household = args.household()?;
            let runner = ScenarioRunner::with_config(args.config());
            let result = runner.run(&household.loans, &household.profile)?;
            match cli.output {
                OutputFormat::Table => write_schedule_table(&mut out, &household, &result, args.start)?,
                OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &result)?,
                OutputFormat::Csv => write_schedule_csv(&mut out, &result, args.start)?,
            }
        }
        Commands::Compare(args) => {
            args.check_format(&cli.output)?;
            let household = args.household()?;
            let runner = ScenarioRunner::with_config(args.config());
            let comparison = runner.compare_strategies(&household.loans, &household.profile)?;
            match cli.output {
                OutputFormat::Table => write_comparison_table(&mut out, &comparison)?,
                OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &comparison)?,
                OutputFormat::Csv => write_comparison_csv(&mut out, &comparison)?,
            }
        }
        Commands::Batch(args) => {
            let households = load_households(&args.scenarios)
                .with_context(|| format!("reading scenarios {}", args.scenarios.display()))?;
            let runner = ScenarioRunner::with_config(args.engine.config(false));
            let rows: Vec<BatchRow> = households
                .iter()
                .zip(runner.run_batch(&households))
                .map(|(household, result)| BatchRow::new(household, &result))
                .collect();
            match cli.output {
                OutputFormat::Table => write_batch_table(&mut out, &rows)?,
                OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &rows)?,
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(&mut out);
                    for row in &rows {
                        writer.serialize(row)?;
                    }
                    writer.flush()?;
                }
            }
        }
    }

    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn write_schedule_table(
    out: &mut dyn Write,
    household: &Household,
    result: &SimulationResult,
    start: Option<NaiveDate>,
) -> Result<()> {
    writeln!(out, "Loan Prepay v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "==================")?;
    writeln!(out)?;
    for (i, loan) in household.loans.iter().enumerate() {
        writeln!(
            out,
            "Loan {}: {:<12} {:>14.2} at {:.3}% over {} years",
            i + 1,
            loan.kind.as_str(),
            loan.principal,
            loan.annual_rate_percent,
            loan.term_years
        )?;
    }
    writeln!(out, "Strategy: {}", result.strategy.as_str())?;
    writeln!(out)?;

    writeln!(
        out,
        "{:>5} {:>10} {:>12} {:>12} {:>14} {:>12} {:>14} {:>12} {:>12}",
        "Month", "Date", "Principal", "Interest", "Balance", "Surplus", "Savings", "Prepaid", "Installment"
    )?;
    writeln!(out, "{}", "-".repeat(113))?;

    for row in &result.records {
        let date = start
            .and_then(|s| payment_date(s, row.month))
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{:>5} {:>10} {:>12.2} {:>12.2} {:>14.2} {:>12.2} {:>14.2} {:>12.2} {:>12.2}",
            row.month,
            date,
            row.principal_paid,
            row.interest_paid,
            row.remaining_loan_balance,
            row.monthly_balance,
            row.total_savings,
            row.prepayment_amount,
            row.current_monthly_installment,
        )?;
    }

    let summary = result.summary();
    writeln!(out)?;
    writeln!(out, "Summary:")?;
    match summary.months_to_payoff {
        Some(months) => writeln!(out, "  Debt-free after: {} months", months)?,
        None => writeln!(
            out,
            "  Not paid off within {} months, {:.2} outstanding",
            summary.total_months, summary.final_balance
        )?,
    }
    writeln!(out, "  Total interest: {:.2}", summary.total_interest)?;
    writeln!(out, "  Total prepaid: {:.2} in {} prepayments", summary.total_prepaid, summary.prepayment_count)?;
    write!(out, "  Final savings: {:.2}", summary.final_savings)?;
    Ok(())
}

fn write_schedule_csv(out: &mut dyn Write, result: &SimulationResult, start: Option<NaiveDate>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in &result.records {
        writer.serialize(CsvRow {
            month: row.month,
            payment_date: start.and_then(|s| payment_date(s, row.month)),
            principal_paid: row.principal_paid,
            interest_paid: row.interest_paid,
            total_payment: row.total_payment,
            remaining_loan_balance: row.remaining_loan_balance,
            monthly_balance: row.monthly_balance,
            total_savings: row.total_savings,
            is_prepayment: row.is_prepayment,
            prepayment_amount: row.prepayment_amount,
            current_monthly_installment: row.current_monthly_installment,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_comparison_table(out: &mut dyn Write, comparison: &StrategyComparison) -> Result<()> {
    let months = |m: Option<u32>| m.map_or_else(|| "cap".to_string(), |m| m.to_string());

    writeln!(
        out,
        "{:<16} {:>8} {:>16} {:>16} {:>12} {:>14}",
        "Strategy", "Months", "Interest", "Interest saved", "Prepayments", "Final inst."
    )?;
    writeln!(out, "{}", "-".repeat(87))?;
    writeln!(
        out,
        "{:<16} {:>8} {:>16.2} {:>16} {:>12} {:>14.2}",
        "NO_PREPAYMENT",
        months(comparison.baseline.months_to_payoff),
        comparison.baseline.total_interest,
        "-",
        0,
        comparison.baseline.final_installment,
    )?;
    for report in [&comparison.shorten_term, &comparison.reduce_payment] {
        writeln!(
            out,
            "{:<16} {:>8} {:>16.2} {:>16.2} {:>12} {:>14.2}",
            report.strategy.as_str(),
            months(report.summary.months_to_payoff),
            report.summary.total_interest,
            report.interest_saved,
            report.summary.prepayment_count,
            report.summary.final_installment,
        )?;
    }
    write!(out, "\nLower interest: {}", comparison.cheaper().as_str())?;
    Ok(())
}

fn write_comparison_csv(out: &mut dyn Write, comparison: &StrategyComparison) -> Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        strategy: &'a str,
        months_to_payoff: Option<u32>,
        total_interest: f64,
        interest_saved: f64,
        prepayment_count: u32,
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.serialize(Row {
        strategy: "NO_PREPAYMENT",
        months_to_payoff: comparison.baseline.months_to_payoff,
        total_interest: comparison.baseline.total_interest,
        interest_saved: 0.0,
        prepayment_count: 0,
    })?;
    for report in [&comparison.shorten_term, &comparison.reduce_payment] {
        writer.serialize(Row {
            strategy: report.strategy.as_str(),
            months_to_payoff: report.summary.months_to_payoff,
            total_interest: report.summary.total_interest,
            interest_saved: report.interest_saved,
            prepayment_count: report.summary.prepayment_count,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_batch_table(out: &mut dyn Write, rows: &[BatchRow]) -> Result<()> {
    let num = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    let count = |v: Option<u32>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

    writeln!(
        out,
        "{:<24} {:<12} {:>8} {:>16} {:>16} {:>12}",
        "Household", "Status", "Months", "Interest", "Prepaid", "Prepayments"
    )?;
    writeln!(out, "{}", "-".repeat(91))?;
    for row in rows {
        writeln!(
            out,
            "{:<24} {:<12} {:>8} {:>16} {:>16} {:>12}",
            row.name,
            row.status,
            count(row.months),
            num(row.total_interest),
            num(row.total_prepaid),
            count(row.prepayment_count),
        )?;
        if let Some(error) = &row.error {
            writeln!(out, "    {}", error)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("valid arguments")
    }

    fn run_args(cli: &Cli) -> &RunArgs {
        match &cli.command {
            Commands::Simulate(args) | Commands::Compare(args) => args,
            Commands::Batch(_) => panic!("not a single-household command"),
        }
    }

    #[test]
    fn test_detailed_requires_json() {
        let cli = parse(&["loan_prepay", "simulate", "--scenario", "h.json", "--detailed"]);
        assert!(run_args(&cli).check_format(&cli.output).is_err());

        let cli = parse(&["loan_prepay", "simulate", "--scenario", "h.json", "--detailed", "--output", "csv"]);
        assert!(run_args(&cli).check_format(&cli.output).is_err());

        let cli = parse(&["loan_prepay", "compare", "--scenario", "h.json", "--detailed", "--output", "json"]);
        assert!(run_args(&cli).check_format(&cli.output).is_ok());
        assert!(run_args(&cli).config().detailed_output);
    }

    #[test]
    fn test_plain_table_is_accepted() {
        let cli = parse(&["loan_prepay", "simulate", "--scenario", "h.json"]);
        assert!(run_args(&cli).check_format(&cli.output).is_ok());
        assert!(!run_args(&cli).config().detailed_output);
    }

    #[test]
    fn test_batch_flags_build_config() {
        let cli = parse(&["loan_prepay", "batch", "--scenarios", "all.json", "--preserve-drift", "--lot", "5000"]);
        let Commands::Batch(args) = &cli.command else {
            panic!("expected batch");
        };
        let config = args.engine.config(false);
        assert_eq!(config.allocation_rounding, AllocationRounding::PreserveDrift);
        assert_eq!(config.prepayment_lot, 5_000.0);
        assert_eq!(config.max_months, DEFAULT_MAX_MONTHS);
    }

    #[test]
    fn test_batch_row_reports_invalid_household() {
        let household = Household {
            name: "empty".into(),
            loans: Vec::new(),
            profile: FinanceProfile {
                monthly_income: 1_000.0,
                monthly_expense: 0.0,
                initial_savings: 0.0,
                prepayment_threshold: 10_000.0,
                prepayment_strategy: PrepaymentStrategy::ShortenTerm,
            },
        };
        let result = ScenarioRunner::new().run(&household.loans, &household.profile);
        let row = BatchRow::new(&household, &result);
        assert_eq!(row.status, "invalid");
        assert!(row.months.is_none());
        assert!(row.error.is_some());
    }
}
