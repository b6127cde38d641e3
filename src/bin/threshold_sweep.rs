//! Sweep prepayment thresholds for one household
//!
//! Usage: cargo run --bin threshold_sweep -- household.json [max_threshold] [step]
//!
//! Runs both strategies for every threshold in parallel and writes
//! threshold_sweep_output.csv.

use std::env;
use std::fs::File;
use std::io::Write;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use loan_prepay::loan::load_household;
use loan_prepay::{PrepaymentStrategy, ScenarioRunner};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        bail!("usage: threshold_sweep <household.json> [max_threshold] [step]");
    };
    let (max_threshold, step) = sweep_range(args.get(2), args.get(3))?;

    let start = Instant::now();
    let household = load_household(path).with_context(|| format!("reading {}", path))?;
    println!("Loaded household '{}' with {} loan(s)", household.name, household.loans.len());

    let thresholds = sweep_thresholds(max_threshold, step);

    let runner = ScenarioRunner::new();
    let output_path = "threshold_sweep_output.csv";
    let mut file = File::create(output_path).context("creating output file")?;
    writeln!(file, "Strategy,Threshold,Months,TotalInterest,Prepayments,FinalInstallment")?;

    for strategy in [PrepaymentStrategy::ShortenTerm, PrepaymentStrategy::ReducePayment] {
        let profiles: Vec<_> = thresholds
            .iter()
            .map(|&t| {
                let mut profile = household.profile.with_strategy(strategy);
                profile.prepayment_threshold = t;
                profile
            })
            .collect();

        let results = runner.run_profiles(&household.loans, &profiles);

        let mut best: Option<(f64, f64)> = None;
        for (threshold, result) in thresholds.iter().zip(results) {
            let summary = result?.summary();
            let months = summary
                .months_to_payoff
                .map_or_else(|| "cap".to_string(), |m| m.to_string());
            writeln!(
                file,
                "{},{:.0},{},{:.2},{},{:.2}",
                strategy.as_str(),
                threshold,
                months,
                summary.total_interest,
                summary.prepayment_count,
                summary.final_installment,
            )?;
            if best.map_or(true, |(_, interest)| summary.total_interest < interest) {
                best = Some((*threshold, summary.total_interest));
            }
        }

        if let Some((threshold, interest)) = best {
            println!(
                "  {:<15} lowest interest {:.2} at threshold {:.0}",
                strategy.as_str(),
                interest,
                threshold
            );
        }
    }

    println!("Output written to {}", output_path);
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}

/// Parse and check the optional `max_threshold` and `step` arguments
fn sweep_range(max_threshold: Option<&String>, step: Option<&String>) -> Result<(f64, f64)> {
    let max_threshold: f64 = match max_threshold {
        Some(raw) => raw.parse().context("max_threshold must be a number")?,
        None => 500_000.0,
    };
    let step: f64 = match step {
        Some(raw) => raw.parse().context("step must be a number")?,
        None => 10_000.0,
    };
    if !max_threshold.is_finite() || max_threshold < 0.0 {
        bail!("max_threshold must be a finite non-negative number");
    }
    if !step.is_finite() || step <= 0.0 {
        bail!("step must be a finite positive number");
    }
    Ok((max_threshold, step))
}

/// Thresholds 0, step, 2*step, ... up to and including `max_threshold`
fn sweep_thresholds(max_threshold: f64, step: f64) -> Vec<f64> {
    (0u64..)
        .map(|i| i as f64 * step)
        .take_while(|t| *t <= max_threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_includes_both_ends() {
        assert_eq!(sweep_thresholds(30_000.0, 10_000.0), vec![0.0, 10_000.0, 20_000.0, 30_000.0]);
        assert_eq!(sweep_thresholds(0.0, 10_000.0), vec![0.0]);
    }

    #[test]
    fn test_sweep_range_rejects_bad_input() {
        let arg = |s: &str| s.to_string();
        assert_eq!(sweep_range(None, None).unwrap(), (500_000.0, 10_000.0));
        assert_eq!(sweep_range(Some(&arg("1e5")), Some(&arg("5000"))).unwrap(), (100_000.0, 5_000.0));
        assert!(sweep_range(None, Some(&arg("inf"))).is_err());
        assert!(sweep_range(None, Some(&arg("NaN"))).is_err());
        assert!(sweep_range(None, Some(&arg("0"))).is_err());
        assert!(sweep_range(Some(&arg("inf")), None).is_err());
        assert!(sweep_range(Some(&arg("-1")), None).is_err());
        assert!(sweep_range(Some(&arg("abc")), None).is_err());
    }
}
