//! Equal-installment (level payment) calculations

/// Monthly rate as a decimal from an annual percentage
pub fn periodic_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Fixed monthly payment that amortizes `principal` over `term_months`
///
/// At a zero rate the level-payment formula is 0/0, so the principal is
/// spread evenly instead.
pub fn compute_fixed_installment(principal: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return principal.max(0.0);
    }
    level_payment(principal, periodic_rate(annual_rate_percent), term_months)
}

/// Re-amortize a reduced balance over the months left on the loan
///
/// Returns 0 when nothing is owed or no months remain.
pub fn recompute_installment(remaining_balance: f64, periodic_rate: f64, remaining_months: u32) -> f64 {
    if remaining_balance <= 0.0 || remaining_months == 0 {
        return 0.0;
    }
    level_payment(remaining_balance, periodic_rate, remaining_months)
}

fn level_payment(balance: f64, rate: f64, months: u32) -> f64 {
    if rate <= 0.0 {
        return balance / months as f64;
    }
    let growth = (1.0 + rate).powf(months as f64);
    balance * rate * growth / (growth - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_mortgage_installment() {
        // 1,000,000 at 4.5% over 30 years
        let installment = compute_fixed_installment(1_000_000.0, 4.5, 360);
        assert_abs_diff_eq!(installment, 5066.85, epsilon = 0.01);
    }

    #[test]
    fn test_housing_fund_installment() {
        // 600,000 at 3.1% over 30 years
        let installment = compute_fixed_installment(600_000.0, 3.1, 360);
        assert_abs_diff_eq!(installment, 2562.10, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_falls_back_to_straight_line() {
        let installment = compute_fixed_installment(120_000.0, 0.0, 120);
        assert_abs_diff_eq!(installment, 1_000.0, epsilon = 1e-9);
        assert!(installment.is_finite());
    }

    #[test]
    fn test_single_month_term_repays_with_interest() {
        let installment = compute_fixed_installment(10_000.0, 12.0, 1);
        assert_abs_diff_eq!(installment, 10_100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_recompute_matches_fresh_schedule() {
        let rate = periodic_rate(4.5);
        let fresh = compute_fixed_installment(500_000.0, 4.5, 240);
        let recomputed = recompute_installment(500_000.0, rate, 240);
        assert_abs_diff_eq!(fresh, recomputed, epsilon = 1e-9);

        // Halving the balance halves the payment
        let half = recompute_installment(250_000.0, rate, 240);
        assert_abs_diff_eq!(half * 2.0, recomputed, epsilon = 1e-9);
    }

    #[test]
    fn test_recompute_degenerate_inputs() {
        assert_eq!(recompute_installment(0.0, 0.004, 100), 0.0);
        assert_eq!(recompute_installment(-5.0, 0.004, 100), 0.0);
        assert_eq!(recompute_installment(1_000.0, 0.004, 0), 0.0);
    }
}
