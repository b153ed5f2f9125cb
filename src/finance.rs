//! General functions related to finance: the annuity factor and the per-process levelized cost
//! formula.
use crate::process::Process;
use crate::units::{Dimensionless, Hours, MoneyPerCapacity, MoneyPerEnergy};
use anyhow::{Result, ensure};

/// Calculates the annuity factor for a given discount rate and lifetime.
///
/// The annuity factor converts a one-time investment into an equivalent constant annual payment
/// over the asset's lifetime.
///
/// # Errors
///
/// Returns an error (rather than silently producing NaN or infinity) if the discount rate is
/// -100% or below, or if the lifetime is zero.
pub fn annuity_factor(discount_rate: Dimensionless, lifetime: u32) -> Result<Dimensionless> {
    ensure!(lifetime > 0, "Annuity lifetime must be at least one year");
    ensure!(
        discount_rate > Dimensionless(-1.0),
        "Annuity is undefined for discount rates of -100% or below"
    );
    if discount_rate == Dimensionless(0.0) {
        // Limit of the closed-form expression as the rate goes to zero
        return Ok(Dimensionless(1.0) / Dimensionless(lifetime as f64));
    }

    let factor = (Dimensionless(1.0) + discount_rate).powi(lifetime as i32);
    Ok((discount_rate * factor) / (factor - Dimensionless(1.0)))
}

/// The annualised cost terms of a single process, ready to be evaluated at different operating
/// points.
///
/// Constructing a `CostTerms` performs the investment annualisation once; [`CostTerms::at`] then
/// yields the levelized cost at a given number of full-load hours and fuel cost.
#[derive(PartialEq, Debug)]
pub struct CostTerms {
    /// Annualised investment cost plus annual fixed cost, per unit capacity
    pub annual_capacity_cost: MoneyPerCapacity,
    /// Variable operating cost per unit of energy produced
    pub var_cost: MoneyPerEnergy,
    /// Emission cost factor per unit of energy produced
    pub co2_cost: MoneyPerEnergy,
    /// Conversion efficiency for the commodity under evaluation
    pub efficiency: Dimensionless,
    /// Total conversion efficiency over all non-environmental outputs
    pub total_efficiency: Dimensionless,
}

impl CostTerms {
    /// Annualise a process's cost parameters for the given efficiencies and emission cost.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero efficiency or total efficiency (both appear as divisors) or
    /// for invalid financing parameters.
    pub fn new(
        process: &Process,
        efficiency: Dimensionless,
        total_efficiency: Dimensionless,
        co2_cost: MoneyPerEnergy,
    ) -> Result<Self> {
        ensure!(
            efficiency > Dimensionless(0.0),
            "Process {} has a zero conversion efficiency for the commodity under evaluation",
            process.id
        );
        ensure!(
            total_efficiency > Dimensionless(0.0),
            "Process {} has a zero total conversion efficiency",
            process.id
        );

        let factor = annuity_factor(process.wacc, process.depreciation)?;
        Ok(Self {
            annual_capacity_cost: process.inv_cost * factor + process.fix_cost,
            var_cost: process.var_cost,
            co2_cost,
            efficiency,
            total_efficiency,
        })
    }

    /// The levelized cost of producing one unit of energy at the given operating point.
    ///
    /// Holding all other terms fixed, the result is monotonically non-increasing in
    /// `full_load_hours`: running the plant more spreads the annual capacity cost over more
    /// units of energy.
    ///
    /// # Errors
    ///
    /// Returns an error for zero full-load hours, which would make the cost infinite.
    pub fn at(&self, full_load_hours: Hours, fuel_cost: MoneyPerEnergy) -> Result<MoneyPerEnergy> {
        ensure!(
            full_load_hours > Hours(0.0),
            "Cannot compute a levelized cost for zero full-load hours"
        );

        let cost = self.annual_capacity_cost / full_load_hours
            + self.var_cost
            + (fuel_cost + self.co2_cost) / self.efficiency;
        Ok(cost * (self.efficiency / self.total_efficiency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::process;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 10, 0.1)] // Edge case: zero discount rate
    #[case(0.05, 10, 0.1295045749654567)]
    #[case(0.03, 5, 0.2183545714005762)]
    #[case(0.08, 20, 0.10185220860455727)]
    fn test_annuity_factor(#[case] rate: f64, #[case] lifetime: u32, #[case] expected: f64) {
        let result = annuity_factor(Dimensionless(rate), lifetime).unwrap();
        assert_approx_eq!(f64, result.0, expected, epsilon = 1e-10);
    }

    #[rstest]
    #[case(0.05, 0)] // zero lifetime
    #[case(-1.0, 10)] // rate of -100%
    #[case(-1.5, 10)] // rate below -100%
    fn test_annuity_factor_invalid(#[case] rate: f64, #[case] lifetime: u32) {
        assert!(annuity_factor(Dimensionless(rate), lifetime).is_err());
    }

    #[test]
    fn test_annuity_factor_positive_and_zero_rate_limit() {
        // The factor is positive over the valid domain and tends to 1/n as the rate goes to 0
        for rate in [-0.5, -0.01, 0.001, 0.08, 2.0] {
            let result = annuity_factor(Dimensionless(rate), 20).unwrap();
            assert!(result > Dimensionless(0.0));
        }
        let near_zero = annuity_factor(Dimensionless(1e-9), 20).unwrap();
        assert_approx_eq!(f64, near_zero.0, 1.0 / 20.0, epsilon = 1e-8);
    }

    #[rstest]
    fn test_cost_terms_monotonic_in_full_load_hours(process: Process) {
        let terms = CostTerms::new(
            &process,
            Dimensionless(0.4),
            Dimensionless(0.4),
            MoneyPerEnergy(0.0),
        )
        .unwrap();

        let mut previous = terms.at(Hours(1.0), MoneyPerEnergy(3.0)).unwrap();
        for flh in [2.0, 10.0, 100.0, 2000.0, 8760.0] {
            let current = terms.at(Hours(flh), MoneyPerEnergy(3.0)).unwrap();
            assert!(current <= previous);
            previous = current;
        }
    }

    #[rstest]
    fn test_cost_terms_closed_form(process: Process) {
        // With eff == total_eff and no fuel or CO2 cost, the cost reduces to
        // (inv * annuity + fix) / FLH + var
        let terms = CostTerms::new(
            &process,
            Dimensionless(0.4),
            Dimensionless(0.4),
            MoneyPerEnergy(0.0),
        )
        .unwrap();
        let result = terms.at(Hours(2000.0), MoneyPerEnergy(0.0)).unwrap();

        let annuity = annuity_factor(process.wacc, process.depreciation).unwrap();
        let expected = (process.inv_cost.value() * annuity.0 + process.fix_cost.value()) / 2000.0
            + process.var_cost.value();
        assert_approx_eq!(f64, result.value(), expected, epsilon = 1e-10);
    }

    #[rstest]
    fn test_cost_terms_zero_full_load_hours(process: Process) {
        let terms = CostTerms::new(
            &process,
            Dimensionless(0.4),
            Dimensionless(0.4),
            MoneyPerEnergy(0.0),
        )
        .unwrap();
        assert!(terms.at(Hours(0.0), MoneyPerEnergy(0.0)).is_err());
    }

    #[rstest]
    fn test_cost_terms_zero_efficiency(process: Process) {
        assert!(
            CostTerms::new(
                &process,
                Dimensionless(0.0),
                Dimensionless(0.4),
                MoneyPerEnergy(0.0)
            )
            .is_err()
        );
        assert!(
            CostTerms::new(
                &process,
                Dimensionless(0.4),
                Dimensionless(0.0),
                MoneyPerEnergy(0.0)
            )
            .is_err()
        );
    }
}
