#![allow(missing_docs)]

//! This module defines various unit types and their conversions.
//!
//! Working with typed quantities means the cost formula has to be dimensionally consistent to
//! compile: e.g. dividing an annual capacity cost by full-load hours yields a cost per unit energy.

/// Represents a dimensionless quantity (efficiencies, ratios, rates).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    pub fn powi(self, rhs: i32) -> Self {
        Dimensionless(self.0.powi(rhs))
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            serde::Serialize,
            serde::Deserialize,
            derive_more::Add,
            derive_more::Sub,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::from(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Energy);
unit_struct!(Hours);

// Derived quantities
unit_struct!(MoneyPerCapacity);
unit_struct!(MoneyPerEnergy);

impl From<f64> for MoneyPerEnergy {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

// Division rules
impl_div!(MoneyPerCapacity, Hours, MoneyPerEnergy);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_cost_over_hours() {
        // An annual capacity cost spread over full-load hours is a cost per unit energy
        assert_eq!(
            MoneyPerCapacity(3000.0) / Hours(2000.0),
            MoneyPerEnergy(1.5)
        );
    }

    #[test]
    fn test_dimensionless_scaling() {
        assert_eq!(
            MoneyPerEnergy(10.0) * Dimensionless(0.5),
            MoneyPerEnergy(5.0)
        );
        assert_eq!(
            MoneyPerEnergy(10.0) / Dimensionless(0.4),
            MoneyPerEnergy(25.0)
        );
    }
}
