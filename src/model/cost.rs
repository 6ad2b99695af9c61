use std::cmp::Ordering;
use std::fmt::{Debug, Display};

use serde::Serialize;

/// Numeric type usable as a link metric.
///
/// Costs must be totally ordered; `f64` is ordered with `total_cmp`. Integer
/// additions saturate so a runaway negative cycle cannot overflow before the
/// round cap is reached.
pub trait LinkCost:
    Copy + Debug + Display + PartialEq + Serialize + Send + Sync + 'static
{
    fn zero() -> Self;
    fn add_cost(self, other: Self) -> Self;
    fn is_negative(&self) -> bool;
    fn total_cmp(&self, other: &Self) -> Ordering;

    fn improves_on(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Less
    }
}

macro_rules! signed_link_cost {
    ($($ty:ty),*) => {$(
        impl LinkCost for $ty {
            fn zero() -> Self {
                0
            }

            fn add_cost(self, other: Self) -> Self {
                self.saturating_add(other)
            }

            fn is_negative(&self) -> bool {
                *self < 0
            }

            fn total_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    )*};
}

macro_rules! unsigned_link_cost {
    ($($ty:ty),*) => {$(
        impl LinkCost for $ty {
            fn zero() -> Self {
                0
            }

            fn add_cost(self, other: Self) -> Self {
                self.saturating_add(other)
            }

            fn is_negative(&self) -> bool {
                false
            }

            fn total_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    )*};
}

signed_link_cost!(i32, i64);
unsigned_link_cost!(u32, u64);

impl LinkCost for f64 {
    fn zero() -> Self {
        0.0
    }

    fn add_cost(self, other: Self) -> Self {
        self + other
    }

    fn is_negative(&self) -> bool {
        *self < 0.0
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_costs_saturate_instead_of_overflowing() {
        assert_eq!(i64::MAX.add_cost(1), i64::MAX);
        assert_eq!(i32::MIN.add_cost(-5), i32::MIN);
        assert_eq!(u32::MAX.add_cost(3), u32::MAX);
    }

    #[test]
    fn improves_on_is_strict() {
        assert!(2_i64.improves_on(&3));
        assert!(!3_i64.improves_on(&3));
        assert!(1.5_f64.improves_on(&2.0));
        assert!(!f64::NAN.improves_on(&2.0));
    }

    #[test]
    fn negativity_by_type() {
        assert!(LinkCost::is_negative(&-1_i64));
        assert!(!LinkCost::is_negative(&0_i32));
        assert!(!LinkCost::is_negative(&7_u64));
        assert!(LinkCost::is_negative(&-0.5_f64));
        assert!(!LinkCost::is_negative(&0.0_f64));
    }
}
