/* Value comparison for the emitted `compare` traversals. */

use crate::math::*;

/// Largest difference between two floats still treated as equal in precision mode.
pub const COMPARE_PRECISION: f64 = 0.000001;

pub trait CompareValue {
    /// Exact equality, or near equality for floats when `precision` is set.
    fn same_as(&self, other: &Self, precision: bool) -> bool;
}

fn same_float(a: f64, b: f64, precision: bool) -> bool {
    a == b || (precision && (a - b).abs() <= COMPARE_PRECISION)
}

impl CompareValue for f32 {
    fn same_as(&self, other: &Self, precision: bool) -> bool {
        same_float(f64::from(*self), f64::from(*other), precision)
    }
}

impl CompareValue for f64 {
    fn same_as(&self, other: &Self, precision: bool) -> bool {
        same_float(*self, *other, precision)
    }
}

macro_rules! exact {
    ($($ty:ty),*) => {
        $(
            impl CompareValue for $ty {
                fn same_as(&self, other: &Self, _precision: bool) -> bool {
                    self == other
                }
            }
        )*
    };
}

exact!(u8, i8, u16, i16, u32, i32);

impl<T: CompareValue, const N: usize> CompareValue for [T; N] {
    fn same_as(&self, other: &Self, precision: bool) -> bool {
        self.iter().zip(other).all(|(a, b)| a.same_as(b, precision))
    }
}

impl<T: CompareValue> CompareValue for Bounds<T> {
    fn same_as(&self, other: &Self, precision: bool) -> bool {
        self.from.same_as(&other.from, precision) && self.to.same_as(&other.to, precision)
    }
}

macro_rules! by_components {
    ($($name:ident),*) => {
        $(
            impl CompareValue for $name {
                fn same_as(&self, other: &Self, precision: bool) -> bool {
                    self.to_array().same_as(&other.to_array(), precision)
                }
            }
        )*
    };
}

by_components!(
    Point2D, Point3D, Vector2D, Vector3D, Euler2D, Euler3D, Quaternion, ColorRGB, ColorARGB, Point2DInt,
    Rectangle2D, Plane2D, Plane3D, Matrix
);

/// Log one difference found by a verbose comparison, indented by nesting depth.
pub fn report_difference(owner: &str, field: &str, element: Option<usize>, depth: usize) {
    let indent = "  ".repeat(depth);
    match element {
        Some(i) => tracing::warn!("{indent}{owner}::{field} #{i} is different"),
        None => tracing::warn!("{indent}{owner}::{field} is different"),
    }
}
