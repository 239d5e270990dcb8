/* Compound math types stored as runs of scalar components. */

use crate::endian::{Primitive, Word};

/// Largest `|1 - length|` still treated as unit length.
pub const NONNORMAL_THRESHOLD: f64 = 0.00001;

macro_rules! components {
    ($name:ident, $component:ty, $n:literal) => {
        impl $name {
            pub const COMPONENTS: usize = $n;

            pub fn from_words<W: Word<$component>>(words: &[W; $n]) -> Self {
                Self::from_array(words.map(|w| w.get()))
            }

            pub fn to_words<W: Word<$component>>(&self) -> [W; $n] {
                self.to_array().map(W::new)
            }

            /// True when every component satisfies `predicate`.
            pub fn all(&self, predicate: impl Fn($component) -> bool) -> bool {
                self.to_array().into_iter().all(predicate)
            }
        }
    };
}

macro_rules! compound {
    ($(#[$meta:meta])* $name:ident: $component:ty, $n:literal { $($field:ident),+ }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        pub struct $name {
            $(pub $field: $component,)+
        }

        impl $name {
            pub const fn new($($field: $component),+) -> Self {
                Self { $($field),+ }
            }

            pub fn from_array(array: [$component; $n]) -> Self {
                let [$($field),+] = array;
                Self { $($field),+ }
            }

            pub fn to_array(&self) -> [$component; $n] {
                [$(self.$field),+]
            }
        }

        components!($name, $component, $n);
    };
}

compound!(Point2D: f32, 2 { x, y });
compound!(Point3D: f32, 3 { x, y, z });
compound!(Vector2D: f32, 2 { i, j });
compound!(Vector3D: f32, 3 { i, j, k });
compound!(Euler2D: f32, 2 { yaw, pitch });
compound!(Euler3D: f32, 3 { yaw, pitch, roll });
compound!(Quaternion: f32, 4 { i, j, k, w });
compound!(ColorRGB: f32, 3 { red, green, blue });
compound!(ColorARGB: f32, 4 { alpha, red, green, blue });
compound!(Point2DInt: i16, 2 { x, y });
compound!(
    /// Integer screen rectangle.
    Rectangle2D: i16, 4 { top, left, bottom, right }
);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane2D {
    pub vector: Vector2D,
    pub w: f32,
}

impl Plane2D {
    pub fn from_array([i, j, w]: [f32; 3]) -> Self {
        Self {
            vector: Vector2D::new(i, j),
            w,
        }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.vector.i, self.vector.j, self.w]
    }
}

components!(Plane2D, f32, 3);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane3D {
    pub vector: Vector3D,
    pub w: f32,
}

impl Plane3D {
    pub fn from_array([i, j, k, w]: [f32; 4]) -> Self {
        Self {
            vector: Vector3D::new(i, j, k),
            w,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.vector.i, self.vector.j, self.vector.k, self.w]
    }
}

components!(Plane3D, f32, 4);

/// 3x3 rotation matrix, stored row by row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Matrix {
    pub vectors: [Vector3D; 3],
}

impl Matrix {
    pub fn from_array(a: [f32; 9]) -> Self {
        Self {
            vectors: [
                Vector3D::new(a[0], a[1], a[2]),
                Vector3D::new(a[3], a[4], a[5]),
                Vector3D::new(a[6], a[7], a[8]),
            ],
        }
    }

    pub fn to_array(&self) -> [f32; 9] {
        let [a, b, c] = self.vectors;
        [a.i, a.j, a.k, b.i, b.j, b.k, c.i, c.j, c.k]
    }
}

components!(Matrix, f32, 9);

/// A `(from, to)` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds<T> {
    pub from: T,
    pub to: T,
}

impl<T> Bounds<T> {
    pub const fn new(from: T, to: T) -> Self {
        Self { from, to }
    }
}

impl<T: Primitive> Bounds<T> {
    pub fn from_words<W: Word<T>>(words: &[W; 2]) -> Self {
        Self::new(words[0].get(), words[1].get())
    }

    pub fn to_words<W: Word<T>>(&self) -> [W; 2] {
        [W::new(self.from), W::new(self.to)]
    }
}

/// Types with a unit-length contract.
pub trait Normalize: Copy {
    /// Human name used in diagnostics, e.g. "3D vector".
    const DESCRIPTION: &'static str;

    fn scale(&self) -> f64;

    fn normalized(&self) -> Self;

    /// Components of the normalized part, for diagnostics.
    fn normal_components(&self) -> Vec<f32>;

    fn is_normalized(&self) -> bool {
        (1.0 - self.scale()).abs() < NONNORMAL_THRESHOLD
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.normal_components().iter().map(|c| c.to_string()).collect();
        format!("({}) -> {}", parts.join(", "), self.scale())
    }
}

macro_rules! normal {
    ($name:ident, $description:literal) => {
        impl Normalize for $name {
            const DESCRIPTION: &'static str = $description;

            fn scale(&self) -> f64 {
                self.to_array()
                    .iter()
                    .map(|c| f64::from(*c) * f64::from(*c))
                    .sum::<f64>()
                    .sqrt()
            }

            fn normalized(&self) -> Self {
                let distance = self.to_array().iter().map(|c| c * c).sum::<f32>().sqrt();
                if distance == 0.0 {
                    return Self::default();
                }
                let m_distance = 1.0 / distance;
                Self::from_array(self.to_array().map(|c| c * m_distance))
            }

            fn normal_components(&self) -> Vec<f32> {
                self.to_array().to_vec()
            }
        }
    };
}

normal!(Vector2D, "2D vector");
normal!(Vector3D, "3D vector");
normal!(Quaternion, "quaternion");

macro_rules! normal_plane {
    ($name:ident, $description:literal) => {
        impl Normalize for $name {
            const DESCRIPTION: &'static str = $description;

            fn scale(&self) -> f64 {
                self.vector.scale()
            }

            fn normalized(&self) -> Self {
                Self {
                    vector: self.vector.normalized(),
                    w: self.w,
                }
            }

            fn normal_components(&self) -> Vec<f32> {
                self.vector.normal_components()
            }
        }
    };
}

normal_plane!(Plane2D, "2D plane");
normal_plane!(Plane3D, "3D plane");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endian::{Be, Le};

    #[test]
    fn normalize_three_four_zero() {
        let v = Vector3D::new(3.0, 4.0, 0.0);
        assert!(!v.is_normalized());
        let n = v.normalized();
        assert!((n.i - 0.6).abs() < 1e-6);
        assert!((n.j - 0.8).abs() < 1e-6);
        assert_eq!(n.k, 0.0);
        assert!(n.is_normalized());
        assert_eq!(v.describe(), "(3, 4, 0) -> 5");
    }

    #[test]
    fn zero_vector_normalizes_to_zero() {
        assert_eq!(Quaternion::default().normalized(), Quaternion::default());
        assert!(!Quaternion::default().is_normalized());
    }

    #[test]
    fn plane_normalizes_only_its_vector() {
        let p = Plane3D::from_array([0.0, 0.0, 2.0, 7.0]).normalized();
        assert_eq!(p.to_array(), [0.0, 0.0, 1.0, 7.0]);
    }

    #[test]
    fn words_round_trip_components() {
        let rect = Rectangle2D::new(1, -2, 3, 4);
        let words: [Be<i16>; 4] = rect.to_words();
        assert_eq!(Rectangle2D::from_words(&words), rect);

        let m = Matrix::from_array([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let words: [Le<f32>; 9] = m.to_words();
        assert_eq!(Matrix::from_words(&words), m);
        assert!(Point3D::default().all(|c| c == 0.0));
    }
}
