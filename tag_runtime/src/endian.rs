/* Byte-order aware storage words.
 *
 * `Be<T>` and `Le<T>` hold the raw bytes of a primitive in a fixed byte order
 * and have alignment 1, so layouts built from them have no implicit padding.
 */

use std::fmt;

pub trait Primitive: Copy + Default + PartialEq + fmt::Debug {
    type Bytes: Copy + Default + PartialEq + fmt::Debug + AsRef<[u8]> + AsMut<[u8]>;

    fn from_be(bytes: Self::Bytes) -> Self;
    fn from_le(bytes: Self::Bytes) -> Self;
    fn to_be(self) -> Self::Bytes;
    fn to_le(self) -> Self::Bytes;
}

macro_rules! primitive {
    ($($ty:ty => $size:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                type Bytes = [u8; $size];

                fn from_be(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn from_le(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_be(self) -> Self::Bytes {
                    self.to_be_bytes()
                }

                fn to_le(self) -> Self::Bytes {
                    self.to_le_bytes()
                }
            }
        )*
    };
}

primitive! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// A stored word that decodes to `T`.
pub trait Word<T: Primitive>: Copy {
    fn new(value: T) -> Self;
    fn get(&self) -> T;
}

macro_rules! word {
    ($name:ident, $from:ident, $to:ident, $label:literal) => {
        #[repr(transparent)]
        pub struct $name<T: Primitive>(pub T::Bytes);

        impl<T: Primitive> $name<T> {
            pub fn new(value: T) -> Self {
                Self(value.$to())
            }

            pub fn get(&self) -> T {
                T::$from(self.0)
            }

            pub fn bytes(&self) -> &[u8] {
                self.0.as_ref()
            }
        }

        impl<T: Primitive> Word<T> for $name<T> {
            fn new(value: T) -> Self {
                $name::new(value)
            }

            fn get(&self) -> T {
                $name::get(self)
            }
        }

        impl<T: Primitive> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T: Primitive> Copy for $name<T> {}

        impl<T: Primitive> Default for $name<T> {
            fn default() -> Self {
                Self(Default::default())
            }
        }

        impl<T: Primitive> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl<T: Primitive> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({:?})"), self.get())
            }
        }
    };
}

word!(Be, from_be, to_be, "Be");
word!(Le, from_le, to_le, "Le");

/// Conversion between two storage forms of the same value.
pub trait Transpose<Out> {
    fn transpose(&self) -> Out;
}

impl<T: Primitive> Transpose<Le<T>> for Be<T> {
    fn transpose(&self) -> Le<T> {
        Le::new(self.get())
    }
}

impl<T: Primitive> Transpose<Be<T>> for Le<T> {
    fn transpose(&self) -> Be<T> {
        Be::new(self.get())
    }
}

impl<T: Primitive> Transpose<Be<T>> for Be<T> {
    fn transpose(&self) -> Be<T> {
        *self
    }
}

impl<T: Primitive> Transpose<Le<T>> for Le<T> {
    fn transpose(&self) -> Le<T> {
        *self
    }
}

impl<A: Transpose<B>, B, const N: usize> Transpose<[B; N]> for [A; N] {
    fn transpose(&self) -> [B; N] {
        std::array::from_fn(|i| self[i].transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_store_declared_byte_order() {
        let be = Be::new(0x1234u16);
        let le = Le::new(0x1234u16);
        assert_eq!(be.bytes(), &[0x12, 0x34]);
        assert_eq!(le.bytes(), &[0x34, 0x12]);
        assert_eq!(be.get(), le.get());
        assert_eq!(std::mem::size_of::<Be<f32>>(), 4);
        assert_eq!(std::mem::align_of::<Le<u32>>(), 1);
    }

    #[test]
    fn transpose_preserves_value() {
        let be = [Be::new(1.5f32), Be::new(-2.0f32)];
        let le: [Le<f32>; 2] = be.transpose();
        assert_eq!(le[0].get(), 1.5);
        assert_eq!(le[1].get(), -2.0);
        let back: [Be<f32>; 2] = le.transpose();
        assert_eq!(back, be);
    }
}
