/* Fixed-size byte layouts.
 *
 * Every layout type is a plain aggregate of alignment-1 members, read and
 * written member by member through `LayoutReader` / `LayoutWriter`.
 */

use crate::endian::{Be, Le, Primitive, Transpose};
use crate::error::{TagError, TagResult};

pub trait Layout: Sized {
    const SIZE: usize;

    /// Decode from a buffer of at least `SIZE` bytes.
    fn decode(bytes: &[u8]) -> Self;

    /// Encode into a buffer of at least `SIZE` bytes.
    fn encode(&self, out: &mut [u8]);

    fn read(bytes: &[u8]) -> TagResult<Self> {
        if bytes.len() < Self::SIZE {
            return Err(TagError::out_of_bounds(format!(
                "need {:#x} bytes, have {:#x}",
                Self::SIZE,
                bytes.len()
            )));
        }
        Ok(Self::decode(&bytes[..Self::SIZE]))
    }

    fn write(&self, out: &mut [u8]) -> TagResult<()> {
        if out.len() < Self::SIZE {
            return Err(TagError::out_of_bounds(format!(
                "need {:#x} bytes, have {:#x}",
                Self::SIZE,
                out.len()
            )));
        }
        self.encode(&mut out[..Self::SIZE]);
        Ok(())
    }

    fn zeroed() -> Self {
        Self::decode(&vec![0u8; Self::SIZE])
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::SIZE];
        self.encode(&mut out);
        out
    }
}

pub struct LayoutReader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> LayoutReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, at: 0 }
    }

    pub fn next<T: Layout>(&mut self) -> T {
        let value = T::decode(&self.bytes[self.at..self.at + T::SIZE]);
        self.at += T::SIZE;
        value
    }
}

pub struct LayoutWriter<'a> {
    out: &'a mut [u8],
    at: usize,
}

impl<'a> LayoutWriter<'a> {
    pub fn new(out: &'a mut [u8]) -> Self {
        Self { out, at: 0 }
    }

    pub fn put<T: Layout>(&mut self, value: &T) {
        value.encode(&mut self.out[self.at..self.at + T::SIZE]);
        self.at += T::SIZE;
    }
}

impl<T: Primitive> Layout for Be<T> {
    const SIZE: usize = std::mem::size_of::<T>();

    fn decode(bytes: &[u8]) -> Self {
        let mut raw = <T::Bytes as Default>::default();
        raw.as_mut().copy_from_slice(&bytes[..Self::SIZE]);
        Be(raw)
    }

    fn encode(&self, out: &mut [u8]) {
        out[..Self::SIZE].copy_from_slice(self.0.as_ref());
    }
}

impl<T: Primitive> Layout for Le<T> {
    const SIZE: usize = std::mem::size_of::<T>();

    fn decode(bytes: &[u8]) -> Self {
        let mut raw = <T::Bytes as Default>::default();
        raw.as_mut().copy_from_slice(&bytes[..Self::SIZE]);
        Le(raw)
    }

    fn encode(&self, out: &mut [u8]) {
        out[..Self::SIZE].copy_from_slice(self.0.as_ref());
    }
}

impl<T: Layout, const N: usize> Layout for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn decode(bytes: &[u8]) -> Self {
        std::array::from_fn(|i| T::decode(&bytes[i * T::SIZE..(i + 1) * T::SIZE]))
    }

    fn encode(&self, out: &mut [u8]) {
        for (i, item) in self.iter().enumerate() {
            item.encode(&mut out[i * T::SIZE..(i + 1) * T::SIZE]);
        }
    }
}

/// Unnamed bytes that are always written as zero.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Padding<const N: usize>(pub [u8; N]);

impl<const N: usize> Default for Padding<N> {
    fn default() -> Self {
        Padding([0; N])
    }
}

impl<const N: usize> Layout for Padding<N> {
    const SIZE: usize = N;

    fn decode(_bytes: &[u8]) -> Self {
        Padding::default()
    }

    fn encode(&self, out: &mut [u8]) {
        out[..N].fill(0);
    }
}

impl<const N: usize> Transpose<Padding<N>> for Padding<N> {
    fn transpose(&self) -> Padding<N> {
        Padding::default()
    }
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident { $($field:ident),* $(,)? }) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        pub struct $name<W> {
            $(pub $field: W,)*
        }

        impl<W: Layout> Layout for $name<W> {
            const SIZE: usize = W::SIZE * [$(stringify!($field)),*].len();

            fn decode(bytes: &[u8]) -> Self {
                let mut r = LayoutReader::new(bytes);
                Self { $($field: r.next(),)* }
            }

            fn encode(&self, out: &mut [u8]) {
                let mut w = LayoutWriter::new(out);
                $(w.put(&self.$field);)*
            }
        }

        impl<A: Transpose<B>, B> Transpose<$name<B>> for $name<A> {
            fn transpose(&self) -> $name<B> {
                $name { $($field: self.$field.transpose(),)* }
            }
        }
    };
}

handle! {
    /// Stored form of a reference to another tag.
    DependencyLayout { class, path_pointer, path_size, id }
}

handle! {
    /// Stored form of an array of nested structs.
    ReflexiveLayout { count, pointer, unused }
}

handle! {
    /// Stored form of a blob.
    DataLayout { size, external, file_offset, pointer, unused }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_sizes() {
        assert_eq!(DependencyLayout::<Be<u32>>::SIZE, 0x10);
        assert_eq!(ReflexiveLayout::<Le<u32>>::SIZE, 0xC);
        assert_eq!(DataLayout::<Be<u32>>::SIZE, 0x14);
        assert_eq!(std::mem::size_of::<DataLayout<Be<u32>>>(), 0x14);
    }

    #[test]
    fn handle_codec_and_transpose() {
        let handle = ReflexiveLayout {
            count: Be::new(3u32),
            pointer: Be::new(0x40440000u32),
            unused: Be::new(0u32),
        };
        let bytes = handle.to_bytes();
        assert_eq!(&bytes[..4], &[0, 0, 0, 3]);
        assert_eq!(ReflexiveLayout::<Be<u32>>::read(&bytes).unwrap(), handle);

        let little: ReflexiveLayout<Le<u32>> = handle.transpose();
        assert_eq!(&little.to_bytes()[..4], &[3, 0, 0, 0]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(matches!(
            <[Be<f32>; 3]>::read(&[0u8; 11]),
            Err(TagError::OutOfBounds(_))
        ));
        let mut out = [0u8; 2];
        assert!(Be::new(1u32).write(&mut out).is_err());
    }

    #[test]
    fn padding_is_always_zero() {
        let mut out = [0xFFu8; 4];
        Padding::<4>::decode(&[1, 2, 3, 4]).encode(&mut out);
        assert_eq!(out, [0; 4]);
    }
}
