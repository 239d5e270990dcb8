/* Field descriptors and value accessors for generic editors. */

use crate::math::*;
use crate::tag::{Dependency, TagClass, TagString};
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float,
    Angle,
    Fraction,
    Index,
    FourCC,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DescriptorKind {
    Number {
        number_type: NumberType,
        /// Scalar components per value (3 for a Point3D, 2 per bounds pair).
        count: usize,
        bounds: bool,
        volatile: bool,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Enum {
        options: &'static [&'static str],
        excluded: &'static [u32],
    },
    Bitfield {
        flags: &'static [&'static str],
        /// Flags an editor may show; cache-only bits are left out.
        mask: u32,
    },
    Dependency {
        /// Allowed class names, empty for any.
        classes: &'static [&'static str],
    },
    Array {
        element: &'static str,
        minimum: u32,
        maximum: u32,
    },
    Blob,
    String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub display_name: &'static str,
    pub identifier: &'static str,
    pub comment: Option<&'static str>,
    pub unit: Option<&'static str>,
    pub read_only: bool,
    /// Offset of the field in the packed layout.
    pub offset: usize,
    pub kind: DescriptorKind,
}

pub trait NumberValue {
    fn components(&self) -> Vec<f64>;

    /// Returns false if `index` is out of range.
    fn set_component(&mut self, index: usize, value: f64) -> bool;
}

pub trait EnumValue {
    fn value(&self) -> u32;
    fn set_value(&mut self, value: u32);
    fn options(&self) -> &'static [&'static str];
}

pub trait BitfieldValue {
    fn bits(&self) -> u32;
    fn set_bits(&mut self, bits: u32);
    fn flags(&self) -> &'static [&'static str];
}

pub trait ArrayValue {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn insert_default(&mut self, index: usize) -> bool;
    fn delete(&mut self, range: Range<usize>) -> bool;
    fn duplicate(&mut self, index: usize) -> bool;
    fn swap(&mut self, a: usize, b: usize) -> bool;
    fn element(&mut self, index: usize) -> Option<&mut dyn TagStruct>;
}

pub trait TagStruct {
    fn struct_name(&self) -> &'static str;

    fn title(&self) -> Option<String> {
        None
    }

    fn values(&mut self) -> Vec<FieldValue<'_>>;
}

pub struct FieldValue<'a> {
    pub descriptor: &'static FieldDescriptor,
    pub access: FieldAccess<'a>,
}

pub enum FieldAccess<'a> {
    Number(&'a mut dyn NumberValue),
    Enum(&'a mut dyn EnumValue),
    Bitfield(&'a mut dyn BitfieldValue),
    Array(&'a mut dyn ArrayValue),
    Dependency(&'a mut Dependency),
    Blob(&'a mut Vec<u8>),
    String(&'a mut TagString),
}

/// Title text for a dependency: the last path component.
pub fn dependency_title(dependency: &Dependency) -> Option<String> {
    if dependency.is_null() {
        return None;
    }
    dependency.path.rsplit('\\').next().map(|s| s.to_string())
}

macro_rules! number_primitive {
    ($($ty:ty),*) => {
        $(
            impl NumberValue for $ty {
                fn components(&self) -> Vec<f64> {
                    vec![*self as f64]
                }

                fn set_component(&mut self, index: usize, value: f64) -> bool {
                    if index != 0 {
                        return false;
                    }
                    *self = value as $ty;
                    true
                }
            }
        )*
    };
}

number_primitive!(i8, u8, i16, u16, i32, u32, f32);

macro_rules! number_compound {
    ($($ty:ident),*) => {
        $(
            impl NumberValue for $ty {
                fn components(&self) -> Vec<f64> {
                    self.to_array().iter().map(|c| *c as f64).collect()
                }

                fn set_component(&mut self, index: usize, value: f64) -> bool {
                    let mut array = self.to_array();
                    match array.get_mut(index) {
                        Some(slot) => {
                            *slot = value as _;
                            *self = Self::from_array(array);
                            true
                        }
                        None => false,
                    }
                }
            }
        )*
    };
}

number_compound!(
    Point2D, Point3D, Vector2D, Vector3D, Euler2D, Euler3D, Quaternion, ColorRGB, ColorARGB,
    Point2DInt, Rectangle2D, Plane2D, Plane3D, Matrix
);

impl NumberValue for TagClass {
    fn components(&self) -> Vec<f64> {
        vec![self.0 as f64]
    }

    fn set_component(&mut self, index: usize, value: f64) -> bool {
        if index != 0 {
            return false;
        }
        self.0 = value as u32;
        true
    }
}

fn set_in_parts(parts: &mut [&mut dyn NumberValue], mut index: usize, value: f64) -> bool {
    for part in parts.iter_mut() {
        let len = part.components().len();
        if index < len {
            return part.set_component(index, value);
        }
        index -= len;
    }
    false
}

impl<T: NumberValue, const N: usize> NumberValue for [T; N] {
    fn components(&self) -> Vec<f64> {
        self.iter().flat_map(|v| v.components()).collect()
    }

    fn set_component(&mut self, index: usize, value: f64) -> bool {
        let mut parts: Vec<&mut dyn NumberValue> = self.iter_mut().map(|v| v as &mut dyn NumberValue).collect();
        set_in_parts(&mut parts, index, value)
    }
}

impl<T: NumberValue> NumberValue for Bounds<T> {
    fn components(&self) -> Vec<f64> {
        let mut out = self.from.components();
        out.extend(self.to.components());
        out
    }

    fn set_component(&mut self, index: usize, value: f64) -> bool {
        let mut parts: [&mut dyn NumberValue; 2] = [&mut self.from, &mut self.to];
        set_in_parts(&mut parts, index, value)
    }
}

impl<T: TagStruct + Default + Clone> ArrayValue for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn insert_default(&mut self, index: usize) -> bool {
        if index > Vec::len(self) {
            return false;
        }
        self.insert(index, T::default());
        true
    }

    fn delete(&mut self, range: Range<usize>) -> bool {
        if range.start > range.end || range.end > Vec::len(self) {
            return false;
        }
        self.drain(range);
        true
    }

    fn duplicate(&mut self, index: usize) -> bool {
        match self.get(index).cloned() {
            Some(copy) => {
                self.insert(index + 1, copy);
                true
            }
            None => false,
        }
    }

    fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= Vec::len(self) || b >= Vec::len(self) {
            return false;
        }
        <[T]>::swap(self, a, b);
        true
    }

    fn element(&mut self, index: usize) -> Option<&mut dyn TagStruct> {
        self.get_mut(index).map(|e| e as &mut dyn TagStruct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Node {
        weight: f32,
    }

    static WEIGHT: FieldDescriptor = FieldDescriptor {
        display_name: "weight",
        identifier: "weight",
        comment: None,
        unit: None,
        read_only: false,
        offset: 0,
        kind: DescriptorKind::Number {
            number_type: NumberType::Float,
            count: 1,
            bounds: false,
            volatile: false,
            minimum: None,
            maximum: None,
        },
    };

    impl TagStruct for Node {
        fn struct_name(&self) -> &'static str {
            "Node"
        }

        fn values(&mut self) -> Vec<FieldValue<'_>> {
            vec![FieldValue {
                descriptor: &WEIGHT,
                access: FieldAccess::Number(&mut self.weight),
            }]
        }
    }

    #[test]
    fn compound_and_bounds_components() {
        let mut p = Point3D::new(1.0, 2.0, 3.0);
        assert!(p.set_component(2, 9.0));
        assert_eq!(p.components(), vec![1.0, 2.0, 9.0]);
        assert!(!p.set_component(3, 0.0));

        let mut b = Bounds::new(1i16, 2i16);
        assert!(b.set_component(1, 5.0));
        assert_eq!(b.to, 5);
    }

    #[test]
    fn array_editing() {
        let mut nodes = vec![Node { weight: 1.0 }];
        let array: &mut dyn ArrayValue = &mut nodes;
        assert!(array.insert_default(1));
        assert!(array.duplicate(0));
        assert_eq!(array.len(), 3);
        assert!(array.swap(0, 2));
        assert!(!array.delete(2..4));
        assert!(array.delete(0..1));

        let element = array.element(1).unwrap();
        assert_eq!(element.struct_name(), "Node");
        match &mut element.values()[0].access {
            FieldAccess::Number(n) => assert_eq!(n.components(), vec![1.0]),
            _ => panic!("expected a number"),
        }
    }

    #[test]
    fn dependency_titles() {
        let dep = Dependency::new(TagClass::new(*b"weap"), "weapons\\pistol\\pistol");
        assert_eq!(dependency_title(&dep).as_deref(), Some("pistol"));
        assert_eq!(dependency_title(&Dependency::default()), None);
    }
}
