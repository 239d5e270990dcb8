//! Support library for generated tag code.
//!
//! Emitted sources only `use tag_runtime::prelude::*;` and call into the
//! codec helpers, layouts and collaborator traits defined here.

pub mod codec;
pub mod compare;
pub mod cursor;
pub mod endian;
pub mod error;
pub mod header;
pub mod layout;
pub mod math;
pub mod reflect;
pub mod source;
pub mod stack;
pub mod tag;
pub mod workload;

pub use error::{TagError, TagResult};

pub mod prelude {
    pub use crate::codec::*;
    pub use crate::compare::{report_difference, CompareValue};
    pub use crate::cursor::FileCursor;
    pub use crate::endian::{Be, Le, Primitive, Transpose, Word};
    pub use crate::error::{fatal, TagError, TagResult};
    pub use crate::header::TagFileHeader;
    pub use crate::layout::{
        DataLayout, DependencyLayout, Layout, LayoutReader, LayoutWriter, Padding, ReflexiveLayout,
    };
    pub use crate::math::*;
    pub use crate::reflect::{
        dependency_title, ArrayValue, BitfieldValue, DescriptorKind, EnumValue, FieldAccess,
        FieldDescriptor, FieldValue, NumberType, NumberValue, TagStruct,
    };
    pub use crate::source::{BlobSelector, DataSource, PackedSource};
    pub use crate::stack::{ContainmentStack, StructTag};
    pub use crate::tag::{Dependency, TagClass, TagId, TagString, NULL_INDEX};
    pub use crate::workload::{BuildOptions, BuildWorkload, Severity};
}
