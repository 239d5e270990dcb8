use crate::error::TagResult;
use crate::tag::{TagClass, TagId};

/// Where a blob's bytes live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Addressed by a packed pointer, like structs.
    TagData,
    /// The bundle's own raw data region.
    Cache,
    Bitmaps,
    Sounds,
    Loc,
}

impl DataSource {
    /// Data source named by an `external_file_offset` schema value.
    pub fn from_external_name(name: &str) -> Option<Self> {
        match name {
            "bitmaps.map" => Some(DataSource::Bitmaps),
            "sounds.map" => Some(DataSource::Sounds),
            "loc.map" => Some(DataSource::Loc),
            _ => None,
        }
    }
}

/// How a blob field locates its bytes in packed form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobSelector {
    Pointer,
    FileOffset,
    External(DataSource),
}

/// Read access to a packed bundle, as needed by emitted decoders.
pub trait PackedSource {
    fn struct_bytes(&self, pointer: u32, size: usize) -> TagResult<&[u8]>;

    /// The fixed struct of the tag being decoded.
    fn base_struct(&self, size: usize) -> TagResult<&[u8]>;

    fn lookup_tag(&self, id: TagId) -> TagResult<(String, TagClass)>;

    fn data_at(&self, source: DataSource, offset: u32, size: usize) -> TagResult<&[u8]>;

    /// Path and class of the tag being decoded, for diagnostics.
    fn describe(&self) -> String;
}
