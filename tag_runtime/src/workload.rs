/* Build-side collaborators for packed-format encoding.
 *
 * Emitted `compile` functions write into a `StructPool` through the
 * `BuildWorkload` trait and report constraint violations through it.
 * `MemoryWorkload` is a self-contained implementation that can lay the pool
 * out into a `MemoryBundle` for reading back.
 */

use crate::error::{TagError, TagResult};
use crate::source::{DataSource, PackedSource};
use crate::tag::{TagClass, TagId};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildOptions {
    /// Skip range, enum, index and normalization checks.
    pub disable_error_checking: bool,
    /// Warn when arrays exceed the stock engine's limits.
    pub check_stock_limits: bool,
}

pub trait BuildWorkload {
    fn options(&self) -> &BuildOptions;

    fn report(&mut self, severity: Severity, tag_index: Option<usize>, message: &str);

    /// Compile (or find) the referenced tag and return its tag index.
    fn compile_referenced_asset(&mut self, path: &str, class: TagClass) -> TagResult<usize>;

    fn structs_mut(&mut self) -> &mut StructPool;

    /// Append bytes to the bundle's raw data region and return their offset.
    fn add_raw_data(&mut self, data: &[u8]) -> TagResult<u32>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructPointer {
    pub offset: usize,
    pub struct_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructDependency {
    pub offset: usize,
    pub tag_index: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolStruct {
    pub data: Vec<u8>,
    pub pointers: Vec<StructPointer>,
    pub dependencies: Vec<StructDependency>,
}

#[derive(Clone, Debug, Default)]
pub struct StructPool {
    structs: Vec<PoolStruct>,
}

impl StructPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_struct(&mut self, size: usize) -> usize {
        self.new_struct_with(vec![0; size])
    }

    pub fn new_struct_with(&mut self, data: Vec<u8>) -> usize {
        self.structs.push(PoolStruct {
            data,
            ..Default::default()
        });
        self.structs.len() - 1
    }

    pub fn add_pointer(&mut self, owner: usize, offset: usize, target: usize) -> TagResult<()> {
        let s = self.get_mut(owner)?;
        s.pointers.push(StructPointer {
            offset,
            struct_index: target,
        });
        Ok(())
    }

    pub fn add_dependency(&mut self, owner: usize, offset: usize, tag_index: usize) -> TagResult<()> {
        let s = self.get_mut(owner)?;
        s.dependencies.push(StructDependency { offset, tag_index });
        Ok(())
    }

    pub fn bytes_mut(&mut self, index: usize, offset: usize, len: usize) -> TagResult<&mut [u8]> {
        let s = self.get_mut(index)?;
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= s.data.len())
            .ok_or_else(|| {
                TagError::out_of_bounds(format!(
                    "struct #{index} has {:#x} bytes, wanted {len:#x} at {offset:#x}",
                    s.data.len()
                ))
            })?;
        Ok(&mut s.data[offset..end])
    }

    pub fn get(&self, index: usize) -> Option<&PoolStruct> {
        self.structs.get(index)
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    fn get_mut(&mut self, index: usize) -> TagResult<&mut PoolStruct> {
        self.structs
            .get_mut(index)
            .ok_or_else(|| TagError::out_of_bounds(format!("no struct #{index}")))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub tag_index: Option<usize>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredTag {
    pub path: String,
    pub class: TagClass,
    pub base_struct: Option<usize>,
}

/// In-memory build workload.
#[derive(Debug, Default)]
pub struct MemoryWorkload {
    options: BuildOptions,
    structs: StructPool,
    tags: Vec<RegisteredTag>,
    raw_data: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MemoryWorkload {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Register a tag by path and class, returning its index.
    pub fn register_tag(&mut self, path: &str, class: TagClass) -> usize {
        if let Some(index) = self
            .tags
            .iter()
            .position(|t| t.path == path && t.class == class)
        {
            return index;
        }
        self.tags.push(RegisteredTag {
            path: path.to_string(),
            class,
            base_struct: None,
        });
        self.tags.len() - 1
    }

    pub fn set_base_struct(&mut self, tag_index: usize, struct_index: usize) -> TagResult<()> {
        let tag = self
            .tags
            .get_mut(tag_index)
            .ok_or_else(|| TagError::UnknownTag(format!("#{tag_index}")))?;
        tag.base_struct = Some(struct_index);
        Ok(())
    }

    pub fn tags(&self) -> &[RegisteredTag] {
        &self.tags
    }

    pub fn structs(&self) -> &StructPool {
        &self.structs
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
    }

    /// Lay every struct out contiguously and patch pointers.
    pub fn finish(self, tag_index: usize) -> TagResult<MemoryBundle> {
        let base_struct = self
            .tags
            .get(tag_index)
            .and_then(|t| t.base_struct)
            .ok_or_else(|| TagError::UnknownTag(format!("#{tag_index} has no base struct")))?;

        let mut addresses = Vec::with_capacity(self.structs.len());
        let mut size = 0usize;
        for s in &self.structs.structs {
            addresses.push(size);
            size += (s.data.len() + 3) & !3;
        }

        let mut memory = vec![0u8; size];
        for (s, at) in self.structs.structs.iter().zip(&addresses) {
            memory[*at..*at + s.data.len()].copy_from_slice(&s.data);
        }

        for (s, at) in self.structs.structs.iter().zip(&addresses) {
            for pointer in &s.pointers {
                let target = addresses.get(pointer.struct_index).ok_or_else(|| {
                    TagError::out_of_bounds(format!("pointer to missing struct #{}", pointer.struct_index))
                })?;
                let address = MemoryBundle::BASE_ADDRESS + *target as u32;
                let patch = at + pointer.offset;
                let slot = memory.get_mut(patch..patch + 4).ok_or_else(|| {
                    TagError::out_of_bounds(format!("pointer patch at {patch:#x} is outside the bundle"))
                })?;
                slot.copy_from_slice(&address.to_le_bytes());
            }
        }

        let base_struct = *addresses
            .get(base_struct)
            .ok_or_else(|| TagError::out_of_bounds(format!("no struct #{base_struct}")))?;

        Ok(MemoryBundle {
            memory,
            base_struct,
            tag_index,
            tags: self.tags,
            raw_data: self.raw_data,
            external: HashMap::new(),
        })
    }
}

impl BuildWorkload for MemoryWorkload {
    fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn report(&mut self, severity: Severity, tag_index: Option<usize>, message: &str) {
        let tag = tag_index
            .and_then(|i| self.tags.get(i))
            .map(|t| format!("{}.{}", t.path, t.class))
            .unwrap_or_default();
        match severity {
            Severity::Fatal => tracing::error!(tag = %tag, "{message}"),
            Severity::Warning => tracing::warn!(tag = %tag, "{message}"),
        }
        self.diagnostics.push(Diagnostic {
            severity,
            tag_index,
            message: message.to_string(),
        });
    }

    fn compile_referenced_asset(&mut self, path: &str, class: TagClass) -> TagResult<usize> {
        Ok(self.register_tag(path, class))
    }

    fn structs_mut(&mut self) -> &mut StructPool {
        &mut self.structs
    }

    fn add_raw_data(&mut self, data: &[u8]) -> TagResult<u32> {
        let offset = u32::try_from(self.raw_data.len())
            .map_err(|_| TagError::out_of_bounds("raw data exceeds 4 GiB"))?;
        self.raw_data.extend_from_slice(data);
        Ok(offset)
    }
}

/// A laid-out packed bundle held in memory.
#[derive(Debug, Clone)]
pub struct MemoryBundle {
    memory: Vec<u8>,
    base_struct: usize,
    tag_index: usize,
    tags: Vec<RegisteredTag>,
    raw_data: Vec<u8>,
    external: HashMap<DataSource, Vec<u8>>,
}

impl MemoryBundle {
    pub const BASE_ADDRESS: u32 = 0x40440000;

    /// Install the contents of an external data store.
    pub fn set_external(&mut self, source: DataSource, data: Vec<u8>) {
        self.external.insert(source, data);
    }

    /// Replace the class recorded for a registered tag.
    pub fn set_tag_class(&mut self, tag_index: usize, class: TagClass) -> TagResult<()> {
        let tag = self
            .tags
            .get_mut(tag_index)
            .ok_or_else(|| TagError::UnknownTag(format!("#{tag_index}")))?;
        tag.class = class;
        Ok(())
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn slice<'a>(data: &'a [u8], offset: usize, size: usize, what: &str) -> TagResult<&'a [u8]> {
        offset
            .checked_add(size)
            .filter(|end| *end <= data.len())
            .map(|end| &data[offset..end])
            .ok_or_else(|| {
                TagError::out_of_bounds(format!(
                    "{what}: {size:#x} bytes at {offset:#x} exceeds {:#x}",
                    data.len()
                ))
            })
    }
}

impl PackedSource for MemoryBundle {
    fn struct_bytes(&self, pointer: u32, size: usize) -> TagResult<&[u8]> {
        let offset = pointer.checked_sub(Self::BASE_ADDRESS).ok_or_else(|| {
            TagError::out_of_bounds(format!("pointer {pointer:#010x} is below the bundle"))
        })?;
        Self::slice(&self.memory, offset as usize, size, "struct")
    }

    fn base_struct(&self, size: usize) -> TagResult<&[u8]> {
        Self::slice(&self.memory, self.base_struct, size, "base struct")
    }

    fn lookup_tag(&self, id: TagId) -> TagResult<(String, TagClass)> {
        id.index()
            .and_then(|i| self.tags.get(i))
            .map(|t| (t.path.clone(), t.class))
            .ok_or_else(|| TagError::UnknownTag(format!("{:#010x}", id.0)))
    }

    fn data_at(&self, source: DataSource, offset: u32, size: usize) -> TagResult<&[u8]> {
        match source {
            DataSource::TagData => self.struct_bytes(offset, size),
            DataSource::Cache => Self::slice(&self.raw_data, offset as usize, size, "cache data"),
            external => {
                let data = self.external.get(&external).ok_or_else(|| {
                    TagError::out_of_bounds(format!("no {external:?} data store is loaded"))
                })?;
                Self::slice(data, offset as usize, size, "external data")
            }
        }
    }

    fn describe(&self) -> String {
        self.tags
            .get(self.tag_index)
            .map(|t| format!("{}.{}", t.path, t.class))
            .unwrap_or_else(|| format!("tag #{}", self.tag_index))
    }
}
