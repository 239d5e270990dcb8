/* Field-level helpers called from emitted codecs. */

use crate::endian::{Be, Le};
use crate::error::{fatal, TagError, TagResult};
use crate::cursor::FileCursor;
use crate::layout::{DataLayout, DependencyLayout, Layout, ReflexiveLayout};
use crate::math::Normalize;
use crate::source::{BlobSelector, DataSource, PackedSource};
use crate::stack::{ContainmentStack, StructTag};
use crate::tag::{format_class_list, Dependency, TagClass, TagId, NULL_INDEX};
use crate::workload::{BuildWorkload, Severity};

/// Offset of `pointer` within a reflexive handle.
const REFLEXIVE_POINTER: usize = 4;
/// Offset of `pointer` within a data handle.
const DATA_POINTER: usize = 12;

pub fn count_u32(len: usize, what: &str) -> TagResult<u32> {
    u32::try_from(len).map_err(|_| TagError::out_of_bounds(format!("{what} has too many elements ({len})")))
}

/* Packed decode */

pub fn read_packed_dependency(
    source: &dyn PackedSource,
    handle: &DependencyLayout<Le<u32>>,
    default_class: Option<TagClass>,
    owner: &'static str,
    field: &'static str,
) -> TagResult<Dependency> {
    let mut class = TagClass(handle.class.get());
    let id = TagId(handle.id.get());
    if id.is_null() {
        if class == TagClass::NULL {
            if let Some(default_class) = default_class {
                class = default_class;
            }
        }
        return Ok(Dependency::null(class));
    }

    let describe = || format!("invalid reference for {owner}::{field} in {}", source.describe());
    let (path, referenced_class) = source.lookup_tag(id).map_err(|e| e.context(describe()))?;
    if referenced_class != class {
        return Err(TagError::invalid(
            "Corrupt tag reference (class in reference does not match class in referenced tag)",
        )
        .context(describe()));
    }
    Ok(Dependency {
        class,
        path: path.to_lowercase(),
        id,
    })
}

pub fn read_packed_array<T>(
    handle: &ReflexiveLayout<Le<u32>>,
    element_size: usize,
    owner: &'static str,
    field: &'static str,
    mut parse: impl FnMut(u32) -> TagResult<T>,
) -> TagResult<Vec<T>> {
    let count = handle.count.get() as usize;
    let pointer = handle.pointer.get();
    let mut elements = Vec::new();
    for i in 0..count {
        let at = u32::try_from(i * element_size)
            .ok()
            .and_then(|delta| pointer.checked_add(delta))
            .ok_or_else(|| TagError::out_of_bounds(format!("{owner}::{field} runs past the address space")))?;
        elements.push(parse(at).map_err(|e| TagError::element("parse", owner, field, i, e))?);
    }
    Ok(elements)
}

pub fn read_packed_blob(
    source: &dyn PackedSource,
    handle: &DataLayout<Le<u32>>,
    selector: BlobSelector,
    owner: &'static str,
    field: &'static str,
) -> TagResult<Vec<u8>> {
    let size = handle.size.get() as usize;
    if size == 0 {
        return Ok(Vec::new());
    }
    let file_offset = handle.file_offset.get();
    let (data_source, offset) = match selector {
        BlobSelector::Pointer => (DataSource::TagData, handle.pointer.get()),
        BlobSelector::FileOffset => (DataSource::Cache, file_offset),
        BlobSelector::External(external @ (DataSource::Bitmaps | DataSource::Sounds)) => {
            if handle.external.get() & 1 != 0 {
                (external, file_offset)
            } else {
                (DataSource::Cache, file_offset)
            }
        }
        BlobSelector::External(external) => (external, file_offset),
    };
    source
        .data_at(data_source, offset, size)
        .map(|bytes| bytes.to_vec())
        .map_err(|e| e.context(format!("failed to read tag data for {owner}::{field} in {}", source.describe())))
}

/* Packed encode */

#[allow(clippy::too_many_arguments)]
pub fn compile_dependency(
    workload: &mut dyn BuildWorkload,
    tag_index: usize,
    struct_index: usize,
    offset: usize,
    dependency: &Dependency,
    classes: &[TagClass],
    non_null: bool,
    owner: &'static str,
    field: &'static str,
) -> TagResult<DependencyLayout<Le<u32>>> {
    let mut id = TagId::NULL;
    if !dependency.is_null() {
        if !classes.is_empty() && !classes.contains(&dependency.class) {
            return Err(fatal(
                workload,
                tag_index,
                format!(
                    "{owner}::{field} must be{}, found {}, instead",
                    format_class_list(classes),
                    dependency.class
                ),
            ));
        }
        let index = workload.compile_referenced_asset(&dependency.path, dependency.class)?;
        workload.structs_mut().add_dependency(struct_index, offset, index)?;
        id = TagId::from_index(index);
    } else if non_null {
        return Err(fatal(workload, tag_index, format!("{owner}::{field} must not be null")));
    }
    Ok(DependencyLayout {
        class: Le::new(dependency.class.0),
        path_pointer: Le::new(0),
        path_size: Le::new(0),
        id: Le::new(id.0),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn check_array_count(
    workload: &mut dyn BuildWorkload,
    tag_index: usize,
    len: usize,
    minimum: u32,
    maximum: u32,
    stock_maximum: Option<u32>,
    owner: &'static str,
    field: &'static str,
) -> TagResult<()> {
    let blocks = |n: u32| if n == 1 { "block" } else { "blocks" };
    if len < minimum as usize {
        return Err(fatal(
            workload,
            tag_index,
            format!("{owner}::{field} must have at least {minimum} {}", blocks(minimum)),
        ));
    }
    if len > maximum as usize {
        return Err(fatal(
            workload,
            tag_index,
            format!("{owner}::{field} must have no more than {maximum} {}", blocks(maximum)),
        ));
    }
    if let Some(stock) = stock_maximum {
        if workload.options().check_stock_limits && len > stock as usize {
            workload.report(
                Severity::Warning,
                Some(tag_index),
                &format!(
                    "{owner}::{field} exceeds the stock limit of {stock} blocks and may not work as intended on the target engine"
                ),
            );
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn compile_array<T>(
    workload: &mut dyn BuildWorkload,
    struct_index: usize,
    offset: usize,
    elements: &[T],
    element_size: usize,
    owner: &'static str,
    field: &'static str,
    mut compile: impl FnMut(&mut dyn BuildWorkload, &T, usize, usize) -> TagResult<()>,
) -> TagResult<ReflexiveLayout<Le<u32>>> {
    let count = count_u32(elements.len(), field)?;
    if count > 0 {
        let array = workload.structs_mut().new_struct(elements.len() * element_size);
        workload
            .structs_mut()
            .add_pointer(struct_index, offset + REFLEXIVE_POINTER, array)?;
        for (i, element) in elements.iter().enumerate() {
            compile(&mut *workload, element, array, i * element_size)
                .map_err(|e| TagError::element("compile", owner, field, i, e))?;
        }
    }
    Ok(ReflexiveLayout {
        count: Le::new(count),
        pointer: Le::new(0),
        unused: Le::new(0),
    })
}

pub fn compile_blob(
    workload: &mut dyn BuildWorkload,
    struct_index: usize,
    offset: usize,
    data: &[u8],
    selector: BlobSelector,
) -> TagResult<DataLayout<Le<u32>>> {
    let size = count_u32(data.len(), "blob")?;
    let mut file_offset = 0;
    if !data.is_empty() {
        match selector {
            BlobSelector::Pointer => {
                let blob = workload.structs_mut().new_struct_with(data.to_vec());
                workload
                    .structs_mut()
                    .add_pointer(struct_index, offset + DATA_POINTER, blob)?;
            }
            BlobSelector::FileOffset | BlobSelector::External(_) => {
                file_offset = workload.add_raw_data(data)?;
            }
        }
    }
    Ok(DataLayout {
        size: Le::new(size),
        external: Le::new(0),
        file_offset: Le::new(file_offset),
        pointer: Le::new(0),
        unused: Le::new(0),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn check_range(
    workload: &mut dyn BuildWorkload,
    tag_index: usize,
    value: f64,
    minimum: Option<f64>,
    maximum: Option<f64>,
    owner: &'static str,
    field: &'static str,
) -> TagResult<()> {
    if let Some(minimum) = minimum {
        if value < minimum {
            return Err(fatal(
                workload,
                tag_index,
                format!("{owner}::{field} must be at least {minimum} (found {value})"),
            ));
        }
    }
    if let Some(maximum) = maximum {
        if value > maximum {
            return Err(fatal(
                workload,
                tag_index,
                format!("{owner}::{field} must be no more than {maximum} (found {value})"),
            ));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn check_enum(
    workload: &mut dyn BuildWorkload,
    tag_index: usize,
    value: u32,
    count: u32,
    excluded: &[u32],
    owner: &'static str,
    field: &'static str,
) -> TagResult<()> {
    if value >= count {
        return Err(fatal(
            workload,
            tag_index,
            format!("{owner}::{field} is out of range ({value} >= {count})"),
        ));
    }
    if excluded.contains(&value) {
        return Err(fatal(
            workload,
            tag_index,
            format!("{owner}::{field} has an invalid value ({value})"),
        ));
    }
    Ok(())
}

pub fn check_normal<N: Normalize>(
    workload: &mut dyn BuildWorkload,
    tag_index: usize,
    value: &N,
    owner: &'static str,
    field: &'static str,
) -> TagResult<()> {
    if value.is_normalized() {
        return Ok(());
    }
    Err(fatal(
        workload,
        tag_index,
        format!("{owner}::{field} is not a normal {} {}", N::DESCRIPTION, value.describe()),
    ))
}

/// True when `value` addresses past the end of the targeted ancestor array.
/// Null indices and targets absent from the stack are never out of range.
pub fn index_out_of_range(
    stack: &ContainmentStack,
    value: u16,
    targets: &[StructTag],
    member: &str,
) -> Option<usize> {
    if value == NULL_INDEX {
        return None;
    }
    match stack.array_len(targets, member) {
        Some(len) if value as usize >= len => Some(len),
        Some(_) => None,
        None => {
            tracing::debug!(?targets, member, "index target not found in containment stack");
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn check_index(
    workload: &mut dyn BuildWorkload,
    tag_index: usize,
    stack: &ContainmentStack,
    value: u16,
    targets: &[StructTag],
    member: &'static str,
    owner: &'static str,
    field: &'static str,
) -> TagResult<()> {
    match index_out_of_range(stack, value, targets, member) {
        Some(len) => Err(fatal(
            workload,
            tag_index,
            format!(
                "{owner}::{field} references an invalid index of {}::{member} ({value} >= {len})",
                targets.first().map(|t| t.0).unwrap_or("?")
            ),
        )),
        None => Ok(()),
    }
}

/* Validators */

/// True when `value` lies outside `[minimum, maximum]`; clamps it when `fix` is set.
pub fn fix_range<T: Copy + PartialOrd>(value: &mut T, minimum: Option<T>, maximum: Option<T>, fix: bool) -> bool {
    if let Some(minimum) = minimum {
        if *value < minimum {
            if fix {
                *value = minimum;
            }
            return true;
        }
    }
    if let Some(maximum) = maximum {
        if *value > maximum {
            if fix {
                *value = maximum;
            }
            return true;
        }
    }
    false
}

/// True when the dependency's class is not allowed, a null class included.
/// Fixing nulls it to the first allowed class.
pub fn fix_reference(dependency: &mut Dependency, classes: &[TagClass], fix: bool) -> bool {
    if classes.is_empty() || classes.contains(&dependency.class) {
        return false;
    }
    if fix {
        *dependency = Dependency::null(classes[0]);
    }
    true
}

pub fn fix_uppercase(dependency: &mut Dependency, fix: bool) -> bool {
    if !dependency.path.chars().any(|c| c.is_uppercase()) {
        return false;
    }
    if fix {
        dependency.path = dependency.path.to_lowercase();
    }
    true
}

pub fn fix_normal<N: Normalize>(value: &mut N, fix: bool) -> bool {
    if value.is_normalized() {
        return false;
    }
    if fix {
        *value = value.normalized();
    }
    true
}

/// Point a matching dependency somewhere else. Paths compare case-insensitively.
pub fn refactor_dependency(
    dependency: &mut Dependency,
    from_path: &str,
    from_class: TagClass,
    to_path: &str,
    to_class: TagClass,
) -> bool {
    if dependency.class != from_class || !dependency.path.eq_ignore_ascii_case(from_path) {
        return false;
    }
    *dependency = Dependency::new(to_class, to_path);
    true
}

/* File decode */

pub fn read_file_dependency(
    cursor: &mut FileCursor<'_>,
    handle: &DependencyLayout<Be<u32>>,
    default_class: Option<TagClass>,
    owner: &'static str,
    field: &'static str,
) -> TagResult<Dependency> {
    let mut class = TagClass(handle.class.get());
    if class == TagClass::NULL {
        if let Some(default_class) = default_class {
            class = default_class;
        }
    }
    let len = handle.path_size.get() as usize;
    if len == 0 {
        return Ok(Dependency::null(class));
    }
    let what = format!("{owner}::{field} path");
    let bytes = cursor.take(len + 1, &what)?;
    if bytes[len] != 0 {
        return Err(TagError::invalid(format!("{what} is missing a null terminator")));
    }
    if bytes[..len].contains(&0) {
        return Err(TagError::invalid(format!("{what} size is smaller than expected")));
    }
    let path = std::str::from_utf8(&bytes[..len])
        .map_err(|_| TagError::invalid(format!("{what} is not valid UTF-8")))?;
    Ok(Dependency::new(class, path))
}

pub fn read_file_array<'a, T>(
    cursor: &mut FileCursor<'a>,
    handle: &ReflexiveLayout<Be<u32>>,
    element_size: usize,
    owner: &'static str,
    field: &'static str,
    mut parse: impl FnMut(&'a [u8], &mut FileCursor<'a>) -> TagResult<T>,
) -> TagResult<Vec<T>> {
    let count = handle.count.get() as usize;
    let total = count
        .checked_mul(element_size)
        .ok_or_else(|| TagError::out_of_bounds(format!("{owner}::{field} count {count} is too large")))?;
    let headers = cursor.take(total, field)?;
    let mut elements = Vec::new();
    for i in 0..count {
        let start = i * element_size;
        let header = &headers[start..start + element_size];
        elements.push(parse(header, cursor).map_err(|e| TagError::element("parse", owner, field, i, e))?);
    }
    Ok(elements)
}

pub fn read_file_blob(
    cursor: &mut FileCursor<'_>,
    handle: &DataLayout<Be<u32>>,
    owner: &'static str,
    field: &'static str,
) -> TagResult<Vec<u8>> {
    let size = handle.size.get() as usize;
    Ok(cursor.take(size, &format!("{owner}::{field} data"))?.to_vec())
}

/* File encode */

pub fn write_fixed<L: Layout>(out: &mut [u8], at: usize, layout: &L) -> TagResult<()> {
    let slot = out
        .get_mut(at..at + L::SIZE)
        .ok_or_else(|| TagError::out_of_bounds(format!("no room for {:#x} bytes at {at:#x}", L::SIZE)))?;
    layout.write(slot)
}

pub fn file_dependency_header(
    dependency: &Dependency,
    default_class: Option<TagClass>,
) -> TagResult<DependencyLayout<Be<u32>>> {
    let mut class = dependency.class;
    if class == TagClass::NULL {
        if let Some(default_class) = default_class {
            class = default_class;
        }
    }
    Ok(DependencyLayout {
        class: Be::new(class.0),
        path_pointer: Be::new(0),
        path_size: Be::new(count_u32(dependency.path.len(), "dependency path")?),
        id: Be::new(TagId::NULL.0),
    })
}

pub fn write_file_dependency(out: &mut Vec<u8>, dependency: &Dependency) {
    if !dependency.path.is_empty() {
        out.extend_from_slice(dependency.path.as_bytes());
        out.push(0);
    }
}

pub fn file_array_header(len: usize) -> TagResult<ReflexiveLayout<Be<u32>>> {
    Ok(ReflexiveLayout {
        count: Be::new(count_u32(len, "array")?),
        pointer: Be::new(0),
        unused: Be::new(0),
    })
}

pub fn write_file_array<T>(
    out: &mut Vec<u8>,
    elements: &[T],
    element_size: usize,
    owner: &'static str,
    field: &'static str,
    mut write: impl FnMut(&T, &mut Vec<u8>, usize) -> TagResult<()>,
) -> TagResult<()> {
    let start = out.len();
    out.resize(start + elements.len() * element_size, 0);
    for (i, element) in elements.iter().enumerate() {
        write(element, out, start + i * element_size)
            .map_err(|e| TagError::element("generate", owner, field, i, e))?;
    }
    Ok(())
}

pub fn file_blob_header(len: usize) -> TagResult<DataLayout<Be<u32>>> {
    Ok(DataLayout {
        size: Be::new(count_u32(len, "blob")?),
        external: Be::new(0),
        file_offset: Be::new(0),
        pointer: Be::new(0),
        unused: Be::new(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{BuildOptions, MemoryWorkload};

    fn weapon() -> TagClass {
        TagClass::new(*b"weap")
    }

    #[test]
    fn dependency_class_must_be_allowed() {
        let mut workload = MemoryWorkload::new(BuildOptions::default());
        let s = workload.structs_mut().new_struct(16);
        let dep = Dependency::new(TagClass::new(*b"vehi"), "vehicles\\hog");
        let err = compile_dependency(&mut workload, 0, s, 0, &dep, &[weapon()], false, "Unit", "weapon")
            .unwrap_err();
        assert_eq!(err.to_string(), "Unit::weapon must be weapon, found vehicle, instead");
        assert_eq!(workload.diagnostics.len(), 1);
    }

    #[test]
    fn dependency_registers_patch() {
        let mut workload = MemoryWorkload::new(BuildOptions::default());
        let s = workload.structs_mut().new_struct(32);
        let dep = Dependency::new(weapon(), "weapons\\pistol");
        let handle = compile_dependency(&mut workload, 0, s, 16, &dep, &[], false, "Unit", "weapon").unwrap();
        assert_eq!(handle.id.get(), TagId::from_index(0).0);
        let deps = &workload.structs().get(s).unwrap().dependencies;
        assert_eq!(deps[0].offset, 16);
    }

    #[test]
    fn null_dependency_rules() {
        let mut workload = MemoryWorkload::new(BuildOptions::default());
        let s = workload.structs_mut().new_struct(16);
        let dep = Dependency::null(TagClass::NULL);
        assert!(compile_dependency(&mut workload, 0, s, 0, &dep, &[weapon()], true, "A", "b").is_err());
        let handle = compile_dependency(&mut workload, 0, s, 0, &dep, &[weapon()], false, "A", "b").unwrap();
        assert_eq!(handle.id.get(), TagId::NULL.0);
    }

    #[test]
    fn array_counts() {
        let mut workload = MemoryWorkload::new(BuildOptions {
            check_stock_limits: true,
            ..Default::default()
        });
        assert_eq!(
            check_array_count(&mut workload, 0, 0, 1, 10, None, "A", "b").unwrap_err().to_string(),
            "A::b must have at least 1 block"
        );
        assert_eq!(
            check_array_count(&mut workload, 0, 11, 0, 10, None, "A", "b").unwrap_err().to_string(),
            "A::b must have no more than 10 blocks"
        );
        check_array_count(&mut workload, 0, 5, 0, 10, Some(4), "A", "b").unwrap();
        assert_eq!(workload.diagnostics.last().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn enum_checks() {
        let mut workload = MemoryWorkload::new(BuildOptions::default());
        assert!(check_enum(&mut workload, 0, 1, 3, &[], "A", "e").is_ok());
        assert_eq!(
            check_enum(&mut workload, 0, 3, 3, &[], "A", "e").unwrap_err().to_string(),
            "A::e is out of range (3 >= 3)"
        );
        assert_eq!(
            check_enum(&mut workload, 0, 2, 3, &[2], "A", "e").unwrap_err().to_string(),
            "A::e has an invalid value (2)"
        );
    }

    #[test]
    fn index_lookup_uses_stack() {
        let tags = [StructTag("Model")];
        let mut stack = ContainmentStack::new();
        assert_eq!(index_out_of_range(&stack, 7, &tags, "nodes"), None);
        let frame = stack.enter(StructTag("Model"), &[("nodes", 3)]);
        assert_eq!(index_out_of_range(&frame, 3, &tags, "nodes"), Some(3));
        assert_eq!(index_out_of_range(&frame, 2, &tags, "nodes"), None);
        assert_eq!(index_out_of_range(&frame, NULL_INDEX, &tags, "nodes"), None);
    }

    #[test]
    fn empty_elements_still_count() {
        let handle = ReflexiveLayout {
            count: Be::new(3u32),
            pointer: Be::new(0u32),
            unused: Be::new(0u32),
        };
        let mut cursor = FileCursor::new(&[]);
        let elements = read_file_array(&mut cursor, &handle, 0, "A", "empties", |header, _| Ok(header.len())).unwrap();
        assert_eq!(elements, vec![0, 0, 0]);
        cursor.finish().unwrap();
    }

    #[test]
    fn file_dependency_path_rules() {
        let handle = DependencyLayout {
            class: Be::new(0),
            path_pointer: Be::new(0),
            path_size: Be::new(3),
            id: Be::new(TagId::NULL.0),
        };
        let good = b"abc\0";
        let dep = read_file_dependency(&mut FileCursor::new(good), &handle, Some(weapon()), "A", "d").unwrap();
        assert_eq!(dep, Dependency::new(weapon(), "abc"));

        let early = b"a\0c\0";
        assert!(read_file_dependency(&mut FileCursor::new(early), &handle, None, "A", "d").is_err());
        let unterminated = b"abcd";
        assert!(read_file_dependency(&mut FileCursor::new(unterminated), &handle, None, "A", "d").is_err());
    }

    #[test]
    fn file_dependency_header_defaults_class() {
        let header = file_dependency_header(&Dependency::default(), Some(weapon())).unwrap();
        assert_eq!(header.class.get(), weapon().0);
        assert_eq!(header.path_size.get(), 0);
        let mut out = Vec::new();
        write_file_dependency(&mut out, &Dependency::new(weapon(), "x"));
        assert_eq!(out, b"x\0");
    }

    #[test]
    fn validator_helpers() {
        let mut value = 1.5f32;
        assert!(!fix_range(&mut value, Some(0.0), Some(2.0), false));
        assert!(fix_range(&mut value, Some(0.0), Some(1.0), true));
        assert_eq!(value, 1.0);

        let mut dep = Dependency::new(TagClass::new(*b"vehi"), "Vehicles\\Hog");
        assert!(fix_uppercase(&mut dep, true));
        assert_eq!(dep.path, "vehicles\\hog");
        assert!(fix_reference(&mut dep, &[weapon()], false));
        assert!(fix_reference(&mut dep, &[weapon()], true));
        assert_eq!(dep, Dependency::null(weapon()));

        let mut unset = Dependency::null(TagClass::NULL);
        assert!(fix_reference(&mut unset, &[weapon()], true));
        assert_eq!(unset, Dependency::null(weapon()));
        assert!(!fix_reference(&mut Dependency::null(TagClass::NULL), &[], false));

        let mut dep = Dependency::new(weapon(), "weapons\\pistol");
        assert!(refactor_dependency(&mut dep, "Weapons\\Pistol", weapon(), "weapons\\rifle", weapon()));
        assert_eq!(dep.path, "weapons\\rifle");
        assert!(!refactor_dependency(&mut dep, "weapons\\rifle", TagClass::NULL, "x", weapon()));
    }
}
