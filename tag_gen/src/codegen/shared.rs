/* Snippets shared by the codegen passes. */

use crate::schema::classify::{BlobKind, ClassifiedField, FieldKind};
use tag_types::{class_by_name, Endian};

/// Which of the two layouts a snippet targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    File,
    Packed,
}

impl Form {
    fn default_word(self) -> &'static str {
        match self {
            Form::File => "Be",
            Form::Packed => "Le",
        }
    }
}

pub fn file_layout(name: &str) -> String {
    format!("{name}FileLayout")
}

pub fn packed_layout(name: &str) -> String {
    format!("{name}PackedLayout")
}

/// Endian word wrapper of a field in the given layout.
pub fn word(field: &ClassifiedField, form: Form) -> &'static str {
    match field.endian {
        Some(Endian::Little) => "Le",
        Some(Endian::Big) => "Be",
        None => form.default_word(),
    }
}

pub fn storage_type(width: u8) -> &'static str {
    match width {
        8 => "u8",
        16 => "u16",
        _ => "u32",
    }
}

fn counted(base: String, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("[{base}; {n}]"),
        None => base,
    }
}

pub fn layout_type(field: &ClassifiedField, form: Form) -> String {
    let w = word(field, form);
    match &field.kind {
        FieldKind::Scalar {
            number, count, bounds, ..
        } => {
            let base = format!("{w}<{}>", number.rust_type());
            if *bounds {
                format!("[{base}; 2]")
            } else {
                counted(base, *count)
            }
        }
        FieldKind::Compound { math, count, .. } => {
            counted(format!("[{w}<{}>; {}]", math.component, math.components), *count)
        }
        FieldKind::Enum { width, .. } | FieldKind::Bitfield { width, .. } => {
            format!("{w}<{}>", storage_type(*width))
        }
        FieldKind::Dependency { .. } => format!("DependencyLayout<{w}<u32>>"),
        FieldKind::Reflexive { .. } => format!("ReflexiveLayout<{w}<u32>>"),
        FieldKind::Blob { .. } => format!("DataLayout<{w}<u32>>"),
        FieldKind::Index { .. } => format!("{w}<u16>"),
        FieldKind::TagId | FieldKind::FourCC => format!("{w}<u32>"),
        FieldKind::TagString => "TagString".to_string(),
        FieldKind::Padding { size } => format!("Padding<{size}>"),
    }
}

/// Type of the member in the editable struct; padding has none.
pub fn editable_type(field: &ClassifiedField) -> Option<String> {
    Some(match &field.kind {
        FieldKind::Scalar {
            number, count, bounds, ..
        } => {
            if *bounds {
                format!("Bounds<{}>", number.rust_type())
            } else {
                counted(number.rust_type().to_string(), *count)
            }
        }
        FieldKind::Compound { math, count, .. } => counted(math.name.to_string(), *count),
        FieldKind::Enum { name, .. } | FieldKind::Bitfield { name, .. } => name.clone(),
        FieldKind::Dependency { .. } => "Dependency".to_string(),
        FieldKind::Reflexive { element, .. } => format!("Vec<{element}>"),
        FieldKind::Blob { .. } => "Vec<u8>".to_string(),
        FieldKind::Index { .. } => "u16".to_string(),
        FieldKind::TagId => "TagId".to_string(),
        FieldKind::TagString => "TagString".to_string(),
        FieldKind::FourCC => "TagClass".to_string(),
        FieldKind::Padding { .. } => return None,
    })
}

/// Expression turning an editable value into its stored form.
/// Handles (dependencies, arrays, blobs) are built by the codecs instead.
pub fn value_to_layout(field: &ClassifiedField, form: Form, value: &str) -> Option<String> {
    let w = word(field, form);
    Some(match &field.kind {
        FieldKind::Scalar { count, bounds, .. } => {
            if *bounds {
                format!("{value}.to_words()")
            } else if count.is_some() {
                format!("{value}.map({w}::new)")
            } else {
                format!("{w}::new({value})")
            }
        }
        FieldKind::Compound { count, .. } => match count {
            Some(_) => format!("{value}.map(|c| c.to_words())"),
            None => format!("{value}.to_words()"),
        },
        FieldKind::Enum { .. } | FieldKind::Bitfield { .. } | FieldKind::TagId | FieldKind::FourCC => {
            format!("{w}::new({value}.0)")
        }
        FieldKind::Index { .. } => format!("{w}::new({value})"),
        FieldKind::TagString => value.to_string(),
        FieldKind::Padding { .. } => "Padding::default()".to_string(),
        FieldKind::Dependency { .. } | FieldKind::Reflexive { .. } | FieldKind::Blob { .. } => return None,
    })
}

/// Expression turning a stored value into its editable form.
pub fn value_from_layout(field: &ClassifiedField, stored: &str) -> Option<String> {
    Some(match &field.kind {
        FieldKind::Scalar { count, bounds, .. } => {
            if *bounds {
                format!("Bounds::from_words(&{stored})")
            } else if count.is_some() {
                format!("{stored}.map(|w| w.get())")
            } else {
                format!("{stored}.get()")
            }
        }
        FieldKind::Compound { math, count, .. } => match count {
            Some(_) => format!("{stored}.map(|w| {}::from_words(&w))", math.name),
            None => format!("{}::from_words(&{stored})", math.name),
        },
        FieldKind::Enum { name, .. } | FieldKind::Bitfield { name, .. } => format!("{name}({stored}.get())"),
        FieldKind::Index { .. } => format!("{stored}.get()"),
        FieldKind::TagId => "TagId::NULL".to_string(),
        FieldKind::FourCC => format!("TagClass({stored}.get())"),
        FieldKind::TagString => stored.to_string(),
        FieldKind::Padding { .. }
        | FieldKind::Dependency { .. }
        | FieldKind::Reflexive { .. }
        | FieldKind::Blob { .. } => return None,
    })
}

/// `TagClass` constant for a class name.
pub fn class_literal(name: &str) -> String {
    let Some(info) = class_by_name(name) else {
        return "TagClass::NULL".to_string();
    };
    let bytes = info.fourcc.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') && !bytes.contains(&b'\\') && !bytes.contains(&b'"') {
        format!("TagClass::new(*b\"{}\")", String::from_utf8_lossy(&bytes))
    } else {
        format!("TagClass({:#010x})", info.fourcc)
    }
}

pub fn class_list(classes: &[String]) -> String {
    let items: Vec<String> = classes.iter().map(|c| class_literal(c)).collect();
    format!("&[{}]", items.join(", "))
}

/// Class restored on null references: the first allowed class, if restricted.
pub fn default_class(classes: &[String]) -> String {
    match classes.first() {
        Some(first) => format!("Some({})", class_literal(first)),
        None => "None".to_string(),
    }
}

pub fn blob_selector(kind: &BlobKind) -> String {
    match kind {
        BlobKind::Pointer => "BlobSelector::Pointer".to_string(),
        BlobKind::FileOffset => "BlobSelector::FileOffset".to_string(),
        BlobKind::External(source) => format!("BlobSelector::External(DataSource::{source})"),
    }
}

/// `&[A::TAG, B::TAG]` for the structs an index may point into.
pub fn struct_tags(names: &[String]) -> String {
    let tags: Vec<String> = names.iter().map(|n| format!("{n}::TAG")).collect();
    format!("&[{}]", tags.join(", "))
}

pub fn float_option(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("Some({})", number_literal(value, true)),
        None => "None".to_string(),
    }
}

pub fn number_literal(value: f64, float: bool) -> String {
    if !float {
        return format!("{}", value as i64);
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value:?}")
    }
}

pub fn string_literal(text: &str) -> String {
    format!("{text:?}")
}

pub fn option_literal(text: Option<&str>) -> String {
    match text {
        Some(text) => format!("Some({})", string_literal(text)),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_literals() {
        assert_eq!(class_literal("weapon"), "TagClass::new(*b\"weap\")");
        assert_eq!(class_literal("fog"), "TagClass::new(*b\"fog \")");
        assert_eq!(class_literal("nonsense"), "TagClass::NULL");
        assert_eq!(default_class(&[]), "None");
        assert_eq!(
            class_list(&["unit".to_string(), "biped".to_string()]),
            "&[TagClass::new(*b\"unit\"), TagClass::new(*b\"bipd\")]"
        );
    }

    #[test]
    fn selectors_and_tags() {
        assert_eq!(blob_selector(&BlobKind::External("Sounds")), "BlobSelector::External(DataSource::Sounds)");
        assert_eq!(struct_tags(&["Unit".to_string(), "Biped".to_string()]), "&[Unit::TAG, Biped::TAG]");
        assert_eq!(float_option(Some(2.0)), "Some(2.0)");
        assert_eq!(float_option(None), "None");
    }

    #[test]
    fn number_literals() {
        assert_eq!(number_literal(1.0, true), "1.0");
        assert_eq!(number_literal(0.25, true), "0.25");
        assert_eq!(number_literal(-3.0, false), "-3");
        assert_eq!(number_literal(1e20, true), "1e20");
    }
}
