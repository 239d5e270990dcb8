use crate::endian::Transpose;
use crate::layout::Layout;
use std::fmt;

/// Null sentinel for Index fields.
pub const NULL_INDEX: u16 = 0xFFFF;

/// Four-character tag class code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagClass(pub u32);

impl TagClass {
    pub const NULL: TagClass = TagClass(0);
    pub const NONE: TagClass = TagClass(0xFFFFFFFF);

    pub const fn new(fourcc: [u8; 4]) -> Self {
        TagClass(u32::from_be_bytes(fourcc))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            tag_types::NULL_CLASS_NAME => Some(TagClass::NULL),
            tag_types::NONE_CLASS_NAME => Some(TagClass::NONE),
            _ => tag_types::class_by_name(name).map(|c| TagClass(c.fourcc)),
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            TagClass::NULL => Some(tag_types::NULL_CLASS_NAME),
            TagClass::NONE => Some(tag_types::NONE_CLASS_NAME),
            _ => tag_types::class_by_fourcc(self.0).map(|c| c.name),
        }
    }

    /// File-format version for this class, if it is a known class.
    pub fn version(self) -> Option<u16> {
        tag_types::class_by_fourcc(self.0).map(|c| c.version)
    }

    pub fn is_null(self) -> bool {
        self == TagClass::NULL || self == TagClass::NONE
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown ({:#010x})", self.0),
        }
    }
}

/// Packed-format tag identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TagId(pub u32);

impl TagId {
    pub const NULL: TagId = TagId(0xFFFFFFFF);

    pub fn from_index(index: usize) -> Self {
        let index = index as u32 & 0xFFFF;
        TagId(((0xE174 + index) << 16) | index)
    }

    pub fn is_null(self) -> bool {
        self == TagId::NULL
    }

    pub fn index(self) -> Option<usize> {
        if self.is_null() {
            None
        } else {
            Some((self.0 & 0xFFFF) as usize)
        }
    }
}

impl Default for TagId {
    fn default() -> Self {
        TagId::NULL
    }
}

/// Reference to another tag by path and class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dependency {
    pub class: TagClass,
    /// Backslash-separated path without extension; empty when null.
    pub path: String,
    pub id: TagId,
}

impl Dependency {
    pub fn new(class: TagClass, path: impl Into<String>) -> Self {
        Self {
            class,
            path: path.into(),
            id: TagId::NULL,
        }
    }

    /// A null reference that still carries a class.
    pub fn null(class: TagClass) -> Self {
        Self::new(class, String::new())
    }

    pub fn is_null(&self) -> bool {
        self.path.is_empty()
    }
}

/// Fixed 32-byte NUL-terminated string.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TagString(pub [u8; 32]);

impl TagString {
    pub fn new(text: &str) -> Self {
        let mut bytes = [0u8; 32];
        let len = text.len().min(31);
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        TagString(bytes)
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end])
    }
}

impl Default for TagString {
    fn default() -> Self {
        TagString([0; 32])
    }
}

impl fmt::Debug for TagString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagString({:?})", self.as_str())
    }
}

impl Layout for TagString {
    const SIZE: usize = 32;

    fn decode(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&bytes[..32]);
        TagString(raw)
    }

    fn encode(&self, out: &mut [u8]) {
        out[..32].copy_from_slice(&self.0);
    }
}

impl Transpose<TagString> for TagString {
    fn transpose(&self) -> TagString {
        *self
    }
}

/// Render an allow-list as " a", " a or b" or " a, b, or c".
pub fn format_class_list(classes: &[TagClass]) -> String {
    let names: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => format!(" {one}"),
        [a, b] => format!(" {a} or {b}"),
        [rest @ .., last] => {
            let mut out = String::new();
            for name in rest {
                out.push_str(&format!(" {name},"));
            }
            out.push_str(&format!(" or {last}"));
            out
        }
    }
}
