/* Field classification.
 *
 * Every field of every struct, inherited ones included, is mapped onto one
 * `FieldKind`. Codegen passes match on the kind exhaustively and never look
 * at schema type names again.
 */

use super::layout_graph::UNORDERED_LEAVES;
use super::names::member_name;
use super::resolved::{ResolvedBitfield, ResolvedEnum, ResolvedField, ResolvedStruct, SchemaSet};
use super::SchemaError;
use serde_derive::Serialize;
use tag_types::{class_by_name, Endian};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float,
    Angle,
    Fraction,
}

impl NumberKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "int8" => NumberKind::Int8,
            "uint8" => NumberKind::UInt8,
            "int16" => NumberKind::Int16,
            "uint16" => NumberKind::UInt16,
            "int32" => NumberKind::Int32,
            "uint32" => NumberKind::UInt32,
            "float" => NumberKind::Float,
            "Angle" => NumberKind::Angle,
            "Fraction" => NumberKind::Fraction,
            _ => return None,
        })
    }

    pub fn rust_type(self) -> &'static str {
        match self {
            NumberKind::Int8 => "i8",
            NumberKind::UInt8 => "u8",
            NumberKind::Int16 => "i16",
            NumberKind::UInt16 => "u16",
            NumberKind::Int32 => "i32",
            NumberKind::UInt32 => "u32",
            NumberKind::Float | NumberKind::Angle | NumberKind::Fraction => "f32",
        }
    }

    pub fn size(self) -> usize {
        match self {
            NumberKind::Int8 | NumberKind::UInt8 => 1,
            NumberKind::Int16 | NumberKind::UInt16 => 2,
            _ => 4,
        }
    }

    pub fn is_float(self) -> bool {
        self.rust_type() == "f32"
    }

    /// Variant name of the runtime's `NumberType`.
    pub fn reflect_name(self) -> &'static str {
        match self {
            NumberKind::Int8 => "Int8",
            NumberKind::UInt8 => "UInt8",
            NumberKind::Int16 => "Int16",
            NumberKind::UInt16 => "UInt16",
            NumberKind::Int32 => "Int32",
            NumberKind::UInt32 => "UInt32",
            NumberKind::Float => "Float",
            NumberKind::Angle => "Angle",
            NumberKind::Fraction => "Fraction",
        }
    }
}

/// A compound math type of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MathKind {
    pub name: &'static str,
    pub component: &'static str,
    pub components: usize,
    pub normalizable: bool,
}

impl MathKind {
    pub fn component_size(&self) -> usize {
        if self.component == "i16" { 2 } else { 4 }
    }

    pub fn is_float(&self) -> bool {
        self.component == "f32"
    }
}

const fn math(name: &'static str, component: &'static str, components: usize, normalizable: bool) -> MathKind {
    MathKind {
        name,
        component,
        components,
        normalizable,
    }
}

pub const MATH_KINDS: &[MathKind] = &[
    math("ColorARGB", "f32", 4, false),
    math("ColorRGB", "f32", 3, false),
    math("Euler2D", "f32", 2, false),
    math("Euler3D", "f32", 3, false),
    math("Matrix", "f32", 9, false),
    math("Plane2D", "f32", 3, true),
    math("Plane3D", "f32", 4, true),
    math("Point2D", "f32", 2, false),
    math("Point2DInt", "i16", 2, false),
    math("Point3D", "f32", 3, false),
    math("Quaternion", "f32", 4, true),
    math("Rectangle2D", "i16", 4, false),
    math("Vector2D", "f32", 2, true),
    math("Vector3D", "f32", 3, true),
];

pub fn math_kind(name: &str) -> Option<MathKind> {
    MATH_KINDS.iter().find(|m| m.name == name).copied()
}

/// Where a blob's bytes live in packed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BlobKind {
    Pointer,
    FileOffset,
    /// Variant name of the runtime's `DataSource`.
    External(&'static str),
}

/// The ancestor array an index field points into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexTarget {
    pub struct_name: String,
    pub member: String,
    /// The target struct and every struct inheriting from it.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldKind {
    Scalar {
        number: NumberKind,
        count: Option<usize>,
        bounds: bool,
        minimum: Option<f64>,
        maximum: Option<f64>,
        default: Vec<f64>,
        default_sign: bool,
    },
    Compound {
        math: MathKind,
        count: Option<usize>,
        normalize: bool,
        default: Vec<f64>,
        default_sign: bool,
    },
    Enum {
        name: String,
        width: u8,
        shifted_by_one: bool,
    },
    Bitfield {
        name: String,
        width: u8,
    },
    Dependency {
        /// Empty for any class.
        classes: Vec<String>,
        non_null: bool,
    },
    Reflexive {
        element: String,
        minimum: u32,
        maximum: u32,
        stock_maximum: Option<u32>,
    },
    Blob {
        selector: BlobKind,
    },
    Index {
        target: Option<IndexTarget>,
    },
    TagId,
    TagString,
    FourCC,
    Padding {
        size: usize,
    },
}

pub const DEPENDENCY_SIZE: usize = 16;
pub const REFLEXIVE_SIZE: usize = 12;
pub const BLOB_SIZE: usize = 20;

impl FieldKind {
    pub fn size(&self) -> usize {
        match self {
            FieldKind::Scalar {
                number,
                count,
                bounds,
                ..
            } => number.size() * if *bounds { 2 } else { 1 } * count.unwrap_or(1),
            FieldKind::Compound { math, count, .. } => {
                math.component_size() * math.components * count.unwrap_or(1)
            }
            FieldKind::Enum { width, .. } | FieldKind::Bitfield { width, .. } => *width as usize / 8,
            FieldKind::Dependency { .. } => DEPENDENCY_SIZE,
            FieldKind::Reflexive { .. } => REFLEXIVE_SIZE,
            FieldKind::Blob { .. } => BLOB_SIZE,
            FieldKind::Index { .. } => 2,
            FieldKind::TagId | FieldKind::FourCC => 4,
            FieldKind::TagString => 32,
            FieldKind::Padding { size } => *size,
        }
    }

    /// Short label used by `analyze`.
    pub fn label(&self) -> String {
        match self {
            FieldKind::Scalar { number, count, bounds, .. } => {
                let mut label = number.rust_type().to_string();
                if *bounds {
                    label = format!("Bounds<{label}>");
                }
                match count {
                    Some(n) => format!("[{label}; {n}]"),
                    None => label,
                }
            }
            FieldKind::Compound { math, count, .. } => match count {
                Some(n) => format!("[{}; {n}]", math.name),
                None => math.name.to_string(),
            },
            FieldKind::Enum { name, .. } => format!("enum {name}"),
            FieldKind::Bitfield { name, .. } => format!("bitfield {name}"),
            FieldKind::Dependency { classes, .. } if classes.is_empty() => "dependency *".to_string(),
            FieldKind::Dependency { classes, .. } => format!("dependency {}", classes.join("|")),
            FieldKind::Reflexive { element, .. } => format!("array {element}"),
            FieldKind::Blob { .. } => "blob".to_string(),
            FieldKind::Index { target: Some(t) } => format!("index {}::{}", t.struct_name, t.member),
            FieldKind::Index { target: None } => "index".to_string(),
            FieldKind::TagId => "tag id".to_string(),
            FieldKind::TagString => "string".to_string(),
            FieldKind::FourCC => "fourcc".to_string(),
            FieldKind::Padding { size } => format!("pad {size:#x}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedField {
    pub display_name: String,
    pub identifier: String,
    pub offset: usize,
    /// Overrides the layout's endianness in both layouts.
    pub endian: Option<Endian>,
    pub kind: FieldKind,
    /// Defined by an ancestor struct.
    pub inherited: bool,
    pub cache_only: bool,
    pub unused: bool,
    pub hidden: bool,
    pub read_only: bool,
    pub volatile: bool,
    pub comment: Option<String>,
    pub unit: Option<String>,
}

impl ClassifiedField {
    pub fn size(&self) -> usize {
        self.kind.size()
    }

    pub fn is_padding(&self) -> bool {
        matches!(self.kind, FieldKind::Padding { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedStruct {
    pub name: String,
    pub group: String,
    pub inherits: Option<String>,
    pub fields: Vec<ClassifiedField>,
    /// Size declared by the schema.
    pub size: usize,
    /// Sum of the field widths.
    pub computed_size: usize,
    /// Identifier of the title field.
    pub title: Option<String>,
}

impl ClassifiedStruct {
    /// Fields that occupy a name in the editable struct.
    pub fn members(&self) -> impl Iterator<Item = &ClassifiedField> {
        self.fields.iter().filter(|f| !f.is_padding())
    }

    pub fn arrays(&self) -> impl Iterator<Item = (&ClassifiedField, &str)> {
        self.fields.iter().filter_map(|f| match &f.kind {
            FieldKind::Reflexive { element, .. } => Some((f, element.as_str())),
            _ => None,
        })
    }

    pub fn field(&self, identifier: &str) -> Option<&ClassifiedField> {
        self.fields.iter().find(|f| f.identifier == identifier)
    }
}

/// The whole run, structs in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedSchema {
    pub enums: Vec<ResolvedEnum>,
    pub bitfields: Vec<ResolvedBitfield>,
    pub structs: Vec<ClassifiedStruct>,
}

impl ClassifiedSchema {
    pub fn find_struct(&self, name: &str) -> Option<&ClassifiedStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&ResolvedEnum> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn find_bitfield(&self, name: &str) -> Option<&ResolvedBitfield> {
        self.bitfields.iter().find(|b| b.name == name)
    }
}

pub fn classify(schema: &SchemaSet, order: &[String]) -> Result<ClassifiedSchema, SchemaError> {
    let mut structs = Vec::with_capacity(order.len());
    for name in order {
        let Some(s) = schema.structs.get(name) else {
            continue;
        };
        structs.push(classify_struct(schema, s)?);
    }

    Ok(ClassifiedSchema {
        enums: schema.enums.values().cloned().collect(),
        bitfields: schema.bitfields.values().cloned().collect(),
        structs,
    })
}

fn classify_struct(schema: &SchemaSet, s: &ResolvedStruct) -> Result<ClassifiedStruct, SchemaError> {
    let lineage = schema.lineage(&s.name)?;
    let mut fields: Vec<ClassifiedField> = Vec::new();
    let mut offset = 0;
    let mut title = None;

    for ancestor in &lineage {
        let inherited = ancestor.name != s.name;
        for field in &ancestor.fields {
            let kind = classify_field(schema, &s.name, field)?;
            if !field.is_padding() && fields.iter().any(|f| f.identifier == field.identifier) {
                return Err(SchemaError::invalid(
                    &s.name,
                    &field.identifier,
                    "member name is also used by an ancestor",
                ));
            }
            let size = kind.size();
            let record = &field.record;
            fields.push(ClassifiedField {
                display_name: field.display_name.clone(),
                identifier: if field.is_padding() {
                    format!("_padding_{offset:#x}")
                } else {
                    field.identifier.clone()
                },
                offset,
                endian: record.endian,
                kind,
                inherited,
                cache_only: record.cache_only,
                unused: record.unused,
                hidden: record.hidden,
                read_only: field.read_only,
                volatile: record.volatile,
                comment: record.comment.clone(),
                unit: record.unit.clone(),
            });
            offset += size;
        }
        if let Some(t) = &ancestor.title {
            title = Some(resolve_title(ancestor, t, &fields)?);
        }
    }

    if offset != s.size {
        tracing::warn!(
            "{} declares {:#x} bytes but its fields add up to {:#x}",
            s.name,
            s.size,
            offset
        );
    }
    tracing::debug!("classified {} ({} fields, {:#x} bytes)", s.name, fields.len(), offset);

    Ok(ClassifiedStruct {
        name: s.name.clone(),
        group: s.group.clone(),
        inherits: s.inherits.clone(),
        fields,
        size: s.size,
        computed_size: offset,
        title,
    })
}

fn resolve_title(owner: &ResolvedStruct, title: &str, fields: &[ClassifiedField]) -> Result<String, SchemaError> {
    let identifier = member_name(title);
    let field = fields
        .iter()
        .find(|f| f.display_name == title || f.identifier == identifier)
        .ok_or_else(|| SchemaError::invalid(&owner.name, title, "title names no field"))?;
    match field.kind {
        FieldKind::TagString | FieldKind::Dependency { .. } | FieldKind::Enum { .. } => Ok(field.identifier.clone()),
        _ => Err(SchemaError::invalid(
            &owner.name,
            &field.identifier,
            "title must be a string, dependency or enum",
        )),
    }
}

fn classify_field(schema: &SchemaSet, owner: &str, field: &ResolvedField) -> Result<FieldKind, SchemaError> {
    let record = &field.record;
    let name = field.identifier.as_str();
    let type_name = field.type_name();
    let invalid = |reason: &str| SchemaError::invalid(owner, name, reason);

    let count = match record.count {
        Some(0) => return Err(invalid("count must be at least 1")),
        Some(1) | None => None,
        Some(n) => Some(n),
    };
    let default = record.default.as_ref().map(|d| d.values()).unwrap_or_default();

    let is_number = NumberKind::from_type_name(type_name).is_some();
    if (record.minimum.is_some() || record.maximum.is_some()) && !is_number && type_name != "TagReflexive" {
        return Err(invalid("minimum and maximum only apply to numbers and arrays"));
    }
    if record.bounds && !is_number {
        return Err(invalid("bounds only apply to numbers"));
    }
    if count.is_some() && !is_number && math_kind(type_name).is_none() {
        return Err(invalid("only numbers and math types can be counted"));
    }
    if record.normalize && !math_kind(type_name).is_some_and(|m| m.normalizable) {
        return Err(invalid("only vectors, quaternions and planes can be normalized"));
    }
    if !default.is_empty() && !is_number && math_kind(type_name).is_none() {
        return Err(invalid("only numbers and math types can have defaults"));
    }

    if let Some(number) = NumberKind::from_type_name(type_name) {
        if record.bounds && count.is_some() {
            return Err(invalid("bounds cannot be counted"));
        }
        let expected = if record.bounds { 2 } else { count.unwrap_or(1) };
        let default = expand_default(default, expected).ok_or_else(|| {
            invalid(&format!("default needs 1 or {expected} values"))
        })?;
        return Ok(FieldKind::Scalar {
            number,
            count,
            bounds: record.bounds,
            minimum: record.minimum,
            maximum: record.maximum,
            default,
            default_sign: record.default_sign,
        });
    }

    if let Some(math) = math_kind(type_name) {
        if count.is_some() && !default.is_empty() {
            return Err(invalid("counted math types cannot have defaults"));
        }
        let default = expand_default(default, math.components).ok_or_else(|| {
            invalid(&format!("default needs 1 or {} values", math.components))
        })?;
        return Ok(FieldKind::Compound {
            math,
            count,
            normalize: record.normalize,
            default,
            default_sign: record.default_sign,
        });
    }

    if let Some(e) = schema.enums.get(type_name) {
        return Ok(FieldKind::Enum {
            name: e.name.clone(),
            width: e.width,
            shifted_by_one: record.shifted_by_one,
        });
    }
    if let Some(b) = schema.bitfields.get(type_name) {
        return Ok(FieldKind::Bitfield {
            name: b.name.clone(),
            width: b.width,
        });
    }

    Ok(match type_name {
        "pad" => FieldKind::Padding {
            size: record.size.unwrap_or(0),
        },
        "TagDependency" => {
            for class in &field.classes {
                if class_by_name(class).is_none() {
                    return Err(SchemaError::UnknownClass {
                        owner: owner.to_string(),
                        field: name.to_string(),
                        class: class.clone(),
                    });
                }
            }
            FieldKind::Dependency {
                classes: field.classes.clone(),
                non_null: record.non_null,
            }
        }
        "TagReflexive" => {
            let element = record
                .struct_name
                .clone()
                .ok_or_else(|| invalid("array has no element struct"))?;
            let element_def = schema.structs.get(&element);
            if element_def.is_none() && !UNORDERED_LEAVES.contains(&element.as_str()) {
                return Err(SchemaError::UnknownStruct {
                    owner: owner.to_string(),
                    field: name.to_string(),
                    struct_name: element,
                });
            }
            let limit = |field: Option<f64>, declared: Option<u32>| field.map(|v| v as u32).or(declared);
            FieldKind::Reflexive {
                minimum: limit(record.minimum, element_def.and_then(|s| s.minimum)).unwrap_or(0),
                maximum: limit(record.maximum, element_def.and_then(|s| s.maximum)).unwrap_or(u32::MAX),
                stock_maximum: record.hek_maximum,
                element,
            }
        }
        "TagDataOffset" => FieldKind::Blob {
            selector: match (&record.external_file_offset, record.file_offset) {
                (Some(external), _) => BlobKind::External(match external.as_str() {
                    "bitmaps.map" => "Bitmaps",
                    "sounds.map" => "Sounds",
                    "loc.map" => "Loc",
                    other => {
                        return Err(invalid(&format!("unknown external data file {other}")));
                    }
                }),
                (None, true) => BlobKind::FileOffset,
                (None, false) => BlobKind::Pointer,
            },
        },
        "Index" => FieldKind::Index {
            target: resolve_index_target(schema, owner, field)?,
        },
        "TagID" => FieldKind::TagId,
        "TagString" => FieldKind::TagString,
        "TagFourCC" => FieldKind::FourCC,
        other => {
            return Err(SchemaError::UnknownType {
                owner: owner.to_string(),
                field: name.to_string(),
                type_name: other.to_string(),
            });
        }
    })
}

/// A single default value is repeated; otherwise the count must match.
fn expand_default(default: Vec<f64>, expected: usize) -> Option<Vec<f64>> {
    match default.len() {
        0 => Some(default),
        1 => Some(vec![default[0]; expected]),
        n if n == expected => Some(default),
        _ => None,
    }
}

fn resolve_index_target(
    schema: &SchemaSet,
    owner: &str,
    field: &ResolvedField,
) -> Result<Option<IndexTarget>, SchemaError> {
    let (Some(target), Some(reflexive)) = (&field.record.struct_name, &field.record.reflexive) else {
        return Ok(None);
    };
    let unresolved = || SchemaError::UnresolvedIndex {
        owner: owner.to_string(),
        field: field.identifier.clone(),
        target: target.clone(),
        reflexive: reflexive.clone(),
    };
    if !schema.structs.contains_key(target) {
        return Err(unresolved());
    }

    let identifier = member_name(reflexive);
    let member = schema
        .lineage(target)?
        .into_iter()
        .flat_map(|s| s.fields.iter())
        .find(|f| {
            f.type_name() == "TagReflexive" && (f.display_name == *reflexive || f.identifier == identifier)
        })
        .map(|f| f.identifier.clone())
        .ok_or_else(unresolved)?;

    Ok(Some(IndexTarget {
        struct_name: target.clone(),
        member,
        tags: schema.descendants_of(target),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::layout_graph::emission_order;
    use tag_types::DefinitionGroup;

    fn classify_text(text: &str) -> Result<ClassifiedSchema, SchemaError> {
        let set = SchemaSet::resolve(&[DefinitionGroup::from_json_str("test", text).unwrap()])?;
        let order = emission_order(&set)?;
        classify(&set, &order)
    }

    #[test]
    fn inherited_fields_are_flattened_with_offsets() {
        let schema = classify_text(
            r#"[
            {"name": "Object", "type": "struct", "size": 8, "fields": [
                {"name": "scale", "type": "float"},
                {"type": "pad", "size": 4}
            ]},
            {"name": "Weapon", "type": "struct", "inherits": "Object", "size": 24, "fields": [
                {"name": "model", "type": "TagDependency", "classes": ["gbxmodel"]}
            ]}
        ]"#,
        )
        .unwrap();
        let weapon = schema.find_struct("Weapon").unwrap();
        let offsets: Vec<_> = weapon.fields.iter().map(|f| (f.identifier.as_str(), f.offset)).collect();
        assert_eq!(offsets, vec![("scale", 0), ("_padding_0x4", 4), ("model", 8)]);
        assert!(weapon.fields[0].inherited);
        assert_eq!(weapon.computed_size, 24);
    }

    #[test]
    fn kinds_are_assigned() {
        let schema = classify_text(
            r#"[
            {"name": "Kind", "type": "enum", "options": ["a", "b"]},
            {"name": "Flags", "type": "bitfield", "width": 32, "fields": ["x"]},
            {"name": "Thing", "type": "struct", "size": 0, "fields": [
                {"name": "kind", "type": "Kind", "shifted_by_one": true},
                {"name": "flags", "type": "Flags"},
                {"name": "range", "type": "Angle", "bounds": true, "default": 1.0},
                {"name": "axis", "type": "Vector3D", "normalize": true},
                {"name": "pixels", "type": "TagDataOffset", "external_file_offset": "bitmaps.map"},
                {"name": "name", "type": "TagString"}
            ]}
        ]"#,
        )
        .unwrap();
        let thing = schema.find_struct("Thing").unwrap();
        assert!(matches!(&thing.fields[0].kind, FieldKind::Enum { width: 16, shifted_by_one: true, .. }));
        assert_eq!(thing.fields[1].size(), 4);
        assert!(matches!(&thing.fields[2].kind, FieldKind::Scalar { bounds: true, default, .. } if default == &vec![1.0, 1.0]));
        assert!(matches!(&thing.fields[3].kind, FieldKind::Compound { normalize: true, .. }));
        assert_eq!(thing.fields[4].kind, FieldKind::Blob { selector: BlobKind::External("Bitmaps") });
        assert_eq!(thing.computed_size, 2 + 4 + 8 + 12 + 20 + 32);
    }

    #[test]
    fn index_targets_include_descendants() {
        let schema = classify_text(
            r#"[
            {"name": "Model", "type": "struct", "size": 0, "fields": [
                {"name": "Nodes", "type": "TagReflexive", "struct": "ModelNode"}
            ]},
            {"name": "Gbxmodel", "type": "struct", "inherits": "Model", "size": 0, "fields": []},
            {"name": "ModelNode", "type": "struct", "size": 0, "fields": [
                {"name": "parent", "type": "Index", "struct": "Model", "reflexive": "Nodes"}
            ]}
        ]"#,
        )
        .unwrap();
        let node = schema.find_struct("ModelNode").unwrap();
        let FieldKind::Index { target: Some(target) } = &node.fields[0].kind else {
            panic!("expected a resolved index");
        };
        assert_eq!(target.member, "nodes");
        assert_eq!(target.tags, vec!["Model", "Gbxmodel"]);
    }

    #[test]
    fn unresolved_index_is_fatal() {
        let err = classify_text(
            r#"[
            {"name": "Model", "type": "struct", "size": 0, "fields": []},
            {"name": "Node", "type": "struct", "size": 0, "fields": [
                {"name": "parent", "type": "Index", "struct": "Model", "reflexive": "nodes"}
            ]}
        ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedIndex { .. }));
    }

    #[test]
    fn unknown_classes_and_structs() {
        let err = classify_text(
            r#"[{"name": "A", "type": "struct", "size": 0, "fields": [
                {"name": "d", "type": "TagDependency", "classes": ["mystery"]}
            ]}]"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "A::d allows unknown tag class mystery");

        let err = classify_text(
            r#"[{"name": "A", "type": "struct", "size": 0, "fields": [
                {"name": "items", "type": "TagReflexive", "struct": "Missing"}
            ]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownStruct { .. }));

        classify_text(
            r#"[{"name": "A", "type": "struct", "size": 0, "fields": [
                {"name": "resources", "type": "TagReflexive", "struct": "PredictedResource"}
            ]}]"#,
        )
        .unwrap();
    }

    #[test]
    fn contradictory_flags() {
        for field in [
            r#"{"name": "f", "type": "float", "count": 2, "bounds": true}"#,
            r#"{"name": "f", "type": "Point3D", "normalize": true}"#,
            r#"{"name": "f", "type": "TagString", "minimum": 1}"#,
            r#"{"name": "f", "type": "float", "count": 3, "default": [1, 2]}"#,
        ] {
            let text = format!(r#"[{{"name": "A", "type": "struct", "size": 0, "fields": [{field}]}}]"#);
            assert!(matches!(classify_text(&text), Err(SchemaError::InvalidField { .. })), "{field}");
        }
    }

    #[test]
    fn reflexive_limits_fall_back_to_element_struct() {
        let schema = classify_text(
            r#"[
            {"name": "Seat", "type": "struct", "size": 0, "maximum": 16, "fields": []},
            {"name": "Vehicle", "type": "struct", "size": 0, "fields": [
                {"name": "seats", "type": "TagReflexive", "struct": "Seat", "minimum": 1, "hek_maximum": 8}
            ]}
        ]"#,
        )
        .unwrap();
        let vehicle = schema.find_struct("Vehicle").unwrap();
        assert_eq!(
            vehicle.fields[0].kind,
            FieldKind::Reflexive {
                element: "Seat".into(),
                minimum: 1,
                maximum: 16,
                stock_maximum: Some(8),
            }
        );
    }
}
