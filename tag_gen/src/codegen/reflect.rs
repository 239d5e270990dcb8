/* Reflection pass: field descriptors and accessors for generic editors. */

use super::shared::{float_option, option_literal, storage_type, string_literal};
use super::writer::CodeWriter;
use crate::schema::classify::{ClassifiedField, ClassifiedSchema, ClassifiedStruct, FieldKind};
use crate::schema::names::constant_prefix;
use crate::GeneratorOptions;
use tag_types::Endian;

pub fn emit_reflection(schema: &ClassifiedSchema, options: &GeneratorOptions) -> String {
    let mut w = CodeWriter::with_header(&options.runtime_crate, true);
    for e in &schema.enums {
        let storage = storage_type(e.width);
        w.blank();
        w.open(format!("impl EnumValue for {} {{", e.name));
        w.open("fn value(&self) -> u32 {");
        w.line("u32::from(self.0)");
        w.close("}");
        w.blank();
        w.open("fn set_value(&mut self, value: u32) {");
        w.line(format!("self.0 = value as {storage};"));
        w.close("}");
        w.blank();
        w.open("fn options(&self) -> &'static [&'static str] {");
        w.line("Self::NAMES");
        w.close("}");
        w.close("}");
    }
    for b in &schema.bitfields {
        let storage = storage_type(b.width);
        w.blank();
        w.open(format!("impl BitfieldValue for {} {{", b.name));
        w.open("fn bits(&self) -> u32 {");
        w.line("u32::from(self.0)");
        w.close("}");
        w.blank();
        w.open("fn set_bits(&mut self, bits: u32) {");
        w.line(format!("self.0 = bits as {storage};"));
        w.close("}");
        w.blank();
        w.open("fn flags(&self) -> &'static [&'static str] {");
        w.line("Self::NAMES");
        w.close("}");
        w.close("}");
    }
    for s in &schema.structs {
        w.blank();
        emit_struct(&mut w, s);
    }
    w.finish()
}

/// Fields an editor gets to see.
fn is_visible(field: &ClassifiedField) -> bool {
    !(field.hidden || field.cache_only || field.unused || field.endian == Some(Endian::Little))
        && descriptor_kind(field).is_some()
}

fn descriptors_static(name: &str) -> String {
    format!("{}_FIELDS", constant_prefix(name))
}

fn number(number_type: &str, count: usize, bounds: bool, field: &ClassifiedField, min: Option<f64>, max: Option<f64>) -> String {
    format!(
        "DescriptorKind::Number {{ number_type: NumberType::{number_type}, count: {count}, bounds: {bounds}, volatile: {}, minimum: {}, maximum: {} }}",
        field.volatile,
        float_option(min),
        float_option(max)
    )
}

fn descriptor_kind(field: &ClassifiedField) -> Option<String> {
    Some(match &field.kind {
        FieldKind::Scalar {
            number: n,
            count,
            bounds,
            minimum,
            maximum,
            ..
        } => {
            let components = if *bounds { 2 } else { count.unwrap_or(1) };
            number(n.reflect_name(), components, *bounds, field, *minimum, *maximum)
        }
        FieldKind::Compound { math, count, .. } => {
            let number_type = if math.is_float() { "Float" } else { "Int16" };
            number(number_type, math.components * count.unwrap_or(1), false, field, None, None)
        }
        FieldKind::Index { .. } => number("Index", 1, false, field, None, None),
        FieldKind::FourCC => number("FourCC", 1, false, field, None, None),
        FieldKind::Enum { name, .. } => {
            format!("DescriptorKind::Enum {{ options: {name}::NAMES, excluded: {name}::EXCLUDED }}")
        }
        FieldKind::Bitfield { name, .. } => format!(
            "DescriptorKind::Bitfield {{ flags: {name}::NAMES, mask: ({name}::MASK & !{name}::CACHE_ONLY_MASK) as u32 }}"
        ),
        FieldKind::Dependency { classes, .. } => {
            let names: Vec<String> = classes.iter().map(|c| string_literal(c)).collect();
            format!("DescriptorKind::Dependency {{ classes: &[{}] }}", names.join(", "))
        }
        FieldKind::Reflexive {
            element,
            minimum,
            maximum,
            ..
        } => format!("DescriptorKind::Array {{ element: {element:?}, minimum: {minimum}, maximum: {maximum:#x} }}"),
        FieldKind::Blob { .. } => "DescriptorKind::Blob".to_string(),
        FieldKind::TagString => "DescriptorKind::String".to_string(),
        FieldKind::TagId | FieldKind::Padding { .. } => return None,
    })
}

fn access(field: &ClassifiedField) -> Option<String> {
    let name = &field.identifier;
    let variant = match &field.kind {
        FieldKind::Scalar { .. } | FieldKind::Compound { .. } | FieldKind::Index { .. } | FieldKind::FourCC => "Number",
        FieldKind::Enum { .. } => "Enum",
        FieldKind::Bitfield { .. } => "Bitfield",
        FieldKind::Dependency { .. } => "Dependency",
        FieldKind::Reflexive { .. } => "Array",
        FieldKind::Blob { .. } => "Blob",
        FieldKind::TagString => "String",
        FieldKind::TagId | FieldKind::Padding { .. } => return None,
    };
    Some(format!("FieldAccess::{variant}(&mut self.{name})"))
}

fn emit_struct(w: &mut CodeWriter, s: &ClassifiedStruct) {
    let visible: Vec<&ClassifiedField> = s.fields.iter().filter(|f| is_visible(f)).collect();
    let table = descriptors_static(&s.name);

    w.open(format!("pub static {table}: [FieldDescriptor; {}] = [", visible.len()));
    for field in &visible {
        w.open("FieldDescriptor {");
        w.line(format!("display_name: {},", string_literal(&field.display_name)));
        w.line(format!("identifier: {},", string_literal(&field.identifier)));
        w.line(format!("comment: {},", option_literal(field.comment.as_deref())));
        w.line(format!("unit: {},", option_literal(field.unit.as_deref())));
        w.line(format!("read_only: {},", field.read_only));
        w.line(format!("offset: {:#x},", field.offset));
        if let Some(kind) = descriptor_kind(field) {
            w.line(format!("kind: {kind},"));
        }
        w.close("},");
    }
    w.close("];");
    w.blank();

    w.open(format!("impl {} {{", s.name));
    w.open("pub fn fields() -> &'static [FieldDescriptor] {");
    w.line(format!("&{table}"));
    w.close("}");
    w.close("}");
    w.blank();

    w.open(format!("impl TagStruct for {} {{", s.name));
    w.open("fn struct_name(&self) -> &'static str {");
    w.line(string_literal(&s.name));
    w.close("}");

    if let Some(title) = s.title.as_ref().and_then(|t| s.field(t)) {
        let name = &title.identifier;
        let expr = match &title.kind {
            FieldKind::TagString => format!("Some(self.{name}.as_str().into_owned())"),
            FieldKind::Dependency { .. } => format!("dependency_title(&self.{name})"),
            _ => format!("self.{name}.name().map(|n| n.to_string())"),
        };
        w.blank();
        w.open("fn title(&self) -> Option<String> {");
        w.line(expr);
        w.close("}");
    }

    w.blank();
    w.open("fn values(&mut self) -> Vec<FieldValue<'_>> {");
    if visible.is_empty() {
        w.line("Vec::new()");
    } else {
        w.open("vec![");
        for (i, field) in visible.iter().enumerate() {
            w.open("FieldValue {");
            w.line(format!("descriptor: &{table}[{i}],"));
            if let Some(access) = access(field) {
                w.line(format!("access: {access},"));
            }
            w.close("},");
        }
        w.close("]");
    }
    w.close("}");
    w.close("}");
}
