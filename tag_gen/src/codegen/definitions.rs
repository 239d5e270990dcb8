/* Layout pass: enums, bitfields, editable structs and both byte layouts. */

use super::shared::{editable_type, file_layout, layout_type, packed_layout, storage_type, Form};
use super::writer::CodeWriter;
use crate::schema::classify::{ClassifiedSchema, ClassifiedStruct};
use crate::schema::resolved::{ResolvedBitfield, ResolvedEnum};
use crate::GeneratorOptions;

pub fn emit_definitions(schema: &ClassifiedSchema, options: &GeneratorOptions) -> String {
    let mut w = CodeWriter::with_header(&options.runtime_crate, false);
    for e in &schema.enums {
        w.blank();
        emit_enum(&mut w, e);
    }
    for b in &schema.bitfields {
        w.blank();
        emit_bitfield(&mut w, b);
    }
    for s in &schema.structs {
        w.blank();
        emit_struct(&mut w, s);
        w.blank();
        emit_layout(&mut w, s, Form::File);
        w.blank();
        emit_layout(&mut w, s, Form::Packed);
        w.blank();
        emit_transpose(&mut w, s, Form::File, Form::Packed);
        w.blank();
        emit_transpose(&mut w, s, Form::Packed, Form::File);
    }
    w.finish()
}

fn hex(value: u32, width: u8) -> String {
    format!("{:#0digits$x}", value, digits = width as usize / 4 + 2)
}

fn names_literal<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = names.map(|n| format!("{n:?}")).collect();
    format!("&[{}]", quoted.join(", "))
}

fn emit_enum(w: &mut CodeWriter, e: &ResolvedEnum) {
    let storage = storage_type(e.width);
    w.doc(e.description.as_deref());
    w.line("#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]");
    w.line(format!("pub struct {}(pub {storage});", e.name));
    w.blank();
    w.open(format!("impl {} {{", e.name));
    for option in &e.options {
        w.doc(option.description.as_deref());
        w.line(format!("pub const {}: Self = Self({});", option.constant, option.value));
    }
    w.line(format!("pub const COUNT: u32 = {};", e.options.len()));
    w.line(format!(
        "pub const NAMES: &'static [&'static str] = {};",
        names_literal(e.options.iter().map(|o| o.display_name.as_str()))
    ));
    let excluded: Vec<String> = e.excluded_values().iter().map(|v| v.to_string()).collect();
    w.line(format!("pub const EXCLUDED: &'static [u32] = &[{}];", excluded.join(", ")));
    w.blank();
    w.open("pub fn is_valid(self) -> bool {");
    w.line("let value = u32::from(self.0);");
    w.line("value < Self::COUNT && !Self::EXCLUDED.contains(&value)");
    w.close("}");
    w.blank();
    w.open("pub fn name(self) -> Option<&'static str> {");
    w.line("Self::NAMES.get(self.0 as usize).copied()");
    w.close("}");
    w.blank();
    w.open("pub fn from_name(name: &str) -> Option<Self> {");
    w.line(format!(
        "Self::NAMES.iter().position(|n| n.eq_ignore_ascii_case(name)).map(|i| Self(i as {storage}))"
    ));
    w.close("}");
    w.close("}");
}

fn emit_bitfield(w: &mut CodeWriter, b: &ResolvedBitfield) {
    let storage = storage_type(b.width);
    w.doc(b.description.as_deref());
    w.line("#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]");
    w.line(format!("pub struct {}(pub {storage});", b.name));
    w.blank();
    w.open(format!("impl {} {{", b.name));
    for flag in &b.flags {
        w.doc(flag.description.as_deref());
        w.line(format!("pub const {}: Self = Self({});", flag.constant, hex(1 << flag.value, b.width)));
    }
    w.line(format!("pub const MASK: {storage} = {};", hex(b.full_mask, b.width)));
    w.line(format!("pub const CACHE_ONLY_MASK: {storage} = {};", hex(b.cache_only_mask, b.width)));
    w.line(format!("pub const READ_ONLY_MASK: {storage} = {};", hex(b.read_only_mask, b.width)));
    w.line(format!(
        "pub const NAMES: &'static [&'static str] = {};",
        names_literal(b.flags.iter().map(|f| f.display_name.as_str()))
    ));
    w.blank();
    w.open("pub fn contains(self, flag: Self) -> bool {");
    w.line("self.0 & flag.0 == flag.0");
    w.close("}");
    w.blank();
    w.open("pub fn set(&mut self, flag: Self, on: bool) {");
    w.open("if on {");
    w.line("self.0 |= flag.0;");
    w.reopen("} else {");
    w.line("self.0 &= !flag.0;");
    w.close("}");
    w.close("}");
    w.close("}");
}

fn emit_struct(w: &mut CodeWriter, s: &ClassifiedStruct) {
    w.line("#[derive(Clone, Debug, Default, PartialEq)]");
    w.open(format!("pub struct {} {{", s.name));
    for field in s.members() {
        w.doc(field.comment.as_deref());
        if let Some(ty) = editable_type(field) {
            w.line(format!("pub {}: {ty},", field.identifier));
        }
    }
    w.close("}");
    w.blank();
    w.open(format!("impl {} {{", s.name));
    w.line(format!("pub const TAG: StructTag = StructTag({:?});", s.name));
    w.close("}");
}

fn emit_layout(w: &mut CodeWriter, s: &ClassifiedStruct, form: Form) {
    let name = match form {
        Form::File => file_layout(&s.name),
        Form::Packed => packed_layout(&s.name),
    };
    let types: Vec<String> = s.fields.iter().map(|f| layout_type(f, form)).collect();

    w.line("#[repr(C)]");
    w.line("#[derive(Clone, Copy, Debug, PartialEq)]");
    w.open(format!("pub struct {name} {{"));
    for (field, ty) in s.fields.iter().zip(&types) {
        w.line(format!("pub {}: {ty},", field.identifier));
    }
    w.close("}");
    w.blank();

    w.open(format!("impl Layout for {name} {{"));
    if s.fields.is_empty() {
        w.line("const SIZE: usize = 0;");
        w.blank();
        w.open("fn decode(_bytes: &[u8]) -> Self {");
        w.line("Self {}");
        w.close("}");
        w.blank();
        w.line("fn encode(&self, _out: &mut [u8]) {}");
    } else {
        let sizes: Vec<String> = types.iter().map(|ty| format!("<{ty} as Layout>::SIZE")).collect();
        w.line(format!("const SIZE: usize = {};", sizes.join(" + ")));
        w.blank();
        w.open("fn decode(bytes: &[u8]) -> Self {");
        w.line("let mut r = LayoutReader::new(bytes);");
        w.open("Self {");
        for field in &s.fields {
            w.line(format!("{}: r.next(),", field.identifier));
        }
        w.close("}");
        w.close("}");
        w.blank();
        w.open("fn encode(&self, out: &mut [u8]) {");
        w.line("let mut w = LayoutWriter::new(out);");
        for field in &s.fields {
            w.line(format!("w.put(&self.{});", field.identifier));
        }
        w.close("}");
    }
    w.close("}");
    w.blank();
    w.line(format!("const _: () = assert!(<{name} as Layout>::SIZE == {:#x});", s.size));
    w.line(format!("const _: () = assert!(std::mem::size_of::<{name}>() == {:#x});", s.size));
}

fn emit_transpose(w: &mut CodeWriter, s: &ClassifiedStruct, from: Form, to: Form) {
    let layout = |form: Form| match form {
        Form::File => file_layout(&s.name),
        Form::Packed => packed_layout(&s.name),
    };
    w.open(format!("impl From<&{}> for {} {{", layout(from), layout(to)));
    w.open(format!("fn from(l: &{}) -> Self {{", layout(from)));
    if s.fields.is_empty() {
        w.line("let _ = l;");
        w.line("Self {}");
    } else {
        w.open("Self {");
        for field in &s.fields {
            w.line(format!("{0}: l.{0}.transpose(),", field.identifier));
        }
        w.close("}");
    }
    w.close("}");
    w.close("}");
}
