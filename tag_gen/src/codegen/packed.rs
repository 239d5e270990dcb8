/* Packed codec pass: `parse_packed_data`, `compile` and `compile_tag`. */

use super::shared::{
    blob_selector, class_list, default_class, float_option, packed_layout, struct_tags, value_from_layout,
    value_to_layout, Form,
};
use super::writer::CodeWriter;
use crate::schema::classify::{ClassifiedField, ClassifiedSchema, ClassifiedStruct, FieldKind};
use crate::GeneratorOptions;

pub fn emit_packed_codec(schema: &ClassifiedSchema, options: &GeneratorOptions) -> String {
    let mut w = CodeWriter::with_header(&options.runtime_crate, true);
    for s in &schema.structs {
        w.blank();
        w.open(format!("impl {} {{", s.name));
        emit_parse(&mut w, s);
        w.blank();
        emit_compile(&mut w, s);
        w.blank();
        emit_compile_tag(&mut w, s);
        w.close("}");
    }
    w.finish()
}

fn emit_parse(w: &mut CodeWriter, s: &ClassifiedStruct) {
    let layout = packed_layout(&s.name);
    w.open("pub fn parse_packed_data(source: &dyn PackedSource, pointer: Option<u32>) -> TagResult<Self> {");
    w.open("let bytes = match pointer {");
    w.line(format!("Some(pointer) => source.struct_bytes(pointer, {layout}::SIZE)?,"));
    w.line(format!("None => source.base_struct({layout}::SIZE)?,"));
    w.close("};");
    w.line(format!("let l = {layout}::read(bytes)?;"));
    w.open("Ok(Self {");
    for field in s.members() {
        w.line(format!("{}: {},", field.identifier, parse_value(s, field)));
    }
    w.close("})");
    w.close("}");
}

fn parse_value(s: &ClassifiedStruct, field: &ClassifiedField) -> String {
    let stored = format!("l.{}", field.identifier);
    let owner = &s.name;
    let name = &field.identifier;
    match &field.kind {
        FieldKind::Bitfield { name: ty, .. } => format!("{ty}({stored}.get() & {ty}::MASK)"),
        FieldKind::Dependency { classes, .. } => format!(
            "read_packed_dependency(source, &{stored}, {}, {owner:?}, {name:?})?",
            default_class(classes)
        ),
        FieldKind::Reflexive { element, .. } => format!(
            "read_packed_array(&{stored}, {}::SIZE, {owner:?}, {name:?}, |at| {element}::parse_packed_data(source, Some(at)))?",
            packed_layout(element)
        ),
        FieldKind::Blob { selector } => format!(
            "read_packed_blob(source, &{stored}, {}, {owner:?}, {name:?})?",
            blob_selector(selector)
        ),
        _ => value_from_layout(field, &stored).unwrap_or_else(|| "Default::default()".to_string()),
    }
}

/// Statements run before the layout is written when error checking is on.
fn checks(s: &ClassifiedStruct) -> Vec<String> {
    let mut out = Vec::new();
    let owner = &s.name;
    for field in s.members() {
        let name = &field.identifier;
        let value = format!("self.{name}");
        match &field.kind {
            FieldKind::Scalar {
                count,
                bounds,
                minimum,
                maximum,
                ..
            } if minimum.is_some() || maximum.is_some() => {
                let check = |v: &str| {
                    format!(
                        "check_range(workload, tag_index, f64::from({v}), {}, {}, {owner:?}, {name:?})?;",
                        float_option(*minimum),
                        float_option(*maximum)
                    )
                };
                if *bounds {
                    out.push(check(&format!("{value}.from")));
                    out.push(check(&format!("{value}.to")));
                } else if count.is_some() {
                    out.push(format!("for value in {value} {{"));
                    out.push(format!("    {}", check("value")));
                    out.push("}".to_string());
                } else {
                    out.push(check(&value));
                }
            }
            FieldKind::Compound {
                count, normalize: true, ..
            } => {
                let check = |v: &str| format!("check_normal(workload, tag_index, {v}, {owner:?}, {name:?})?;");
                if count.is_some() {
                    out.push(format!("for value in &{value} {{"));
                    out.push(format!("    {}", check("value")));
                    out.push("}".to_string());
                } else {
                    out.push(check(&format!("&{value}")));
                }
            }
            FieldKind::Enum {
                name: ty, shifted_by_one, ..
            } => {
                let raw = if *shifted_by_one {
                    format!("u32::from({value}.0).wrapping_add(1)")
                } else {
                    format!("u32::from({value}.0)")
                };
                out.push(format!(
                    "check_enum(workload, tag_index, {raw}, {ty}::COUNT, {ty}::EXCLUDED, {owner:?}, {name:?})?;"
                ));
            }
            FieldKind::Index { target: Some(target) } => {
                out.push(format!(
                    "check_index(workload, tag_index, &stack, {value}, {}, {:?}, {owner:?}, {name:?})?;",
                    struct_tags(&target.tags),
                    target.member
                ));
            }
            _ => {}
        }
    }
    out
}

fn has_index(s: &ClassifiedStruct) -> bool {
    s.members()
        .any(|f| matches!(f.kind, FieldKind::Index { target: Some(_) }))
}

fn emit_compile(w: &mut CodeWriter, s: &ClassifiedStruct) {
    let layout = packed_layout(&s.name);
    let owner = &s.name;
    w.open("pub fn compile(");
    w.line("&self,");
    w.line("workload: &mut dyn BuildWorkload,");
    w.line("tag_index: usize,");
    w.line("struct_index: usize,");
    w.line("offset: usize,");
    w.line("stack: &mut ContainmentStack,");
    w.reopen(") -> TagResult<()> {");

    let lengths: Vec<String> = s
        .arrays()
        .map(|(f, _)| format!("({0:?}, self.{0}.len())", f.identifier))
        .collect();
    if !lengths.is_empty() {
        w.line(format!("let mut stack = stack.enter(Self::TAG, &[{}]);", lengths.join(", ")));
    } else if has_index(s) {
        w.line("let stack = stack.enter(Self::TAG, &[]);");
    } else {
        w.line("let _frame = stack.enter(Self::TAG, &[]);");
    }

    let checks = checks(s);
    if !checks.is_empty() {
        w.blank();
        w.line("let checks = !workload.options().disable_error_checking;");
        w.open("if checks {");
        for line in &checks {
            w.line(line);
        }
        w.close("}");
    }

    for field in &s.fields {
        let name = &field.identifier;
        let at = format!("offset + {:#x}", field.offset);
        match &field.kind {
            FieldKind::Dependency { classes, non_null } => {
                w.blank();
                w.open(format!("let handle_{name} = compile_dependency("));
                w.line("workload,");
                w.line("tag_index,");
                w.line("struct_index,");
                w.line(format!("{at},"));
                w.line(format!("&self.{name},"));
                w.line(format!("{},", class_list(classes)));
                w.line(format!("{non_null},"));
                w.line(format!("{owner:?},"));
                w.line(format!("{name:?},"));
                w.close(")?;");
            }
            FieldKind::Reflexive {
                element,
                minimum,
                maximum,
                stock_maximum,
            } => {
                let stock = match stock_maximum {
                    Some(n) => format!("Some({n})"),
                    None => "None".to_string(),
                };
                w.blank();
                w.line(format!(
                    "check_array_count(workload, tag_index, self.{name}.len(), {minimum}, {maximum}, {stock}, {owner:?}, {name:?})?;"
                ));
                w.open(format!("let handle_{name} = compile_array("));
                w.line("workload,");
                w.line("struct_index,");
                w.line(format!("{at},"));
                w.line(format!("&self.{name},"));
                w.line(format!("{}::SIZE,", packed_layout(element)));
                w.line(format!("{owner:?},"));
                w.line(format!("{name:?},"));
                w.line("|workload, element, array, at| element.compile(workload, tag_index, array, at, &mut stack),");
                w.close(")?;");
            }
            FieldKind::Blob { selector } => {
                w.blank();
                w.line(format!(
                    "let handle_{name} = compile_blob(workload, struct_index, {at}, &self.{name}, {})?;",
                    blob_selector(selector)
                ));
            }
            _ => {}
        }
    }

    w.blank();
    if s.fields.is_empty() {
        w.line(format!("{layout} {{}}"));
    } else {
        w.open(format!("{layout} {{"));
        for field in &s.fields {
            let name = &field.identifier;
            let value = match &field.kind {
                FieldKind::Dependency { .. } | FieldKind::Reflexive { .. } | FieldKind::Blob { .. } => {
                    format!("handle_{name}")
                }
                _ => value_to_layout(field, Form::Packed, &format!("self.{name}"))
                    .unwrap_or_else(|| "Default::default()".to_string()),
            };
            w.line(format!("{name}: {value},"));
        }
        w.close("}");
    }
    w.line(format!(".write(workload.structs_mut().bytes_mut(struct_index, offset, {layout}::SIZE)?)"));
    w.close("}");
}

fn emit_compile_tag(w: &mut CodeWriter, s: &ClassifiedStruct) {
    let layout = packed_layout(&s.name);
    w.line("/// Compile this struct as the base struct of a tag, returning its struct index.");
    w.open("pub fn compile_tag(&self, workload: &mut dyn BuildWorkload, tag_index: usize) -> TagResult<usize> {");
    w.line(format!("let struct_index = workload.structs_mut().new_struct({layout}::SIZE);"));
    w.line("let mut stack = ContainmentStack::new();");
    w.line("self.compile(workload, tag_index, struct_index, 0, &mut stack)?;");
    w.line("Ok(struct_index)");
    w.close("}");
}
