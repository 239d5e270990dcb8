/* File codec pass.
 *
 * Decode walks a `FileCursor`: the fixed struct first, then the variable data
 * of each dependency, array and blob in field order. Encode mirrors it.
 */

use super::shared::{default_class, file_layout, number_literal, value_from_layout, value_to_layout, word, Form};
use super::writer::CodeWriter;
use crate::schema::classify::{ClassifiedField, ClassifiedSchema, ClassifiedStruct, FieldKind};
use crate::GeneratorOptions;

pub fn emit_file_codec(schema: &ClassifiedSchema, options: &GeneratorOptions) -> String {
    let mut w = CodeWriter::with_header(&options.runtime_crate, true);
    for s in &schema.structs {
        w.blank();
        w.open(format!("impl {} {{", s.name));
        emit_parse(&mut w, s);
        w.blank();
        emit_write(&mut w, s, options.extract_hidden);
        w.close("}");
    }
    w.finish()
}

fn emit_parse(w: &mut CodeWriter, s: &ClassifiedStruct) {
    let layout = file_layout(&s.name);
    w.line("/// Read and validate a whole tag file, header included.");
    w.open("pub fn parse_file(data: &[u8], class: Option<TagClass>, postprocess: bool) -> TagResult<Self> {");
    w.line("let body = TagFileHeader::validate(data, class)?;");
    w.line("let mut cursor = FileCursor::new(body);");
    w.line("let tag = Self::parse_file_data(&mut cursor, postprocess)?;");
    w.line("cursor.finish()?;");
    w.line("Ok(tag)");
    w.close("}");
    w.blank();

    w.open("pub fn parse_file_data<'a>(cursor: &mut FileCursor<'a>, postprocess: bool) -> TagResult<Self> {");
    w.line(format!("let header = cursor.take({layout}::SIZE, {:?})?;", s.name));
    w.line("Self::parse_file_data_at(header, cursor, postprocess)");
    w.close("}");
    w.blank();

    w.open("pub fn parse_file_data_at<'a>(");
    w.line("header: &'a [u8],");
    w.line("cursor: &mut FileCursor<'a>,");
    w.line("postprocess: bool,");
    w.reopen(") -> TagResult<Self> {");
    w.line(format!("let l = {layout}::read(header)?;"));

    let defaults: Vec<String> = s.members().flat_map(default_lines).collect();
    let binding = if defaults.is_empty() { "let r" } else { "let mut r" };
    w.open(format!("{binding} = Self {{"));
    for field in s.members() {
        w.line(format!("{}: {},", field.identifier, parse_value(s, field)));
    }
    w.close("};");
    if !defaults.is_empty() {
        w.open("if postprocess {");
        for line in &defaults {
            w.line(line);
        }
        w.close("}");
    }
    w.line("Ok(r)");
    w.close("}");
}

fn parse_value(s: &ClassifiedStruct, field: &ClassifiedField) -> String {
    let stored = format!("l.{}", field.identifier);
    let owner = &s.name;
    let name = &field.identifier;
    match &field.kind {
        FieldKind::Dependency { classes, .. } => format!(
            "read_file_dependency(cursor, &{stored}, {}, {owner:?}, {name:?})?",
            default_class(classes)
        ),
        FieldKind::Reflexive { element, .. } => {
            let read = format!(
                "read_file_array(cursor, &{stored}, {}::SIZE, {owner:?}, {name:?}, |header, cursor| {element}::parse_file_data_at(header, cursor, postprocess))?",
                file_layout(element)
            );
            if field.cache_only {
                format!("{{ {read}; Vec::new() }}")
            } else {
                read
            }
        }
        FieldKind::Blob { .. } => format!("read_file_blob(cursor, &{stored}, {owner:?}, {name:?})?"),
        FieldKind::Bitfield { name: ty, .. } => format!("{ty}({stored}.get() & {ty}::MASK & !{ty}::CACHE_ONLY_MASK)"),
        _ => value_from_layout(field, &stored).unwrap_or_else(|| "Default::default()".to_string()),
    }
}

/// Postprocess statements replacing unset values with declared defaults.
fn default_lines(field: &ClassifiedField) -> Vec<String> {
    let name = &field.identifier;
    let unset = |sign: bool, zero: &str| if sign { format!("<= {zero}") } else { format!("== {zero}") };
    match &field.kind {
        FieldKind::Scalar {
            number,
            count,
            bounds,
            default,
            default_sign,
            ..
        } if !default.is_empty() => {
            let float = number.is_float();
            let zero = number_literal(0.0, float);
            let test = unset(*default_sign, &zero);
            let lit = |v: f64| number_literal(v, float);
            if *bounds {
                vec![format!(
                    "if r.{name}.from {test} && r.{name}.to {test} {{ r.{name} = Bounds::new({}, {}); }}",
                    lit(default[0]),
                    lit(default[1])
                )]
            } else if count.is_some() {
                default
                    .iter()
                    .enumerate()
                    .map(|(q, v)| format!("if r.{name}[{q}] {test} {{ r.{name}[{q}] = {}; }}", lit(*v)))
                    .collect()
            } else {
                vec![format!("if r.{name} {test} {{ r.{name} = {}; }}", lit(default[0]))]
            }
        }
        FieldKind::Compound {
            math,
            count: None,
            default,
            default_sign,
            ..
        } if !default.is_empty() => {
            let float = math.is_float();
            let test = unset(*default_sign, &number_literal(0.0, float));
            let values: Vec<String> = default.iter().map(|v| number_literal(*v, float)).collect();
            vec![format!(
                "if r.{name}.all(|c| c {test}) {{ r.{name} = {}::from_array([{}]); }}",
                math.name,
                values.join(", ")
            )]
        }
        _ => Vec::new(),
    }
}

/// Cache-only and unused fields are left out of file data unless hidden data is extracted.
fn is_hidden(field: &ClassifiedField, extract_hidden: bool) -> bool {
    !extract_hidden && (field.cache_only || field.unused)
}

fn emit_write(w: &mut CodeWriter, s: &ClassifiedStruct, extract_hidden: bool) {
    let layout = file_layout(&s.name);
    let owner = &s.name;

    w.open("pub fn generate_file(&self, class: TagClass) -> TagResult<Vec<u8>> {");
    w.line("Ok(TagFileHeader::wrap(class, &self.generate_file_data()?))");
    w.close("}");
    w.blank();

    w.line("/// File data without a header.");
    w.open("pub fn generate_file_data(&self) -> TagResult<Vec<u8>> {");
    w.line(format!("let mut out = vec![0u8; {layout}::SIZE];"));
    w.line("self.write_file_data_at(&mut out, 0)?;");
    w.line("Ok(out)");
    w.close("}");
    w.blank();

    w.line("/// Write the fixed struct at `at` and append its variable data to `out`.");
    w.open("pub fn write_file_data_at(&self, out: &mut Vec<u8>, at: usize) -> TagResult<()> {");
    if s.fields.is_empty() {
        w.line(format!("let l = {layout} {{}};"));
    } else {
        w.open(format!("let l = {layout} {{"));
        for field in &s.fields {
            w.line(format!("{}: {},", field.identifier, header_value(field, extract_hidden)));
        }
        w.close("};");
    }
    w.line("write_fixed(out, at, &l)?;");
    for field in &s.fields {
        if is_hidden(field, extract_hidden) {
            continue;
        }
        let name = &field.identifier;
        match &field.kind {
            FieldKind::Dependency { .. } => w.line(format!("write_file_dependency(out, &self.{name});")),
            FieldKind::Reflexive { element, .. } => w.line(format!(
                "write_file_array(out, &self.{name}, {}::SIZE, {owner:?}, {name:?}, |e, out, at| e.write_file_data_at(out, at))?;",
                file_layout(element)
            )),
            FieldKind::Blob { .. } => w.line(format!("out.extend_from_slice(&self.{name});")),
            _ => {}
        }
    }
    w.line("Ok(())");
    w.close("}");
}

fn header_value(field: &ClassifiedField, extract_hidden: bool) -> String {
    let name = &field.identifier;
    if is_hidden(field, extract_hidden) {
        return "Layout::zeroed()".to_string();
    }
    match &field.kind {
        FieldKind::Dependency { classes, .. } => {
            format!("file_dependency_header(&self.{name}, {})?", default_class(classes))
        }
        FieldKind::Reflexive { .. } => format!("file_array_header(self.{name}.len())?"),
        FieldKind::Blob { .. } => format!("file_blob_header(self.{name}.len())?"),
        FieldKind::Bitfield { name: ty, .. } if !extract_hidden => {
            format!("{}::new(self.{name}.0 & !{ty}::CACHE_ONLY_MASK)", word(field, Form::File))
        }
        _ => value_to_layout(field, Form::File, &format!("self.{name}")).unwrap_or_else(|| "Layout::zeroed()".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::classify::classify;
    use crate::schema::layout_graph::emission_order;
    use crate::schema::resolved::SchemaSet;
    use tag_types::DefinitionGroup;

    fn emit(text: &str, extract_hidden: bool) -> String {
        let set = SchemaSet::resolve(&[DefinitionGroup::from_json_str("test", text).unwrap()]).unwrap();
        let order = emission_order(&set).unwrap();
        let schema = classify(&set, &order).unwrap();
        let options = GeneratorOptions {
            extract_hidden,
            ..Default::default()
        };
        emit_file_codec(&schema, &options)
    }

    const LIGHT: &str = r#"[
        {"name": "Light", "type": "struct", "size": 28, "fields": [
            {"name": "radius", "type": "float", "default": 2.0},
            {"name": "falloff", "type": "float", "bounds": true, "default": [0.5, 1.0], "default_sign": true},
            {"name": "color", "type": "ColorRGB", "default": 1.0},
            {"name": "runtime id", "type": "uint32", "cache_only": true}
        ]}
    ]"#;

    #[test]
    fn postprocess_defaults() {
        let text = emit(LIGHT, false);
        assert!(text.contains("let mut r = Self {"));
        assert!(text.contains("if r.radius == 0.0 { r.radius = 2.0; }"));
        assert!(text.contains("if r.falloff.from <= 0.0 && r.falloff.to <= 0.0 { r.falloff = Bounds::new(0.5, 1.0); }"));
        assert!(text.contains("if r.color.all(|c| c == 0.0) { r.color = ColorRGB::from_array([1.0, 1.0, 1.0]); }"));
    }

    #[test]
    fn bitfields_are_masked_on_decode() {
        let text = emit(
            r#"[
            {"name": "LightFlags", "type": "bitfield", "width": 16, "fields": ["dynamic", {"name": "lit", "cache_only": true}]},
            {"name": "Light", "type": "struct", "size": 2, "fields": [{"name": "flags", "type": "LightFlags"}]}
        ]"#,
            false,
        );
        assert!(text.contains("flags: LightFlags(l.flags.get() & LightFlags::MASK & !LightFlags::CACHE_ONLY_MASK),"));
    }

    #[test]
    fn cache_only_fields_are_zeroed_unless_extracted() {
        assert!(emit(LIGHT, false).contains("runtime_id: Layout::zeroed(),"));
        assert!(emit(LIGHT, true).contains("runtime_id: Be::new(self.runtime_id),"));
    }
}
