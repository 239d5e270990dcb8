/* Validators pass.
 *
 * Each traversal returns whether anything was found. Without `fix` it stops at
 * the first violation; with `fix` it corrects in place and keeps going.
 */

use super::shared::{class_list, number_literal, struct_tags};
use super::writer::CodeWriter;
use crate::schema::classify::{ClassifiedField, ClassifiedSchema, ClassifiedStruct, FieldKind};
use crate::GeneratorOptions;

/// One test inside a traversal, optionally run for each item of an iterator.
struct Check {
    each: Option<(&'static str, String)>,
    test: String,
    /// Correction applied when `fix` is set; helpers that fix themselves leave this empty.
    correct: Option<String>,
}

impl Check {
    fn direct(test: String) -> Self {
        Self {
            each: None,
            test,
            correct: None,
        }
    }

    fn each(binding: &'static str, iter: String, test: String) -> Self {
        Self {
            each: Some((binding, iter)),
            test,
            correct: None,
        }
    }

    fn correcting(mut self, correct: String) -> Self {
        self.correct = Some(correct);
        self
    }
}

pub fn emit_validators(schema: &ClassifiedSchema, options: &GeneratorOptions) -> String {
    let mut w = CodeWriter::with_header(&options.runtime_crate, true);
    for s in &schema.structs {
        w.blank();
        w.open(format!("impl {} {{", s.name));

        w.line("/// Numbers outside their declared minimum and maximum; fixing clamps them.");
        emit_traversal(&mut w, "check_invalid_ranges", range_checks(s), s);
        w.blank();
        emit_index_traversal(&mut w, s);
        w.blank();
        w.line("/// Dependencies whose class is not allowed; fixing nulls them.");
        emit_traversal(&mut w, "check_invalid_references", reference_checks(s), s);
        w.blank();
        emit_traversal(&mut w, "check_nonnormal_vectors", normal_checks(s), s);
        w.blank();
        w.line("/// Enum values past the last option; fixing resets them.");
        emit_traversal(&mut w, "check_broken_enums", enum_checks(s), s);
        w.blank();
        emit_traversal(&mut w, "check_uppercase_references", uppercase_checks(s), s);
        w.blank();
        emit_refactor(&mut w, s);
        w.blank();
        emit_compare(&mut w, s);

        w.close("}");
    }
    w.finish()
}

fn emit_check(w: &mut CodeWriter, check: &Check) {
    if let Some((binding, iter)) = &check.each {
        w.open(format!("for {binding} in {iter} {{"));
    }
    w.open(format!("if {} {{", check.test));
    w.open("if !fix {");
    w.line("return true;");
    w.close("}");
    if let Some(correct) = &check.correct {
        w.line(correct);
    }
    w.line("found = true;");
    w.close("}");
    if check.each.is_some() {
        w.close("}");
    }
}

/// `name(&mut self, fix)` running `checks` and recursing into every array.
fn emit_traversal(w: &mut CodeWriter, name: &str, mut checks: Vec<Check>, s: &ClassifiedStruct) {
    for (array, _) in s.arrays() {
        checks.push(Check::each(
            "element",
            format!("&mut self.{}", array.identifier),
            format!("element.{name}(fix)"),
        ));
    }
    w.open(format!("pub fn {name}(&mut self, fix: bool) -> bool {{"));
    if checks.is_empty() {
        w.line("false");
    } else {
        w.line("let mut found = false;");
        for check in &checks {
            emit_check(w, check);
        }
        w.line("found");
    }
    w.close("}");
}

fn range_checks(s: &ClassifiedStruct) -> Vec<Check> {
    let mut out = Vec::new();
    for field in s.members() {
        let FieldKind::Scalar {
            number,
            count,
            bounds,
            minimum,
            maximum,
            ..
        } = &field.kind
        else {
            continue;
        };
        if minimum.is_none() && maximum.is_none() {
            continue;
        }
        let limit = |v: &Option<f64>| match v {
            Some(v) => format!("Some({})", number_literal(*v, number.is_float())),
            None => "None".to_string(),
        };
        let test = |target: &str| format!("fix_range({target}, {}, {}, fix)", limit(minimum), limit(maximum));
        let name = &field.identifier;
        if *bounds {
            out.push(Check::direct(test(&format!("&mut self.{name}.from"))));
            out.push(Check::direct(test(&format!("&mut self.{name}.to"))));
        } else if count.is_some() {
            out.push(Check::each("value", format!("&mut self.{name}"), test("value")));
        } else {
            out.push(Check::direct(test(&format!("&mut self.{name}"))));
        }
    }
    out
}

fn reference_checks(s: &ClassifiedStruct) -> Vec<Check> {
    s.members()
        .filter_map(|field| match &field.kind {
            FieldKind::Dependency { classes, .. } if !classes.is_empty() => Some(Check::direct(format!(
                "fix_reference(&mut self.{}, {}, fix)",
                field.identifier,
                class_list(classes)
            ))),
            _ => None,
        })
        .collect()
}

fn normal_checks(s: &ClassifiedStruct) -> Vec<Check> {
    s.members()
        .filter_map(|field| match &field.kind {
            FieldKind::Compound {
                count, normalize: true, ..
            } => Some(match count {
                Some(_) => Check::each("value", format!("&mut self.{}", field.identifier), "fix_normal(value, fix)".to_string()),
                None => Check::direct(format!("fix_normal(&mut self.{}, fix)", field.identifier)),
            }),
            _ => None,
        })
        .collect()
}

fn enum_checks(s: &ClassifiedStruct) -> Vec<Check> {
    s.members()
        .filter_map(|field| match &field.kind {
            FieldKind::Enum { name, .. } => Some(
                Check::direct(format!("u32::from(self.{}.0) >= {name}::COUNT", field.identifier))
                    .correcting(format!("self.{} = {name}::default();", field.identifier)),
            ),
            _ => None,
        })
        .collect()
}

fn uppercase_checks(s: &ClassifiedStruct) -> Vec<Check> {
    s.members()
        .filter(|field| matches!(field.kind, FieldKind::Dependency { .. }))
        .map(|field| Check::direct(format!("fix_uppercase(&mut self.{}, fix)", field.identifier)))
        .collect()
}

fn emit_index_traversal(w: &mut CodeWriter, s: &ClassifiedStruct) {
    w.line("/// Indices past the end of the ancestor array they point into; fixing nulls them.");
    w.open("pub fn check_invalid_indices(&mut self, fix: bool) -> bool {");
    w.line("let mut stack = ContainmentStack::new();");
    w.line("self.check_invalid_indices_in(&mut stack, fix)");
    w.close("}");
    w.blank();

    let mut checks = Vec::new();
    for field in s.members() {
        if let FieldKind::Index { target: Some(target) } = &field.kind {
            checks.push(
                Check::direct(format!(
                    "index_out_of_range(&stack, self.{}, {}, {:?}).is_some()",
                    field.identifier,
                    struct_tags(&target.tags),
                    target.member
                ))
                .correcting(format!("self.{} = NULL_INDEX;", field.identifier)),
            );
        }
    }
    let lengths: Vec<String> = s
        .arrays()
        .map(|(f, _)| format!("({0:?}, self.{0}.len())", f.identifier))
        .collect();
    for (array, _) in s.arrays() {
        checks.push(Check::each(
            "element",
            format!("&mut self.{}", array.identifier),
            "element.check_invalid_indices_in(&mut stack, fix)".to_string(),
        ));
    }

    w.open("pub fn check_invalid_indices_in(&mut self, stack: &mut ContainmentStack, fix: bool) -> bool {");
    if !lengths.is_empty() {
        w.line(format!("let mut stack = stack.enter(Self::TAG, &[{}]);", lengths.join(", ")));
    } else if !checks.is_empty() {
        w.line("let stack = stack.enter(Self::TAG, &[]);");
    } else {
        w.line("let _frame = stack.enter(Self::TAG, &[]);");
    }
    if checks.is_empty() {
        w.line("false");
    } else {
        w.line("let mut found = false;");
        for check in &checks {
            emit_check(w, check);
        }
        w.line("found");
    }
    w.close("}");
}

fn emit_refactor(w: &mut CodeWriter, s: &ClassifiedStruct) {
    w.line("/// Point every matching dependency at another tag and return how many changed.");
    w.open("pub fn refactor_reference(");
    w.line("&mut self,");
    w.line("from_path: &str,");
    w.line("from_class: TagClass,");
    w.line("to_path: &str,");
    w.line("to_class: TagClass,");
    w.reopen(") -> usize {");
    let dependencies: Vec<&str> = s
        .members()
        .filter(|f| matches!(f.kind, FieldKind::Dependency { .. }))
        .map(|f| f.identifier.as_str())
        .collect();
    if dependencies.is_empty() && s.arrays().next().is_none() {
        w.line("0");
        w.close("}");
        return;
    }
    w.line("let mut replaced = 0;");
    for name in dependencies {
        w.open(format!(
            "if refactor_dependency(&mut self.{name}, from_path, from_class, to_path, to_class) {{"
        ));
        w.line("replaced += 1;");
        w.close("}");
    }
    for (array, _) in s.arrays() {
        w.open(format!("for element in &mut self.{} {{", array.identifier));
        w.line("replaced += element.refactor_reference(from_path, from_class, to_path, to_class);");
        w.close("}");
    }
    w.line("replaced");
    w.close("}");
}

/// Open a difference branch: stop at the first difference unless verbose, log it otherwise.
fn emit_difference(w: &mut CodeWriter, test: &str, owner: &str, field: &str, element: &str) {
    w.open(format!("if {test} {{"));
    w.open("if !verbose {");
    w.line("return false;");
    w.close("}");
    w.line(format!("report_difference({owner:?}, {field:?}, {element}, depth);"));
    w.line("same = false;");
    w.close("}");
}

fn emit_compare(w: &mut CodeWriter, s: &ClassifiedStruct) {
    w.line("/// Field by field comparison. Cache-only fields are skipped, and volatile ones too with `ignore_volatile`.");
    w.line("/// Stops at the first difference unless `verbose`, which logs every difference instead.");
    w.open("pub fn compare(&self, other: &Self, precision: bool, ignore_volatile: bool, verbose: bool) -> bool {");
    w.line("self.compare_at_depth(other, precision, ignore_volatile, verbose, 0)");
    w.close("}");
    w.blank();

    let fields: Vec<&ClassifiedField> = s.members().filter(|f| !f.cache_only).collect();
    w.open("pub fn compare_at_depth(");
    w.line("&self,");
    w.line("other: &Self,");
    w.line("precision: bool,");
    w.line("ignore_volatile: bool,");
    w.line("verbose: bool,");
    w.line("depth: usize,");
    w.reopen(") -> bool {");
    if fields.is_empty() {
        w.line("true");
        w.close("}");
        return;
    }
    w.line("let mut same = true;");
    for field in fields {
        let name = &field.identifier;
        let differs = match &field.kind {
            FieldKind::Scalar { .. } | FieldKind::Compound { .. } => {
                format!("!self.{name}.same_as(&other.{name}, precision)")
            }
            FieldKind::Reflexive { .. } => {
                emit_difference(w, &format!("self.{name}.len() != other.{name}.len()"), &s.name, name, "None");
                w.open(format!("for (i, (a, b)) in self.{name}.iter().zip(&other.{name}).enumerate() {{"));
                emit_difference(
                    w,
                    "!a.compare_at_depth(b, precision, ignore_volatile, verbose, depth + 1)",
                    &s.name,
                    name,
                    "Some(i)",
                );
                w.close("}");
                continue;
            }
            _ => format!("self.{name} != other.{name}"),
        };
        let test = if field.volatile {
            format!("!ignore_volatile && {differs}")
        } else {
            differs
        };
        emit_difference(w, &test, &s.name, name, "None");
    }
    w.line("same");
    w.close("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::classify::classify;
    use crate::schema::layout_graph::emission_order;
    use crate::schema::resolved::SchemaSet;
    use tag_types::DefinitionGroup;

    fn emit(text: &str) -> String {
        let set = SchemaSet::resolve(&[DefinitionGroup::from_json_str("test", text).unwrap()]).unwrap();
        let order = emission_order(&set).unwrap();
        let schema = classify(&set, &order).unwrap();
        emit_validators(&schema, &GeneratorOptions::default())
    }

    #[test]
    fn index_traversal_pushes_frames() {
        let text = emit(
            r#"[
            {"name": "Bone", "type": "struct", "size": 2, "fields": [
                {"name": "parent", "type": "Index", "struct": "Skeleton", "reflexive": "bones"}
            ]},
            {"name": "Skeleton", "type": "struct", "size": 12, "fields": [
                {"name": "bones", "type": "TagReflexive", "struct": "Bone"}
            ]}
        ]"#,
        );
        assert!(text.contains("let mut stack = stack.enter(Self::TAG, &[(\"bones\", self.bones.len())]);"));
        assert!(text.contains("if index_out_of_range(&stack, self.parent, &[Skeleton::TAG], \"bones\").is_some() {"));
        assert!(text.contains("self.parent = NULL_INDEX;"));
        assert!(text.contains("if element.check_invalid_indices_in(&mut stack, fix) {"));
    }

    #[test]
    fn compare_skips_cache_only_and_volatile_fields() {
        let text = emit(
            r#"[
            {"name": "Light", "type": "struct", "size": 24, "fields": [
                {"name": "radius", "type": "float"},
                {"name": "heat", "type": "float", "volatile": true},
                {"name": "runtime id", "type": "uint32", "cache_only": true},
                {"name": "children", "type": "TagReflexive", "struct": "Light"}
            ]}
        ]"#,
        );
        assert!(text.contains("if !self.radius.same_as(&other.radius, precision) {"));
        assert!(text.contains("if !ignore_volatile && !self.heat.same_as(&other.heat, precision) {"));
        assert!(!text.contains("other.runtime_id"));
        assert!(text.contains("if self.children.len() != other.children.len() {"));
        assert!(text.contains("if !a.compare_at_depth(b, precision, ignore_volatile, verbose, depth + 1) {"));
        assert!(text.contains("report_difference(\"Light\", \"children\", Some(i), depth);"));
    }

    #[test]
    fn empty_traversals_return_false() {
        let text = emit(r#"[{"name": "Empty", "type": "struct", "size": 0, "fields": []}]"#);
        assert!(text.contains("pub fn check_invalid_ranges(&mut self, fix: bool) -> bool {\n        false\n    }"));
        assert!(text.contains(") -> usize {\n        0\n    }"));
    }
}
