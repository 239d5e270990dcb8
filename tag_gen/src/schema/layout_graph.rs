use super::resolved::SchemaSet;
use indexmap::{IndexMap, IndexSet};

#[cfg(feature = "layout_graph_trace")]
fn trace_log(msg: impl AsRef<str>) {
    eprintln!("[layout_graph] {}", msg.as_ref());
}

#[cfg(not(feature = "layout_graph_trace"))]
fn trace_log(_msg: impl AsRef<str>) {}

/// Array element structs that may be missing from a run without a warning.
pub const UNORDERED_LEAVES: &[&str] = &["PredictedResource"];

/// Tracks struct dependency information for emitting structs in topological order.
#[derive(Debug)]
pub struct LayoutGraph {
    nodes: IndexMap<String, LayoutGraphNode>,
}

#[derive(Debug, Clone)]
pub struct LayoutGraphNode {
    pub id: usize,
    pub name: String,
    pub inherits: Option<String>,
    /// Element structs of this struct's own array fields, in field order.
    pub deps: Vec<String>,
}

/// An array field whose element struct is not part of this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub owner: String,
    pub field: String,
    pub struct_name: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutGraphError {
    #[error("circular dependency detected: {0:?}")]
    CircularDependency(Vec<String>),
    #[error("{owner} inherits from unknown struct {parent}")]
    UnknownParent { owner: String, parent: String },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Edge {
    Root,
    Inherits,
    Contains,
}

impl LayoutGraph {
    pub fn build(schema: &SchemaSet) -> Self {
        let mut nodes = IndexMap::new();
        for (idx, s) in schema.structs.values().enumerate() {
            let mut deps = Vec::new();
            for field in &s.fields {
                if field.type_name() != "TagReflexive" {
                    continue;
                }
                if let Some(element) = &field.record.struct_name {
                    if !deps.contains(element) {
                        deps.push(element.clone());
                    }
                }
            }
            nodes.insert(
                s.name.clone(),
                LayoutGraphNode {
                    id: idx,
                    name: s.name.clone(),
                    inherits: s.inherits.clone(),
                    deps,
                },
            );
        }
        Self { nodes }
    }

    /// Depth-first insertion: parent, then array element structs, then the struct itself.
    pub fn topo_order(&self) -> Result<Vec<String>, LayoutGraphError> {
        let mut placed = IndexSet::new();
        let mut visiting = Vec::new();
        for name in self.nodes.keys() {
            self.insert(name, Edge::Root, &mut visiting, &mut placed)?;
        }
        Ok(placed.into_iter().collect())
    }

    fn insert(
        &self,
        name: &str,
        edge: Edge,
        visiting: &mut Vec<String>,
        placed: &mut IndexSet<String>,
    ) -> Result<(), LayoutGraphError> {
        if placed.contains(name) {
            return Ok(());
        }
        let Some(node) = self.nodes.get(name) else {
            trace_log(format!("skipping unknown struct {name}"));
            return Ok(());
        };
        if visiting.iter().any(|v| v == name) {
            // Arrays are stored behind a handle, so containing an ancestor is fine.
            if edge == Edge::Contains {
                trace_log(format!("{name} is contained by its own descendant"));
                return Ok(());
            }
            let mut cycle = visiting.clone();
            cycle.push(name.to_string());
            return Err(LayoutGraphError::CircularDependency(cycle));
        }

        visiting.push(name.to_string());
        if let Some(parent) = &node.inherits {
            if !self.nodes.contains_key(parent) {
                return Err(LayoutGraphError::UnknownParent {
                    owner: name.to_string(),
                    parent: parent.clone(),
                });
            }
            self.insert(parent, Edge::Inherits, visiting, placed)?;
        }
        for dep in &node.deps {
            self.insert(dep, Edge::Contains, visiting, placed)?;
        }
        visiting.pop();

        trace_log(format!("placing {name} (#{})", node.id));
        placed.insert(name.to_string());
        Ok(())
    }

    /// Array element structs missing from the graph, allow-listed leaves excluded.
    pub fn unresolved_references(&self, schema: &SchemaSet) -> Vec<UnresolvedReference> {
        let mut out = Vec::new();
        for s in schema.structs.values() {
            for field in &s.fields {
                if field.type_name() != "TagReflexive" {
                    continue;
                }
                let Some(element) = &field.record.struct_name else {
                    continue;
                };
                if self.nodes.contains_key(element) || UNORDERED_LEAVES.contains(&element.as_str()) {
                    continue;
                }
                out.push(UnresolvedReference {
                    owner: s.name.clone(),
                    field: field.identifier.clone(),
                    struct_name: element.clone(),
                });
            }
        }
        out
    }

    pub fn nodes(&self) -> impl Iterator<Item = &LayoutGraphNode> {
        self.nodes.values()
    }
}

/// Emission order for a schema, warning about unresolved array element structs.
pub fn emission_order(schema: &SchemaSet) -> Result<Vec<String>, LayoutGraphError> {
    let graph = LayoutGraph::build(schema);
    for unresolved in graph.unresolved_references(schema) {
        tracing::warn!(
            "{}::{} references {} which is not defined in this run",
            unresolved.owner,
            unresolved.field,
            unresolved.struct_name
        );
    }
    let order = graph.topo_order()?;
    tracing::debug!("emission order: {}", order.join(", "));
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_types::DefinitionGroup;

    fn schema(text: &str) -> SchemaSet {
        SchemaSet::resolve(&[DefinitionGroup::from_json_str("test", text).unwrap()]).unwrap()
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn parents_and_elements_come_first() {
        let set = schema(
            r#"[
            {"name": "Weapon", "type": "struct", "inherits": "Item", "size": 0, "fields": [
                {"name": "triggers", "type": "TagReflexive", "struct": "WeaponTrigger"}
            ]},
            {"name": "WeaponTrigger", "type": "struct", "size": 0, "fields": [
                {"name": "barrels", "type": "TagReflexive", "struct": "WeaponBarrel"}
            ]},
            {"name": "Item", "type": "struct", "size": 0, "fields": []},
            {"name": "WeaponBarrel", "type": "struct", "size": 0, "fields": []}
        ]"#,
        );
        let order = LayoutGraph::build(&set).topo_order().unwrap();
        assert_eq!(order, vec!["Item", "WeaponBarrel", "WeaponTrigger", "Weapon"]);
    }

    #[test]
    fn diamonds_are_inserted_once() {
        let set = schema(
            r#"[
            {"name": "Top", "type": "struct", "size": 0, "fields": [
                {"name": "left", "type": "TagReflexive", "struct": "Left"},
                {"name": "right", "type": "TagReflexive", "struct": "Right"}
            ]},
            {"name": "Left", "type": "struct", "size": 0, "fields": [
                {"name": "leaf", "type": "TagReflexive", "struct": "Leaf"}
            ]},
            {"name": "Right", "type": "struct", "size": 0, "fields": [
                {"name": "leaf", "type": "TagReflexive", "struct": "Leaf"}
            ]},
            {"name": "Leaf", "type": "struct", "size": 0, "fields": []}
        ]"#,
        );
        let order = LayoutGraph::build(&set).topo_order().unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "Leaf") < position(&order, "Left"));
        assert!(position(&order, "Leaf") < position(&order, "Right"));
        assert_eq!(order.last().unwrap(), "Top");
    }

    #[test]
    fn self_containment_is_allowed() {
        let set = schema(
            r#"[{"name": "Node", "type": "struct", "size": 0, "fields": [
                {"name": "children", "type": "TagReflexive", "struct": "Node"}
            ]}]"#,
        );
        assert_eq!(LayoutGraph::build(&set).topo_order().unwrap(), vec!["Node"]);
    }

    #[test]
    fn inheritance_cycle_is_an_error() {
        let set = schema(
            r#"[
            {"name": "A", "type": "struct", "inherits": "B", "size": 0, "fields": []},
            {"name": "B", "type": "struct", "inherits": "A", "size": 0, "fields": []}
        ]"#,
        );
        let err = LayoutGraph::build(&set).topo_order().unwrap_err();
        assert!(matches!(err, LayoutGraphError::CircularDependency(cycle) if cycle.len() == 3));
    }

    #[test]
    fn unknown_elements_warn_except_allow_listed() {
        let set = schema(
            r#"[{"name": "Scenery", "type": "struct", "size": 0, "fields": [
                {"name": "predicted resources", "type": "TagReflexive", "struct": "PredictedResource"},
                {"name": "widgets", "type": "TagReflexive", "struct": "Widget"}
            ]}]"#,
        );
        let graph = LayoutGraph::build(&set);
        let unresolved = graph.unresolved_references(&set);
        assert_eq!(
            unresolved,
            vec![UnresolvedReference {
                owner: "Scenery".into(),
                field: "widgets".into(),
                struct_name: "Widget".into(),
            }]
        );
        assert_eq!(graph.topo_order().unwrap(), vec!["Scenery"]);
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let set = schema(r#"[{"name": "Orphan", "type": "struct", "inherits": "Nobody", "size": 0, "fields": []}]"#);
        let err = LayoutGraph::build(&set).topo_order().unwrap_err();
        assert_eq!(
            err,
            LayoutGraphError::UnknownParent {
                owner: "Orphan".into(),
                parent: "Nobody".into()
            }
        );
    }
}
