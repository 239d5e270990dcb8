pub mod codegen;
pub mod schema;

use codegen::GeneratedSources;
use schema::classify::{classify, ClassifiedSchema};
use schema::layout_graph::{emission_order, LayoutGraph, UnresolvedReference};
use schema::resolved::SchemaSet;
use schema::SchemaError;
use std::path::Path;
use tag_types::DefinitionGroup;

/// Knobs shared by every codegen pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// File encode also writes cache-only and unused fields.
    pub extract_hidden: bool,
    /// Crate path used in the `use ...::prelude::*` line of emitted files.
    pub runtime_crate: String,
    pub verbose: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            extract_hidden: false,
            runtime_crate: "tag_runtime".to_string(),
            verbose: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Every stage of the front end for one schema run.
#[derive(Debug)]
pub struct Analysis {
    pub set: SchemaSet,
    pub order: Vec<String>,
    pub unresolved: Vec<UnresolvedReference>,
    pub schema: ClassifiedSchema,
}

/// Resolve, order and classify in-memory definition groups.
pub fn analyze_groups(groups: &[DefinitionGroup]) -> Result<Analysis, SchemaError> {
    let set = SchemaSet::resolve(groups)?;
    let unresolved = LayoutGraph::build(&set).unresolved_references(&set);
    let order = emission_order(&set)?;
    let schema = classify(&set, &order)?;
    Ok(Analysis {
        set,
        order,
        unresolved,
        schema,
    })
}

/// Load every schema file in `dir` and run the front end over them.
pub fn analyze_dir(dir: &Path) -> Result<Analysis, SchemaError> {
    let groups = schema::loader::load_dir(dir)?;
    analyze_groups(&groups)
}

/// Generate every target for a schema directory and write them, plus `include.rs`, into `out_dir`.
pub fn generate_dir(
    schema_dir: &Path,
    out_dir: &Path,
    options: &GeneratorOptions,
) -> Result<GeneratedSources, GenerateError> {
    let analysis = analyze_dir(schema_dir)?;
    let sources = codegen::generate_all(&analysis.schema, options);
    sources.write_to(out_dir).map_err(|source| GenerateError::Io {
        path: out_dir.display().to_string(),
        source,
    })?;
    Ok(sources)
}
