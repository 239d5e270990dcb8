/* Reads every definition group from a schema directory. */

use super::SchemaError;
use std::fs;
use std::path::{Path, PathBuf};
use tag_types::DefinitionGroup;

fn is_schema_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    )
}

/// Schema files in a directory, sorted by file name.
pub fn schema_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    let entries = fs::read_dir(dir).map_err(|source| SchemaError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SchemaError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_schema_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one file. The group is named after the file stem.
pub fn load_file(path: &Path) -> Result<DefinitionGroup, SchemaError> {
    let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();

    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => DefinitionGroup::from_json_str(&name, &text).map_err(|e| e.to_string()),
        _ => DefinitionGroup::from_yaml_str(&name, &text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| SchemaError::Parse {
        path: path.display().to_string(),
        message,
    })
}

pub fn load_dir(dir: &Path) -> Result<Vec<DefinitionGroup>, SchemaError> {
    let files = schema_files(dir)?;
    tracing::debug!("loading {} schema files from {}", files.len(), dir.display());
    files.iter().map(|path| load_file(path)).collect()
}
