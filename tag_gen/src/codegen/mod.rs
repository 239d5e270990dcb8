pub mod definitions;
pub mod file_format;
pub mod packed;
pub mod reflect;
pub mod shared;
pub mod validate;
pub mod writer;

use crate::schema::classify::ClassifiedSchema;
use crate::GeneratorOptions;
use std::path::Path;

/// One generation target: a single emitted source file.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Target {
    Definitions,
    PackedCodec,
    FileCodec,
    Validators,
    Reflection,
}

impl Target {
    pub const ALL: [Target; 5] = [
        Target::Definitions,
        Target::PackedCodec,
        Target::FileCodec,
        Target::Validators,
        Target::Reflection,
    ];

    /// Module name, also the stem of the file written by `generate`.
    pub fn module(self) -> &'static str {
        match self {
            Target::Definitions => "definitions",
            Target::PackedCodec => "packed_codec",
            Target::FileCodec => "file_codec",
            Target::Validators => "validators",
            Target::Reflection => "reflection",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.rs", self.module())
    }

    pub fn emit(self, schema: &ClassifiedSchema, options: &GeneratorOptions) -> String {
        match self {
            Target::Definitions => definitions::emit_definitions(schema, options),
            Target::PackedCodec => packed::emit_packed_codec(schema, options),
            Target::FileCodec => file_format::emit_file_codec(schema, options),
            Target::Validators => validate::emit_validators(schema, options),
            Target::Reflection => reflect::emit_reflection(schema, options),
        }
    }
}

/// Every emitted source, in `Target::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSources {
    pub files: Vec<(Target, String)>,
}

impl GeneratedSources {
    pub fn get(&self, target: Target) -> Option<&str> {
        self.files.iter().find(|(t, _)| *t == target).map(|(_, text)| text.as_str())
    }

    /// Write every source plus `include.rs` into `dir`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<Vec<String>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for (target, text) in &self.files {
            let name = target.file_name();
            std::fs::write(dir.join(&name), text)?;
            written.push(name);
        }
        std::fs::write(dir.join(INCLUDE_FILE), include_source())?;
        written.push(INCLUDE_FILE.to_string());
        Ok(written)
    }
}

pub const INCLUDE_FILE: &str = "include.rs";

/// Run all five passes, one thread each.
pub fn generate_all(schema: &ClassifiedSchema, options: &GeneratorOptions) -> GeneratedSources {
    let files = std::thread::scope(|scope| {
        let handles: Vec<_> = Target::ALL
            .iter()
            .map(|target| scope.spawn(move || (*target, target.emit(schema, options))))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });
    tracing::debug!("emitted {} sources for {} structs", Target::ALL.len(), schema.structs.len());
    GeneratedSources { files }
}

/// Module wrapper that stitches the sources written by `generate` together.
/// Paths resolve against `OUT_DIR`, so it is meant to be `include!`d from a build script's output.
pub fn include_source() -> String {
    let allow = "#[allow(unused_mut, unused_variables, unused_imports, dead_code, clippy::all, non_upper_case_globals)]";
    let mut w = writer::CodeWriter::new();
    w.line("// Generated by tag-gen. Do not edit; change the schema and regenerate.");
    w.blank();
    for target in Target::ALL {
        let visibility = if target == Target::Definitions { "pub " } else { "" };
        w.line(allow);
        w.open(format!("{visibility}mod {} {{", target.module()));
        w.line(format!(
            "include!(concat!(env!(\"OUT_DIR\"), \"/{}\"));",
            target.file_name()
        ));
        w.close("}");
        w.blank();
    }
    w.line("pub use definitions::*;");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_wraps_every_target() {
        let text = include_source();
        assert!(text.contains("pub mod definitions {\n    include!(concat!(env!(\"OUT_DIR\"), \"/definitions.rs\"));\n}"));
        assert!(text.contains("mod reflection {"));
        assert!(!text.contains("pub mod reflection"));
        assert!(text.ends_with("pub use definitions::*;\n"));
    }
}
