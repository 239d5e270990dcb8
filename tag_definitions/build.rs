use anyhow::Context;
use std::path::PathBuf;
use tag_gen::GeneratorOptions;

fn main() -> anyhow::Result<()> {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let schema_dir = manifest_dir.join("definitions");

    println!("cargo:rerun-if-changed={}", schema_dir.display());
    for file in tag_gen::schema::loader::schema_files(&schema_dir)? {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    tag_gen::generate_dir(&schema_dir, &out_dir, &GeneratorOptions::default())
        .with_context(|| format!("generating tag definitions from {}", schema_dir.display()))?;
    Ok(())
}
