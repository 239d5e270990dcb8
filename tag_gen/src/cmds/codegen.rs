/* Codegen commands - emit one target file or every target into a directory */

use super::common::load_and_analyze;
use anyhow::Context;
use std::path::PathBuf;
use tag_gen::codegen::{generate_all, Target};
use tag_gen::GeneratorOptions;

fn print_configuration(schema_dir: &PathBuf, output: &PathBuf, options: &GeneratorOptions) {
  println!("Tag Generator - Code Generation Tool");
  println!("====================================\n");
  println!("[~] Configuration:");
  println!("  Schema directory: {}", schema_dir.display());
  println!("  Output: {}", output.display());
  println!("  Runtime crate: {}", options.runtime_crate);
  println!("  Extract hidden fields: {}", options.extract_hidden);
  println!();
}

/* Execute a single-target command */
pub fn run_target(
  target: Target,
  schema_dir: PathBuf,
  output: PathBuf,
  options: &GeneratorOptions,
) -> anyhow::Result<()> {
  if options.verbose {
    print_configuration(&schema_dir, &output, options);
  }

  let analysis = load_and_analyze(&schema_dir, options.verbose)?;

  if options.verbose {
    println!("\n[*] Emitting {}...", target.module());
  }
  let text = target.emit(&analysis.schema, options);

  if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("cannot create {}", parent.display()))?;
  }
  std::fs::write(&output, &text).with_context(|| format!("cannot write {}", output.display()))?;

  println!(
    "[✓] Wrote {} ({} structs, {} bytes)",
    output.display(),
    analysis.schema.structs.len(),
    text.len()
  );
  Ok(())
}

/* Execute the generate command */
pub fn run_all(schema_dir: PathBuf, output_dir: PathBuf, options: &GeneratorOptions) -> anyhow::Result<()> {
  if options.verbose {
    print_configuration(&schema_dir, &output_dir, options);
  }

  let analysis = load_and_analyze(&schema_dir, options.verbose)?;

  if options.verbose {
    println!("\n[*] Running {} codegen passes...", Target::ALL.len());
  }
  let sources = generate_all(&analysis.schema, options);
  let written = sources
    .write_to(&output_dir)
    .with_context(|| format!("cannot write generated sources to {}", output_dir.display()))?;

  if options.verbose {
    for name in &written {
      println!("  - {}", output_dir.join(name).display());
    }
  }
  println!(
    "[✓] Generated {} files for {} structs in {}",
    written.len(),
    analysis.schema.structs.len(),
    output_dir.display()
  );
  Ok(())
}
