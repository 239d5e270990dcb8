/* Common utilities shared between analyze and codegen commands */

use anyhow::Context;
use std::path::Path;
use tag_gen::schema::loader;
use tag_gen::{analyze_groups, Analysis};

/* Load, resolve, order and classify a schema directory */
pub fn load_and_analyze(schema_dir: &Path, verbose: bool) -> anyhow::Result<Analysis> {
  if verbose {
    println!("[~] Loading schema files from {}...", schema_dir.display());
  }
  let files = loader::schema_files(schema_dir)
    .with_context(|| format!("cannot list schema directory {}", schema_dir.display()))?;
  let mut groups = Vec::with_capacity(files.len());
  for file in &files {
    let group = loader::load_file(file)?;
    if verbose {
      println!("  - {} ({} definitions)", file.display(), group.definitions.len());
    }
    groups.push(group);
  }

  if verbose {
    println!("[~] Resolving {} definition group(s)...", groups.len());
  }
  let analysis = match analyze_groups(&groups) {
    Ok(analysis) => analysis,
    Err(e) => {
      println!("[✗] {e}");
      return Err(e.into());
    }
  };

  if verbose {
    println!(
      "[✓] {} enums, {} bitfields, {} structs",
      analysis.schema.enums.len(),
      analysis.schema.bitfields.len(),
      analysis.schema.structs.len()
    );
  }
  print_warnings(&analysis, verbose);
  Ok(analysis)
}

/* Non-fatal findings: unresolved array elements and size mismatches */
pub fn print_warnings(analysis: &Analysis, verbose: bool) {
  let mismatched: Vec<_> = analysis
    .schema
    .structs
    .iter()
    .filter(|s| s.size != s.computed_size)
    .collect();

  if analysis.unresolved.is_empty() && mismatched.is_empty() {
    if verbose {
      println!("[✓] No warnings");
    }
    return;
  }

  for unresolved in &analysis.unresolved {
    println!(
      "  [!] {}::{} references {} which is not defined in this run",
      unresolved.owner, unresolved.field, unresolved.struct_name
    );
  }
  for s in mismatched {
    println!(
      "  [!] {} declares {:#x} bytes but its fields add up to {:#x}",
      s.name, s.size, s.computed_size
    );
  }
}
