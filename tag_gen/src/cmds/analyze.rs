/* Analyze command - emission order, classified fields and warnings */

use super::common::load_and_analyze;
use serde_derive::Serialize;
use std::path::PathBuf;
use tag_gen::schema::classify::{ClassifiedSchema, ClassifiedStruct};
use tag_gen::schema::resolved::SchemaSet;

#[derive(Serialize)]
struct AnalysisReport<'a> {
  emission_order: &'a [String],
  resolved: &'a SchemaSet,
  classified: &'a ClassifiedSchema,
}

/* Execute the analyze command */
pub fn run(schema_dir: PathBuf, json: bool) -> anyhow::Result<()> {
  if json {
    let analysis = load_and_analyze(&schema_dir, false)?;
    let report = AnalysisReport {
      emission_order: &analysis.order,
      resolved: &analysis.set,
      classified: &analysis.schema,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  println!("Tag Generator - Schema Analysis Tool");
  println!("====================================\n");

  let analysis = load_and_analyze(&schema_dir, true)?;

  println!("\n[~] Emission order:");
  for (position, name) in analysis.order.iter().enumerate() {
    println!("  {position:>3}. {name}");
  }

  if !analysis.schema.enums.is_empty() {
    println!("\n[~] Enums:");
    for e in &analysis.schema.enums {
      println!("  {} ({} bits, {} options)", e.name, e.width, e.options.len());
    }
  }

  if !analysis.schema.bitfields.is_empty() {
    println!("\n[~] Bitfields:");
    for b in &analysis.schema.bitfields {
      println!(
        "  {} ({} bits) full {:#x}, cache only {:#x}, read only {:#x}",
        b.name, b.width, b.full_mask, b.cache_only_mask, b.read_only_mask
      );
    }
  }

  println!("\n[~] Structs:");
  for s in &analysis.schema.structs {
    print_struct(s);
  }

  println!("\n[✓] Analysis complete");
  Ok(())
}

fn print_struct(s: &ClassifiedStruct) {
  match &s.inherits {
    Some(parent) => println!("\n  {} : {} ({:#x} bytes)", s.name, parent, s.size),
    None => println!("\n  {} ({:#x} bytes)", s.name, s.size),
  }
  for field in &s.fields {
    let mut flags = Vec::new();
    if field.inherited {
      flags.push("inherited");
    }
    if field.cache_only {
      flags.push("cache only");
    }
    if field.unused {
      flags.push("unused");
    }
    if field.hidden {
      flags.push("hidden");
    }
    if field.read_only {
      flags.push("read only");
    }
    let flags = if flags.is_empty() {
      String::new()
    } else {
      format!(" [{}]", flags.join(", "))
    };
    println!(
      "    {:#06x} {:<32} {}{}",
      field.offset,
      field.identifier,
      field.kind.label(),
      flags
    );
  }
}
