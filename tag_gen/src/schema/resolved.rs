use super::names::{constant_prefix, member_name, option_constant};
use super::superclass::expand_classes;
use super::SchemaError;
use indexmap::IndexMap;
use serde_derive::Serialize;
use std::collections::HashSet;
use tag_types::{BitfieldDef, DefinitionGroup, EnumDef, FieldDef, OptionRecord, StructDef};

/// Math types stored as several scalar components.
pub const COMPOUND_TYPES: &[&str] = &[
  "ColorARGB", "ColorRGB", "Euler2D", "Euler3D", "Matrix", "Plane2D", "Plane3D", "Point2D", "Point2DInt",
  "Point3D", "Quaternion", "Rectangle2D", "Vector2D", "Vector3D",
];

/// Handle types that also occupy several words in a layout.
pub const HANDLE_TYPES: &[&str] = &["TagDependency", "TagReflexive", "TagDataOffset"];

pub const DEFAULT_ENUM_WIDTH: u8 = 16;

pub fn is_compound(type_name: &str) -> bool {
  COMPOUND_TYPES.contains(&type_name) || HANDLE_TYPES.contains(&type_name)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOption {
  pub name: String,
  pub display_name: String,
  /// Constant identifier, prefixed with the owning type.
  pub constant: String,
  pub value: u32,
  pub description: Option<String>,
  pub excluded: bool,
  pub cache_only: bool,
  pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEnum {
  pub name: String,
  pub group: String,
  pub prefix: String,
  pub width: u8,
  pub options: Vec<ResolvedOption>,
  pub description: Option<String>,
}

impl ResolvedEnum {
  pub fn excluded_values(&self) -> Vec<u32> {
    self.options.iter().filter(|o| o.excluded).map(|o| o.value).collect()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBitfield {
  pub name: String,
  pub group: String,
  pub prefix: String,
  pub width: u8,
  pub flags: Vec<ResolvedOption>,
  /// Every declared bit, excluded or not.
  pub declared_mask: u32,
  /// Declared bits minus excluded ones.
  pub full_mask: u32,
  pub cache_only_mask: u32,
  pub read_only_mask: u32,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
  pub display_name: String,
  pub identifier: String,
  pub compound: bool,
  /// Dependency classes after superclass expansion; empty means any class.
  pub classes: Vec<String>,
  pub read_only: bool,
  pub record: FieldDef,
}

impl ResolvedField {
  pub fn is_padding(&self) -> bool {
    self.record.is_padding()
  }

  pub fn type_name(&self) -> &str {
    &self.record.field_type
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStruct {
  pub name: String,
  pub group: String,
  pub inherits: Option<String>,
  pub fields: Vec<ResolvedField>,
  pub size: usize,
  pub title: Option<String>,
  pub minimum: Option<u32>,
  pub maximum: Option<u32>,
  pub read_only: bool,
  pub description: Option<String>,
}

/// Every definition of a run, keyed by name in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaSet {
  pub enums: IndexMap<String, ResolvedEnum>,
  pub bitfields: IndexMap<String, ResolvedBitfield>,
  pub structs: IndexMap<String, ResolvedStruct>,
}

impl SchemaSet {
  pub fn resolve(groups: &[DefinitionGroup]) -> Result<Self, SchemaError> {
    let mut set = SchemaSet::default();
    let mut seen = HashSet::new();

    for group in groups {
      for definition in &group.definitions {
        if !seen.insert(definition.name().to_string()) {
          return Err(SchemaError::Duplicate(definition.name().to_string()));
        }
      }

      for def in group.enums() {
        let resolved = resolve_enum(&group.name, def)?;
        set.enums.insert(resolved.name.clone(), resolved);
      }
      for def in group.bitfields() {
        let resolved = resolve_bitfield(&group.name, def)?;
        set.bitfields.insert(resolved.name.clone(), resolved);
      }
      for def in group.structs() {
        let resolved = resolve_struct(&group.name, def)?;
        set.structs.insert(resolved.name.clone(), resolved);
      }
    }

    tracing::debug!(
      "resolved {} enums, {} bitfields, {} structs",
      set.enums.len(),
      set.bitfields.len(),
      set.structs.len()
    );
    Ok(set)
  }

  pub fn is_enum(&self, name: &str) -> bool {
    self.enums.contains_key(name)
  }

  pub fn is_bitfield(&self, name: &str) -> bool {
    self.bitfields.contains_key(name)
  }

  /// `name` followed by every struct inheriting from it, directly or not.
  pub fn descendants_of(&self, name: &str) -> Vec<String> {
    let mut out = vec![name.to_string()];
    let mut i = 0;
    while i < out.len() {
      let current = out[i].clone();
      for s in self.structs.values() {
        if s.inherits.as_deref() == Some(current.as_str()) && !out.contains(&s.name) {
          out.push(s.name.clone());
        }
      }
      i += 1;
    }
    out
  }

  /// Inheritance chain of a struct, root first, the struct itself last.
  pub fn lineage(&self, name: &str) -> Result<Vec<&ResolvedStruct>, SchemaError> {
    let mut chain = Vec::new();
    let mut current = self.structs.get(name);
    while let Some(s) = current {
      if chain.iter().any(|c: &&ResolvedStruct| c.name == s.name) {
        return Err(SchemaError::Graph(super::layout_graph::LayoutGraphError::CircularDependency(
          chain.iter().map(|c| c.name.clone()).collect(),
        )));
      }
      chain.push(s);
      current = match &s.inherits {
        Some(parent) => Some(self.structs.get(parent).ok_or_else(|| SchemaError::UnknownParent {
          owner: s.name.clone(),
          parent: parent.clone(),
        })?),
        None => None,
      };
    }
    chain.reverse();
    Ok(chain)
  }
}

fn check_width(name: &str, width: u8, count: usize, bits_per_option: bool) -> Result<(), SchemaError> {
  if !matches!(width, 8 | 16 | 32) {
    return Err(SchemaError::InvalidWidth { name: name.to_string(), width });
  }
  let fits = if bits_per_option { count <= width as usize } else { (count as u64) <= (1u64 << width) };
  if !fits {
    return Err(SchemaError::WidthOverflow { name: name.to_string(), count, width });
  }
  Ok(())
}

fn resolve_options(prefix: &str, records: &[OptionRecord]) -> Vec<ResolvedOption> {
  records
    .iter()
    .enumerate()
    .map(|(value, record)| {
      let detail = record.detail();
      let constant_source = detail.member_name.clone().unwrap_or_else(|| detail.name.clone());
      ResolvedOption {
        display_name: detail.display_name.clone().unwrap_or_else(|| detail.name.clone()),
        constant: option_constant(prefix, &constant_source),
        value: value as u32,
        description: detail.description,
        excluded: detail.excluded,
        cache_only: detail.cache_only,
        read_only: detail.read_only,
        name: detail.name,
      }
    })
    .collect()
}

fn resolve_enum(group: &str, def: &EnumDef) -> Result<ResolvedEnum, SchemaError> {
  let width = def.width.unwrap_or(DEFAULT_ENUM_WIDTH);
  check_width(&def.name, width, def.options.len(), false)?;
  let prefix = constant_prefix(&def.name);
  Ok(ResolvedEnum {
    name: def.name.clone(),
    group: group.to_string(),
    options: resolve_options(&prefix, &def.options),
    prefix,
    width,
    description: def.description.clone(),
  })
}

fn resolve_bitfield(group: &str, def: &BitfieldDef) -> Result<ResolvedBitfield, SchemaError> {
  check_width(&def.name, def.width, def.fields.len(), true)?;
  let prefix = constant_prefix(&format!("{}Flag", def.name));
  let flags = resolve_options(&prefix, &def.fields);

  let declared_mask = if flags.len() >= 32 { u32::MAX } else { (1u32 << flags.len()) - 1 };
  let mask_of = |predicate: fn(&ResolvedOption) -> bool| {
    flags.iter().filter(|f| predicate(f)).fold(0u32, |mask, f| mask | (1 << f.value))
  };
  let excluded_mask = mask_of(|f| f.excluded);
  let cache_only_mask = mask_of(|f| f.cache_only) & !excluded_mask;
  let read_only_mask = mask_of(|f| f.read_only) & !excluded_mask;

  Ok(ResolvedBitfield {
    name: def.name.clone(),
    group: group.to_string(),
    width: def.width,
    declared_mask,
    full_mask: declared_mask & !excluded_mask,
    cache_only_mask,
    read_only_mask,
    flags,
    prefix,
    description: def.description.clone(),
  })
}

fn resolve_struct(group: &str, def: &StructDef) -> Result<ResolvedStruct, SchemaError> {
  let mut fields = Vec::with_capacity(def.fields.len());
  let mut identifiers = HashSet::new();

  for (index, record) in def.fields.iter().enumerate() {
    if record.is_padding() {
      if record.size.unwrap_or(0) == 0 {
        return Err(SchemaError::invalid(&def.name, &format!("padding #{index}"), "padding needs a non-zero size"));
      }
      fields.push(ResolvedField {
        display_name: String::new(),
        identifier: format!("_padding_{index}"),
        compound: false,
        classes: Vec::new(),
        read_only: true,
        record: record.clone(),
      });
      continue;
    }

    let Some(name) = record.name.as_deref() else {
      return Err(SchemaError::invalid(&def.name, &format!("field #{index}"), "field has no name"));
    };
    let display_name = record.display_name.clone().unwrap_or_else(|| name.to_string());
    let identifier = record.member_name.clone().unwrap_or_else(|| member_name(name));

    if record.default.is_some() && record.cache_only {
      return Err(SchemaError::DefaultOnCacheOnly { owner: def.name.clone(), field: identifier });
    }
    if !identifiers.insert(identifier.clone()) {
      return Err(SchemaError::invalid(&def.name, &identifier, "member name is used more than once"));
    }

    fields.push(ResolvedField {
      display_name,
      compound: is_compound(&record.field_type),
      classes: expand_classes(&record.classes),
      read_only: record.read_only.unwrap_or(def.read_only),
      identifier,
      record: record.clone(),
    });
  }

  Ok(ResolvedStruct {
    name: def.name.clone(),
    group: group.to_string(),
    inherits: def.inherits.clone(),
    fields,
    size: def.size,
    title: def.title.clone(),
    minimum: def.minimum,
    maximum: def.maximum,
    read_only: def.read_only,
    description: def.description.clone(),
  })
}
