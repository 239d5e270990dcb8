use serde_derive::{Deserialize, Serialize};

/// One schema file: an ordered list of enum, bitfield and struct records.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct DefinitionGroup {
    pub name: String,
    pub definitions: Vec<Definition>,
}

impl DefinitionGroup {
    pub fn from_json_str(name: &str, text: &str) -> Result<Self, serde_json::Error> {
        let definitions: Vec<Definition> = serde_json::from_str(text)?;
        Ok(Self {
            name: name.to_string(),
            definitions,
        })
    }

    pub fn from_yaml_str(name: &str, text: &str) -> Result<Self, serde_yml::Error> {
        let definitions: Vec<Definition> = serde_yml::from_str(text)?;
        Ok(Self {
            name: name.to_string(),
            definitions,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Enum(e) => Some(e),
            _ => None,
        })
    }

    pub fn bitfields(&self) -> impl Iterator<Item = &BitfieldDef> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Bitfield(b) => Some(b),
            _ => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDef> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Struct(s) => Some(s),
            _ => None,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Definition {
    Enum(EnumDef),
    Bitfield(BitfieldDef),
    Struct(StructDef),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Enum(e) => &e.name,
            Definition::Bitfield(b) => &b.name,
            Definition::Struct(s) => &s.name,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct EnumDef {
    pub name: String,
    pub options: Vec<OptionRecord>,
    /// Storage width in bits. Defaults to 16.
    #[serde(default)]
    pub width: Option<u8>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct BitfieldDef {
    pub name: String,
    pub width: u8,
    pub fields: Vec<OptionRecord>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An enum option or bitfield flag, either a bare name or a detailed record.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum OptionRecord {
    Name(String),
    Detailed(OptionDetail),
}

impl OptionRecord {
    pub fn detail(&self) -> OptionDetail {
        match self {
            OptionRecord::Name(name) => OptionDetail {
                name: name.clone(),
                ..Default::default()
            },
            OptionRecord::Detailed(detail) => detail.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct OptionDetail {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub cache_only: bool,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct StructDef {
    pub name: String,
    #[serde(default)]
    pub inherits: Option<String>,
    pub fields: Vec<FieldDef>,
    /// Declared byte size of the fixed layout, inherited fields included.
    pub size: usize,
    /// Name of the field used as a human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub minimum: Option<u32>,
    #[serde(default)]
    pub maximum: Option<u32>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    Little,
    Big,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum DefaultValue {
    Single(f64),
    Multiple(Vec<f64>),
}

impl DefaultValue {
    pub fn values(&self) -> Vec<f64> {
        match self {
            DefaultValue::Single(v) => vec![*v],
            DefaultValue::Multiple(v) => v.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct FieldDef {
    /// Absent for padding.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: String,
    /// Byte count of a `pad` field.
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub bounds: bool,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub hek_maximum: Option<u32>,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub default_sign: bool,
    #[serde(default)]
    pub endian: Option<Endian>,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Element struct of a reflexive, or the owning struct of an index target.
    #[serde(default, rename = "struct")]
    pub struct_name: Option<String>,
    /// Display name of the reflexive an index field points into.
    #[serde(default)]
    pub reflexive: Option<String>,
    #[serde(default)]
    pub non_null: bool,
    #[serde(default)]
    pub cache_only: bool,
    #[serde(default)]
    pub unused: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: Option<bool>,
    #[serde(default)]
    pub volatile: bool,
    #[serde(default)]
    pub normalize: bool,
    #[serde(default)]
    pub shifted_by_one: bool,
    #[serde(default)]
    pub file_offset: bool,
    #[serde(default)]
    pub external_file_offset: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl FieldDef {
    pub fn is_padding(&self) -> bool {
        self.field_type == "pad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_json_group() {
        let text = r#"[
            {"name": "WeaponType", "type": "enum", "options": ["rifle", {"name": "unused", "excluded": true}]},
            {"name": "WeaponFlags", "type": "bitfield", "width": 16, "fields": ["a", {"name": "b", "cache_only": true}]},
            {"name": "Weapon", "type": "struct", "size": 20, "fields": [
                {"name": "kind", "type": "WeaponType"},
                {"type": "pad", "size": 2},
                {"name": "scale", "type": "float", "default": 1.0},
                {"name": "spread", "type": "float", "bounds": true, "default": [0.5, 1.5]},
                {"name": "owner", "type": "Index", "struct": "Weapon", "reflexive": "triggers"}
            ]}
        ]"#;
        let group = DefinitionGroup::from_json_str("weapon", text).unwrap();
        assert_eq!(group.enums().count(), 1);
        assert_eq!(group.bitfields().count(), 1);

        let weapon = group.structs().next().unwrap();
        assert!(weapon.fields[1].is_padding());
        assert_eq!(weapon.fields[2].default, Some(DefaultValue::Single(1.0)));
        assert_eq!(weapon.fields[3].default.as_ref().unwrap().values(), vec![0.5, 1.5]);
        assert_eq!(weapon.fields[4].struct_name.as_deref(), Some("Weapon"));

        let flags = group.bitfields().next().unwrap();
        assert!(flags.fields[1].detail().cache_only);
        assert!(!flags.fields[0].detail().cache_only);
    }

    #[test]
    fn parses_yaml_group() {
        let text = "
- name: Light
  type: struct
  size: 4
  fields:
    - name: radius
      type: float
      minimum: 0.0
";
        let group = DefinitionGroup::from_yaml_str("light", text).unwrap();
        let light = group.structs().next().unwrap();
        assert_eq!(light.fields[0].minimum, Some(0.0));
        assert_eq!(group.definitions[0].name(), "Light");
    }
}
