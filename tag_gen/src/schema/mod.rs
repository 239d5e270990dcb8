pub mod classify;
pub mod layout_graph;
pub mod loader;
pub mod names;
pub mod resolved;
pub mod superclass;

use layout_graph::LayoutGraphError;

/// Fatal schema errors. Each names the defining struct and field where one applies.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A schema file is not a valid list of definitions
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Two definitions share one name
    #[error("{0} is defined more than once")]
    Duplicate(String),

    /// An enum or bitfield does not fit its storage width
    #[error("{name} has {count} options which do not fit in {width} bits")]
    WidthOverflow { name: String, count: usize, width: u8 },

    /// Storage width other than 8, 16 or 32 bits
    #[error("{name} has an invalid width of {width} bits")]
    InvalidWidth { name: String, width: u8 },

    /// Default values would be hidden by packed-only recomputation
    #[error("{owner}::{field} has a default value but is cache only")]
    DefaultOnCacheOnly { owner: String, field: String },

    /// The field type is neither built in nor a declared enum, bitfield or struct
    #[error("{owner}::{field} has unknown type {type_name}")]
    UnknownType {
        owner: String,
        field: String,
        type_name: String,
    },

    /// A struct inherits from a struct that was never declared
    #[error("{owner} inherits from unknown struct {parent}")]
    UnknownParent { owner: String, parent: String },

    /// An array element struct was never declared
    #[error("{owner}::{field} references unknown struct {struct_name}")]
    UnknownStruct {
        owner: String,
        field: String,
        struct_name: String,
    },

    /// A literal dependency class is not in the tag class table
    #[error("{owner}::{field} allows unknown tag class {class}")]
    UnknownClass {
        owner: String,
        field: String,
        class: String,
    },

    /// An index field names an array that does not exist on the target struct
    #[error("{owner}::{field} indexes {target}::{reflexive} which is not an array")]
    UnresolvedIndex {
        owner: String,
        field: String,
        target: String,
        reflexive: String,
    },

    /// Any other contradictory or incomplete field record
    #[error("{owner}::{field} is invalid: {reason}")]
    InvalidField {
        owner: String,
        field: String,
        reason: String,
    },

    #[error(transparent)]
    Graph(#[from] LayoutGraphError),
}

impl SchemaError {
    pub fn invalid(owner: &str, field: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidField {
            owner: owner.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
