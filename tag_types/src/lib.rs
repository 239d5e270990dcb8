//! Tag Schema Definitions
//!
//! This crate contains the schema records describing tag layouts (enums,
//! bitfields and structs) together with the static tag class table. It holds
//! pure data structures only; resolution and code generation live in `tag_gen`.

pub mod class;
pub mod types;

// Re-export commonly used types at the crate root
pub use class::*;
pub use types::*;
