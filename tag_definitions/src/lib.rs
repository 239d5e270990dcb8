//! Tag types generated from the schema files in `definitions/`.

include!(concat!(env!("OUT_DIR"), "/include.rs"));
