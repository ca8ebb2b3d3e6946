//! Structural validation of generated presets

mod schema;

pub use schema::SchemaValidator;
