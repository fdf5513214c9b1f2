//! Serializable shapes handed to the presentation layer.

pub mod categories;
pub mod products;
