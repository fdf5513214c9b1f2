//! Domain entities and value objects, free of persistence and transport
//! concerns.

pub mod auth;
pub mod category;
pub mod product;
pub mod types;
