//! Diesel row types mirroring the `categorias` and `produtos` tables.

pub mod category;
pub mod product;
