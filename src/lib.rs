//! Core library for the catalog service.
//!
//! The `data` feature exposes the domain, pagination and persistence layers:
//! generic repositories over a [`repository::PersistenceContext`] and a
//! [`repository::UnitOfWork`] that commits staged changes atomically. The
//! `server` feature adds the service entry points, configuration loading and
//! access-token issuance.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod settings;
#[cfg(feature = "server")]
pub mod token;
