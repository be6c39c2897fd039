//! Movies and users catalog service
//!
//! Exposes both resources as a JSON CRUD API. Every write goes through a
//! [`pipeline::Pipeline`] that checks uniqueness, existence and payload
//! validity in a fixed order before touching the store, and every failure is
//! mapped to one [`error::ApiError`] variant with its own status code.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod repositories;
pub mod resource;
pub mod routes;
pub mod state;
pub mod validation;
