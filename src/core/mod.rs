//! Core classification engine module

pub mod client;
pub mod config;
pub mod errors;
pub mod form;
pub mod language;
pub mod models;
