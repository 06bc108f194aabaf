// src/phosphosite/mod.rs
pub mod client;
pub mod models;
