// src/extractors/mod.rs
pub mod entities;
pub mod header;
pub mod tables;
