// src/core/mod.rs

pub mod engine;
pub mod generator;
pub mod graph;
pub mod key;
pub mod tokenizer;
pub mod types;
pub mod vocab;
