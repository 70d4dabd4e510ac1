//! Persona synthesis: prompt building, LLM call, normalization and persistence.
//! All LLM calls go through llm_client.

pub mod builder;
pub mod generator;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod storage;
