//! Pokedex CLI Library
//!
//! This module exposes the cache, API client, and REPL pieces for use by the
//! binary and by integration tests.

pub mod app;
pub mod cache;
pub mod catch;
pub mod cli;
pub mod commands;
pub mod data;
pub mod pokedex;
pub mod repl;
