//! Core types and definitions for the tower defense simulation.
//!
//! This crate defines the vocabulary shared by the engine and its
//! collaborators: entities, components, the tile map, configuration,
//! lifecycle events, render snapshots, and constants.
//! It owns no simulation state and runs no systems.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod map;
pub mod state;
pub mod types;
