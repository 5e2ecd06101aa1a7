//! Shared bot state.

pub mod cache;

pub use cache::{Entity, EntityCache, EntityKey, EntityKind};
