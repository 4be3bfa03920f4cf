// src/simulation/mod.rs
//! Instance simulation
//!
//! Spawned mesh instances, the append-only pool that holds them, and the
//! controller that creates them from spawn triggers.

pub mod instance;
pub mod pool;
pub mod spawn;

// Re-export main types
pub use instance::{rotation_matrix, scale_factor, Instance};
pub use pool::{InstancePool, DEFAULT_CAPACITY};
pub use spawn::{SeededSource, SpawnController, SpawnSource};
