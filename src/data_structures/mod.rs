//! Engine data structures: models, textures and instances.
//!
//! This module contains the core data types for scene representation:
//!
//! - `model` contains mesh, line and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation and attribute data

pub mod instance;
pub mod model;
pub mod texture;
