//! Filter module.
//!
//! Contains the effect registry and the built-in effect library.

pub mod registry;
pub mod builtin;

pub use registry::{EffectRegistry, RegistryBuilder, RegistryEntry, SharedRegistry};
