//! Shared otelconf types: component names, the collector build manifest,
//! and the registry of components compiled into the distribution.

#![warn(clippy::pedantic)]

pub mod component;
pub mod manifest;
pub mod registry;

pub use component::{ComponentCategory, ComponentName, RESERVED_QUALIFIER_PREFIX};
pub use manifest::{BuildManifest, ManifestError, ModuleEntry, TypeResolver};
pub use registry::{ComponentRegistry, ComponentSet};
