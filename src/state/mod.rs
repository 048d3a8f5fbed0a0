//! Session filter state.
//!
//! Tracks which effects are enabled, their stack order and parameter overrides,
//! reconciled against the live [`EffectRegistry`](crate::filters::EffectRegistry).

pub mod settings;
pub mod store;

pub use settings::{FilterSettings, ImportSummary};
pub use store::{EffectInstance, FilterStateStore, InstanceView, SharedFilterState};
