//! Render pipeline.
//!
//! A [`CompositeRequest`] snapshot plus caller-supplied [`ExternalAssets`](crate::core::ExternalAssets)
//! goes in, one composited image comes out. The compositor owns no state
//! between calls.

pub mod fit;
pub mod paint;
pub mod pipeline;
pub mod progress;
pub mod request;

pub use fit::{cover_fit, Resample};
pub use paint::PixelBuffer;
pub use pipeline::{load_source, Compositor, RenderOptions, RenderOutput};
pub use progress::{CancellationToken, ProgressCallback, RenderProgress, RenderStats, SkipReason};
pub use request::CompositeRequest;
