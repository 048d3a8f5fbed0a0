//! Immutable render request snapshot.

use crate::state::store::EffectInstance;
use image::DynamicImage;
use std::sync::Arc;

/// Everything one render needs, frozen at construction.
///
/// Holds only enabled instances, sorted by ascending order index. Requests
/// are cheap to clone and safe to hand to another thread.
#[derive(Debug, Clone)]
pub struct CompositeRequest {
    source: Arc<DynamicImage>,
    width: u32,
    height: u32,
    instances: Vec<EffectInstance>,
}

impl CompositeRequest {
    /// Build a request, dropping disabled instances and sorting the rest.
    pub fn new(
        source: impl Into<Arc<DynamicImage>>,
        width: u32,
        height: u32,
        instances: impl IntoIterator<Item = EffectInstance>,
    ) -> Self {
        let mut instances: Vec<EffectInstance> =
            instances.into_iter().filter(|i| i.enabled).collect();
        instances.sort_by_key(|i| i.order_index);
        Self {
            source: source.into(),
            width,
            height,
            instances,
        }
    }

    /// A request with no effects; renders to the cover-fit source.
    pub fn passthrough(source: impl Into<Arc<DynamicImage>>, width: u32, height: u32) -> Self {
        Self::new(source, width, height, Vec::new())
    }

    pub fn source(&self) -> &Arc<DynamicImage> {
        &self.source
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Active instances in paint order.
    pub fn instances(&self) -> &[EffectInstance] {
        &self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}
