//! The render pipeline: turns a request plus external assets into one image.

use crate::compositor::fit::{cover_fit, Resample};
use crate::compositor::paint::PixelBuffer;
use crate::compositor::progress::{
    CancellationToken, ProgressCallback, ProgressTracker, RenderProgress, RenderStats, SkipReason,
};
use crate::compositor::request::CompositeRequest;
use crate::core::context::{ExternalAssets, RenderContext};
use crate::core::error::{RenderError, RenderResult};
use crate::core::layer::LayerSource;
use crate::core::params::EffectParams;
use crate::core::types::merge_parameters;
use crate::filters::registry::{RegistryEntry, SharedRegistry};
use image::DynamicImage;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Render options.
#[derive(Clone)]
pub struct RenderOptions {
    /// Paint pixels across the rayon pool.
    pub parallel: bool,
    /// Filter used when cover-fitting images to the target size.
    pub resample: Resample,
    /// Progress callback.
    pub progress: Option<ProgressCallback>,
    /// Checked before every effect and layer.
    pub cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("parallel", &self.parallel)
            .field("resample", &self.resample)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            resample: Resample::default(),
            progress: None,
            cancel: None,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable parallel painting.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_resample(mut self, resample: Resample) -> Self {
        self.resample = resample;
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(RenderProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|t| t.is_cancelled()).unwrap_or(false)
    }
}

/// Result of a render call.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Composited image at exactly the requested size.
    pub image: DynamicImage,
    pub stats: RenderStats,
}

/// Stateless compositor over a shared catalog.
///
/// Concurrent renders of distinct requests are safe; the registry lock is only
/// held while resolving ids, never while painting.
#[derive(Debug, Clone)]
pub struct Compositor {
    registry: SharedRegistry,
    default_options: RenderOptions,
}

impl Compositor {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            default_options: RenderOptions::default(),
        }
    }

    /// Set default options.
    pub fn with_default_options(mut self, options: RenderOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Render with the default options.
    pub fn render(
        &self,
        request: &CompositeRequest,
        assets: &ExternalAssets,
    ) -> RenderResult<RenderOutput> {
        self.render_with(request, assets, &self.default_options)
    }

    /// Render a request.
    ///
    /// With no active effects the output is the cover-fit source. Otherwise
    /// the cover-fit source is the bottom of the stack and each effect's
    /// layers are painted over it in order. Stale ids and effects missing
    /// their asset are skipped; only invalid input or cancellation fails
    /// the call.
    pub fn render_with(
        &self,
        request: &CompositeRequest,
        assets: &ExternalAssets,
        options: &RenderOptions,
    ) -> RenderResult<RenderOutput> {
        let (width, height) = (request.width(), request.height());
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let source = request.source();
        if source.width() == 0 || source.height() == 0 {
            return Err(RenderError::EmptySource);
        }

        let mut tracker = ProgressTracker::start(request.len(), options.progress.clone());
        if options.is_cancelled() {
            tracker.cancelled();
            return Err(RenderError::Cancelled);
        }

        let base = cover_fit(source, width, height, options.resample);
        if request.is_empty() {
            let stats = tracker.complete();
            debug!("Rendered empty stack at {}x{}", width, height);
            return Ok(RenderOutput { image: base, stats });
        }

        let entries: Vec<Option<RegistryEntry>> = {
            let registry = self.registry.read();
            request
                .instances()
                .iter()
                .map(|i| registry.get_entry(&i.id).cloned())
                .collect()
        };

        let primary = PixelBuffer::from_image(&base);
        let mut accum = primary.clone();
        let mut fitted_assets: HashMap<String, PixelBuffer> = HashMap::new();
        let mut base_assigned = false;

        for (index, (instance, entry)) in request.instances().iter().zip(entries).enumerate() {
            if options.is_cancelled() {
                tracker.cancelled();
                return Err(RenderError::Cancelled);
            }

            let Some(entry) = entry else {
                warn!("Skipping '{}': no such effect is registered", instance.id);
                tracker.effect_skipped(&instance.id, SkipReason::UnknownEffect);
                continue;
            };
            let descriptor = &entry.descriptor;
            let params = merge_parameters(&descriptor.default_parameters, &instance.parameters);
            if descriptor.requires_external_asset {
                let typed = EffectParams::resolve(descriptor.category, &params);
                let key = typed.asset_key(&instance.id).unwrap_or(instance.id.as_str());
                if !assets.contains(key) {
                    debug!("Skipping '{}': asset '{}' not supplied", instance.id, key);
                    tracker.effect_skipped(&instance.id, SkipReason::MissingAsset);
                    continue;
                }
            }

            tracker.effect_started(&instance.id, index);
            let started = Instant::now();
            let is_base_layer = !base_assigned;
            base_assigned = true;

            let ctx = RenderContext::new(
                &instance.id,
                descriptor.category,
                width,
                height,
                is_base_layer,
                &params,
                assets,
            );
            let layers = entry.effect.render(&ctx);
            if layers.is_empty() && descriptor.requires_external_asset {
                tracker.effect_skipped(&instance.id, SkipReason::MissingAsset);
                continue;
            }

            let mut painted = 0;
            for layer in &layers {
                if options.is_cancelled() {
                    tracker.cancelled();
                    return Err(RenderError::Cancelled);
                }
                if !layer.is_visible() {
                    continue;
                }

                let sample = match &layer.source {
                    LayerSource::Primary => &primary,
                    LayerSource::External(key) => {
                        if !fitted_assets.contains_key(key) {
                            let Some(image) = assets.get(key) else {
                                debug!("'{}': asset '{}' not supplied, layer dropped", instance.id, key);
                                continue;
                            };
                            let fitted = cover_fit(image, width, height, options.resample);
                            fitted_assets.insert(key.clone(), PixelBuffer::from_image(&fitted));
                        }
                        match fitted_assets.get(key) {
                            Some(buffer) => buffer,
                            None => continue,
                        }
                    }
                };

                accum.paint(sample, layer, options.parallel);
                painted += 1;
            }

            tracker.effect_completed(&instance.id, painted, started.elapsed());
        }

        let stats = tracker.complete();
        debug!(
            "Rendered {} effect(s), {} layer(s) at {}x{} in {:?}",
            stats.effects_rendered, stats.layers_painted, width, height, stats.duration
        );
        Ok(RenderOutput {
            image: accum.to_image(),
            stats,
        })
    }
}

/// Decode a source image from disk.
pub fn load_source(path: impl AsRef<Path>) -> RenderResult<DynamicImage> {
    let image = image::open(path.as_ref())?;
    if image.width() == 0 || image.height() == 0 {
        return Err(RenderError::EmptySource);
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blend::BlendMode;
    use crate::core::effect::{EffectCategory, EffectDescriptor, FnEffect};
    use crate::core::layer::Layer;
    use crate::core::matrix::ColorMatrix;
    use crate::core::params::{BLEND_MODE, INTENSITY, OPACITY};
    use crate::core::types::{ParameterMap, Value};
    use crate::filters::registry::EffectRegistry;
    use crate::state::store::EffectInstance;
    use image::{GenericImageView, Rgba, RgbaImage};
    use parking_lot::Mutex;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 37 % 256) as u8, (y * 53 % 256) as u8, 90, 255])
        }))
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([rgb[0], rgb[1], rgb[2], 255]),
        ))
    }

    fn instance(id: &str, order_index: usize) -> EffectInstance {
        EffectInstance {
            id: id.to_string(),
            enabled: true,
            order_index,
            parameters: ParameterMap::new(),
        }
    }

    fn flat_effect(id: &str, rgb: [f32; 3], opacity: f32) -> FnEffect {
        let descriptor = EffectDescriptor::builder(id, id).build();
        FnEffect::new(descriptor, move |_| {
            vec![Layer::primary(ColorMatrix::flat(rgb), BlendMode::Normal, opacity)]
        })
    }

    fn compositor(effects: Vec<FnEffect>) -> Compositor {
        let mut registry = EffectRegistry::new();
        for effect in effects {
            registry.register(effect).unwrap();
        }
        Compositor::new(registry.into_shared())
    }

    #[test]
    fn test_empty_stack_is_cover_fit_source() {
        let compositor = compositor(Vec::new());
        let source = gradient(6, 4);

        let request = CompositeRequest::passthrough(source.clone(), 6, 4);
        let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
        assert_eq!(output.image.as_bytes(), source.as_bytes());

        let request = CompositeRequest::passthrough(source.clone(), 3, 3);
        let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
        assert_eq!(output.image.dimensions(), (3, 3));
        let expected = cover_fit(&source, 3, 3, Resample::default());
        assert_eq!(output.image.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn test_normal_full_opacity_replaces() {
        let compositor = compositor(vec![flat_effect("red", [1.0, 0.0, 0.0], 1.0)]);
        let request = CompositeRequest::new(gradient(5, 5), 5, 5, vec![instance("red", 0)]);

        let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
        assert!(output.image.pixels().all(|(_, _, p)| p == Rgba([255, 0, 0, 255])));
        assert_eq!(output.stats.layers_painted, 1);
    }

    #[test]
    fn test_order_is_significant() {
        let compositor = compositor(vec![
            flat_effect("red", [1.0, 0.0, 0.0], 1.0),
            flat_effect("blue", [0.0, 0.0, 1.0], 1.0),
        ]);
        let source = gradient(2, 2);

        let red_then_blue =
            CompositeRequest::new(source.clone(), 2, 2, vec![instance("red", 0), instance("blue", 1)]);
        let blue_then_red =
            CompositeRequest::new(source, 2, 2, vec![instance("red", 1), instance("blue", 0)]);

        let a = compositor.render(&red_then_blue, &ExternalAssets::new()).unwrap();
        let b = compositor.render(&blue_then_red, &ExternalAssets::new()).unwrap();
        assert_eq!(a.image.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(b.image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_stale_instance_skipped() {
        let compositor = compositor(vec![flat_effect("red", [1.0, 0.0, 0.0], 1.0)]);
        let request = CompositeRequest::new(
            gradient(3, 3),
            3,
            3,
            vec![instance("ghost", 0), instance("red", 1)],
        );

        let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
        assert_eq!(output.stats.effects_skipped, 1);
        assert_eq!(output.stats.effects_rendered, 1);
        assert_eq!(output.image.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_base_layer_flag_only_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EffectRegistry::new();
        for id in ["a", "b", "c"] {
            let seen = seen.clone();
            let descriptor = EffectDescriptor::builder(id, id).build();
            registry
                .register(FnEffect::new(descriptor, move |ctx| {
                    seen.lock().push((ctx.effect_id.to_string(), ctx.is_base_layer));
                    Vec::new()
                }))
                .unwrap();
        }
        let compositor = Compositor::new(registry.into_shared());
        let request = CompositeRequest::new(
            gradient(2, 2),
            2,
            2,
            vec![instance("c", 0), instance("a", 1), instance("b", 2)],
        );

        compositor.render(&request, &ExternalAssets::new()).unwrap();
        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![
                ("c".to_string(), true),
                ("a".to_string(), false),
                ("b".to_string(), false)
            ]
        );
    }

    #[test]
    fn test_missing_asset_is_noop() {
        let compositor = Compositor::new(EffectRegistry::with_builtins().into_shared());
        let source = gradient(4, 4);
        let request = CompositeRequest::new(source.clone(), 4, 4, vec![instance("overlay_blend", 0)]);

        let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
        assert_eq!(output.image.as_bytes(), source.as_bytes());
        assert_eq!(output.stats.effects_skipped, 1);
    }

    #[test]
    fn test_missing_asset_keeps_base_flag_for_next_effect() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut registry = EffectRegistry::with_builtins();
        let descriptor = EffectDescriptor::builder("after", "After").build();
        registry
            .register(FnEffect::new(descriptor, move |ctx| {
                sink.lock().push(ctx.is_base_layer);
                Vec::new()
            }))
            .unwrap();
        let compositor = Compositor::new(registry.into_shared());
        let request = CompositeRequest::new(
            gradient(4, 4),
            4,
            4,
            vec![instance("overlay_blend", 0), instance("after", 1)],
        );
        let assets = ExternalAssets::new().with("paper_texture", solid(2, 2, [10, 20, 30]));

        let output = compositor.render(&request, &assets).unwrap();
        assert_eq!(output.stats.effects_skipped, 1);
        assert_eq!(*seen.lock(), vec![true]);
    }

    #[test]
    fn test_overlay_asset_painted() {
        let compositor = Compositor::new(EffectRegistry::with_builtins().into_shared());
        let mut overlay = instance("overlay_blend", 0);
        overlay.parameters.insert(BLEND_MODE.into(), Value::from("normal"));
        overlay.parameters.insert(OPACITY.into(), Value::Float(1.0));
        let request = CompositeRequest::new(gradient(4, 4), 4, 4, vec![overlay]);
        let assets = ExternalAssets::new().with("overlay_blend", solid(2, 2, [0, 0, 255]));
        let options = RenderOptions::new().with_resample(Resample::Nearest);

        let output = compositor.render_with(&request, &assets, &options).unwrap();
        assert!(output.image.pixels().all(|(_, _, p)| p == Rgba([0, 0, 255, 255])));
    }

    fn translucent_gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 37 % 256) as u8, (y * 53 % 256) as u8, 90, (30 + x * 20 + y * 10) as u8])
        }))
    }

    #[test]
    fn test_builtins_at_zero_intensity_leave_source() {
        let registry = EffectRegistry::with_builtins();
        let instances: Vec<EffectInstance> = registry
            .default_order()
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let mut inst = instance(id, index);
                inst.parameters.insert(INTENSITY.into(), Value::Float(0.0));
                inst
            })
            .collect();
        let compositor = Compositor::new(registry.into_shared());

        for source in [gradient(8, 6), translucent_gradient(8, 6)] {
            let request = CompositeRequest::new(source.clone(), 8, 6, instances.clone());
            let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
            assert_eq!(output.image.as_bytes(), source.as_bytes());
        }
    }

    #[test]
    fn test_zero_intensity_keeps_half_transparent_pixels() {
        let compositor = Compositor::new(EffectRegistry::with_builtins().into_shared());
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([100, 150, 200, 128])));
        let mut sepia = instance("sepia", 0);
        sepia.parameters.insert(INTENSITY.into(), Value::Float(0.0));
        let request = CompositeRequest::new(source, 4, 4, vec![sepia]);

        let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
        assert_eq!(output.stats.effects_rendered, 1);
        assert!(output
            .image
            .pixels()
            .all(|(_, _, p)| p == Rgba([100, 150, 200, 128])));
    }

    #[test]
    fn test_invalid_dimensions() {
        let compositor = compositor(Vec::new());
        let request = CompositeRequest::passthrough(gradient(2, 2), 0, 10);
        let err = compositor.render(&request, &ExternalAssets::new()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDimensions { width: 0, height: 10 }));
    }

    #[test]
    fn test_empty_source() {
        let compositor = compositor(Vec::new());
        let request = CompositeRequest::passthrough(DynamicImage::new_rgba8(0, 0), 4, 4);
        let err = compositor.render(&request, &ExternalAssets::new()).unwrap_err();
        assert!(matches!(err, RenderError::EmptySource));
    }

    #[test]
    fn test_cancelled_render() {
        let compositor = compositor(vec![flat_effect("red", [1.0, 0.0, 0.0], 1.0)]);
        let request = CompositeRequest::new(gradient(2, 2), 2, 2, vec![instance("red", 0)]);
        let token = CancellationToken::new();
        token.cancel();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let options = RenderOptions::new()
            .with_cancellation(token)
            .with_progress(move |e| sink.lock().push(e));

        let err = compositor
            .render_with(&request, &ExternalAssets::new(), &options)
            .unwrap_err();
        assert!(matches!(err, RenderError::Cancelled));
        assert!(err.is_recoverable());
        assert_eq!(events.lock().last(), Some(&RenderProgress::Cancelled));
    }

    #[test]
    fn test_category_passed_to_context() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let descriptor = EffectDescriptor::builder("x", "X")
            .category(EffectCategory::Artistic)
            .build();
        let mut registry = EffectRegistry::new();
        registry
            .register(FnEffect::new(descriptor, move |ctx| {
                *sink.lock() = Some((ctx.category, ctx.width, ctx.height));
                Vec::new()
            }))
            .unwrap();
        let compositor = Compositor::new(registry.into_shared());
        let request = CompositeRequest::new(gradient(4, 4), 3, 2, vec![instance("x", 0)]);

        let output = compositor.render(&request, &ExternalAssets::new()).unwrap();
        assert_eq!(output.image.dimensions(), (3, 2));
        assert_eq!(*seen.lock(), Some((EffectCategory::Artistic, 3, 2)));
    }

    #[test]
    fn test_load_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_source(dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }
}
