//! Filterstack CLI - Photo Filter Composition
//!
//! This is a demonstration CLI for the Filterstack library.

use anyhow::{bail, Context, Result};
use filterstack::prelude::*;
use image::DynamicImage;
use log::{info, warn};
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let program = args.first().map(String::as_str).unwrap_or("filterstack");
    let config = load_config(args)?;
    init_logging(&config);

    println!("🎨 Filterstack - Photo Filter Composition v{}", filterstack::VERSION);
    println!();

    if args.len() < 2 {
        print_usage(program);
        return Ok(());
    }

    match args[1].as_str() {
        "list" => list_effects(&config),
        "info" => {
            let Some(id) = args.get(2) else {
                bail!("Please specify an effect ID");
            };
            effect_info(&config, id)
        }
        "render" => {
            if args.len() < 4 {
                eprintln!("Usage: {} render <input> <output> [options]", program);
                bail!("Please specify input and output paths");
            }
            render_image(&config, &args[2], &args[3], &args[4..])
        }
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(())
        }
        other => {
            print_usage(program);
            bail!("Unknown command: {}", other)
        }
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                          List all available effects");
    println!("  info <effect>                 Show detailed info about an effect");
    println!("  render <in> <out> [options]   Render an image through the filter stack");
    println!("  help                          Show this help message");
    println!();
    println!("Render options:");
    println!("  --effects <a,b,...>        Enable exactly these effects, in this order");
    println!("  --set <id.key=value>       Override an effect parameter (repeatable)");
    println!("  --size <WxH>               Output size (default from config)");
    println!("  --settings <file.json>     Load saved filter settings");
    println!("  --save-settings <file>     Save the final filter settings");
    println!("  --overlay <image>          Image for the overlay blend effect");
    println!("  --config <file.toml>       Engine configuration");
}

/// `--config` may appear anywhere; it is read before anything else.
fn load_config(args: &[String]) -> Result<EngineConfig> {
    match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).context("--config needs a path")?;
            EngineConfig::load(path).with_context(|| format!("loading {}", path))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn init_logging(config: &EngineConfig) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    // A second init (e.g. from tests) is harmless.
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn list_effects(config: &EngineConfig) -> Result<()> {
    let registry = config.build_registry();
    let grouped = registry.grouped_by_category();

    println!("Available effects ({} total):", registry.len());
    println!();

    for (category, effects) in grouped {
        println!("  📁 {}", category);
        for descriptor in effects {
            let marker = if descriptor.default_enabled { " (on by default)" } else { "" };
            println!("      • {} - {}{}", descriptor.id, descriptor.description, marker);
        }
        println!();
    }
    Ok(())
}

fn effect_info(config: &EngineConfig, effect_id: &str) -> Result<()> {
    let registry = config.build_registry();
    let descriptor = registry
        .require(effect_id)
        .context("use 'list' to see available effects")?;

    println!("Effect: {}", descriptor.display_name);
    println!("ID: {}", descriptor.id);
    println!("Category: {}", descriptor.category);
    println!("Enabled by default: {}", descriptor.default_enabled);
    if descriptor.requires_external_asset {
        println!("Requires an external image (--overlay)");
    }
    if let Some(color) = &descriptor.color {
        println!("Color: {}", color.to_hex());
    }
    if !descriptor.tags.is_empty() {
        println!("Tags: {}", descriptor.tags.join(", "));
    }
    println!();
    println!("Description:");
    println!("  {}", descriptor.description);
    println!();

    if !descriptor.default_parameters.is_empty() {
        println!("Parameters:");
        for (name, value) in &descriptor.default_parameters {
            println!("  • {} [{}] = {}", name, value.type_name(), value);
        }
    }
    Ok(())
}

/// Options accepted after `render <input> <output>`.
#[derive(Debug, Default)]
struct RenderArgs<'a> {
    effects: Option<Vec<String>>,
    overrides: Vec<(String, String, Value)>,
    size: Option<(u32, u32)>,
    settings_path: Option<&'a str>,
    save_settings: Option<&'a str>,
    overlay: Option<&'a str>,
}

const VALUE_FLAGS: &[&str] = &[
    "--effects",
    "--set",
    "--size",
    "--settings",
    "--save-settings",
    "--overlay",
    "--config",
];

fn parse_render_args(args: &[String]) -> Result<RenderArgs<'_>> {
    let mut parsed = RenderArgs::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if !VALUE_FLAGS.contains(&flag) {
            eprintln!("Unknown option: {}", flag);
            i += 1;
            continue;
        }
        let Some(value) = args.get(i + 1) else {
            bail!("{} needs a value", flag);
        };
        match flag {
            "--effects" => {
                parsed.effects = Some(
                    value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                );
            }
            "--set" => parsed.overrides.push(parse_override(value)?),
            "--size" => {
                parsed.size = Some(
                    parse_dimensions(value).with_context(|| format!("invalid size '{}'", value))?,
                );
            }
            "--settings" => parsed.settings_path = Some(value.as_str()),
            "--save-settings" => parsed.save_settings = Some(value.as_str()),
            "--overlay" => parsed.overlay = Some(value.as_str()),
            // Read up front by `load_config`.
            _ => {}
        }
        i += 2;
    }
    Ok(parsed)
}

fn render_image(config: &EngineConfig, input: &str, output: &str, args: &[String]) -> Result<()> {
    let RenderArgs {
        effects,
        overrides,
        size,
        settings_path,
        save_settings,
        overlay,
    } = parse_render_args(args)?;

    let registry = config.build_registry().into_shared();
    let mut state = FilterStateStore::new(registry.clone());

    if let Some(path) = settings_path {
        let settings = FilterSettings::load(path)?;
        let summary = state.import_settings(&settings);
        for id in &summary.ignored {
            warn!("Settings mention unknown effect '{}'", id);
        }
    }

    if let Some(ids) = &effects {
        state.disable_all();
        for id in ids {
            if !state.set_enabled(id, true) {
                warn!("Unknown effect '{}' ignored", id);
            }
        }
        state.set_order(ids.as_slice());
    }

    for (id, key, value) in overrides {
        let mut partial = ParameterMap::new();
        partial.insert(key, value);
        if !state.set_parameters(&id, partial) {
            warn!("Unknown effect '{}' in --set ignored", id);
        }
    }

    let mut assets = ExternalAssets::new();
    if let Some(path) = overlay {
        let image = load_source(path).with_context(|| format!("loading overlay {}", path))?;
        assets.insert("overlay_blend", image);
        if effects.is_none() {
            state.set_enabled("overlay_blend", true);
        }
    }

    let source = load_source(input).with_context(|| format!("loading {}", input))?;
    let (width, height) = size.unwrap_or((config.render.default_width, config.render.default_height));

    println!("🧪 Stack: {}", state.summary());
    println!("⚙️  Rendering {} -> {} at {}x{}", input, output, width, height);

    let request = state.composite_request(source, width, height);
    let options = config.render.to_options().with_progress(|update| match update {
        RenderProgress::EffectStarted { effect_id, .. } => {
            println!("   • Applying: {}", effect_id);
        }
        RenderProgress::EffectSkipped { effect_id, reason } => {
            println!("   ⏭  Skipped {} ({:?})", effect_id, reason);
        }
        RenderProgress::Completed { total_duration_ms, effects_rendered, .. } => {
            println!("✅ Complete in {}ms ({} effects)", total_duration_ms, effects_rendered);
        }
        _ => {}
    });

    let rendered = Compositor::new(registry).render_with(&request, &assets, &options)?;
    save_output(&rendered.image, output)?;
    info!("Saved {} ({} layers painted)", output, rendered.stats.layers_painted);
    println!("🎉 Image saved to: {}", output);

    if let Some(path) = save_settings {
        state.export_settings().save(path)?;
        println!("💾 Settings saved to: {}", path);
    }
    Ok(())
}

/// Formats without an alpha channel get the image flattened to RGB.
fn save_output(image: &DynamicImage, path: &str) -> Result<()> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let result = match ext.as_deref() {
        Some("jpg") | Some("jpeg") => DynamicImage::ImageRgb8(image.to_rgb8()).save(path),
        _ => image.save(path),
    };
    result.with_context(|| format!("saving {}", path))
}

/// Parse `id.key=value`.
fn parse_override(s: &str) -> Result<(String, String, Value)> {
    let (target, raw) = s
        .split_once('=')
        .with_context(|| format!("expected id.key=value, got '{}'", s))?;
    let (id, key) = target
        .split_once('.')
        .with_context(|| format!("expected id.key=value, got '{}'", s))?;
    if id.is_empty() || key.is_empty() {
        bail!("expected id.key=value, got '{}'", s);
    }
    Ok((id.to_string(), key.to_string(), Value::parse_literal(raw)))
}

fn parse_dimensions(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once('x')?;
    let w = w.parse().ok()?;
    let h = h.parse().ok()?;
    Some((w, h))
}
