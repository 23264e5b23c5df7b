// Renders every catalog effect for one photo, for eyeballing the catalog

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use slideshow_compositor::{
    effects::{EffectEngine, EffectName, EffectParams, EffectRegistry},
    video::{ImageNormalizer, ResizePolicy},
};

#[derive(Parser)]
#[command(name = "effect-preview", version, about = "Render every effect for one photo")]
struct Cli {
    /// Photo to preview
    image: PathBuf,

    /// Directory for the PNG previews
    #[arg(short, long, default_value = "effect_preview")]
    output: PathBuf,

    /// Preview width
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Preview height
    #[arg(long, default_value_t = 360)]
    height: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🎨 Previewing effects for {:?}", cli.image);

    let normalizer = ImageNormalizer::new((cli.width, cli.height), ResizePolicy::Pad, [0, 0, 0]);
    let normalized = normalizer.load_normalized(0, &cli.image)?;

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create {:?}", cli.output))?;

    let registry = EffectRegistry::new();
    let params = EffectParams::default();
    let engine = EffectEngine::new(&registry, &params);

    for name in EffectName::ALL {
        let started = std::time::Instant::now();
        match engine.apply_effect(&normalized.frame, name) {
            Ok(frame) => {
                let path = cli.output.join(format!("{}.png", name));
                frame
                    .save_png(&path)
                    .with_context(|| format!("failed to write {:?}", path))?;
                info!("{:<10} {:>6.1} ms -> {:?}", name, started.elapsed().as_secs_f64() * 1000.0, path);
            }
            Err(e) => warn!("{} failed: {}", name, e),
        }
    }

    println!("✅ Previews written to {:?}", cli.output);
    Ok(())
}
