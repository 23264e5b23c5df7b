use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slideshow_compositor::{
    audio::AudioLoader,
    config::Config,
    effects::EffectSelection,
    video::{is_supported_image, ResizePolicy},
    SlideshowEngine,
};

const MIN_IMAGES: usize = 5;
const MAX_IMAGES: usize = 10;

#[derive(Parser)]
#[command(
    name = "slideshow-compositor",
    version,
    about = "Turn a handful of photos and a song into a short slideshow video",
    long_about = "Slideshow-Compositor fits 5 to 10 photos to a common resolution, gives each one a visual effect, joins them with crossfades, slides and wipes, and encodes the result with an optional soundtrack to MP4 plus a JPEG thumbnail."
)]
struct Cli {
    /// Photos in display order (JPG, JPEG, PNG)
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Audio file path (MP3, WAV)
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Output video file path
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for effect and transition selection
    #[arg(long)]
    seed: Option<u64>,

    /// Pick effects by photo position instead of at random
    #[arg(long)]
    deterministic: bool,

    /// How photos are fitted to the frame (pad, fit)
    #[arg(long)]
    resize: Option<ResizePolicy>,

    /// Seconds each photo stays on screen
    #[arg(long)]
    duration: Option<f64>,

    /// Transition length in seconds
    #[arg(long)]
    transition: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Input checks that belong to the caller rather than the pipeline
    fn validate_inputs(&self) -> Result<()> {
        if !(MIN_IMAGES..=MAX_IMAGES).contains(&self.images.len()) {
            bail!(
                "Please provide between {} and {} photos (got {})",
                MIN_IMAGES,
                MAX_IMAGES,
                self.images.len()
            );
        }

        if let Some(bad) = self.images.iter().find(|p| !is_supported_image(p)) {
            bail!("Unsupported photo {:?}: only JPG, JPEG and PNG are accepted", bad);
        }

        if let Some(audio) = &self.audio {
            let supported = AudioLoader::detect_format(audio)
                .map(|ext| AudioLoader::is_format_supported(&ext))
                .unwrap_or(false);
            if !supported {
                bail!("Unsupported audio {:?}: only MP3 and WAV are accepted", audio);
            }
        }

        Ok(())
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.effects.seed = Some(seed);
            config.transition.seed = Some(seed);
        }
        if self.deterministic {
            config.effects.selection = EffectSelection::ByIndex;
        }
        if let Some(policy) = self.resize {
            config.images.resize_policy = policy;
        }
        if let Some(duration) = self.duration {
            config.clip.duration_per_image = duration;
        }
        if let Some(transition) = self.transition {
            config.transition.duration = transition;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Slideshow-Compositor v{}", env!("CARGO_PKG_VERSION"));

    cli.validate_inputs()?;

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    cli.apply_overrides(&mut config);

    let engine = SlideshowEngine::new(config);
    let outcome = engine.run(&cli.images, cli.audio.as_deref(), &cli.output);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if let Some(result) = &outcome.result {
        println!("{}", outcome.message);
        println!("  Video:      {}", result.output_path.display());
        println!("  Duration:   {:.1}s", result.duration);
        println!("  Resolution: {}", result.resolution);
        println!("  Size:       {:.2} MB", result.size_mb);
        match &result.thumbnail_path {
            Some(path) => println!("  Thumbnail:  {}", path.display()),
            None => println!("  Thumbnail:  none"),
        }
    } else {
        eprintln!("{}", outcome.message);
    }

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
