use thiserror::Error;

/// Main error type for the Slideshow-Compositor library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Image decode error: {0}")]
    Image(#[from] ImageError),

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-image decode failures. The engine skips the image and carries on.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("Image {path} has zero width or height")]
    EmptyImage { path: String },
}

/// Effect failures. The engine falls back to the unmodified frame.
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Unknown effect: {name}")]
    UnknownEffect { name: String },

    #[error("Effect application failed: {effect} - {reason}")]
    ApplyFailed { effect: String, reason: String },
}

/// Audio failures. The engine renders a silent video instead.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Audio file contains no samples: {path}")]
    Empty { path: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },

    #[error("Failed to write audio track: {reason}")]
    WriteFailed { reason: String },
}

/// Timeline construction failures. Always fatal.
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("No usable clips: all {attempted} images failed to load")]
    NoClips { attempted: usize },

    #[error("Invalid composition parameters: {details}")]
    InvalidParameters { details: String },
}

/// Encoder failures. Always fatal.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("FFmpeg not found. Please install FFmpeg and make sure it is on PATH")]
    FfmpegUnavailable,

    #[error("Video encoding failed: {reason}")]
    Failed { reason: String },

    #[error("Invalid encode parameters: {details}")]
    InvalidParameters { details: String },
}

/// Thumbnail failures. The engine reports a null thumbnail instead.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to write thumbnail {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl CompositorError {
    /// Name of the pipeline stage that produced this error
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Image(_) => "image decoding",
            Self::Effect(_) => "effect application",
            Self::Audio(_) => "audio attachment",
            Self::Composition(_) => "composition",
            Self::Encode(_) => "encoding",
            Self::Thumbnail(_) => "thumbnail extraction",
            Self::Config(_) => "configuration",
            Self::Io(_) => "pipeline",
        }
    }

    /// Whether this error aborts the whole pipeline
    ///
    /// Decode, effect, audio and thumbnail failures only degrade the output.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Image(_) | Self::Effect(_) | Self::Audio(_) | Self::Thumbnail(_)
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Composition(CompositionError::NoClips { attempted }) => {
                format!("None of the {} photos could be read. Please upload JPG or PNG images.", attempted)
            }
            Self::Encode(EncodeError::FfmpegUnavailable) => {
                "Video creation failed: FFmpeg is not installed on the server.".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => format!("Video creation failed during {}: {}", self.stage(), self),
        }
    }
}
