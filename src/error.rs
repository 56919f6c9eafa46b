use thiserror::Error;

/// Failures surfaced by the border engine and the scene loaders.
///
/// All of these are local: a failed pass leaves the overlay untouched and the
/// engine usable for the next pass.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("overlay surface is not present in the host scene")]
    MissingOverlay,

    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene: {0}")]
    SceneParse(#[from] serde_json::Error),

    #[error("failed to parse palette: {0}")]
    PaletteParse(#[from] toml::de::Error),
}
