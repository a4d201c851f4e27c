use thiserror::Error;

/// Fatal engine conditions. Per-item problems never show up here; they are
/// reported as unresolved lines or size gaps instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("catalog is empty; load canonical products before running the engine")]
    EmptyCatalog,
}
