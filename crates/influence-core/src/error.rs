use crate::tactics::AgentId;
use thiserror::Error;

/// Rejected response-curve configuration. Raised at construction, never at evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("response curve needs at least one control point")]
    Empty,
    #[error("control point {index} is not finite")]
    NonFinite { index: usize },
    #[error("control point {index} ({input}, {output}) lies outside [0, 1]")]
    OutOfRange {
        index: usize,
        input: f32,
        output: f32,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("dimension must be in 1..={max}, got {actual}")]
    InvalidDimension { max: u32, actual: u32 },
    #[error("terrain_resolution must be finite and > 0, got {0}")]
    InvalidResolution(f32),
    #[error("terrain_origin_offset must be finite, got {0}")]
    InvalidOffset(f32),
    #[error("stamp radius ({actual}) exceeds supported maximum ({max})")]
    RadiusTooLarge { max: u32, actual: u32 },
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lifecycle violations on a single agent's section. A rejected call leaves the grid untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("section was retired and cannot be stamped or retracted again")]
    SectionRetired,
    #[error("section capacity ({capacity}) is smaller than the window ({required} cells)")]
    SectionTooSmall { capacity: usize, required: usize },
    #[error("stamp radius ({actual}) exceeds supported maximum ({max})")]
    RadiusTooLarge { max: u32, actual: u32 },
    #[error("section holds a stamp from a different grid")]
    ForeignSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TacticsError {
    #[error("no live agent with id {0}")]
    UnknownAgent(AgentId),
    #[error("agent id space exhausted")]
    AgentIdsExhausted,
    #[error(transparent)]
    Grid(#[from] GridError),
}
