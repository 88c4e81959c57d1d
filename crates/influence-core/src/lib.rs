//! Shared tactical influence grid for real-time game AI.
//!
//! Agents stamp a falloff-weighted footprint around their position every tick and
//! retract the previous one first, so the grid always equals the sum of the live
//! agents' latest stamps without ever being recomputed from scratch.

pub mod config;
pub mod curve;
pub mod error;
pub mod grid;
pub mod mapper;
pub mod section;
pub mod spatial;
pub mod tactics;
pub mod texture;

pub use config::{CurveConfig, GridConfig, InfluenceConfig, Interpolation};
pub use curve::ResponseCurve;
pub use error::{ConfigError, CurveError, GridError, TacticsError};
pub use grid::{InfluenceGrid, UNITS_PER_INTENSITY};
pub use mapper::{CoordinateMapper, GridCoord, Vec3};
pub use section::{window_cells, InfluenceContribution, InfluenceSection, SectionState};
pub use spatial::SpatialIndex;
pub use tactics::{AgentBinding, AgentId, TacticalLayer};
