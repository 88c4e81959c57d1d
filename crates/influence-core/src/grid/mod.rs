mod maintenance;

use crate::config::GridConfig;
use crate::curve::ResponseCurve;
use crate::error::{ConfigError, GridError};
use crate::mapper::{CoordinateMapper, GridCoord, Vec3};
use crate::section::{window_cells, InfluenceContribution, InfluenceSection};
use crate::spatial::SpatialIndex;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

/// Fixed-point scale of the accumulators. Each contribution is quantized once, so
/// retraction subtracts exactly what was added and summation order never matters.
pub const UNITS_PER_INTENSITY: f64 = (1u64 << 24) as f64;

pub(crate) fn quantize(intensity: f32) -> i64 {
    (intensity as f64 * UNITS_PER_INTENSITY).round() as i64
}

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(1);

fn to_intensity(units: i64) -> f32 {
    (units as f64 / UNITS_PER_INTENSITY) as f32
}

/// Shared tactical influence grid.
///
/// Each cell holds the sum of every live agent's last applied contribution. Agents
/// keep that sum current by calling [`InfluenceGrid::update_agent_influence`] once per
/// tick and [`InfluenceGrid::retract`] when they despawn. A separate occupancy layer
/// marks the cell each agent stands on; it is not part of the intensity sum.
#[derive(Debug)]
pub struct InfluenceGrid {
    /// Process-unique; sections remember it so they are never applied elsewhere.
    id: u64,
    config: GridConfig,
    mapper: CoordinateMapper,
    curve: ResponseCurve,
    /// Row-major accumulators in fixed-point units.
    cells: Vec<i64>,
    /// Row-major count of agents whose centre cell is here.
    occupancy: Vec<u32>,
    index: OnceLock<SpatialIndex>,
}

impl InfluenceGrid {
    pub fn new(config: GridConfig, curve: ResponseCurve) -> Result<Self, ConfigError> {
        config.validate()?;
        let mapper = CoordinateMapper::new(&config);
        let cell_count = config.dimension as usize * config.dimension as usize;
        debug!(
            dimension = config.dimension,
            resolution = config.terrain_resolution,
            default_radius = config.default_stamp_radius,
            "influence grid created"
        );
        Ok(Self {
            id: NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed),
            config,
            mapper,
            curve,
            cells: vec![0; cell_count],
            occupancy: vec![0; cell_count],
            index: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn curve(&self) -> &ResponseCurve {
        &self.curve
    }

    pub fn dimension(&self) -> u32 {
        self.config.dimension
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Accumulated intensity, or `None` outside the grid.
    pub fn read_cell(&self, col: i32, row: i32) -> Option<f32> {
        self.mapper
            .index(GridCoord::new(col, row))
            .map(|i| to_intensity(self.cells[i]))
    }

    /// Number of agents standing on the cell; 0 outside the grid.
    pub fn occupancy(&self, col: i32, row: i32) -> u32 {
        self.mapper
            .index(GridCoord::new(col, row))
            .map_or(0, |i| self.occupancy[i])
    }

    pub fn is_occupied(&self, col: i32, row: i32) -> bool {
        self.occupancy(col, row) > 0
    }

    /// Row-major snapshot of every cell's intensity.
    pub fn intensities(&self) -> Vec<f32> {
        self.cells.iter().map(|&u| to_intensity(u)).collect()
    }

    pub(crate) fn intensity_at(&self, index: usize) -> f32 {
        to_intensity(self.cells[index])
    }

    pub(crate) fn occupancy_at(&self, index: usize) -> u32 {
        self.occupancy[index]
    }

    /// Read-only snapshot of the in-bounds cells of a window, row-major.
    pub fn query_window(&self, center: Vec3, radius: u32) -> Vec<InfluenceContribution> {
        let center = self.mapper.world_to_grid(center);
        let Some((cols, rows)) = self.clip_window(center, radius) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(cols.clone().count() * rows.clone().count());
        for row in rows {
            for col in cols.clone() {
                let i = row as usize * self.config.dimension as usize + col as usize;
                out.push(InfluenceContribution {
                    col,
                    row,
                    intensity: to_intensity(self.cells[i]),
                });
            }
        }
        out
    }

    /// Strongest cell in a window; ties go to the first cell in row-major order.
    pub fn hottest_in_window(&self, center: Vec3, radius: u32) -> Option<InfluenceContribution> {
        let center = self.mapper.world_to_grid(center);
        let (cols, rows) = self.clip_window(center, radius)?;
        let dim = self.config.dimension as usize;
        let mut best: Option<InfluenceContribution> = None;
        for row in rows {
            for col in cols.clone() {
                let intensity = to_intensity(self.cells[row as usize * dim + col as usize]);
                if !matches!(best, Some(b) if b.intensity >= intensity) {
                    best = Some(InfluenceContribution {
                        col,
                        row,
                        intensity,
                    });
                }
            }
        }
        best
    }

    /// Retract the section's previous stamp, then stamp a fresh window around `position`.
    ///
    /// Cells outside the grid are skipped, so an agent off the terrain contributes
    /// nothing. Rejected calls leave both the grid and the section untouched.
    pub fn update_agent_influence(
        &mut self,
        position: Vec3,
        section: &mut InfluenceSection,
        radius: u32,
    ) -> Result<(), GridError> {
        if section.is_retired() {
            return Err(GridError::SectionRetired);
        }
        self.check_owner(section)?;
        if radius > GridConfig::MAX_STAMP_RADIUS {
            return Err(GridError::RadiusTooLarge {
                max: GridConfig::MAX_STAMP_RADIUS,
                actual: radius,
            });
        }
        let required = window_cells(radius);
        if section.capacity() < required {
            return Err(GridError::SectionTooSmall {
                capacity: section.capacity(),
                required,
            });
        }

        self.retract_entries(section);

        let center = self.mapper.world_to_grid(position);
        section.begin_stamp();
        if let Some((cols, rows)) = self.clip_window(center, radius) {
            let dim = self.config.dimension as usize;
            for row in rows {
                for col in cols.clone() {
                    let intensity = self.falloff(center, GridCoord::new(col, row), radius);
                    self.cells[row as usize * dim + col as usize] += quantize(intensity);
                    section.push(InfluenceContribution {
                        col,
                        row,
                        intensity,
                    });
                }
            }
        }

        if let Some(i) = self.mapper.index(center) {
            self.occupancy[i] += 1;
            section.set_marker(Some(center));
        }
        section.bind(self.id);
        Ok(())
    }

    /// Stamp with the configured default radius.
    pub fn update_agent_influence_default(
        &mut self,
        position: Vec3,
        section: &mut InfluenceSection,
    ) -> Result<(), GridError> {
        self.update_agent_influence(position, section, self.config.default_stamp_radius)
    }

    /// Remove the section's last stamp for good (agent despawn).
    pub fn retract(&mut self, section: &mut InfluenceSection) -> Result<(), GridError> {
        if section.is_retired() {
            return Err(GridError::SectionRetired);
        }
        self.check_owner(section)?;
        self.retract_entries(section);
        section.retire();
        Ok(())
    }

    /// Snap an arbitrary point to the nearest cell centre. Builds the spatial index
    /// on first use.
    pub fn nearest_cell(&self, point: Vec3) -> Option<GridCoord> {
        self.spatial_index().nearest_cell(point)
    }

    /// Build the spatial index now instead of on the first query.
    pub fn warm_spatial_index(&self) {
        self.spatial_index();
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        self.index.get_or_init(|| {
            let start = Instant::now();
            let index = SpatialIndex::from_mapper(&self.mapper);
            debug!(
                cells = index.len(),
                build_us = start.elapsed().as_micros() as u64,
                "spatial index built"
            );
            index
        })
    }

    /// Whether the section is unstamped or was stamped by this grid.
    pub(crate) fn owns(&self, section: &InfluenceSection) -> bool {
        match section.owner() {
            Some(owner) => owner == self.id,
            None => true,
        }
    }

    fn check_owner(&self, section: &InfluenceSection) -> Result<(), GridError> {
        if self.owns(section) {
            Ok(())
        } else {
            Err(GridError::ForeignSection)
        }
    }

    fn retract_entries(&mut self, section: &InfluenceSection) {
        let dim = self.config.dimension as usize;
        for c in section.contributions() {
            self.cells[c.row as usize * dim + c.col as usize] -= quantize(c.intensity);
        }
        if let Some(i) = section.marker().and_then(|m| self.mapper.index(m)) {
            self.occupancy[i] = self.occupancy[i].saturating_sub(1);
        }
    }

    fn falloff(&self, center: GridCoord, cell: GridCoord, radius: u32) -> f32 {
        let normalized = if radius == 0 {
            1.0
        } else {
            1.0 - center.distance(cell) / radius as f32
        };
        self.curve.evaluate(normalized)
    }

    /// In-bounds column and row ranges of the window, or `None` if fully clipped.
    fn clip_window(
        &self,
        center: GridCoord,
        radius: u32,
    ) -> Option<(RangeInclusive<i32>, RangeInclusive<i32>)> {
        let max = self.config.dimension as i64 - 1;
        let r = radius as i64;
        let clip = |c: i32| {
            let lo = (c as i64 - r).max(0);
            let hi = (c as i64 + r).min(max);
            (lo <= hi).then(|| lo as i32..=hi as i32)
        };
        Some((clip(center.col)?, clip(center.row)?))
    }
}
