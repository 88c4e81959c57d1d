use crate::config::GridConfig;
use serde::{Deserialize, Serialize};

/// World-space position. Only the X/Z plane maps onto the grid; Y is height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Integer cell coordinate. May lie outside the grid; check with
/// [`CoordinateMapper::contains`] before indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

impl GridCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Euclidean distance in cell units.
    pub fn distance(self, other: GridCoord) -> f32 {
        let dc = (self.col as f64) - (other.col as f64);
        let dr = (self.row as f64) - (other.row as f64);
        (dc * dc + dr * dr).sqrt() as f32
    }
}

/// Pure conversions between world space and grid space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    origin_offset: f64,
    resolution: f64,
    dimension: u32,
}

impl CoordinateMapper {
    /// Expects a validated config.
    pub fn new(config: &GridConfig) -> Self {
        Self {
            origin_offset: config.terrain_origin_offset as f64,
            resolution: config.terrain_resolution as f64,
            dimension: config.dimension,
        }
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// World units per cell edge.
    pub fn cell_size(&self) -> f64 {
        self.resolution / self.dimension as f64
    }

    /// Floor semantics: a point on a cell boundary belongs to the higher cell.
    pub fn world_to_grid(&self, position: Vec3) -> GridCoord {
        GridCoord {
            col: self.axis_to_grid(position.x),
            row: self.axis_to_grid(position.z),
        }
    }

    /// Centre of the cell in world space, at height 0.
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec3 {
        let cell = self.cell_size();
        Vec3 {
            x: ((coord.col as f64 + 0.5) * cell - self.origin_offset) as f32,
            y: 0.0,
            z: ((coord.row as f64 + 0.5) * cell - self.origin_offset) as f32,
        }
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        let dim = self.dimension as i64;
        (0..dim).contains(&(coord.col as i64)) && (0..dim).contains(&(coord.row as i64))
    }

    /// Row-major index of an in-bounds cell.
    pub fn index(&self, coord: GridCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.row as usize * self.dimension as usize + coord.col as usize)
    }

    pub fn coord_of(&self, index: usize) -> GridCoord {
        let dim = self.dimension as usize;
        GridCoord {
            col: (index % dim) as i32,
            row: (index / dim) as i32,
        }
    }

    fn axis_to_grid(&self, value: f32) -> i32 {
        // Multiply before dividing so whole-cell positions land exactly on their cell.
        let scaled = (value as f64 + self.origin_offset) * self.dimension as f64 / self.resolution;
        if scaled.is_nan() {
            return i32::MIN;
        }
        // Saturating cast; far-away positions stay far outside the grid.
        scaled.floor() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(offset: f32, resolution: f32, dimension: u32) -> CoordinateMapper {
        CoordinateMapper::new(&GridConfig {
            terrain_origin_offset: offset,
            terrain_resolution: resolution,
            dimension,
            default_stamp_radius: 1,
        })
    }

    #[test]
    fn unit_cells_map_to_their_integer_coordinate() {
        let m = mapper(0.0, 9.0, 9);
        assert_eq!(m.world_to_grid(Vec3::new(4.0, 0.0, 4.0)), GridCoord::new(4, 4));
        assert_eq!(m.world_to_grid(Vec3::new(4.99, 7.0, 0.2)), GridCoord::new(4, 0));
        for i in 0..9 {
            let p = Vec3::new(i as f32, 0.0, i as f32);
            assert_eq!(m.world_to_grid(p), GridCoord::new(i, i));
        }
    }

    #[test]
    fn floor_not_round_for_negative_positions() {
        let m = mapper(0.0, 10.0, 10);
        assert_eq!(m.world_to_grid(Vec3::new(-0.1, 0.0, 0.0)), GridCoord::new(-1, 0));
        assert_eq!(m.world_to_grid(Vec3::new(0.6, 0.0, 9.6)), GridCoord::new(0, 9));
    }

    #[test]
    fn origin_offset_shifts_terrain() {
        let m = mapper(50.0, 100.0, 10);
        assert_eq!(m.world_to_grid(Vec3::new(-50.0, 0.0, -50.0)), GridCoord::new(0, 0));
        assert_eq!(m.world_to_grid(Vec3::new(0.0, 0.0, 0.0)), GridCoord::new(5, 5));
        assert_eq!(m.world_to_grid(Vec3::new(49.9, 0.0, 60.0)), GridCoord::new(9, 11));
    }

    #[test]
    fn grid_to_world_returns_cell_centres() {
        let m = mapper(50.0, 100.0, 10);
        let p = m.grid_to_world(GridCoord::new(0, 9));
        assert_eq!(p, Vec3::new(-45.0, 0.0, 45.0));
        for col in 0..10 {
            for row in 0..10 {
                let c = GridCoord::new(col, row);
                assert_eq!(m.world_to_grid(m.grid_to_world(c)), c);
            }
        }
    }

    #[test]
    fn non_finite_positions_stay_out_of_bounds() {
        let m = mapper(0.0, 10.0, 10);
        assert!(!m.contains(m.world_to_grid(Vec3::new(f32::NAN, 0.0, 1.0))));
        assert!(!m.contains(m.world_to_grid(Vec3::new(f32::INFINITY, 0.0, 1.0))));
        assert!(!m.contains(m.world_to_grid(Vec3::new(1.0, 0.0, f32::NEG_INFINITY))));
    }

    #[test]
    fn index_is_row_major_and_bounds_checked() {
        let m = mapper(0.0, 4.0, 4);
        assert_eq!(m.index(GridCoord::new(1, 2)), Some(9));
        assert_eq!(m.coord_of(9), GridCoord::new(1, 2));
        assert_eq!(m.index(GridCoord::new(4, 0)), None);
        assert_eq!(m.index(GridCoord::new(0, -1)), None);
    }

    #[test]
    fn distance_is_euclidean_in_cells() {
        let a = GridCoord::new(0, 0);
        assert_eq!(a.distance(GridCoord::new(3, 4)), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }
}
