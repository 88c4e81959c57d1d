use crate::mapper::{CoordinateMapper, GridCoord, Vec3};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::fmt;

/// One grid cell's world-space centre on the X/Z plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellNode {
    pub position: [f64; 2],
    pub coord: GridCoord,
}

impl RTreeObject for CellNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for CellNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dz = self.position[1] - point[1];
        dx * dx + dz * dz
    }
}

/// Build-once nearest-neighbour index over every cell. Immutable after construction,
/// so shared references can be queried from any thread.
pub struct SpatialIndex {
    tree: RTree<CellNode>,
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("cells", &self.tree.size())
            .finish()
    }
}

impl SpatialIndex {
    /// Bulk-load an R*-tree (O(n log n)).
    pub fn build(cells: Vec<CellNode>) -> Self {
        Self {
            tree: RTree::bulk_load(cells),
        }
    }

    /// Index every cell centre of the mapped grid.
    pub fn from_mapper(mapper: &CoordinateMapper) -> Self {
        let count = mapper.dimension() as usize * mapper.dimension() as usize;
        let cells = (0..count)
            .map(|i| {
                let coord = mapper.coord_of(i);
                let world = mapper.grid_to_world(coord);
                CellNode {
                    position: [world.x as f64, world.z as f64],
                    coord,
                }
            })
            .collect();
        Self::build(cells)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest cell by X/Z distance; Y is ignored. `None` only for an empty index
    /// or a non-finite point.
    pub fn nearest_cell(&self, point: Vec3) -> Option<GridCoord> {
        if !point.x.is_finite() || !point.z.is_finite() {
            return None;
        }
        self.tree
            .nearest_neighbor(&[point.x as f64, point.z as f64])
            .map(|node| node.coord)
    }

    /// Cells whose centres lie within `radius` world units of `center`.
    /// Uses an AABB envelope query then filters by Euclidean distance.
    pub fn cells_within(&self, center: Vec3, radius: f64) -> Vec<GridCoord> {
        let c = [center.x as f64, center.z as f64];
        let envelope = AABB::from_corners(
            [c[0] - radius, c[1] - radius],
            [c[0] + radius, c[1] + radius],
        );
        let r_sq = radius * radius;

        let mut cells: Vec<GridCoord> = self
            .tree
            .locate_in_envelope(&envelope)
            .filter(|node| node.distance_2(&c) <= r_sq)
            .map(|node| node.coord)
            .collect();
        cells.sort_by_key(|coord| (coord.row, coord.col));
        cells
    }
}
