use crate::mapper::GridCoord;

/// One cell's worth of influence attributed to one agent for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfluenceContribution {
    pub col: i32,
    pub row: i32,
    pub intensity: f32,
}

impl InfluenceContribution {
    pub fn coord(&self) -> GridCoord {
        GridCoord::new(self.col, self.row)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionState {
    /// Freshly allocated; nothing applied yet.
    Unbound,
    /// Holds the contribution currently applied to the grid.
    Bound,
    /// Contribution retracted for good. Further updates are rejected.
    Retired,
}

/// An agent's private record of its last stamp, so the grid can retract it exactly.
///
/// Capacity is fixed at allocation and sized to the agent's stamp window; the grid
/// rewrites the entries in place every tick and never reallocates them.
///
/// A section belongs to the first grid that stamps it and is deliberately not
/// `Clone`: a copy would let the same stamp be retracted twice.
///
/// ```compile_fail
/// let s = influence_core::InfluenceSection::for_radius(1);
/// let _copy = s.clone();
/// ```
#[derive(Debug)]
pub struct InfluenceSection {
    entries: Vec<InfluenceContribution>,
    capacity: usize,
    /// Centre cell painted with the agent marker, if it was inside the grid.
    marker: Option<GridCoord>,
    /// Id of the grid holding this section's stamp.
    owner: Option<u64>,
    state: SectionState,
}

impl InfluenceSection {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            marker: None,
            owner: None,
            state: SectionState::Unbound,
        }
    }

    /// Sized for a `(2·radius + 1)²` window.
    pub fn for_radius(radius: u32) -> Self {
        Self::with_capacity(window_cells(radius))
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    pub fn is_retired(&self) -> bool {
        self.state == SectionState::Retired
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of valid entries from the last stamp.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contributions(&self) -> &[InfluenceContribution] {
        &self.entries
    }

    pub fn marker(&self) -> Option<GridCoord> {
        self.marker
    }

    /// Sum of curve outputs over the last stamp.
    pub fn total_intensity(&self) -> f64 {
        self.entries.iter().map(|c| c.intensity as f64).sum()
    }

    pub(crate) fn owner(&self) -> Option<u64> {
        self.owner
    }

    pub(crate) fn begin_stamp(&mut self) {
        self.entries.clear();
        self.marker = None;
    }

    pub(crate) fn push(&mut self, contribution: InfluenceContribution) {
        debug_assert!(
            self.entries.len() < self.capacity,
            "stamp window exceeds section capacity"
        );
        self.entries.push(contribution);
    }

    pub(crate) fn set_marker(&mut self, marker: Option<GridCoord>) {
        self.marker = marker;
    }

    pub(crate) fn bind(&mut self, grid: u64) {
        self.owner = Some(grid);
        self.state = SectionState::Bound;
    }

    pub(crate) fn retire(&mut self) {
        self.entries.clear();
        self.marker = None;
        self.state = SectionState::Retired;
    }
}

/// Cells covered by a square stamp window of the given radius.
pub fn window_cells(radius: u32) -> usize {
    let side = 2 * radius as usize + 1;
    side * side
}
