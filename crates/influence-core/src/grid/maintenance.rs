use super::{quantize, InfluenceGrid, UNITS_PER_INTENSITY};
use crate::section::InfluenceSection;
use tracing::{debug, warn};

impl InfluenceGrid {
    /// Sum of every cell's intensity.
    pub fn total_intensity(&self) -> f64 {
        self.cells.iter().map(|&u| u as f64).sum::<f64>() / UNITS_PER_INTENSITY
    }

    /// Rebuild every cell from the sections of all live agents and replace the
    /// accumulated values. Retired sections and sections stamped by another grid
    /// are ignored.
    ///
    /// Returns the number of cells whose intensity or occupancy changed. With exact
    /// retraction this is zero unless a section was dropped without being retracted.
    pub fn reconcile<'a, I>(&mut self, sections: I) -> usize
    where
        I: IntoIterator<Item = &'a InfluenceSection>,
    {
        let mut cells = vec![0i64; self.cells.len()];
        let mut occupancy = vec![0u32; self.occupancy.len()];
        let dim = self.config.dimension as usize;
        let mut live = 0usize;
        let mut foreign = 0usize;

        for section in sections.into_iter().filter(|s| !s.is_retired()) {
            if !self.owns(section) {
                foreign += 1;
                continue;
            }
            live += 1;
            for c in section.contributions() {
                cells[c.row as usize * dim + c.col as usize] += quantize(c.intensity);
            }
            if let Some(i) = section.marker().and_then(|m| self.mapper.index(m)) {
                occupancy[i] += 1;
            }
        }

        let corrected = self
            .cells
            .iter()
            .zip(&cells)
            .zip(self.occupancy.iter().zip(&occupancy))
            .filter(|((old, new), (old_occ, new_occ))| old != new || old_occ != new_occ)
            .count();

        self.cells = cells;
        self.occupancy = occupancy;

        if foreign > 0 {
            warn!(foreign, "reconciliation skipped sections from another grid");
        }
        if corrected > 0 {
            warn!(corrected, sections = live, "reconciliation corrected drifted cells");
        } else {
            debug!(sections = live, "reconciliation found no drift");
        }
        corrected
    }
}
