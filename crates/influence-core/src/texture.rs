//! Conversion of the grid into 8-bit pixel buffers for display.
//!
//! Intensities are scaled so `full_scale` maps to 255 and anything hotter saturates.
//! Rows follow the grid's row-major order.

use crate::grid::InfluenceGrid;
use rayon::prelude::*;

fn to_byte(intensity: f32, full_scale: f32) -> u8 {
    let scale = if full_scale.is_finite() && full_scale > 0.0 {
        full_scale
    } else {
        1.0
    };
    ((intensity / scale).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One byte per cell.
pub fn to_luma8(grid: &InfluenceGrid, full_scale: f32) -> Vec<u8> {
    (0..grid.cell_count())
        .into_par_iter()
        .map(|i| to_byte(grid.intensity_at(i), full_scale))
        .collect()
}

/// RGBA per cell: red carries intensity, green marks cells an agent stands on.
pub fn to_rgba8(grid: &InfluenceGrid, full_scale: f32) -> Vec<u8> {
    let mut pixels = vec![0u8; grid.cell_count() * 4];
    pixels
        .par_chunks_mut(4)
        .enumerate()
        .for_each(|(i, px)| {
            px[0] = to_byte(grid.intensity_at(i), full_scale);
            px[1] = if grid.occupancy_at(i) > 0 { 255 } else { 0 };
            px[3] = 255;
        });
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::curve::ResponseCurve;
    use crate::mapper::Vec3;
    use crate::section::InfluenceSection;

    fn stamped_grid() -> InfluenceGrid {
        let mut grid = InfluenceGrid::new(
            GridConfig {
                terrain_origin_offset: 0.0,
                terrain_resolution: 4.0,
                dimension: 4,
                default_stamp_radius: 1,
            },
            ResponseCurve::linear(),
        )
        .unwrap();
        let mut a = InfluenceSection::for_radius(1);
        let mut b = InfluenceSection::for_radius(1);
        grid.update_agent_influence(Vec3::new(1.0, 0.0, 2.0), &mut a, 1).unwrap();
        grid.update_agent_influence(Vec3::new(1.0, 0.0, 2.0), &mut b, 1).unwrap();
        grid
    }

    #[test]
    fn luma_scales_and_saturates() {
        let grid = stamped_grid();
        let luma = to_luma8(&grid, 4.0);
        assert_eq!(luma.len(), 16);
        // Two agents at (1, 2): 2.0 of 4.0.
        assert_eq!(luma[2 * 4 + 1], 128);
        assert_eq!(luma.iter().filter(|&&v| v > 0).count(), 1);

        let saturated = to_luma8(&grid, 1.0);
        assert_eq!(saturated[9], 255);
    }

    #[test]
    fn invalid_full_scale_falls_back_to_one() {
        let grid = stamped_grid();
        assert_eq!(to_luma8(&grid, 0.0), to_luma8(&grid, 1.0));
        assert_eq!(to_luma8(&grid, f32::NAN), to_luma8(&grid, 1.0));
    }

    #[test]
    fn rgba_marks_occupied_cells_in_green() {
        let grid = stamped_grid();
        let rgba = to_rgba8(&grid, 2.0);
        assert_eq!(rgba.len(), 64);
        assert_eq!(&rgba[9 * 4..9 * 4 + 4], &[255, 255, 0, 255]);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
    }
}
