use std::collections::HashMap;

/// Geographic bounding box as (min_lon, min_lat, max_lon, max_lat)
pub type BBox = (f64, f64, f64, f64);

/// Most cells a single bounding box or query may cover before it is
/// treated as oversized
const MAX_CELLS: i64 = 4096;

/// Spatial index over feature bounding boxes.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated by the exact hit test on the candidates).
/// Features spanning more than `MAX_CELLS` cells (e.g. projected metre
/// coordinates) go to `oversized` and are candidates for every query.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    oversized: Vec<usize>,
    cell_size: f64,
    len: usize,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            oversized: Vec::new(),
            cell_size,
            len: 0,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    fn cell_count(min_cell: (i32, i32), max_cell: (i32, i32)) -> i64 {
        let width = max_cell.0 as i64 - min_cell.0 as i64 + 1;
        let height = max_cell.1 as i64 - min_cell.1 as i64 + 1;
        width.saturating_mul(height)
    }

    /// Build from feature bounding boxes; `None` entries (no geometry) are skipped
    /// but still consume their index.
    pub fn build(bboxes: impl Iterator<Item = Option<BBox>>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            grid.len = idx + 1;
            let Some((min_lon, min_lat, max_lon, max_lat)) = bbox else {
                continue;
            };
            let min_cell = grid.to_cell(min_lon, min_lat);
            let max_cell = grid.to_cell(max_lon, max_lat);
            if Self::cell_count(min_cell, max_cell) > MAX_CELLS {
                grid.oversized.push(idx);
                continue;
            }
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Feature indices whose bounding box may lie within `radius` degrees of a point.
    /// Sorted and deduplicated.
    pub fn query_point(&self, lon: f64, lat: f64, radius: f64) -> Vec<usize> {
        let min_cell = self.to_cell(lon - radius, lat - radius);
        let max_cell = self.to_cell(lon + radius, lat + radius);
        if Self::cell_count(min_cell, max_cell) > MAX_CELLS {
            return (0..self.len).collect();
        }
        let mut results = self.oversized.clone();
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results.sort_unstable();
        results.dedup();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_finds_overlapping_boxes_once() {
        let boxes = vec![
            Some((-73.0, -38.0, -72.0, -37.0)),
            None,
            Some((-70.0, -30.0, -70.0, -30.0)),
        ];
        let grid = FeatureGrid::build(boxes.into_iter(), 0.25);
        assert_eq!(grid.query_point(-72.5, -37.5, 0.01), vec![0]);
        assert_eq!(grid.query_point(-70.0, -30.0, 0.01), vec![2]);
        assert!(grid.query_point(0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_metre_scale_box_is_not_rasterized() {
        // 1 km line in UTM metres: about 16M cells if indexed cell by cell
        let boxes = vec![
            Some((700_000.0, 5_880_000.0, 701_000.0, 5_881_000.0)),
            Some((-72.5, -37.2, -72.5, -37.2)),
        ];
        let grid = FeatureGrid::build(boxes.into_iter(), 0.25);
        assert!(grid.cells.len() <= 1);
        assert_eq!(grid.query_point(-72.5, -37.2, 0.01), vec![0, 1]);
        assert_eq!(grid.query_point(10.0, 10.0, 0.01), vec![0]);
    }

    #[test]
    fn test_wide_query_returns_every_feature() {
        let boxes = vec![Some((0.0, 0.0, 0.0, 0.0)), None, Some((50.0, 50.0, 50.0, 50.0))];
        let grid = FeatureGrid::build(boxes.into_iter(), 0.25);
        assert_eq!(grid.query_point(0.0, 0.0, 90.0), vec![0, 1, 2]);
    }
}
