use crate::grid::SLOTS_PER_DAY;

pub const DEFAULT_COLUMNS: usize = 8;

/// Geometry of the slot grid: slots flow left to right in rows of `columns`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            cell_width: 40.,
            cell_height: 40.,
            origin_x: 0.,
            origin_y: 0.,
        }
    }
}

impl GridLayout {
    pub fn rows(&self) -> usize {
        let columns = self.columns.max(1);
        SLOTS_PER_DAY.div_ceil(columns)
    }

    /// Slot directly under a point, if any.
    pub fn hit_slot(&self, x: f32, y: f32) -> Option<usize> {
        let column = (x - self.origin_x) / self.cell_width;
        let row = (y - self.origin_y) / self.cell_height;
        if !(column >= 0. && row >= 0.) {
            return None;
        }
        let (column, row) = (column as usize, row as usize);
        if column >= self.columns.max(1) || row >= self.rows() {
            return None;
        }
        Some(row * self.columns.max(1) + column).filter(|slot| *slot < SLOTS_PER_DAY)
    }

    /// Slot under a point after clamping the point onto the grid.
    pub fn nearest_slot(&self, x: f32, y: f32) -> usize {
        let columns = self.columns.max(1);
        let column = ((x - self.origin_x) / self.cell_width).floor();
        let row = ((y - self.origin_y) / self.cell_height).floor();
        let column = column.clamp(0., (columns - 1) as f32) as usize;
        let row = row.clamp(0., (self.rows() - 1) as f32) as usize;
        (row * columns + column).min(SLOTS_PER_DAY - 1)
    }

    /// Center point of a slot cell.
    pub fn slot_center(&self, slot: usize) -> (f32, f32) {
        let columns = self.columns.max(1);
        let column = (slot % columns) as f32;
        let row = (slot / columns) as f32;
        (
            self.origin_x + (column + 0.5) * self.cell_width,
            self.origin_y + (row + 0.5) * self.cell_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::GridLayout;

    #[test]
    fn test_hit_slot() {
        let layout = GridLayout::default();
        assert_eq!(layout.rows(), 12);
        assert_eq!(layout.hit_slot(0., 0.), Some(0));
        assert_eq!(layout.hit_slot(100., 60.), Some(10));
        assert_eq!(layout.hit_slot(319., 479.), Some(95));
        assert_eq!(layout.hit_slot(-1., 10.), None);
        assert_eq!(layout.hit_slot(321., 10.), None);
        assert_eq!(layout.hit_slot(10., 481.), None);
    }

    #[test]
    fn test_nearest_slot_clamps() {
        let layout = GridLayout {
            origin_x: 10.,
            origin_y: 10.,
            ..Default::default()
        };
        assert_eq!(layout.nearest_slot(-50., -50.), 0);
        assert_eq!(layout.nearest_slot(5000., 15.), 7);
        assert_eq!(layout.nearest_slot(5000., 5000.), 95);
    }

    #[test]
    fn test_slot_center_round_trip() {
        let layout = GridLayout::default();
        for slot in 0..96 {
            let (x, y) = layout.slot_center(slot);
            assert_eq!(layout.hit_slot(x, y), Some(slot));
        }
    }
}
