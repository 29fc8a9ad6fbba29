use crate::agent::{AgentId, CellView};
use crate::demographics::Demographics;
use crate::topology::grid_index;

/// A read-only copy of every cell's committed state, taken between ticks.
///
/// This is what visualizers and writers consume; it never reflects a half-finished tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationSnapshot {
    size: usize,
    cells: Vec<CellView>,
}

impl PopulationSnapshot {
    pub(crate) fn new(size: usize, cells: Vec<CellView>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        PopulationSnapshot { size, cells }
    }

    /// Cells per side.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellView> {
        if row < self.size && col < self.size {
            self.cells.get(grid_index(self.size, row, col).index())
        } else {
            None
        }
    }

    pub fn cell(&self, id: AgentId) -> Option<&CellView> {
        self.cells.get(id.index())
    }

    /// Cells in row-major order, one slice per row.
    pub fn rows(&self) -> impl Iterator<Item = &[CellView]> + '_ {
        self.cells.chunks(self.size.max(1))
    }

    pub fn cells(&self) -> &[CellView] {
        &self.cells
    }

    pub fn demographics(&self) -> Demographics {
        Demographics::from_statuses(self.cells.iter().map(|cell| cell.status))
    }
}
