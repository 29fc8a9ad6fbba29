//! Static Moore-neighbourhood topology.
//!
//! Cells live in a `size × size` grid stored row-major, so the cell at `(row, col)` is
//! `AgentId(row * size + col)`. Edges are bounded: corner cells have three candidate
//! neighbours and edge cells five.
use smallvec::SmallVec;

use crate::agent::{Agent, AgentId};
use crate::random::SimRng;

/// Maximum number of neighbours any cell can have.
pub const NEIGHBORHOOD_SIZE: usize = 8;

/// Row-major Moore offsets `(d_row, d_col)`. Neighbour lists, and therefore the order of
/// infection draws, follow this order.
const MOORE_OFFSETS: [(isize, isize); NEIGHBORHOOD_SIZE] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// An ordered, fixed-capacity list of neighbour ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    members: SmallVec<[AgentId; NEIGHBORHOOD_SIZE]>,
}

impl Neighborhood {
    /// Appends a neighbour.
    ///
    /// # Panics
    ///
    /// Panics if the neighbourhood already holds [`NEIGHBORHOOD_SIZE`] members. A bounded
    /// Moore neighbourhood never does, so this is a defect in topology construction.
    pub fn push(&mut self, id: AgentId) {
        assert!(
            self.members.len() < NEIGHBORHOOD_SIZE,
            "neighborhood is full ({NEIGHBORHOOD_SIZE} members) but {id:?} was added"
        );
        self.members.push(id);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.members.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentId> + '_ {
        self.members.iter()
    }

    /// Keeps the members for which `keep` returns true, preserving order. `keep` is called
    /// once per member, in order.
    pub fn retain<F: FnMut(&AgentId) -> bool>(&mut self, mut keep: F) {
        self.members.retain(|id| keep(id));
    }

    pub fn as_slice(&self) -> &[AgentId] {
        &self.members
    }
}

impl<'a> IntoIterator for &'a Neighborhood {
    type Item = &'a AgentId;
    type IntoIter = std::slice::Iter<'a, AgentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// The id of the cell at `(row, col)` in a grid with `size` cells per side.
pub fn grid_index(size: usize, row: usize, col: usize) -> AgentId {
    debug_assert!(row < size && col < size);
    AgentId::new(row * size + col)
}

/// The `(row, col)` position of `id` in a grid with `size` cells per side.
pub fn grid_position(size: usize, id: AgentId) -> (usize, usize) {
    (id.index() / size, id.index() % size)
}

/// The in-bounds Moore neighbours of `(row, col)`, in row-major order.
pub fn moore_neighborhood(size: usize, row: usize, col: usize) -> Neighborhood {
    let mut neighborhood = Neighborhood::default();
    for (d_row, d_col) in MOORE_OFFSETS {
        let (Some(n_row), Some(n_col)) = (
            row.checked_add_signed(d_row),
            col.checked_add_signed(d_col),
        ) else {
            continue;
        };
        if n_row < size && n_col < size {
            neighborhood.push(grid_index(size, n_row, n_col));
        }
    }
    neighborhood
}

/// Gives every agent its Moore candidates and lets its behavior filter them. Agents are
/// visited row-major so that filtering draws are reproducible for a seed. Filtering is
/// one-sided: an agent dropping a neighbour does not remove itself from that neighbour's list.
///
/// `agents` must hold exactly `size * size` agents.
pub fn build_topology(agents: &mut [Agent], size: usize, rng: &mut SimRng) {
    assert_eq!(
        Some(agents.len()),
        size.checked_mul(size),
        "topology for a {size}x{size} grid built over {} agents",
        agents.len()
    );
    for (index, agent) in agents.iter_mut().enumerate() {
        let (row, col) = (index / size, index % size);
        agent.accept_neighbors(moore_neighborhood(size, row, col), rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Behavior, BehaviorKind, DEFAULT_INTROVERT_AVOIDANCE};
    use crate::random::{RandomSource, TopologyRng};
    use crate::status::InfectionStatus;

    fn ids(size: usize, cells: &[(usize, usize)]) -> Vec<AgentId> {
        cells
            .iter()
            .map(|&(row, col)| grid_index(size, row, col))
            .collect()
    }

    fn agents(size: usize, kind: BehaviorKind) -> Vec<Agent> {
        (0..size * size)
            .map(|_| {
                Agent::new(
                    InfectionStatus::Susceptible,
                    0.5,
                    0.5,
                    Behavior::new(kind, DEFAULT_INTROVERT_AVOIDANCE),
                )
            })
            .collect()
    }

    #[test]
    fn interior_cell_has_eight_neighbors() {
        let n = moore_neighborhood(5, 2, 2);
        assert_eq!(n.len(), 8);
        assert!(!n.contains(&grid_index(5, 2, 2)));
    }

    #[test]
    fn corner_cell_has_three_neighbors() {
        let n = moore_neighborhood(5, 0, 0);
        assert_eq!(n.as_slice(), ids(5, &[(0, 1), (1, 0), (1, 1)]).as_slice());

        let n = moore_neighborhood(5, 4, 4);
        assert_eq!(n.as_slice(), ids(5, &[(3, 3), (3, 4), (4, 3)]).as_slice());
    }

    #[test]
    fn edge_cell_has_five_neighbors() {
        let n = moore_neighborhood(5, 0, 2);
        assert_eq!(
            n.as_slice(),
            ids(5, &[(0, 1), (0, 3), (1, 1), (1, 2), (1, 3)]).as_slice()
        );
    }

    #[test]
    fn single_cell_grid_is_isolated() {
        assert!(moore_neighborhood(1, 0, 0).is_empty());
    }

    #[test]
    fn neighbor_order_is_row_major() {
        let n = moore_neighborhood(3, 1, 1);
        let expected: Vec<AgentId> = [0, 1, 2, 3, 5, 6, 7, 8].map(AgentId::new).to_vec();
        assert_eq!(n.as_slice(), expected.as_slice());
    }

    #[test]
    fn grid_position_round_trips() {
        let id = grid_index(7, 3, 5);
        assert_eq!(id.index(), 26);
        assert_eq!(grid_position(7, id), (3, 5));
    }

    #[test]
    #[should_panic(expected = "neighborhood is full")]
    fn overflowing_a_neighborhood_panics() {
        let mut n = moore_neighborhood(3, 1, 1);
        n.push(AgentId::new(4));
    }

    #[test]
    fn baseline_topology_is_symmetric() {
        let size = 6;
        let mut population = agents(size, BehaviorKind::Baseline);
        let mut rng = RandomSource::new(0).get_rng(TopologyRng);
        build_topology(&mut population, size, &mut rng);

        for (index, agent) in population.iter().enumerate() {
            let id = AgentId::new(index);
            for neighbor in agent.neighbors() {
                assert!(population[neighbor.index()].neighbors().contains(&id));
            }
        }
    }

    #[test]
    fn introvert_pruning_is_one_sided() {
        let size = 6;
        let mut population = agents(size, BehaviorKind::Baseline);
        population[grid_index(size, 2, 2).index()] = Agent::new(
            InfectionStatus::Susceptible,
            0.5,
            0.5,
            Behavior::new(BehaviorKind::Introvert, 1.0),
        );
        let mut rng = RandomSource::new(0).get_rng(TopologyRng);
        build_topology(&mut population, size, &mut rng);

        let introvert = grid_index(size, 2, 2);
        assert!(population[introvert.index()].neighbors().is_empty());
        for neighbor in moore_neighborhood(size, 2, 2).iter() {
            assert!(population[neighbor.index()].neighbors().contains(&introvert));
        }
    }

    #[test]
    fn introvert_neighbors_never_exceed_moore_count() {
        let size = 8;
        let mut population = agents(size, BehaviorKind::Introvert);
        let mut rng = RandomSource::new(5).get_rng(TopologyRng);
        build_topology(&mut population, size, &mut rng);

        let mut total = 0;
        for (index, agent) in population.iter().enumerate() {
            let (row, col) = (index / size, index % size);
            let candidates = moore_neighborhood(size, row, col);
            assert!(agent.neighbors().len() <= candidates.len());
            assert!(agent.neighbors().iter().all(|id| candidates.contains(id)));
            total += agent.neighbors().len();
        }
        // Roughly half of the 420 directed links survive.
        assert!(total > 0 && total < 420);
    }
}
