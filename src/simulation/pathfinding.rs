//! Grid routing for cars and pedestrians
//!
//! Routing is a plain A* over unit-cost grid steps with a Manhattan
//! heuristic. The frontier is keyed by `(g + h, insertion counter)` so that
//! equal-cost candidates are expanded in the order they were discovered,
//! which keeps routes identical across runs with the same seed.
//!
//! Which steps are legal depends on the agent kind:
//!
//! * cars follow one-way roads and never enter a road whose heading is the
//!   exact opposite of the step taken to reach it
//! * pedestrians roam freely across sidewalks, crossings and light cells
//!
//! In both cases the goal cell itself is always enterable.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;

use super::grid::{Cell, Grid};
use super::types::{AgentKind, Coord, StaticKind};

/// Find the shortest route from `start` to `goal`
///
/// `neighbors` yields the cells reachable in one step from a cell. The
/// returned path excludes `start` and ends with `goal`; it is empty when
/// `start == goal` or when the goal cannot be reached.
pub fn find_path<F, I>(start: Coord, goal: Coord, mut neighbors: F) -> Vec<Coord>
where
    F: FnMut(Coord) -> I,
    I: IntoIterator<Item = Coord>,
{
    if start == goal {
        return Vec::new();
    }

    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut g_score: HashMap<Coord, u32> = HashMap::new();
    let mut closed: HashSet<Coord> = HashSet::new();
    let mut counter: u64 = 0;

    g_score.insert(start, 0);
    frontier.push(Reverse((start.manhattan(&goal), counter, start)));

    while let Some(Reverse((_, _, current))) = frontier.pop() {
        if current == goal {
            return reconstruct_path(&came_from, start, goal);
        }
        if !closed.insert(current) {
            continue;
        }

        let tentative = g_score[&current] + 1;
        for next in neighbors(current) {
            if closed.contains(&next) {
                continue;
            }
            let improves = g_score
                .get(&next)
                .map_or(true, |&known| tentative < known);
            if improves {
                came_from.insert(next, current);
                g_score.insert(next, tentative);
                counter += 1;
                frontier.push(Reverse((tentative + next.manhattan(&goal), counter, next)));
            }
        }
    }

    Vec::new()
}

fn reconstruct_path(came_from: &HashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Whether `cell` carries the surface an agent of `kind` travels on
pub fn has_surface(kind: AgentKind, cell: &Cell) -> bool {
    match kind {
        AgentKind::Car => cell.has(StaticKind::Road),
        AgentKind::Pedestrian => {
            cell.has(StaticKind::Sidewalk)
                || cell.has(StaticKind::PedestrianWalk)
                || cell.has(StaticKind::TrafficLight)
        }
    }
}

/// Cells an agent of `kind` may step into from `coord` while heading to `goal`
pub fn neighbors(grid: &Grid, kind: AgentKind, coord: Coord, goal: Coord) -> Vec<Coord> {
    let Some(cell) = grid.cell_at(coord) else {
        return Vec::new();
    };
    if !has_surface(kind, cell) {
        return Vec::new();
    }

    grid.neighbors4(coord)
        .filter(|&(direction, next)| {
            if next == goal {
                return true;
            }
            let Some(next_cell) = grid.cell_at(next) else {
                return false;
            };
            match kind {
                AgentKind::Car => next_cell
                    .road_direction()
                    .is_some_and(|road| road != direction.opposite()),
                AgentKind::Pedestrian => has_surface(kind, next_cell),
            }
        })
        .map(|(_, next)| next)
        .collect()
}

/// Route an agent of `kind` across the grid
pub fn route(grid: &Grid, kind: AgentKind, start: Coord, goal: Coord) -> Vec<Coord> {
    find_path(start, goal, |coord| neighbors(grid, kind, coord, goal))
}

/// Directed graph of every legal step for `kind` when heading to `goal`
pub fn reachability_graph(grid: &Grid, kind: AgentKind, goal: Coord) -> DiGraphMap<Coord, ()> {
    let mut graph = DiGraphMap::new();
    for cell in grid.cells() {
        let from = cell.coord();
        for to in neighbors(grid, kind, from, goal) {
            graph.add_edge(from, to, ());
        }
    }
    graph
}

/// Whether `to` can be reached from `from` in `graph`
pub fn is_reachable(graph: &DiGraphMap<Coord, ()>, from: Coord, to: Coord) -> bool {
    if from == to {
        return true;
    }
    if !graph.contains_node(from) || !graph.contains_node(to) {
        return false;
    }
    has_path_connecting(graph, from, to, None)
}
