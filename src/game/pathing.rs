//! # Pathfinding
//!
//! Breadth-first search over the tile grid for click-to-move, the frontier
//! search behind auto-explore, and the travel state used by auto-run and
//! path-walk. Search itself is delegated to the `pathfinding` crate; this
//! module supplies the successor and goal rules.

use crate::game::{Direction, Level, Position};
use pathfinding::directed::bfs::bfs;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// 8-directional BFS from `src` to `dst`.
///
/// A tile is passable if walkable (closed doors auto-open on traversal) or
/// if it is exactly the destination, mirroring walk-to-attack semantics at
/// call sites. Returns the ordered waypoints after `src`, or `None` when no
/// path exists.
pub fn bfs_path(level: &Level, src: Position, dst: Position) -> Option<Vec<Position>> {
    if !level.in_bounds(dst) {
        return None;
    }
    let path = bfs(
        &src,
        |&pos| {
            pos.neighbors8()
                .into_iter()
                .filter(|&next| level.is_walkable(next) || next == dst)
                .collect::<Vec<_>>()
        },
        |&pos| pos == dst,
    )?;
    Some(path.into_iter().skip(1).collect())
}

/// Frontier search for auto-explore: walks outward from `from` through
/// already-explored walkable tiles and returns the first tile whose explored
/// bit is unset. `None` means the dungeon is fully explored.
pub fn auto_explore_target(level: &Level, from: Position) -> Option<Position> {
    let mut queue = VecDeque::new();
    let mut seen = HashSet::new();
    queue.push_back(from);
    seen.insert(from);

    while let Some(pos) = queue.pop_front() {
        for next in pos.neighbors8() {
            if !level.in_bounds(next) || !seen.insert(next) {
                continue;
            }
            if !level.is_explored(next) {
                return Some(next);
            }
            if level.is_walkable(next) {
                queue.push_back(next);
            }
        }
    }
    None
}

/// Whether a tile is an intersection: more than 2 of its 4 orthogonal
/// neighbors are walkable. Auto-run stops here so the player can choose a
/// branch.
pub fn is_intersection(level: &Level, pos: Position) -> bool {
    pos.neighbors4()
        .into_iter()
        .filter(|&n| level.is_walkable(n))
        .count()
        > 2
}

/// Multi-turn movement in progress: a held direction or a precomputed path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Travel {
    /// Auto-run: keep stepping in one direction until interrupted.
    AutoRun { dir: Direction },
    /// Path-walk: consume one waypoint per settled turn.
    Path { waypoints: VecDeque<Position> },
}

impl Travel {
    /// The next tile this travel wants to enter, if any.
    pub fn next_step(&self, from: Position) -> Option<Position> {
        match self {
            Travel::AutoRun { dir } => Some(from.step(*dir)),
            Travel::Path { waypoints } => waypoints.front().copied(),
        }
    }

    /// Consumes the waypoint just taken.
    pub fn advance(&mut self) {
        if let Travel::Path { waypoints } = self {
            waypoints.pop_front();
        }
    }

    /// Whether there is nothing left to do.
    pub fn finished(&self) -> bool {
        match self {
            Travel::AutoRun { .. } => false,
            Travel::Path { waypoints } => waypoints.is_empty(),
        }
    }
}
