use std::collections::VecDeque;

use crate::cube::{CubieCube, NUM_CORNERS, NUM_EDGES};
use crate::mask::Mask;

/// Pieces tracked per table. 24^4 entries is the largest table built.
const MAX_TRACKED: usize = 4;
/// Every (position, twist) pair of a corner or an edge fits in one digit.
const RADIX: usize = 24;
const UNREACHED: u8 = u8::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceKind {
    Corner,
    Edge,
}

impl PieceKind {
    fn twist(self) -> usize {
        match self {
            PieceKind::Corner => 3,
            PieceKind::Edge => 2,
        }
    }

    fn slots(cube: &CubieCube, kind: PieceKind) -> (&[u8], &[u8]) {
        match kind {
            PieceKind::Corner => (&cube.corners.perm[..], &cube.corners.ori[..]),
            PieceKind::Edge => (&cube.edges.perm[..], &cube.edges.ori[..]),
        }
    }
}

/// Exact number of moves needed to bring a few tracked pieces home, over
/// every arrangement of those pieces. The distance for the whole mask is at
/// least the distance for any subset of its pieces.
#[derive(Debug)]
pub struct PruningTable {
    kind: PieceKind,
    pieces: Vec<u8>,
    distances: Vec<u8>,
}

impl PruningTable {
    fn build(kind: PieceKind, pieces: Vec<u8>, must_orient: Vec<bool>, moves: &[CubieCube]) -> Self {
        let twist = kind.twist();
        let size = RADIX.pow(pieces.len() as u32);
        let mut distances = vec![UNREACHED; size];

        // For each move, where a (position, twist) digit ends up.
        let digit_moves: Vec<Vec<usize>> = moves
            .iter()
            .map(|m| {
                let (perm, ori) = PieceKind::slots(m, kind);
                let mut table = vec![0; RADIX];
                for (i, from) in perm.iter().enumerate() {
                    for o in 0..twist {
                        table[*from as usize * twist + o] = i * twist + (o + ori[i] as usize) % twist;
                    }
                }
                table
            })
            .collect();

        let mut goals: Vec<usize> = vec![0];
        for (piece, orient) in pieces.iter().zip(must_orient.iter()) {
            let twists = if *orient { 1 } else { twist };
            goals = goals
                .iter()
                .flat_map(|key| (0..twists).map(move |o| key * RADIX + *piece as usize * twist + o))
                .collect();
        }

        let mut fringe: VecDeque<usize> = VecDeque::new();
        for goal in goals {
            distances[goal] = 0;
            fringe.push_back(goal);
        }
        let mut digits = vec![0; pieces.len()];
        while let Some(key) = fringe.pop_front() {
            let distance = distances[key];
            let mut rest = key;
            for d in digits.iter_mut().rev() {
                *d = rest % RADIX;
                rest /= RADIX;
            }
            for table in digit_moves.iter() {
                let next = digits.iter().fold(0, |acc, d| acc * RADIX + table[*d]);
                if distances[next] == UNREACHED {
                    distances[next] = distance + 1;
                    fringe.push_back(next);
                }
            }
        }

        Self {
            kind,
            pieces,
            distances,
        }
    }

    fn key(&self, cube: &CubieCube) -> usize {
        let twist = self.kind.twist();
        let (perm, ori) = PieceKind::slots(cube, self.kind);
        self.pieces.iter().fold(0, |acc, piece| {
            let position = perm.iter().position(|p| p == piece).unwrap_or(0);
            acc * RADIX + position * twist + ori[position] as usize
        })
    }

    /// `None` when the tracked pieces can't be solved with these moves.
    pub fn distance(&self, cube: &CubieCube) -> Option<usize> {
        match self.distances[self.key(cube)] {
            UNREACHED => None,
            d => Some(d as usize),
        }
    }
}

/// Corner and edge tables for one mask and move set.
#[derive(Debug)]
pub struct PruningTables {
    tables: Vec<PruningTable>,
}

impl PruningTables {
    pub fn new(mask: &Mask, moves: &[CubieCube]) -> Self {
        let corners: Vec<u8> = (0..NUM_CORNERS)
            .filter(|i| mask.corner_positioned(*i))
            .take(MAX_TRACKED)
            .map(|i| i as u8)
            .collect();
        let edges: Vec<u8> = (0..NUM_EDGES)
            .filter(|i| mask.edge_positioned(*i))
            .take(MAX_TRACKED)
            .map(|i| i as u8)
            .collect();
        let mut tables = vec![];
        if !corners.is_empty() {
            let orient = corners
                .iter()
                .map(|c| mask.corner_oriented(*c as usize))
                .collect();
            tables.push(PruningTable::build(PieceKind::Corner, corners, orient, moves));
        }
        if !edges.is_empty() {
            let orient = edges
                .iter()
                .map(|e| mask.edge_oriented(*e as usize))
                .collect();
            tables.push(PruningTable::build(PieceKind::Edge, edges, orient, moves));
        }
        Self { tables }
    }

    pub fn num_entries(&self) -> usize {
        self.tables.iter().map(|t| t.distances.len()).sum()
    }

    /// Lower bound on the moves left, or `None` if some tracked pieces can
    /// never be solved.
    pub fn lower_bound(&self, cube: &CubieCube) -> Option<usize> {
        self.tables
            .iter()
            .try_fold(0, |bound, table| table.distance(cube).map(|d| bound.max(d)))
    }
}
