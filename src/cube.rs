use crate::orbit::Orbit;
use crate::turn::{Turn, TurnKind, TurnSequence};

pub type Corners = Orbit<8, 3>;
pub type Edges = Orbit<12, 2>;
pub type Centers = Orbit<6, 1>;

pub const NUM_CORNERS: usize = 8;
pub const NUM_EDGES: usize = 12;
pub const NUM_CENTERS: usize = 6;

/// Center order used by `Centers`.
pub const CENTER_NAMES: [char; NUM_CENTERS] = ['U', 'D', 'F', 'B', 'L', 'R'];
const CORNER_NAMES: [&str; NUM_CORNERS] = ["URF", "UFL", "ULB", "UBR", "DFR", "DLF", "DBL", "DRB"];
const EDGE_NAMES: [&str; NUM_EDGES] = [
    "UR", "UF", "UL", "UB", "DR", "DF", "DL", "DB", "FR", "FL", "BL", "BR",
];

// Facelet layout: U 0-8, R 9-17, F 18-26, D 27-35, L 36-44, B 45-53.
const FACELET_FACES: [char; 6] = ['U', 'R', 'F', 'D', 'L', 'B'];
const CORNER_FACELETS: [[usize; 3]; NUM_CORNERS] = [
    [8, 9, 20],
    [6, 18, 38],
    [0, 36, 47],
    [2, 45, 11],
    [29, 26, 15],
    [27, 44, 24],
    [33, 53, 42],
    [35, 17, 51],
];
const EDGE_FACELETS: [[usize; 2]; NUM_EDGES] = [
    [5, 10],
    [7, 19],
    [3, 37],
    [1, 46],
    [32, 16],
    [28, 25],
    [30, 43],
    [34, 52],
    [23, 12],
    [21, 41],
    [50, 39],
    [48, 14],
];

type CubeTable = (
    [u8; NUM_CORNERS],
    [u8; NUM_CORNERS],
    [u8; NUM_EDGES],
    [u8; NUM_EDGES],
    [u8; NUM_CENTERS],
);

const ID_CORNERS: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
const ID_EDGES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
const ID_CENTERS: [u8; 6] = [0, 1, 2, 3, 4, 5];

const TURN_U: CubeTable = (
    [3, 0, 1, 2, 4, 5, 6, 7],
    [0; 8],
    [3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11],
    [0; 12],
    ID_CENTERS,
);
const TURN_R: CubeTable = (
    [4, 1, 2, 0, 7, 5, 6, 3],
    [2, 0, 0, 1, 1, 0, 0, 2],
    [8, 1, 2, 3, 11, 5, 6, 7, 4, 9, 10, 0],
    [0; 12],
    ID_CENTERS,
);
const TURN_F: CubeTable = (
    [1, 5, 2, 3, 0, 4, 6, 7],
    [1, 2, 0, 0, 2, 1, 0, 0],
    [0, 9, 2, 3, 4, 8, 6, 7, 1, 5, 10, 11],
    [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    ID_CENTERS,
);
const TURN_D: CubeTable = (
    [0, 1, 2, 3, 5, 6, 7, 4],
    [0; 8],
    [0, 1, 2, 3, 5, 6, 7, 4, 8, 9, 10, 11],
    [0; 12],
    ID_CENTERS,
);
const TURN_L: CubeTable = (
    [0, 2, 6, 3, 4, 1, 5, 7],
    [0, 1, 2, 0, 0, 2, 1, 0],
    [0, 1, 10, 3, 4, 5, 9, 7, 8, 2, 6, 11],
    [0; 12],
    ID_CENTERS,
);
const TURN_B: CubeTable = (
    [0, 1, 3, 7, 4, 5, 2, 6],
    [0, 0, 1, 2, 0, 0, 2, 1],
    [0, 1, 2, 11, 4, 5, 6, 10, 8, 9, 3, 7],
    [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    ID_CENTERS,
);
const ROTATION_X: CubeTable = (
    [4, 5, 1, 0, 7, 6, 2, 3],
    [2, 1, 2, 1, 1, 2, 1, 2],
    [8, 5, 9, 1, 11, 7, 10, 3, 4, 6, 2, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0],
    [2, 3, 1, 0, 4, 5],
);
const ROTATION_Y: CubeTable = (
    [3, 0, 1, 2, 7, 4, 5, 6],
    [0; 8],
    [3, 0, 1, 2, 7, 4, 5, 6, 11, 8, 9, 10],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
    [0, 1, 5, 4, 2, 3],
);
const ROTATION_Z: CubeTable = (
    [1, 5, 6, 2, 0, 4, 7, 3],
    [1, 2, 1, 2, 2, 1, 2, 1],
    [2, 9, 6, 10, 0, 8, 4, 11, 1, 5, 7, 3],
    [1; 12],
    [4, 5, 2, 3, 1, 0],
);

/// A 3x3x3 state at the cubie level. Composition reads left to right:
/// `a.apply(&b)` is `a` followed by `b`.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub struct CubieCube {
    pub corners: Corners,
    pub edges: Edges,
    pub centers: Centers,
}

impl Default for CubieCube {
    fn default() -> Self {
        Self::identity()
    }
}

impl CubieCube {
    pub fn identity() -> Self {
        Self {
            corners: Corners::new(ID_CORNERS, [0; 8]),
            edges: Edges::new(ID_EDGES, [0; 12]),
            centers: Centers::new(ID_CENTERS, [0; 6]),
        }
    }

    fn from_table(table: &CubeTable) -> Self {
        let (cp, co, ep, eo, tp) = *table;
        Self {
            corners: Corners::new(cp, co),
            edges: Edges::new(ep, eo),
            centers: Centers::new(tp, [0; 6]),
        }
    }

    /// The quarter turn (clockwise) of a turn kind.
    pub fn for_kind(kind: TurnKind) -> Self {
        use TurnKind::*;
        let t = Self::from_table;
        match kind {
            U => t(&TURN_U),
            R => t(&TURN_R),
            F => t(&TURN_F),
            D => t(&TURN_D),
            L => t(&TURN_L),
            B => t(&TURN_B),
            X => t(&ROTATION_X),
            Y => t(&ROTATION_Y),
            Z => t(&ROTATION_Z),
            M => t(&TURN_L)
                .pow(3)
                .apply(&t(&ROTATION_X).pow(3))
                .apply(&t(&TURN_R)),
            E => t(&TURN_U)
                .apply(&t(&TURN_D).pow(3))
                .apply(&t(&ROTATION_Y).pow(3)),
            S => t(&TURN_F).pow(3).apply(&t(&ROTATION_Z)).apply(&t(&TURN_B)),
            WideR => t(&ROTATION_X).apply(&t(&TURN_L)),
            WideL => t(&ROTATION_X).pow(3).apply(&t(&TURN_R)),
            WideU => t(&ROTATION_Y).apply(&t(&TURN_D)),
            WideD => t(&ROTATION_Y).pow(3).apply(&t(&TURN_U)),
            WideF => t(&ROTATION_Z).apply(&t(&TURN_B)),
            WideB => t(&ROTATION_Z).pow(3).apply(&t(&TURN_F)),
        }
    }

    pub fn for_turn(turn: Turn) -> Self {
        match turn {
            Turn::Identity => Self::identity(),
            Turn::Move { kind, amount } => Self::for_kind(kind).pow(amount as usize),
        }
    }

    pub fn from_turns(turns: &TurnSequence) -> Self {
        Self::identity().apply_turns(turns)
    }

    /// Apply another state after this one.
    pub fn apply(&self, other: &CubieCube) -> CubieCube {
        CubieCube {
            corners: self.corners.apply(&other.corners),
            edges: self.edges.apply(&other.edges),
            centers: self.centers.apply(&other.centers),
        }
    }

    pub fn apply_turns(&self, turns: &TurnSequence) -> CubieCube {
        turns
            .iter()
            .fold(*self, |cube, turn| cube.apply(&CubieCube::for_turn(*turn)))
    }

    pub fn invert(&self) -> CubieCube {
        CubieCube {
            corners: self.corners.invert(),
            edges: self.edges.invert(),
            centers: self.centers.invert(),
        }
    }

    pub fn pow(&self, n: usize) -> CubieCube {
        (0..n).fold(CubieCube::identity(), |acc, _| acc.apply(self))
    }

    /// Reinterpret this state as seen from the frame `basis`: `basis⁻¹ · self · basis`.
    pub fn change_basis(&self, basis: &CubieCube) -> CubieCube {
        basis.invert().apply(self).apply(basis)
    }

    pub fn change_basis_turns(&self, basis: &TurnSequence) -> CubieCube {
        self.change_basis(&CubieCube::from_turns(basis))
    }

    pub fn is_inverse_of(&self, other: &CubieCube) -> bool {
        self.apply(other).is_solved()
    }

    pub fn is_solved(&self) -> bool {
        self.corners.is_solved() && self.edges.is_solved() && self.centers.is_solved()
    }

    /// Sticker letters in facelet order (U, R, F, D, L, B; nine each).
    pub fn facelets(&self) -> [char; 54] {
        let mut facelets = [' '; 54];
        for i in 0..NUM_CORNERS {
            let piece: Vec<char> = CORNER_NAMES[self.corners.perm[i] as usize]
                .chars()
                .collect();
            for (n, color) in piece.iter().enumerate() {
                let slot = (n + self.corners.ori[i] as usize) % 3;
                facelets[CORNER_FACELETS[i][slot]] = *color;
            }
        }
        for i in 0..NUM_EDGES {
            let piece: Vec<char> = EDGE_NAMES[self.edges.perm[i] as usize].chars().collect();
            for (n, color) in piece.iter().enumerate() {
                let slot = (n + self.edges.ori[i] as usize) % 2;
                facelets[EDGE_FACELETS[i][slot]] = *color;
            }
        }
        for (pos, name) in CENTER_NAMES.iter().enumerate() {
            let face = face_offset(*name);
            facelets[face + 4] = CENTER_NAMES[self.centers.perm[pos] as usize];
        }
        facelets
    }

    /// Unfolded net: U on top, then L F R B, then D.
    pub fn visualize(&self) -> String {
        let facelets = self.facelets();
        let row = |face: char, r: usize| -> String {
            let start = face_offset(face) + r * 3;
            facelets[start..start + 3].iter().collect()
        };
        let mut lines = vec![];
        for r in 0..3 {
            lines.push(format!("   {}", row('U', r)));
        }
        for r in 0..3 {
            lines.push(['L', 'F', 'R', 'B'].iter().map(|f| row(*f, r)).collect());
        }
        for r in 0..3 {
            lines.push(format!("   {}", row('D', r)));
        }
        lines.join("\n")
    }

    /// The whole-cube rotation that brings the U center up and then the
    /// F center to the front.
    pub fn up_front_rotation(&self) -> TurnSequence {
        const UP: [&str; 6] = ["", "z2", "x", "x'", "z", "z'"];
        const FRONT: [&str; 6] = ["", "", "", "y2", "y'", "y"];
        let up_index = self.centers.position_of(0).min(5);
        let up: TurnSequence = UP[up_index].parse().unwrap_or_default();
        let upright = self.apply_turns(&up);
        let front_index = upright.centers.position_of(2).min(5);
        let front: TurnSequence = FRONT[front_index].parse().unwrap_or_default();
        up.concat(&front)
    }
}

fn face_offset(face: char) -> usize {
    FACELET_FACES.iter().position(|f| *f == face).unwrap_or(0) * 9
}
