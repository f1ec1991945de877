use crate::cube::CubieCube;
use crate::mask::Mask;
use crate::method::Face;
use crate::turn::TurnSequence;

use super::{matches_with_free_face, GoalSearch};

const UP_ROTATIONS: [&str; 6] = ["", "x", "x'", "x2", "z", "z'"];
const FRONT_ROTATIONS: [&str; 4] = ["", "y", "y'", "y2"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub turns: TurnSequence,
    pub cube: CubieCube,
}

/// The 24 whole-cube orientations: each choice of up face, then each
/// choice of front face.
pub fn all_orientations() -> Vec<Rotation> {
    let mut rotations = Vec::with_capacity(24);
    for up in UP_ROTATIONS.iter() {
        for front in FRONT_ROTATIONS.iter() {
            let turns: TurnSequence = format!("{} {}", up, front)
                .parse()
                .unwrap_or_default();
            let cube = CubieCube::from_turns(&turns);
            rotations.push(Rotation { turns, cube });
        }
    }
    rotations
}

/// Tries each rotation in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotationSearch;

impl GoalSearch for RotationSearch {
    fn prerotate_solves(
        &self,
        state: &CubieCube,
        mask: &Mask,
        orientations: &[Rotation],
        free_face: Option<Face>,
    ) -> Option<TurnSequence> {
        orientations
            .iter()
            .find(|rotation| {
                matches_with_free_face(&state.apply(&rotation.cube), mask, free_face)
            })
            .map(|rotation| rotation.turns.clone())
    }
}
