use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cube::CubieCube;
use crate::mask::Mask;
use crate::method::Face;
use crate::turn::{ParseTurnError, TurnSequence};

mod mask_search;
mod prerotate;
mod pruning_table;

pub use mask_search::{MaskSearch, DEFAULT_MOVESET};
pub use prerotate::{all_orientations, Rotation, RotationSearch};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no phase named `{0}`")]
    UnknownStage(String),

    #[error("bad move set: {0}")]
    Moveset(#[from] ParseTurnError),

    #[error("phase `{0}` has a malformed mask")]
    MalformedMask(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Sequences applied before searching, one search each.
    pub premoves: Vec<String>,
    pub num_solution: usize,
    pub upper_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionCandidate {
    pub solution: TurnSequence,
    pub score: usize,
}

/// Finds the whole-cube rotation that makes a state match a goal.
pub trait GoalSearch {
    /// The first of `orientations` that, applied after `state`, matches
    /// `mask`. With a `free_face`, any turn of that face may follow the
    /// rotation; only the rotation is returned.
    fn prerotate_solves(
        &self,
        state: &CubieCube,
        mask: &Mask,
        orientations: &[Rotation],
        free_face: Option<Face>,
    ) -> Option<TurnSequence>;
}

/// Bounded search for alternative ways to finish a phase.
pub trait AlternativeSearch {
    fn solve(
        &self,
        stage_id: &str,
        state: &CubieCube,
        config: &SolverConfig,
        previous_stage_id: Option<&str>,
    ) -> Result<Vec<SolutionCandidate>, SearchError>;
}

/// `mask` matches `state`, allowing a trailing turn of `free_face`.
pub fn matches_with_free_face(state: &CubieCube, mask: &Mask, free_face: Option<Face>) -> bool {
    match free_face {
        None => mask.matches(state),
        Some(face) => {
            let turn = CubieCube::for_kind(face.turn_kind());
            let mut adjusted = *state;
            for _ in 0..4 {
                if mask.matches(&adjusted) {
                    return true;
                }
                adjusted = adjusted.apply(&turn);
            }
            false
        }
    }
}
