//! Recorded solves, keyed by scramble.
//!
//! A smart cube reports every turn, including the ones made while applying
//! the scramble, so each recorded solve is split into the turns that
//! reproduce the scramble and the turns that solve it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cube::CubieCube;
use crate::error::{ReconError, Result};
use crate::turn::{Turn, TurnSequence};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInfo {
    #[serde(rename = "move")]
    pub turn: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvePayload {
    pub solve_id: String,
    pub scramble: String,
    pub moves: Vec<MoveInfo>,
    pub time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solve {
    #[serde(flatten)]
    pub payload: SolvePayload,
    pub num_moves_to_scramble: usize,
    pub num_moves_to_solve: usize,
}

impl Solve {
    /// Turns after the scramble, ready for segmentation.
    pub fn solution(&self) -> Result<TurnSequence> {
        let moves = &self.payload.moves;
        moves
            .get(self.num_moves_to_scramble..)
            .ok_or_else(|| ReconError::SolveOutOfRange {
                solve_id: self.payload.solve_id.clone(),
                scramble_len: self.num_moves_to_scramble,
                len: moves.len(),
            })?
            .iter()
            .map(|m| m.turn.parse::<Turn>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(TurnSequence::from)
            .map_err(Into::into)
    }
}

/// Replay `payload.moves` against the inverse of the scramble until the cube
/// is solved. A turn that overshoots the last scramble turn (`U3` for a
/// scramble ending in `U`) is split in two, the first half closing the
/// scramble.
pub fn make_solve(mut payload: SolvePayload) -> Result<Solve> {
    let scramble: TurnSequence = payload.scramble.parse()?;
    let mut cube = CubieCube::from_turns(&scramble.invert());
    let mut num_moves_to_scramble = 0;
    while !cube.is_solved() && num_moves_to_scramble < payload.moves.len() {
        let info = &payload.moves[num_moves_to_scramble];
        let turn: Turn = info.turn.parse()?;
        let next = cube.apply(&CubieCube::for_turn(turn));
        if let Turn::Move { kind, amount } = turn {
            let closing = (1..4)
                .filter(|partial| *partial != amount)
                .find(|partial| {
                    cube.apply(&CubieCube::for_turn(Turn::new(kind, *partial as i64)))
                        .is_solved()
                });
            if let (false, Some(partial)) = (next.is_solved(), closing) {
                let timestamp = info.timestamp;
                let split = [
                    Turn::new(kind, partial as i64),
                    Turn::new(kind, amount as i64 - partial as i64),
                ];
                payload.moves.splice(
                    num_moves_to_scramble..=num_moves_to_scramble,
                    split.iter().map(|t| MoveInfo {
                        turn: t.to_string(),
                        timestamp,
                    }),
                );
                num_moves_to_scramble += 1;
                break;
            }
        }
        cube = next;
        num_moves_to_scramble += 1;
    }
    let num_moves_to_solve = payload.moves.len() - num_moves_to_scramble;
    Ok(Solve {
        payload,
        num_moves_to_scramble,
        num_moves_to_solve,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveLog {
    pub all_scrambles: Vec<String>,
    pub all_solve_ids: Vec<String>,
    /// Scrambles with no recorded solve yet.
    pub unattempted: Vec<String>,
    pub scramble_to_id: BTreeMap<String, String>,
    pub scramble_to_solve_ids: BTreeMap<String, Vec<String>>,
    pub solve_id_to_solve: BTreeMap<String, Solve>,
}

impl SolveLog {
    pub fn add_scramble(&mut self, scramble: &str, id: &str) {
        self.all_scrambles.push(scramble.to_string());
        if !self.scramble_to_solve_ids.contains_key(scramble) {
            self.unattempted.push(scramble.to_string());
        }
        self.scramble_to_id
            .insert(scramble.to_string(), id.to_string());
    }

    pub fn add_solve(&mut self, payload: SolvePayload) -> Result<&Solve> {
        let solve = make_solve(payload)?;
        let scramble = solve.payload.scramble.clone();
        let solve_id = solve.payload.solve_id.clone();
        self.unattempted.retain(|s| *s != scramble);
        self.all_solve_ids.push(solve_id.clone());
        self.scramble_to_solve_ids
            .entry(scramble)
            .or_default()
            .push(solve_id.clone());
        self.solve_id_to_solve.insert(solve_id.clone(), solve);
        Ok(&self.solve_id_to_solve[&solve_id])
    }
}
