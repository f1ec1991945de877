use std::collections::BTreeMap;
use std::iter;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cube::CubieCube;
use crate::error::{ReconError, Result};
use crate::method::{Face, Method, MethodBook, Phase, PhaseBook, SCRAMBLED};
use crate::solver::{all_orientations, GoalSearch, Rotation, RotationSearch};
use crate::turn::{Turn, TurnKind, TurnSequence, TurnTable};

/// One closed phase of a segmented solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionDesc {
    /// The solver's own turns for this phase.
    pub solution: TurnSequence,
    /// The same turns, expressed in the frame set up by every earlier phase.
    pub rotated_solution: TurnSequence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<TurnSequence>,
    pub score: usize,
    pub stage: String,
    pub stage_id: String,
}

/// Rewrite every `L`/`l` turn as the opposite wide/face turn followed by a
/// compensating `x` rotation, which is moved to the end of the sequence.
///
/// Returns the rewritten turns and the rotations, in order. The rewritten
/// turns followed by the rotations do the same thing as `turns`.
pub fn prefer_r_wide(
    turns: &TurnSequence,
    table: &TurnTable,
) -> Result<(TurnSequence, TurnSequence)> {
    for (i, turn) in turns.iter().enumerate() {
        let (substitute, amount) = match turn {
            Turn::Move {
                kind: TurnKind::L,
                amount,
            } => (TurnKind::WideR, *amount),
            Turn::Move {
                kind: TurnKind::WideL,
                amount,
            } => (TurnKind::R, *amount),
            _ => continue,
        };
        let rotation = Turn::new(TurnKind::X, -(amount as i64));
        let undo = CubieCube::for_turn(rotation).invert();
        let rest = table
            .conjugate_sequence(&turns.drop_prefix(i + 1), &undo)
            .ok_or(ReconError::NotARotation)?;
        let (rewritten_rest, mut rotations) = prefer_r_wide(&rest, table)?;

        let mut rewritten = TurnSequence(turns.0[..i].to_vec());
        rewritten.push(Turn::new(substitute, amount as i64));
        let rewritten = rewritten.concat(&rewritten_rest);
        rotations.0.insert(0, rotation);
        return Ok((rewritten, rotations));
    }
    Ok((turns.clone(), TurnSequence::new()))
}

struct Match<'p> {
    stage_id: String,
    phase: &'p Phase,
    orientation: TurnSequence,
    orientation_cube: CubieCube,
    prerotation: TurnSequence,
}

/// Splits solves into the phases of the methods in `methods`.
pub struct Segmenter<'a, G: GoalSearch> {
    methods: &'a MethodBook,
    phases: &'a PhaseBook,
    goal_search: G,
    turn_table: TurnTable,
    orientations: Vec<Rotation>,
}

impl<'a> Segmenter<'a, RotationSearch> {
    pub fn new(methods: &'a MethodBook, phases: &'a PhaseBook) -> Self {
        Self::with_goal_search(methods, phases, RotationSearch)
    }
}

impl<'a, G: GoalSearch> Segmenter<'a, G> {
    pub fn with_goal_search(methods: &'a MethodBook, phases: &'a PhaseBook, goal_search: G) -> Self {
        Self {
            methods,
            phases,
            goal_search,
            turn_table: TurnTable::new(),
            orientations: all_orientations(),
        }
    }

    /// Exactly one whole-cube orientation must finish the solve.
    fn check_solved(&self, scramble: &CubieCube, solution: &TurnSequence) -> Result<()> {
        let end = scramble.apply_turns(solution);
        let solved_orientations = self
            .orientations
            .iter()
            .filter(|o| end.apply(&o.cube).is_solved())
            .count();
        if solved_orientations == 1 {
            debug!("solve finishes rotated by {}", end.up_front_rotation().invert());
            Ok(())
        } else {
            Err(ReconError::MalformedSolve {
                visualization: end.visualize(),
            })
        }
    }

    fn find_next<'p>(
        &'p self,
        method: &Method,
        current: &str,
        live: &CubieCube,
        orientation_cache: &mut BTreeMap<String, Vec<(TurnSequence, CubieCube)>>,
    ) -> Result<Option<Match<'p>>> {
        for stage_id in method.successors(current) {
            let phase = self.phases.get(stage_id)?;
            if !orientation_cache.contains_key(stage_id) {
                phase.mask.validate()?;
                let parsed = phase
                    .parsed_orientations()?
                    .into_iter()
                    .map(|o| {
                        let cube = CubieCube::from_turns(&o);
                        (o, cube)
                    })
                    .collect();
                orientation_cache.insert(stage_id.clone(), parsed);
            }
            for (orientation, orientation_cube) in orientation_cache[stage_id].iter() {
                let prerotation = self.goal_search.prerotate_solves(
                    &live.change_basis(orientation_cube),
                    &phase.mask,
                    &self.orientations,
                    phase.free_face,
                );
                if let Some(prerotation) = prerotation {
                    return Ok(Some(Match {
                        stage_id: stage_id.clone(),
                        phase,
                        orientation: orientation.clone(),
                        orientation_cube: *orientation_cube,
                        prerotation,
                    }));
                }
            }
        }
        Ok(None)
    }

    pub fn segment(&self, method_id: &str, scramble: &str, solution: &str) -> Result<Vec<SolutionDesc>> {
        Ok(self.segment_with_states(method_id, scramble, solution)?.0)
    }

    /// Like [`Segmenter::segment`], also returning the live state held right
    /// after each phase closed.
    pub fn segment_with_states(
        &self,
        method_id: &str,
        scramble: &str,
        solution: &str,
    ) -> Result<(Vec<SolutionDesc>, Vec<CubieCube>)> {
        let scramble: TurnSequence = scramble.parse()?;
        let solution: TurnSequence = solution.parse()?;
        let scrambled = CubieCube::from_turns(&scramble);
        self.check_solved(&scrambled, &solution)?;
        let method = self.methods.get(method_id)?;

        let mut orientation_cache = BTreeMap::new();
        let mut records: Vec<SolutionDesc> = vec![];
        let mut closing_states = vec![];
        let mut live = scrambled;
        // Maps the solver's physical frame onto the frame of the phases.
        let mut frame = CubieCube::identity();
        let mut current = SCRAMBLED.to_string();
        let mut moves_so_far = TurnSequence::new();
        let mut frozen = false;
        let mut freeze_rotations = TurnSequence::new();

        for turn in iter::once(Turn::Identity).chain(solution.iter().copied()) {
            if turn != Turn::Identity {
                moves_so_far.push(turn);
                live = live.apply(&CubieCube::for_turn(turn).change_basis(&frame));
            }
            let found = match self.find_next(method, &current, &live, &mut orientation_cache)? {
                Some(found) => found,
                None => continue,
            };

            // Without an orientation the phase keeps the previous frame,
            // unless a frozen face already shifted it.
            let prerotation = if found.orientation.is_empty() && !frozen {
                TurnSequence::new()
            } else {
                found.prerotation
            };
            let prerotation_cube = CubieCube::from_turns(&prerotation);
            let mut next_frame = frame.apply(&found.orientation_cube).apply(&prerotation_cube);
            let mut rotated = self
                .turn_table
                .conjugate_sequence(&moves_so_far, &next_frame)
                .ok_or(ReconError::NotARotation)?;
            live = live
                .change_basis(&found.orientation_cube)
                .apply(&prerotation_cube);

            match found.phase.frozen_face {
                Some(Face::L) => frozen = true,
                Some(face) => return Err(ReconError::UnsupportedFreeze(face.to_string())),
                None => {}
            }
            if frozen {
                let (rewritten, rotations) = prefer_r_wide(&rotated, &self.turn_table)?;
                let undo = CubieCube::from_turns(&rotations).invert();
                next_frame = next_frame.apply(&undo);
                live = live.apply(&undo);
                rotated = rewritten;
                freeze_rotations = freeze_rotations.concat(&rotations);
            }

            debug!(
                "closed {} after {} turns: {}",
                found.phase.name,
                moves_so_far.len(),
                rotated
            );
            records.push(SolutionDesc {
                solution: moves_so_far,
                rotated_solution: rotated,
                orientation: Some(found.orientation.to_string()).filter(|o| !o.is_empty()),
                view: Some(prerotation.invert()).filter(|v| !v.is_empty()),
                score: 0,
                stage: found.phase.name.clone(),
                stage_id: found.stage_id,
            });
            closing_states.push(live);
            frame = next_frame;
            current = records[records.len() - 1].stage_id.clone();
            moves_so_far = TurnSequence::new();
        }
        if !freeze_rotations.is_empty() {
            debug!("frozen face rotations: {}", freeze_rotations);
        }
        Ok((records, closing_states))
    }
}

/// Segment with the default rotation search.
pub fn segment(
    method_id: &str,
    scramble: &str,
    solution: &str,
    methods: &MethodBook,
    phases: &PhaseBook,
) -> Result<Vec<SolutionDesc>> {
    Segmenter::new(methods, phases).segment(method_id, scramble, solution)
}

/// The state reached by replaying `records` after `scramble`: each phase's
/// orientation, then its view undone, then its rotated solution.
pub fn replay(scramble: &CubieCube, records: &[SolutionDesc]) -> Result<CubieCube> {
    records.iter().try_fold(*scramble, |cube, record| {
        let orientation: TurnSequence = record
            .orientation
            .as_deref()
            .unwrap_or("")
            .parse()?;
        let view = record.view.clone().unwrap_or_default();
        Ok(cube
            .change_basis_turns(&orientation)
            .apply_turns(&view.invert())
            .apply_turns(&record.rotated_solution))
    })
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;

    use super::*;
    use crate::presets::{
        self, CFOP, CFOP_SCRAMBLE, CFOP_SOLUTION, ROUX, ROUX_FROZEN_LEFT, ROUX_SCRAMBLE,
        ROUX_SOLUTION,
    };

    fn summary(records: &[SolutionDesc]) -> Vec<String> {
        records
            .iter()
            .map(|r| {
                format!(
                    "{} | {} | {} | {}",
                    r.stage,
                    r.rotated_solution,
                    r.orientation.as_deref().unwrap_or("-"),
                    r.view.as_ref().map_or("-".to_string(), |v| v.to_string()),
                )
            })
            .collect()
    }

    #[test]
    fn test_roux() {
        let (methods, phases) = presets::books();
        let records = segment(ROUX, ROUX_SCRAMBLE, ROUX_SOLUTION, &methods, &phases).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].orientation.as_deref(), Some("z y' ".trim_end()));
        assert_eq!(
            records[0].solution.to_string(),
            "B2 L2 B' L2 R' F R F2 S R2 B F' R'"
        );
        assert_debug_snapshot!(summary(&records), @r###"
        [
            "fb | L2 F2 L' F2 B' R B R2 M' B2 L R' B' | z y' | x",
            "ss_front | U2 R U R2 U' R' | - | -",
            "lp | R L' B2 R' B' M2 B' L U' L' B' M2 B' L U L' B' L | - | -",
            "cmll | R U R' U R U2 R' U R U R' F' R U R' U' R' F R2 U' R' | - | -",
            "lse | U | - | -",
            "solved | M' U2 M U2 M U M' U' M' U2 M' U M2 U' M U2 M U2 M2 U2 | - | -",
        ]
        "###);
        assert!(records.iter().all(|r| r.score == 0));
        assert_eq!(records[1].stage_id, "ss_front");
    }

    #[test]
    fn test_solutions_partition_the_input() {
        let (methods, phases) = presets::books();
        for (method, scramble, solution) in [
            (ROUX, ROUX_SCRAMBLE, ROUX_SOLUTION),
            (ROUX_FROZEN_LEFT, ROUX_SCRAMBLE, ROUX_SOLUTION),
            (CFOP, CFOP_SCRAMBLE, CFOP_SOLUTION),
        ]
        .iter()
        {
            let records = segment(method, scramble, solution, &methods, &phases).unwrap();
            let joined = records
                .iter()
                .fold(TurnSequence::new(), |acc, r| acc.concat(&r.solution));
            let input: TurnSequence = solution.parse().unwrap();
            assert_eq!(joined.to_string(), input.to_string(), "{}", method);
        }
    }

    #[test]
    fn test_replay_matches_the_solve() {
        let (methods, phases) = presets::books();
        for (method, scramble, solution) in [
            (ROUX, ROUX_SCRAMBLE, ROUX_SOLUTION),
            (ROUX_FROZEN_LEFT, ROUX_SCRAMBLE, ROUX_SOLUTION),
            (CFOP, CFOP_SCRAMBLE, CFOP_SOLUTION),
        ]
        .iter()
        {
            let records = segment(method, scramble, solution, &methods, &phases).unwrap();
            let scrambled = CubieCube::from_turns(&scramble.parse().unwrap());
            let replayed = replay(&scrambled, &records).unwrap();
            // Rotations the solver made during the last phase stay in place.
            assert!(
                all_orientations()
                    .iter()
                    .any(|o| replayed.apply(&o.cube).is_solved()),
                "{}",
                method
            );
        }
    }

    #[test]
    fn test_frozen_left_face() {
        let (methods, phases) = presets::books();
        let records =
            segment(ROUX_FROZEN_LEFT, ROUX_SCRAMBLE, ROUX_SOLUTION, &methods, &phases).unwrap();
        assert_debug_snapshot!(summary(&records), @r###"
        [
            "fb | r2 B2 r' U2 D' R D R2 M' D2 r R' F' | z y' | x",
            "ss_front | U2 R U R2 U' R' | - | x2",
            "lp | R r' U2 R' U' M2 U' r U' r' U' M2 U' r U r' U' r | - | -",
            "cmll | R U R' U R U2 R' U R U R' F' R U R' U' R' F R2 U' R' | - | -",
            "solved | U M' U2 M U2 M U M' U' M' U2 M' U M2 U' M U2 M U2 M2 U2 | - | -",
        ]
        "###);
        for record in records.iter() {
            assert!(!record
                .rotated_solution
                .iter()
                .any(|t| matches!(t.kind(), Some(TurnKind::L) | Some(TurnKind::WideL))));
        }
    }

    #[test]
    fn test_cfop() {
        let (methods, phases) = presets::books();
        let records = segment(CFOP, CFOP_SCRAMBLE, CFOP_SOLUTION, &methods, &phases).unwrap();
        assert_debug_snapshot!(summary(&records), @r###"
        [
            "cross | z2 B2 U2 R B' U r U' r' | x2 | y2 x2",
            "f2l | U2 L U L' D U r U R' U' M D' U2 L U2 L' U' L U L' U B U' L U L' U2 B' | - | -",
            "oll | U' B L U' L' U' L U L' B' | - | -",
            "pll | x' L2 D2 L U L' D2 L U' L F2 | - | -",
        ]
        "###);
        assert_eq!(records[3].solution.to_string(), "x R2 D2 R U R' D2 R U' R B2");
        // The rotation made before the last layer stays in the recorded turns.
        assert_eq!(
            records[3].rotated_solution.to_string(),
            "x' L2 D2 L U L' D2 L U' L F2"
        );
        assert!(records[3].view.is_none());
        let cross_view = records[0].view.clone().unwrap();
        assert_eq!(
            cross_view.invert().concat(&records[0].rotated_solution).to_string(),
            "x2 y2 z2 B2 U2 R B' U r U' r'"
        );
    }

    #[test]
    fn test_malformed_solve() {
        let (methods, phases) = presets::books();
        let unfinished = ROUX_SOLUTION.trim_end_matches("U2").trim_end();
        let err = segment(ROUX, ROUX_SCRAMBLE, unfinished, &methods, &phases).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Cube\n"));
        assert!(message.ends_with("does not look solved"));
        match err {
            ReconError::MalformedSolve { visualization } => {
                assert_eq!(visualization.lines().count(), 9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_method_and_bad_turns() {
        let (methods, phases) = presets::books();
        assert!(matches!(
            segment("nope", "", "", &methods, &phases),
            Err(ReconError::UnknownMethod(_))
        ));
        assert!(matches!(
            segment(ROUX, "R Q", "", &methods, &phases),
            Err(ReconError::ParseTurn(_))
        ));
    }

    #[test]
    fn test_zero_length_phase_and_trailing_turns() {
        let mut methods = MethodBook::default();
        methods.new_method("m", "Two step");
        methods.add_stage("m", None, "cross").unwrap();
        methods.add_stage("m", Some("cross"), "all").unwrap();
        let mut phases = PhaseBook::default();
        phases.new_stage(
            "cross",
            Phase::new("cross", crate::mask::Mask::from_positions(&[], &[4, 5, 6, 7], &[])),
        );
        phases.new_stage("all", Phase::new("all", crate::mask::Mask::solved()));

        // The cross is already solved before the first turn.
        let records = segment("m", "R U R' U'", "U R U' R'", &methods, &phases).unwrap();
        assert_eq!(
            records.iter().map(|r| r.solution.to_string()).collect::<Vec<_>>(),
            vec!["", "U R U' R'"]
        );

        // A solve ending in a rotation leaves that rotation unassigned.
        let records = segment("m", "R U R' U'", "U R U' R' y", &methods, &phases).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].solution.to_string(), "U R U' R'");
    }

    #[test]
    fn test_unsupported_freeze() {
        let mut methods = MethodBook::default();
        methods.new_method("m", "Frozen");
        methods.add_stage("m", None, "all").unwrap();
        let mut phases = PhaseBook::default();
        phases.new_stage(
            "all",
            Phase::new("all", crate::mask::Mask::solved()).with_frozen_face(Face::R),
        );
        assert!(matches!(
            segment("m", "R", "R'", &methods, &phases),
            Err(ReconError::UnsupportedFreeze(_))
        ));
    }

    #[test]
    fn test_prefer_r_wide() {
        let table = TurnTable::new();
        let turns: TurnSequence = "U L2 F l' R D".parse().unwrap();
        let (rewritten, rotations) = prefer_r_wide(&turns, &table).unwrap();
        assert!(!rewritten
            .iter()
            .any(|t| matches!(t.kind(), Some(TurnKind::L) | Some(TurnKind::WideL))));
        assert_eq!(rotations.iter().filter(|t| t.is_rotation()).count(), 2);
        assert_eq!(
            CubieCube::from_turns(&rewritten.concat(&rotations)),
            CubieCube::from_turns(&turns)
        );
        assert_eq!(rewritten.0[..2].to_vec(), vec![
            "U".parse::<Turn>().unwrap(),
            "r2".parse::<Turn>().unwrap()
        ]);

        let untouched: TurnSequence = "R U F".parse().unwrap();
        let (same, none) = prefer_r_wide(&untouched, &table).unwrap();
        assert_eq!(same.to_string(), "R U F");
        assert!(none.is_empty());
    }
}
