use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::cube::CubieCube;
use crate::method::{Face, MethodBook, PhaseBook, SCRAMBLED};
use crate::traverse_combinations::{traverse_combinations, TraverseResult};
use crate::turn::{Turn, TurnKind, TurnSequence};

use super::pruning_table::PruningTables;
use super::{matches_with_free_face, AlternativeSearch, SearchError, SolutionCandidate, SolverConfig};

/// Move set used for an edge of the method graph that has none configured.
pub const DEFAULT_MOVESET: &str = "U D L R F B";

/// Iterative deepening over a phase's move set, pruned with pattern tables
/// built from the phase mask. Tables are cached per phase and move set.
pub struct MaskSearch<'a> {
    methods: &'a MethodBook,
    phases: &'a PhaseBook,
    tables: RefCell<HashMap<String, Rc<PruningTables>>>,
}

#[derive(Debug, Clone)]
struct SearchTurn {
    turn: Turn,
    kind: TurnKind,
    cube: CubieCube,
}

#[derive(Debug, Clone)]
struct Node {
    cube: CubieCube,
    path: Vec<usize>,
}

impl<'a> MaskSearch<'a> {
    pub fn new(methods: &'a MethodBook, phases: &'a PhaseBook) -> Self {
        Self {
            methods,
            phases,
            tables: RefCell::new(HashMap::new()),
        }
    }

    fn search_turns(moveset: &str) -> Result<Vec<SearchTurn>, SearchError> {
        let parsed: TurnSequence = moveset.parse()?;
        let mut kinds: Vec<TurnKind> = vec![];
        for kind in parsed.iter().filter_map(|t| t.kind()) {
            if !kind.is_rotation() && !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds
            .iter()
            .flat_map(|kind| {
                (1..4).map(move |amount| {
                    let turn = Turn::new(*kind, amount);
                    SearchTurn {
                        turn,
                        kind: *kind,
                        cube: CubieCube::for_turn(turn),
                    }
                })
            })
            .collect())
    }

    fn pruning_tables(
        &self,
        stage_id: &str,
        moveset: &str,
        turns: &[SearchTurn],
    ) -> Result<Rc<PruningTables>, SearchError> {
        let key = format!("{}|{}", stage_id, moveset);
        if let Some(tables) = self.tables.borrow().get(&key) {
            return Ok(Rc::clone(tables));
        }
        let phase = self
            .phases
            .get(stage_id)
            .map_err(|_| SearchError::UnknownStage(stage_id.to_string()))?;
        let moves: Vec<CubieCube> = turns.iter().map(|t| t.cube).collect();
        let tables = Rc::new(PruningTables::new(&phase.mask, &moves));
        debug!(
            "built pruning tables for {} over {} ({} entries)",
            stage_id,
            moveset,
            tables.num_entries()
        );
        self.tables.borrow_mut().insert(key, Rc::clone(&tables));
        Ok(tables)
    }
}

impl AlternativeSearch for MaskSearch<'_> {
    fn solve(
        &self,
        stage_id: &str,
        state: &CubieCube,
        config: &SolverConfig,
        previous_stage_id: Option<&str>,
    ) -> Result<Vec<SolutionCandidate>, SearchError> {
        let phase = self
            .phases
            .get(stage_id)
            .map_err(|_| SearchError::UnknownStage(stage_id.to_string()))?;
        phase
            .mask
            .validate()
            .map_err(|_| SearchError::MalformedMask(stage_id.to_string()))?;
        let moveset = self
            .methods
            .moveset(previous_stage_id.unwrap_or(SCRAMBLED), stage_id)
            .unwrap_or(DEFAULT_MOVESET);
        let turns = Self::search_turns(moveset)?;
        let tables = self.pruning_tables(stage_id, moveset, &turns)?;
        let mask = &phase.mask;
        let free_face = phase.free_face;
        // A trailing free-face turn is not counted by the tables.
        let slack = free_face.map_or(0, |_| 1);

        let indices: Vec<usize> = (0..turns.len()).collect();
        let mut candidates = vec![];
        for premove in config.premoves.iter() {
            let premove: TurnSequence = premove.parse()?;
            let start = state.apply_turns(&premove);
            let mut found: Vec<Vec<usize>> = vec![];
            for bound in 0..=config.upper_limit {
                let broke = traverse_combinations(
                    &indices,
                    bound,
                    Node {
                        cube: start,
                        path: vec![],
                    },
                    |node: &Node, index: &usize| {
                        let turn = &turns[*index];
                        if let Some(last) = node.path.last() {
                            let last = turns[*last].kind;
                            if last.axis() == turn.kind.axis() && last.rank() >= turn.kind.rank() {
                                return None;
                            }
                        }
                        let mut path = node.path.clone();
                        path.push(*index);
                        Some(Node {
                            cube: node.cube.apply(&turn.cube),
                            path,
                        })
                    },
                    &mut |node: &Node| {
                        let solved = matches_with_free_face(&node.cube, mask, free_face);
                        if node.path.len() == bound {
                            if solved {
                                found.push(node.path.clone());
                                if found.len() >= config.num_solution {
                                    return TraverseResult::Break;
                                }
                            }
                            return TraverseResult::Skip;
                        }
                        if solved {
                            return TraverseResult::Skip;
                        }
                        match tables.lower_bound(&node.cube) {
                            Some(h) if node.path.len() + h.saturating_sub(slack) <= bound => {
                                TraverseResult::Continue
                            }
                            _ => TraverseResult::Skip,
                        }
                    },
                );
                if broke {
                    break;
                }
            }
            for path in found {
                let mut solution = premove.clone();
                for index in path {
                    solution.push(turns[index].turn);
                }
                let score = solution.move_count();
                candidates.push(SolutionCandidate { solution, score });
            }
        }
        Ok(candidates)
    }
}
