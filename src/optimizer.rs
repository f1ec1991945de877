use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cube::CubieCube;
use crate::error::Result;
use crate::logger::now_ms;
use crate::segment::SolutionDesc;
use crate::solver::{AlternativeSearch, SolverConfig};
use crate::turn::TurnSequence;

fn default_num_solution() -> usize {
    2
}

fn default_max_upper_limit() -> usize {
    11
}

fn default_first_phase_premoves() -> Vec<String> {
    ["", "x", "x2", "x'"].iter().map(|p| p.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Alternatives requested per premove.
    #[serde(default = "default_num_solution")]
    pub num_solution: usize,
    /// Search depth cap; a phase is never searched deeper than it was solved.
    #[serde(default = "default_max_upper_limit")]
    pub max_upper_limit: usize,
    /// Premoves for a first phase recorded without a view.
    #[serde(default = "default_first_phase_premoves")]
    pub first_phase_premoves: Vec<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            num_solution: default_num_solution(),
            max_upper_limit: default_max_upper_limit(),
            first_phase_premoves: default_first_phase_premoves(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedAlternative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    pub stage: String,
    pub solution: TurnSequence,
    pub score: usize,
}

fn orientation_of(record: &SolutionDesc) -> Result<TurnSequence> {
    Ok(record.orientation.as_deref().unwrap_or("").parse()?)
}

/// The state each phase is searched from: the scramble replayed through
/// every earlier record, then the phase's own orientation.
pub fn phase_start_states(scramble: &TurnSequence, records: &[SolutionDesc]) -> Result<Vec<CubieCube>> {
    let mut cube = CubieCube::from_turns(scramble);
    let mut states = Vec::with_capacity(records.len());
    for record in records {
        cube = cube.change_basis_turns(&orientation_of(record)?);
        states.push(cube);
        if let Some(view) = &record.view {
            cube = cube.apply_turns(&view.invert());
        }
        cube = cube.apply_turns(&record.rotated_solution);
    }
    Ok(states)
}

/// Ask `search` for shorter ways through each recorded phase.
///
/// Returns one list per record, best score first.
pub fn optimize<S: AlternativeSearch + ?Sized>(
    scramble: &TurnSequence,
    records: &[SolutionDesc],
    search: &S,
    config: &OptimizerConfig,
) -> Result<Vec<Vec<RankedAlternative>>> {
    let states = phase_start_states(scramble, records)?;
    let mut optimized = Vec::with_capacity(records.len());
    for (i, (record, state)) in records.iter().zip(states.iter()).enumerate() {
        let premoves = match &record.view {
            Some(view) => vec![view.invert().to_string()],
            None if i == 0 => config.first_phase_premoves.clone(),
            None => vec![String::new()],
        };
        let solver_config = SolverConfig {
            premoves,
            num_solution: config.num_solution,
            upper_limit: record.solution.len().min(config.max_upper_limit),
        };
        let previous = i
            .checked_sub(1)
            .map(|p| records[p].stage_id.as_str());

        let start = now_ms();
        let mut alternatives: Vec<RankedAlternative> = search
            .solve(&record.stage_id, state, &solver_config, previous)?
            .into_iter()
            .map(|candidate| RankedAlternative {
                orientation: record.orientation.clone(),
                stage: record.stage.clone(),
                solution: candidate.solution,
                score: candidate.score,
            })
            .collect();
        alternatives.sort_by_key(|a| a.score);
        info!(
            "{}: {} alternatives in {:.0}ms",
            record.stage,
            alternatives.len(),
            now_ms() - start
        );
        if let Some(best) = alternatives.first() {
            debug!("{}: best {} ({})", record.stage, best.solution, best.score);
        }
        optimized.push(alternatives);
    }
    Ok(optimized)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::ReconError;
    use crate::presets::{
        self, CFOP, CFOP_SCRAMBLE, CFOP_SOLUTION, ROUX, ROUX_FROZEN_LEFT, ROUX_SCRAMBLE,
        ROUX_SOLUTION,
    };
    use crate::segment::{segment, Segmenter};
    use crate::solver::{MaskSearch, SearchError, SolutionCandidate};

    /// Records every request and answers with fixed candidates.
    #[derive(Default)]
    struct RecordingSearch {
        requests: RefCell<Vec<(String, SolverConfig, Option<String>)>>,
    }

    impl AlternativeSearch for RecordingSearch {
        fn solve(
            &self,
            stage_id: &str,
            _state: &CubieCube,
            config: &SolverConfig,
            previous_stage_id: Option<&str>,
        ) -> std::result::Result<Vec<SolutionCandidate>, SearchError> {
            self.requests.borrow_mut().push((
                stage_id.to_string(),
                config.clone(),
                previous_stage_id.map(|p| p.to_string()),
            ));
            Ok(vec![
                SolutionCandidate {
                    solution: "R U R' U'".parse().unwrap(),
                    score: 4,
                },
                SolutionCandidate {
                    solution: "R2".parse().unwrap(),
                    score: 1,
                },
            ])
        }
    }

    struct FailingSearch;

    impl AlternativeSearch for FailingSearch {
        fn solve(
            &self,
            stage_id: &str,
            _state: &CubieCube,
            _config: &SolverConfig,
            _previous_stage_id: Option<&str>,
        ) -> std::result::Result<Vec<SolutionCandidate>, SearchError> {
            Err(SearchError::UnknownStage(stage_id.to_string()))
        }
    }

    fn roux_records() -> Vec<SolutionDesc> {
        let (methods, phases) = presets::books();
        segment(ROUX, ROUX_SCRAMBLE, ROUX_SOLUTION, &methods, &phases).unwrap()
    }

    fn scramble() -> TurnSequence {
        ROUX_SCRAMBLE.parse().unwrap()
    }

    #[test]
    fn test_requests_follow_the_records() {
        let records = roux_records();
        let search = RecordingSearch::default();
        let optimized = optimize(&scramble(), &records, &search, &OptimizerConfig::default()).unwrap();
        assert_eq!(optimized.len(), records.len());
        for alternatives in optimized.iter() {
            assert_eq!(
                alternatives.iter().map(|a| a.score).collect::<Vec<_>>(),
                vec![1, 4]
            );
        }
        assert_eq!(optimized[0][0].orientation.as_deref(), Some("z y'"));
        assert_eq!(optimized[1][0].stage, "ss_front");

        let requests = search.requests.borrow();
        let (stage, config, previous) = &requests[0];
        assert_eq!(stage, "fb");
        assert_eq!(config.premoves, vec!["x'".to_string()]);
        assert_eq!(config.upper_limit, 11);
        assert_eq!(config.num_solution, 2);
        assert_eq!(previous, &None);

        let (stage, config, previous) = &requests[1];
        assert_eq!(stage, "ss_front");
        assert_eq!(config.premoves, vec![String::new()]);
        assert_eq!(config.upper_limit, 6);
        assert_eq!(previous.as_deref(), Some("fb"));

        // The lse phase was a single turn.
        assert_eq!(requests[4].1.upper_limit, 1);
    }

    #[test]
    fn test_first_phase_without_view() {
        let mut records = roux_records();
        records[0].view = None;
        let search = RecordingSearch::default();
        let config = OptimizerConfig {
            max_upper_limit: 3,
            ..OptimizerConfig::default()
        };
        optimize(&scramble(), &records[..2], &search, &config).unwrap();
        let requests = search.requests.borrow();
        assert_eq!(requests[0].1.premoves, vec!["", "x", "x2", "x'"]);
        assert_eq!(requests[0].1.upper_limit, 3);
    }

    #[test]
    fn test_start_states_match_the_segmentation() {
        let records = roux_records();
        let states = phase_start_states(&scramble(), &records).unwrap();
        for (record, state) in records.iter().zip(states.iter()) {
            let premove = record.view.clone().unwrap_or_default().invert();
            let end = state
                .apply_turns(&premove)
                .apply_turns(&record.rotated_solution);
            let (_, phases) = presets::books();
            let phase = phases.get(&record.stage_id).unwrap();
            assert!(
                crate::solver::matches_with_free_face(&end, &phase.mask, phase.free_face),
                "{}",
                record.stage
            );
        }
        let last = records.last().unwrap();
        assert!(states[states.len() - 1]
            .apply_turns(&last.rotated_solution)
            .is_solved());
    }

    #[test]
    fn test_start_states_equal_the_live_states() {
        let (methods, phases) = presets::books();
        let segmenter = Segmenter::new(&methods, &phases);
        for (method, scramble, solution) in [
            (ROUX, ROUX_SCRAMBLE, ROUX_SOLUTION),
            (ROUX_FROZEN_LEFT, ROUX_SCRAMBLE, ROUX_SOLUTION),
            (CFOP, CFOP_SCRAMBLE, CFOP_SOLUTION),
        ]
        .iter()
        {
            let (records, closing_states) = segmenter
                .segment_with_states(method, scramble, solution)
                .unwrap();
            assert_eq!(records.len(), closing_states.len());
            let scramble: TurnSequence = scramble.parse().unwrap();
            let states = phase_start_states(&scramble, &records).unwrap();
            let mut live = CubieCube::from_turns(&scramble);
            for ((record, state), closed) in records.iter().zip(states.iter()).zip(closing_states) {
                let orientation = orientation_of(record).unwrap();
                assert_eq!(
                    *state,
                    live.change_basis_turns(&orientation),
                    "{} {}",
                    method,
                    record.stage
                );
                live = closed;
            }
        }
    }

    #[test]
    fn test_search_errors_propagate() {
        let records = roux_records();
        let err = optimize(&scramble(), &records, &FailingSearch, &OptimizerConfig::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::Search(SearchError::UnknownStage(_))));
    }

    #[test]
    fn test_first_block_alternatives() {
        let records = roux_records();
        let (methods, phases) = presets::books();
        let search = MaskSearch::new(&methods, &phases);
        let optimized = optimize(
            &scramble(),
            &records[..1],
            &search,
            &OptimizerConfig::default(),
        )
        .unwrap();
        let alternatives = &optimized[0];
        assert!(alternatives.len() >= 2);
        assert_eq!(alternatives[0].score, 6);
        assert!(alternatives
            .windows(2)
            .all(|pair| pair[0].score <= pair[1].score));

        let start = phase_start_states(&scramble(), &records).unwrap()[0];
        let mask = &phases.get("fb").unwrap().mask;
        for alternative in alternatives {
            assert!(alternative.score <= records[0].solution.len());
            assert_eq!(alternative.stage, "fb");
            assert!(mask.matches(&start.apply_turns(&alternative.solution)));
        }
    }

    #[test]
    fn test_config_defaults() {
        let config: OptimizerConfig = serde_json::from_str("{\"max_upper_limit\": 7}").unwrap();
        assert_eq!(
            config,
            OptimizerConfig {
                max_upper_limit: 7,
                ..OptimizerConfig::default()
            }
        );
    }
}
