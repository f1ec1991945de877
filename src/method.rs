use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::mask::Mask;
use crate::turn::{TurnKind, TurnSequence};

/// Synthetic root of every method graph.
pub const SCRAMBLED: &str = "scrambled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    U,
    D,
    F,
    B,
    L,
    R,
}

impl Face {
    pub fn turn_kind(self) -> TurnKind {
        match self {
            Face::U => TurnKind::U,
            Face::D => TurnKind::D,
            Face::F => TurnKind::F,
            Face::B => TurnKind::B,
            Face::L => TurnKind::L,
            Face::R => TurnKind::R,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.turn_kind().letter())
    }
}

fn default_orientations() -> Vec<String> {
    vec![String::new()]
}

/// One step of a method: a goal mask plus the whole-cube orientations the
/// step may be performed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub mask: Mask,
    #[serde(default = "default_orientations")]
    pub orientations: Vec<String>,
    /// Face that is held still from this phase on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_face: Option<Face>,
    /// Face whose final turn does not matter for the goal (e.g. AUF).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_face: Option<Face>,
}

impl Phase {
    pub fn new(name: &str, mask: Mask) -> Phase {
        Phase {
            name: name.to_string(),
            mask,
            orientations: default_orientations(),
            frozen_face: None,
            free_face: None,
        }
    }

    pub fn with_orientations(mut self, orientations: Vec<String>) -> Phase {
        self.orientations = if orientations.is_empty() {
            default_orientations()
        } else {
            orientations
        };
        self
    }

    pub fn with_frozen_face(mut self, face: Face) -> Phase {
        self.frozen_face = Some(face);
        self
    }

    pub fn with_free_face(mut self, face: Face) -> Phase {
        self.free_face = Some(face);
        self
    }

    pub fn parsed_orientations(&self) -> Result<Vec<TurnSequence>> {
        if self.orientations.is_empty() {
            return Ok(vec![TurnSequence::new()]);
        }
        self.orientations
            .iter()
            .map(|o| o.parse().map_err(ReconError::from))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Phase id to successor phase ids, rooted at `SCRAMBLED`.
    #[serde(default)]
    pub graph: BTreeMap<String, Vec<String>>,
}

impl Method {
    pub fn successors(&self, phase_id: &str) -> &[String] {
        self.graph
            .get(phase_id)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}

pub fn make_from_to_key(from_id: &str, to_id: &str) -> String {
    format!("{}||{}", from_id, to_id)
}

/// Every method plus the per-edge move sets and algorithm set names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBook {
    #[serde(default)]
    pub methods: BTreeMap<String, Method>,
    #[serde(default)]
    pub movesets: BTreeMap<String, String>,
    #[serde(default)]
    pub algset_names: BTreeMap<String, String>,
}

impl MethodBook {
    pub fn get(&self, method: &str) -> Result<&Method> {
        self.methods
            .get(method)
            .ok_or_else(|| ReconError::UnknownMethod(method.to_string()))
    }

    fn get_mut(&mut self, method: &str) -> Result<&mut Method> {
        self.methods
            .get_mut(method)
            .ok_or_else(|| ReconError::UnknownMethod(method.to_string()))
    }

    pub fn new_method(&mut self, id: &str, name: &str) {
        self.methods.insert(
            id.to_string(),
            Method {
                name: name.to_string(),
                graph: BTreeMap::new(),
            },
        );
    }

    pub fn delete_method(&mut self, id: &str) {
        self.methods.remove(id);
    }

    /// Append `stage` to the successors of `parent` (default `SCRAMBLED`).
    pub fn add_stage(&mut self, method: &str, parent: Option<&str>, stage: &str) -> Result<()> {
        let parent = parent.unwrap_or(SCRAMBLED);
        self.get_mut(method)?
            .graph
            .entry(parent.to_string())
            .or_default()
            .push(stage.to_string());
        Ok(())
    }

    /// Splice `stage` out of the graph: its children take its place in every
    /// parent's successor list, then anything no longer reachable from
    /// `SCRAMBLED` is dropped.
    pub fn remove_stage(&mut self, method: &str, stage: &str) -> Result<()> {
        let graph = &mut self.get_mut(method)?.graph;
        let children = graph.remove(stage).unwrap_or_default();
        for successors in graph.values_mut() {
            if !successors.iter().any(|s| s == stage) {
                continue;
            }
            let mut spliced: Vec<String> = vec![];
            for s in successors.iter() {
                let replacement = if s == stage {
                    children.as_slice()
                } else {
                    std::slice::from_ref(s)
                };
                for r in replacement {
                    if !spliced.contains(r) {
                        spliced.push(r.clone());
                    }
                }
            }
            *successors = spliced;
        }

        let mut reachable = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from(vec![SCRAMBLED]);
        while let Some(node) = queue.pop_front() {
            if !reachable.insert(node.to_string()) {
                continue;
            }
            if let Some(successors) = graph.get(node) {
                queue.extend(successors.iter().map(|s| s.as_str()));
            }
        }
        graph.retain(|node, _| reachable.contains(node));
        Ok(())
    }

    /// Rename the node `stage` to `name`, relabelling every edge into it.
    pub fn rename_stage(&mut self, method: &str, stage: &str, name: &str) -> Result<()> {
        let graph = &mut self.get_mut(method)?.graph;
        let links = graph.remove(stage).unwrap_or_default();
        graph.insert(name.to_string(), links);
        for successors in graph.values_mut() {
            for s in successors.iter_mut() {
                if s == stage {
                    *s = name.to_string();
                }
            }
        }
        Ok(())
    }

    pub fn set_moveset(&mut self, from_id: &str, to_id: &str, moveset: &str) -> Result<()> {
        moveset.parse::<TurnSequence>()?;
        self.movesets
            .insert(make_from_to_key(from_id, to_id), moveset.to_string());
        Ok(())
    }

    pub fn set_algsetname(&mut self, from_id: &str, to_id: &str, name: &str) {
        self.algset_names
            .insert(make_from_to_key(from_id, to_id), name.to_string());
    }

    pub fn moveset(&self, from_id: &str, to_id: &str) -> Option<&str> {
        self.movesets
            .get(&make_from_to_key(from_id, to_id))
            .map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PieceOrbit {
    Corners,
    Edges,
    Centers,
}

/// Phase table keyed by phase id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseBook {
    pub phases: BTreeMap<String, Phase>,
}

impl PhaseBook {
    pub fn get(&self, stage: &str) -> Result<&Phase> {
        self.phases
            .get(stage)
            .ok_or_else(|| ReconError::UnknownStage(stage.to_string()))
    }

    pub fn new_stage(&mut self, stage: &str, phase: Phase) {
        self.phases.insert(stage.to_string(), phase);
    }

    pub fn duplicate_stage(&mut self, stage: &str, copy_to: &str) -> Result<()> {
        let copy = self.get(stage)?.clone();
        self.phases.insert(copy_to.to_string(), copy);
        Ok(())
    }

    pub fn delete_stage(&mut self, stage: &str) {
        self.phases.remove(stage);
    }

    /// Toggle one mask bit. Orientation flags are materialized from the
    /// position flags the first time they are set; a missing center array
    /// starts fully constrained. Centers have no orientation.
    pub fn set_state(
        &mut self,
        stage: &str,
        orbit: PieceOrbit,
        index: usize,
        oriented: Option<bool>,
        positioned: Option<bool>,
    ) -> Result<()> {
        let mask = &mut self
            .phases
            .get_mut(stage)
            .ok_or_else(|| ReconError::UnknownStage(stage.to_string()))?
            .mask;
        let (positions, orientations) = match orbit {
            PieceOrbit::Corners => (&mut mask.cp, Some(&mut mask.co)),
            PieceOrbit::Edges => (&mut mask.ep, Some(&mut mask.eo)),
            PieceOrbit::Centers => (mask.tp.get_or_insert_with(|| vec![1; 6]), None),
        };
        if index >= positions.len() {
            return Err(ReconError::MalformedMask(format!(
                "index {} out of range for {:?}",
                index, orbit
            )));
        }
        if let (Some(oriented), Some(orientations)) = (oriented, orientations) {
            let flags = orientations.get_or_insert_with(|| positions.clone());
            flags[index] = oriented as u8;
        }
        if let Some(positioned) = positioned {
            positions[index] = positioned as u8;
        }
        Ok(())
    }
}
