use serde::{Deserialize, Serialize};

use crate::cube::{CubieCube, NUM_CENTERS, NUM_CORNERS, NUM_EDGES};
use crate::error::{ReconError, Result};

/// Don't-care pattern over a `CubieCube`. A 1 marks a position that must
/// hold its home piece (`cp`, `ep`, `tp`) or must be untwisted (`co`, `eo`).
/// A missing `co`/`eo` follows `cp`/`ep`; a missing `tp` constrains no center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    pub cp: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co: Option<Vec<u8>>,
    pub ep: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eo: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<Vec<u8>>,
}

fn flags(len: usize, set: &[usize]) -> Vec<u8> {
    (0..len).map(|i| set.contains(&i) as u8).collect()
}

fn is_set(flags: &[u8], i: usize) -> bool {
    flags.get(i).map_or(false, |f| *f != 0)
}

impl Mask {
    /// Constrain the listed corner, edge and center positions, orientation
    /// included.
    pub fn from_positions(corners: &[usize], edges: &[usize], centers: &[usize]) -> Mask {
        Mask {
            cp: flags(NUM_CORNERS, corners),
            co: None,
            ep: flags(NUM_EDGES, edges),
            eo: None,
            tp: Some(flags(NUM_CENTERS, centers)),
        }
    }

    pub fn solved() -> Mask {
        Mask {
            cp: vec![1; NUM_CORNERS],
            co: None,
            ep: vec![1; NUM_EDGES],
            eo: None,
            tp: Some(vec![1; NUM_CENTERS]),
        }
    }

    /// Require every piece to be oriented, whatever its position.
    pub fn with_all_oriented(mut self) -> Mask {
        self.co = Some(vec![1; NUM_CORNERS]);
        self.eo = Some(vec![1; NUM_EDGES]);
        self
    }

    pub fn corner_positioned(&self, i: usize) -> bool {
        is_set(&self.cp, i)
    }

    pub fn corner_oriented(&self, i: usize) -> bool {
        is_set(self.co.as_ref().unwrap_or(&self.cp), i)
    }

    pub fn edge_positioned(&self, i: usize) -> bool {
        is_set(&self.ep, i)
    }

    pub fn edge_oriented(&self, i: usize) -> bool {
        is_set(self.eo.as_ref().unwrap_or(&self.ep), i)
    }

    pub fn center_positioned(&self, i: usize) -> bool {
        self.tp.as_ref().map_or(false, |tp| is_set(tp, i))
    }

    pub fn validate(&self) -> Result<()> {
        let ok = self.cp.len() == NUM_CORNERS
            && self.ep.len() == NUM_EDGES
            && self.co.as_ref().map_or(true, |co| co.len() == NUM_CORNERS)
            && self.eo.as_ref().map_or(true, |eo| eo.len() == NUM_EDGES)
            && self.tp.as_ref().map_or(true, |tp| tp.len() == NUM_CENTERS);
        if ok {
            Ok(())
        } else {
            Err(ReconError::MalformedMask(format!("{:?}", self)))
        }
    }

    pub fn matches(&self, cube: &CubieCube) -> bool {
        (0..NUM_CORNERS).all(|i| {
            (!self.corner_positioned(i) || cube.corners.perm[i] as usize == i)
                && (!self.corner_oriented(i) || cube.corners.ori[i] == 0)
        }) && (0..NUM_EDGES).all(|i| {
            (!self.edge_positioned(i) || cube.edges.perm[i] as usize == i)
                && (!self.edge_oriented(i) || cube.edges.ori[i] == 0)
        }) && (0..NUM_CENTERS)
            .all(|i| !self.center_positioned(i) || cube.centers.perm[i] as usize == i)
    }
}
