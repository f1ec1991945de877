use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cube::CubieCube;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TurnKind {
    U,
    R,
    F,
    D,
    L,
    B,
    WideU,
    WideR,
    WideF,
    WideD,
    WideL,
    WideB,
    M,
    E,
    S,
    X,
    Y,
    Z,
}

const LETTERS: &str = "URFDLBurfdlbMESxyz";

impl TurnKind {
    pub const ALL: [TurnKind; 18] = [
        TurnKind::U,
        TurnKind::R,
        TurnKind::F,
        TurnKind::D,
        TurnKind::L,
        TurnKind::B,
        TurnKind::WideU,
        TurnKind::WideR,
        TurnKind::WideF,
        TurnKind::WideD,
        TurnKind::WideL,
        TurnKind::WideB,
        TurnKind::M,
        TurnKind::E,
        TurnKind::S,
        TurnKind::X,
        TurnKind::Y,
        TurnKind::Z,
    ];

    pub fn from_letter(letter: char) -> Option<TurnKind> {
        LETTERS
            .chars()
            .position(|l| l == letter)
            .map(|i| Self::ALL[i])
    }

    pub fn letter(self) -> char {
        LETTERS.as_bytes()[self.rank()] as char
    }

    /// Position in `ALL`; used to generate commuting turns in one order only.
    pub fn rank(self) -> usize {
        self as usize
    }

    /// 0 for the x axis (R L M x), 1 for y (U D E y), 2 for z (F B S z).
    pub fn axis(self) -> u8 {
        use TurnKind::*;
        match self {
            R | L | WideR | WideL | M | X => 0,
            U | D | WideU | WideD | E | Y => 1,
            F | B | WideF | WideB | S | Z => 2,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, TurnKind::X | TurnKind::Y | TurnKind::Z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Identity,
    /// `amount` is in clockwise quarter turns, always 1, 2 or 3.
    Move { kind: TurnKind, amount: u8 },
}

impl Turn {
    pub fn new(kind: TurnKind, amount: i64) -> Turn {
        match amount.rem_euclid(4) {
            0 => Turn::Identity,
            amount => Turn::Move {
                kind,
                amount: amount as u8,
            },
        }
    }

    pub fn invert(self) -> Turn {
        match self {
            Turn::Identity => Turn::Identity,
            Turn::Move { kind, amount } => Turn::new(kind, -(amount as i64)),
        }
    }

    pub fn kind(self) -> Option<TurnKind> {
        match self {
            Turn::Identity => None,
            Turn::Move { kind, .. } => Some(kind),
        }
    }

    pub fn is_rotation(self) -> bool {
        self.kind().map_or(false, TurnKind::is_rotation)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Turn::Identity => Ok(()),
            Turn::Move { kind, amount } => match amount {
                1 => write!(f, "{}", kind.letter()),
                2 => write!(f, "{}2", kind.letter()),
                _ => write!(f, "{}'", kind.letter()),
            },
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("cannot parse turn `{0}`")]
pub struct ParseTurnError(pub String);

impl FromStr for Turn {
    type Err = ParseTurnError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let err = || ParseTurnError(token.to_string());
        let mut chars = token.chars();
        let kind = chars
            .next()
            .and_then(TurnKind::from_letter)
            .ok_or_else(err)?;
        let mut digits = String::new();
        let mut counter_clockwise = false;
        for c in chars {
            match c {
                '0'..='9' => digits.push(c),
                '\'' | '’' => counter_clockwise = true,
                _ => return Err(err()),
            }
        }
        let amount: i64 = if digits.is_empty() {
            1
        } else {
            digits.parse::<u32>().map_err(|_| err())? as i64
        };
        Ok(Turn::new(
            kind,
            if counter_clockwise { -amount } else { amount },
        ))
    }
}

/// An ordered list of turns. Equality compares canonical forms, so `R R`
/// equals `R2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TurnSequence(pub Vec<Turn>);

impl TurnSequence {
    pub fn new() -> Self {
        Self(vec![])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, turn: Turn) {
        if turn != Turn::Identity {
            self.0.push(turn);
        }
    }

    pub fn concat(&self, other: &TurnSequence) -> TurnSequence {
        let mut turns = self.0.clone();
        turns.extend(other.iter().copied());
        TurnSequence(turns)
    }

    pub fn invert(&self) -> TurnSequence {
        TurnSequence(self.0.iter().rev().map(|t| t.invert()).collect())
    }

    /// Number of turns that physically move pieces; rotations are free.
    pub fn move_count(&self) -> usize {
        self.0
            .iter()
            .filter(|t| **t != Turn::Identity && !t.is_rotation())
            .count()
    }

    /// Merge runs of the same kind and drop turns that cancel out.
    pub fn canonical(&self) -> TurnSequence {
        let mut stack: Vec<Turn> = vec![];
        for turn in self.0.iter() {
            let (kind, amount) = match turn {
                Turn::Identity => continue,
                Turn::Move { kind, amount } => (*kind, *amount),
            };
            match stack.last() {
                Some(Turn::Move {
                    kind: last_kind,
                    amount: last_amount,
                }) if *last_kind == kind => {
                    let merged = Turn::new(kind, (*last_amount + amount) as i64);
                    stack.pop();
                    if merged != Turn::Identity {
                        stack.push(merged);
                    }
                }
                _ => stack.push(*turn),
            }
        }
        TurnSequence(stack)
    }

    pub fn drop_prefix(&self, n: usize) -> TurnSequence {
        TurnSequence(self.0.iter().skip(n).copied().collect())
    }

    pub fn drop_suffix(&self, n: usize) -> TurnSequence {
        let keep = self.0.len().saturating_sub(n);
        TurnSequence(self.0[..keep].to_vec())
    }

    /// A random sequence of face turns where no two consecutive turns share
    /// an axis with the later one ranked lower.
    pub fn random_scramble<R: Rng>(rng: &mut R, len: usize) -> TurnSequence {
        let faces = &TurnKind::ALL[..6];
        let mut turns: Vec<Turn> = vec![];
        while turns.len() < len {
            let kind = faces[rng.gen_range(0..faces.len())];
            let amount = rng.gen_range(1..4);
            if let Some(last) = turns.last().and_then(|t| t.kind()) {
                if last.axis() == kind.axis() && last.rank() >= kind.rank() {
                    continue;
                }
            }
            turns.push(Turn::new(kind, amount));
        }
        TurnSequence(turns)
    }
}

impl PartialEq for TurnSequence {
    fn eq(&self, other: &Self) -> bool {
        self.canonical().0 == other.canonical().0
    }
}

impl Eq for TurnSequence {}

impl From<Vec<Turn>> for TurnSequence {
    fn from(turns: Vec<Turn>) -> Self {
        TurnSequence(turns.into_iter().filter(|t| *t != Turn::Identity).collect())
    }
}

impl FromStr for TurnSequence {
    type Err = ParseTurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let turns = s
            .split_whitespace()
            .map(Turn::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(turns.into())
    }
}

impl TryFrom<String> for TurnSequence {
    type Error = ParseTurnError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TurnSequence> for String {
    fn from(seq: TurnSequence) -> String {
        seq.to_string()
    }
}

impl fmt::Display for TurnSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .filter(|t| **t != Turn::Identity)
            .map(|t| t.to_string())
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// Every turn keyed by the state it produces, for rewriting turns into a
/// rotated frame.
pub struct TurnTable {
    by_state: HashMap<CubieCube, Turn>,
}

impl Default for TurnTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnTable {
    pub fn new() -> Self {
        let mut by_state = HashMap::new();
        for kind in TurnKind::ALL.iter() {
            for amount in 1..4 {
                let turn = Turn::new(*kind, amount);
                by_state
                    .entry(CubieCube::for_turn(turn))
                    .or_insert(turn);
            }
        }
        Self { by_state }
    }

    pub fn lookup(&self, state: &CubieCube) -> Option<Turn> {
        if state.is_solved() {
            return Some(Turn::Identity);
        }
        self.by_state.get(state).copied()
    }

    /// The turn that does in `frame` what `turn` does in the identity frame:
    /// `frame⁻¹ · turn · frame`. `None` when `frame` is not a whole-cube
    /// rotation.
    pub fn conjugate(&self, turn: Turn, frame: &CubieCube) -> Option<Turn> {
        self.lookup(&CubieCube::for_turn(turn).change_basis(frame))
    }

    pub fn conjugate_sequence(
        &self,
        turns: &TurnSequence,
        frame: &CubieCube,
    ) -> Option<TurnSequence> {
        turns
            .iter()
            .map(|t| self.conjugate(*t, frame))
            .collect::<Option<Vec<_>>>()
            .map(TurnSequence::from)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn seq(s: &str) -> TurnSequence {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_render() {
        assert_eq!(seq("R U R' U'").to_string(), "R U R' U'");
        assert_eq!(seq("  R2'   L2' B’ ").to_string(), "R2 L2 B'");
        assert_eq!(seq("U3 D4 F5").to_string(), "U' F");
        assert_eq!(seq("r l' M2 E S' x y2 z'").to_string(), "r l' M2 E S' x y2 z'");
        assert_eq!(seq("").to_string(), "");
        assert!(seq("").is_empty());
    }

    #[test]
    fn test_marker_placement() {
        // Recorded solves carry the counter-clockwise marker on either side
        // of the amount.
        for (a, b) in [("R2'", "R'2"), ("U'", "U’"), ("S2'", "S2’"), ("F3'", "F'3")].iter() {
            assert_eq!(seq(a).to_string(), seq(b).to_string());
        }
        assert_eq!(seq("F3'").to_string(), "F");
        assert_eq!(seq(&seq("R'2 U'").to_string()).to_string(), "R2 U'");
    }

    #[test]
    fn test_parse_errors() {
        assert_debug_snapshot!("R Q2".parse::<TurnSequence>(), @r###"
        Err(
            ParseTurnError(
                "Q2",
            ),
        )
        "###);
        assert!("R2x".parse::<TurnSequence>().is_err());
        assert!("U99999999999".parse::<TurnSequence>().is_err());
    }

    #[test]
    fn test_canonical_equality() {
        assert_eq!(seq("R R"), seq("R2"));
        assert_eq!(seq("R U U' R"), seq("R2"));
        assert_eq!(seq("R R'"), seq(""));
        assert_ne!(seq("R U"), seq("U R"));
        assert_eq!(seq("F F F").canonical().to_string(), "F'");
        assert_eq!(seq("R L L' R'").canonical().len(), 0);
    }

    #[test]
    fn test_invert_and_trim() {
        let s = seq("R U2 F' x");
        assert_eq!(s.invert().to_string(), "x' F U2 R'");
        assert_eq!(s.drop_prefix(1).to_string(), "U2 F' x");
        assert_eq!(s.drop_suffix(2).to_string(), "R U2");
        assert_eq!(s.drop_suffix(9).len(), 0);
        assert_eq!(s.concat(&seq("D")).to_string(), "R U2 F' x D");
        assert_eq!(s.move_count(), 3);
        assert!(CubieCube::from_turns(&s)
            .apply_turns(&s.invert())
            .is_solved());
    }

    #[test]
    fn test_conjugate() {
        let table = TurnTable::new();
        let x = CubieCube::from_turns(&seq("x"));
        let conjugated = table.conjugate_sequence(&seq("U R F M r"), &x).unwrap();
        assert_eq!(conjugated.to_string(), "B R U M r");
        let y = CubieCube::from_turns(&seq("y"));
        assert_eq!(
            table.conjugate_sequence(&seq("R F"), &y).unwrap().to_string(),
            "F L"
        );
        assert_eq!(table.conjugate(Turn::Identity, &y), Some(Turn::Identity));
        let not_a_rotation = CubieCube::from_turns(&seq("R"));
        assert_eq!(table.conjugate(Turn::new(TurnKind::U, 1), &not_a_rotation), None);
    }

    #[test]
    fn test_random_scramble() {
        let mut rng = StdRng::seed_from_u64(7);
        let scramble = TurnSequence::random_scramble(&mut rng, 25);
        assert_eq!(scramble.len(), 25);
        assert_eq!(scramble.canonical().len(), 25);
        assert_eq!(scramble.move_count(), 25);
    }

    #[test]
    fn test_serde_as_string() {
        let s: TurnSequence = serde_json::from_str("\"R U2 F'\"").unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"R U2 F'\"");
        assert!(serde_json::from_str::<TurnSequence>("\"R Q\"").is_err());
    }
}
