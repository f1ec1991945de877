//! Built-in methods: Roux, Roux holding the left block still, and Fridrich.

use crate::error::Result;
use crate::mask::Mask;
use crate::method::{Face, MethodBook, Phase, PhaseBook};
use crate::solver::all_orientations;

pub const ROUX: &str = "roux";
pub const ROUX_FROZEN_LEFT: &str = "roux_frozen_left";
pub const CFOP: &str = "cfop";

#[cfg(test)]
pub(crate) const ROUX_SCRAMBLE: &str =
    "U2 L2 U2 F' R2 B' L' B' L D' L2' U L2' D2' R2 F2 U2 F2 R2 R2' L2' D";
#[cfg(test)]
pub(crate) const ROUX_SOLUTION: &str = "B2' L2 B' L2 R' F R F2 S R2 B F' R' U2 F U F2 U' F' F B' R2' F' R' S2' R' B U' B' R' S2' R' B U B' R' B F U F' U F U2 F' U F U F' L' F U F' U' F' L F2 U' F' U S U2 S' U2 S' U S U' S U2 S U S2 U' S' U2 S' U2 S2' U2";
#[cfg(test)]
pub(crate) const CFOP_SCRAMBLE: &str = "F L2 B2 R2 F2 D' B2 U' B2 D2 L D R B' U2 B' L' D2";
#[cfg(test)]
pub(crate) const CFOP_SOLUTION: &str = "z2 F2 U2 L F' U l U' l' U2 R U R' D U l U L' U' M' D' U2 R U2 R' U' R U R' U F U' R U R' U2 F' U' F R U' R' U' R U R' F' x R2' D2 R U R' D2 R U' R B2";

const LEFT_BLOCK_CORNERS: [usize; 2] = [5, 6];
const LEFT_BLOCK_EDGES: [usize; 3] = [6, 9, 10];
const ALL_CORNERS: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
const BOTH_BLOCKS_EDGES: [usize; 6] = [6, 9, 10, 4, 8, 11];

fn every_orientation() -> Vec<String> {
    all_orientations()
        .iter()
        .map(|rotation| rotation.turns.to_string())
        .collect()
}

fn first_block() -> Phase {
    Phase::new(
        "fb",
        Mask::from_positions(&LEFT_BLOCK_CORNERS, &LEFT_BLOCK_EDGES, &[4]),
    )
    .with_orientations(every_orientation())
}

fn install_roux_phases(phases: &mut PhaseBook) {
    phases.new_stage("fb", first_block());
    phases.new_stage("fb_frozen", first_block().with_frozen_face(Face::L));
    phases.new_stage(
        "ss_front",
        Phase::new(
            "ss_front",
            Mask::from_positions(&[4, 5, 6], &[4, 6, 8, 9, 10], &[4, 5]),
        ),
    );
    phases.new_stage(
        "ss_back",
        Phase::new(
            "ss_back",
            Mask::from_positions(&[5, 6, 7], &[4, 6, 9, 10, 11], &[4, 5]),
        ),
    );
    phases.new_stage(
        "lp",
        Phase::new(
            "lp",
            Mask::from_positions(&[4, 5, 6, 7], &BOTH_BLOCKS_EDGES, &[4, 5]),
        ),
    );
    let cmll = Mask::from_positions(&ALL_CORNERS, &BOTH_BLOCKS_EDGES, &[4, 5]);
    phases.new_stage(
        "cmll",
        Phase::new("cmll", cmll.clone()).with_free_face(Face::U),
    );
    phases.new_stage("lse", Phase::new("lse", cmll));
    phases.new_stage("solved", Phase::new("solved", Mask::solved()));
}

fn install_roux_graph(methods: &mut MethodBook, id: &str, name: &str, first: &str) -> Result<()> {
    methods.new_method(id, name);
    methods.add_stage(id, None, first)?;
    methods.add_stage(id, Some(first), "ss_back")?;
    methods.add_stage(id, Some(first), "ss_front")?;
    methods.add_stage(id, Some("ss_back"), "lp")?;
    methods.add_stage(id, Some("ss_front"), "lp")?;
    methods.add_stage(id, Some("lp"), "cmll")?;
    for second_square in ["ss_back", "ss_front"].iter() {
        methods.set_moveset(first, second_square, "U R r M")?;
        methods.set_moveset(second_square, "lp", "U R r M")?;
    }
    methods.set_moveset("lp", "cmll", "U R F")?;
    methods.set_algsetname("lp", "cmll", "CMLL");
    Ok(())
}

pub fn install_roux(methods: &mut MethodBook, phases: &mut PhaseBook) -> Result<()> {
    install_roux_phases(phases);
    install_roux_graph(methods, ROUX, "Roux", "fb")?;
    methods.add_stage(ROUX, Some("cmll"), "lse")?;
    methods.add_stage(ROUX, Some("lse"), "solved")?;
    methods.set_moveset("cmll", "lse", "U M")?;
    methods.set_moveset("lse", "solved", "U M")?;
    Ok(())
}

/// Roux where the first block's face is never turned afterwards: later
/// phases are rewritten with `r`/`R` and an `x` rotation instead of `L`/`l`.
pub fn install_roux_frozen_left(methods: &mut MethodBook, phases: &mut PhaseBook) -> Result<()> {
    install_roux_phases(phases);
    install_roux_graph(methods, ROUX_FROZEN_LEFT, "Roux (left block held)", "fb_frozen")?;
    methods.add_stage(ROUX_FROZEN_LEFT, Some("cmll"), "solved")?;
    methods.set_moveset("cmll", "solved", "U M")?;
    Ok(())
}

pub fn install_cfop(methods: &mut MethodBook, phases: &mut PhaseBook) -> Result<()> {
    let cross = Mask::from_positions(&[], &[4, 5, 6, 7], &[]);
    let f2l = Mask::from_positions(&[4, 5, 6, 7], &[4, 5, 6, 7, 8, 9, 10, 11], &[]);
    phases.new_stage(
        "cross",
        Phase::new("cross", cross).with_orientations(every_orientation()),
    );
    phases.new_stage("f2l", Phase::new("f2l", f2l.clone()));
    phases.new_stage("oll", Phase::new("oll", f2l.with_all_oriented()));
    phases.new_stage("pll", Phase::new("pll", Mask::solved()));

    methods.new_method(CFOP, "Fridrich");
    methods.add_stage(CFOP, None, "cross")?;
    methods.add_stage(CFOP, Some("cross"), "f2l")?;
    methods.add_stage(CFOP, Some("f2l"), "oll")?;
    methods.add_stage(CFOP, Some("oll"), "pll")?;
    methods.set_moveset("cross", "f2l", "U R L F B D")?;
    methods.set_moveset("f2l", "oll", "U R F")?;
    methods.set_moveset("oll", "pll", "U R F")?;
    methods.set_algsetname("f2l", "oll", "OLL");
    methods.set_algsetname("oll", "pll", "PLL");
    Ok(())
}

/// A method book and phase book holding every preset.
pub fn books() -> (MethodBook, PhaseBook) {
    let mut methods = MethodBook::default();
    let mut phases = PhaseBook::default();
    for install in [install_roux, install_roux_frozen_left, install_cfop].iter() {
        if let Err(err) = install(&mut methods, &mut phases) {
            log::error!("skipping preset: {}", err);
        }
    }
    (methods, phases)
}
