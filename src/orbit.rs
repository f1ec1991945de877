/// One class of interchangeable pieces (corners, edges or centers).
///
/// `perm` and `ori` are indexed by position. `perm[i]` is the piece that
/// currently sits at position `i`, and `ori[i]` is the twist of that piece
/// relative to its home orientation, modulo `TWIST`.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub struct Orbit<const N: usize, const TWIST: u8> {
    // The indices of these arrays are the new (output side) positions.
    // The values of perm are the old (input side) positions to pull from.
    pub perm: [u8; N],
    pub ori: [u8; N],
}

impl<const N: usize, const TWIST: u8> Orbit<N, TWIST> {
    pub fn identity() -> Self {
        let mut perm = [0; N];
        for (i, p) in perm.iter_mut().enumerate() {
            *p = i as u8;
        }
        Self { perm, ori: [0; N] }
    }

    pub fn new(perm: [u8; N], ori: [u8; N]) -> Self {
        Self { perm, ori }
    }

    /// Apply another orbit after this one.
    /// Returns a new orbit that represents the combination.
    pub fn apply(&self, other: &Self) -> Self {
        let mut perm = [0; N];
        let mut ori = [0; N];
        for i in 0..N {
            let from = other.perm[i] as usize;
            perm[i] = self.perm[from];
            ori[i] = (self.ori[from] + other.ori[i]) % TWIST;
        }
        Self { perm, ori }
    }

    pub fn invert(&self) -> Self {
        let mut perm = [0; N];
        let mut ori = [0; N];
        for (i, val) in self.perm.iter().enumerate() {
            perm[*val as usize] = i as u8;
        }
        for i in 0..N {
            ori[i] = (TWIST - self.ori[perm[i] as usize]) % TWIST;
        }
        Self { perm, ori }
    }

    pub fn is_inverse_of(&self, other: &Self) -> bool {
        self.apply(other) == Self::identity()
    }

    /// The position currently holding `piece`.
    pub fn position_of(&self, piece: u8) -> usize {
        self.perm.iter().position(|p| *p == piece).unwrap_or(N)
    }

    pub fn is_solved(&self) -> bool {
        *self == Self::identity()
    }
}
