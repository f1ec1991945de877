use thiserror::Error;

use crate::solver::SearchError;
use crate::turn::ParseTurnError;

pub type Result<T> = std::result::Result<T, ReconError>;

#[derive(Debug, Error)]
pub enum ReconError {
    #[error("Cube\n{visualization}\ndoes not look solved")]
    MalformedSolve { visualization: String },

    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("unknown stage `{0}`")]
    UnknownStage(String),

    #[error("cannot freeze face `{0}`, only L is supported")]
    UnsupportedFreeze(String),

    #[error("frame is not a whole-cube rotation")]
    NotARotation,

    #[error("malformed mask {0}")]
    MalformedMask(String),

    #[error("solve `{solve_id}` has {len} moves but claims {scramble_len} scramble moves")]
    SolveOutOfRange {
        solve_id: String,
        scramble_len: usize,
        len: usize,
    },

    #[error(transparent)]
    ParseTurn(#[from] ParseTurnError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
