use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub mod cube;
pub mod error;
pub mod logger;
pub mod mask;
pub mod method;
pub mod optimizer;
pub mod orbit;
pub mod presets;
pub mod segment;
pub mod solver;
pub mod solves;
mod traverse_combinations;
pub mod turn;

pub use error::{ReconError, Result};
pub use method::{MethodBook, Phase, PhaseBook};
pub use optimizer::{optimize, OptimizerConfig, RankedAlternative};
pub use segment::{segment, SolutionDesc};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// One solve to analyze plus the methods and phases to analyze it with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub scramble: String,
    pub solution: String,
    pub method_id: String,
    pub methods: MethodBook,
    pub phases: PhaseBook,
    #[serde(default)]
    pub config: OptimizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub records: Vec<SolutionDesc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized: Option<Vec<Vec<RankedAlternative>>>,
}

impl AnalysisRequest {
    pub fn segment(&self) -> Result<Vec<SolutionDesc>> {
        segment(
            &self.method_id,
            &self.scramble,
            &self.solution,
            &self.methods,
            &self.phases,
        )
    }

    /// Segment, then search each phase for alternatives.
    pub fn analyze(&self, with_alternatives: bool) -> Result<Analysis> {
        let records = self.segment()?;
        let optimized = if with_alternatives {
            let search = solver::MaskSearch::new(&self.methods, &self.phases);
            Some(optimize(
                &self.scramble.parse()?,
                &records,
                &search,
                &self.config,
            )?)
        } else {
            None
        };
        Ok(Analysis { records, optimized })
    }
}

fn run(request_json: &str, with_alternatives: bool) -> Result<String> {
    let request: AnalysisRequest = serde_json::from_str(request_json)?;
    let analysis = request.analyze(with_alternatives)?;
    Ok(serde_json::to_string(&analysis)?)
}

fn to_js(err: ReconError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    if let Err(err) = logger::init() {
        web_sys::console::warn_1(&err.to_string().into());
    }
}

/// Split a solve into phases. Takes and returns JSON.
#[wasm_bindgen]
pub fn analyze_solve(request_json: &str) -> std::result::Result<String, JsValue> {
    run(request_json, false).map_err(to_js)
}

/// Split a solve into phases and find shorter alternatives for each.
#[wasm_bindgen]
pub fn optimize_solve(request_json: &str) -> std::result::Result<String, JsValue> {
    run(request_json, true).map_err(to_js)
}

#[wasm_bindgen]
pub fn random_scramble(len: usize) -> String {
    turn::TurnSequence::random_scramble(&mut rand::thread_rng(), len).to_string()
}
