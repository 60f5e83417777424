//! Text and JSON rendering of orchestrator state.

use std::fmt::Write as _;

use serde::Serialize;

use crate::constants::report::{
    LOADING_LINE, NO_GROUPINGS_LINE, NOT_STARTED_LINE, PAIRS_HEADING, SAMPLE_HEADING,
};
use crate::metrics::{PairCoverage, pair_coverage};
use crate::orchestrator::{PhaseState, PresentationState};

/// JSON document emitted for one settled cycle.
#[derive(Debug, Serialize)]
pub struct CycleReport<'a> {
    /// Seed to pass back for a replay.
    pub base_seed: u64,
    /// Settled state, flattened into the document.
    #[serde(flatten)]
    pub state: &'a PresentationState,
    /// Coverage statistics when pairing is ready.
    pub coverage: Option<PairCoverage>,
}

impl<'a> CycleReport<'a> {
    /// Build the report for `state`.
    pub fn new(base_seed: u64, state: &'a PresentationState) -> Self {
        let coverage = match state.pairing {
            PhaseState::Ready => pair_coverage(&state.sample, &state.pairs),
            _ => None,
        };
        Self {
            base_seed,
            state,
            coverage,
        }
    }
}

/// Render `state` as a human-readable report.
pub fn render_text(state: &PresentationState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SAMPLE_HEADING}");
    match state.sampling {
        PhaseState::Idle => {
            let _ = writeln!(out, "{NOT_STARTED_LINE}");
        }
        PhaseState::Loading => {
            let _ = writeln!(out, "{LOADING_LINE}");
        }
        PhaseState::Ready | PhaseState::Failed => {
            for (idx, country) in state.sample.iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {}", idx + 1, country.name);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{PAIRS_HEADING}");
    if let Some(failure) = &state.failure {
        let kind = serde_json::to_value(failure.kind)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        let _ = writeln!(out, "Error ({kind}): {}", failure.message);
        return out;
    }
    match state.pairing {
        PhaseState::Idle => {
            let _ = writeln!(out, "{NOT_STARTED_LINE}");
        }
        PhaseState::Loading => {
            let _ = writeln!(out, "{LOADING_LINE}");
        }
        PhaseState::Ready if state.pairs.is_empty() => {
            let _ = writeln!(out, "{NO_GROUPINGS_LINE}");
        }
        PhaseState::Ready | PhaseState::Failed => {
            for (idx, pair) in state.pairs.iter().enumerate() {
                let _ = writeln!(out, "{:>3}. \"{}\" & \"{}\"", idx + 1, pair.name1, pair.name2);
            }
        }
    }

    if state.pairing == PhaseState::Ready
        && let Some(coverage) = pair_coverage(&state.sample, &state.pairs)
    {
        let _ = writeln!(out);
        let _ = write!(
            out,
            "Coverage: {} of {} sampled countries share a border with another sampled country",
            coverage.connected, coverage.sampled
        );
        if !coverage.isolated.is_empty() {
            let _ = write!(out, " (isolated: {})", coverage.isolated.join(", "));
        }
        let _ = writeln!(out);
    }
    out
}

/// Render a settled cycle as pretty-printed JSON.
pub fn render_json(base_seed: u64, state: &PresentationState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&CycleReport::new(base_seed, state))
}
