//! Summaries over detection output

use serde::Serialize;

use crate::detection::AnnotatedResult;

/// Per-meter totals for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeterSummary {
    pub meter_code: String,
    pub total: usize,
    pub evaluated: usize,
    pub anomalies: usize,
}

// meters appear in the same order as in `results`
pub fn summarize(results: &[AnnotatedResult]) -> Vec<MeterSummary> {
    let mut summaries: Vec<MeterSummary> = Vec::new();

    for r in results {
        let pos = match summaries.iter().position(|s| s.meter_code == r.meter_code()) {
            Some(pos) => pos,
            None => {
                summaries.push(MeterSummary {
                    meter_code: r.meter_code().to_string(),
                    total: 0,
                    evaluated: 0,
                    anomalies: 0,
                });
                summaries.len() - 1
            }
        };

        let summary = &mut summaries[pos];
        summary.total += 1;
        summary.evaluated += r.is_evaluated() as usize;
        summary.anomalies += r.is_anomaly as usize;
    }
    summaries
}

pub fn anomalies_only(results: Vec<AnnotatedResult>) -> Vec<AnnotatedResult> {
    results.into_iter().filter(|r| r.is_anomaly).collect()
}
