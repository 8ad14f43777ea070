//! Recommendation and scoring heuristic
//!
//! A pure function of a pod's declared and observed resources. The CPU
//! recommendation is the observed peak itself; memory gets a 20% headroom
//! multiplier above the observed peak. The optimization score is the
//! unweighted mean of the per-resource over-provisioning ratios: near 1
//! means heavy over-provisioning, zero or negative means the pod is at or
//! under its recommended sizing. The score is recomputed on every call and
//! never cached.

use crate::models::PodMetrics;

/// Safety margin applied above observed peak memory
pub const MEMORY_HEADROOM: f64 = 1.2;

/// Signed over-provisioning ratio of a declared value against its
/// recommendation.
///
/// With no declared value the ratio saturates: 1.0 when something is
/// recommended anyway, 0.0 when both sides are zero.
pub fn diff_ratio(current: f64, recommended: f64) -> f64 {
    if current > 0.0 {
        (current - recommended) / current
    } else if recommended > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Fill in the recommended sizing and optimization score from the
/// current/observed fields.
pub fn apply_recommendation(metrics: &mut PodMetrics) {
    metrics.recommend_cpu = metrics.max_cpu;
    metrics.recommend_memory = metrics.max_memory * MEMORY_HEADROOM;

    let cpu_diff = diff_ratio(metrics.current_cpu, metrics.recommend_cpu);
    let mem_diff = diff_ratio(metrics.current_memory, metrics.recommend_memory);
    metrics.optimization_score = (cpu_diff + mem_diff) / 2.0;
}
