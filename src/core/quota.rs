//! Per-plan feature limits from the subscription state.
//!
//! The plan table is embedded at compile time from `config/plans.json`.
//! A limit of `-1` means unlimited, matching the upstream subscription
//! provider's convention.

use std::collections::HashMap;

use serde::Deserialize;

/// Feature key for the generation quota.
pub const AI_GENERATIONS: &str = "ai_generations";

/// Sentinel limit meaning "no limit".
pub const UNLIMITED: i64 = -1;

/// Source of per-feature limits for the active plan.
pub trait QuotaSource: Send + Sync {
    /// Limit for a feature; `-1` means unlimited.
    fn feature_limit(&self, feature: &str) -> i64;
}

#[derive(Debug, Clone, Deserialize)]
struct PlanLimits {
    ai_generations: i64,
}

/// Quota source backed by the embedded plan table.
#[derive(Debug, Clone)]
pub struct PlanQuota {
    plan_id: String,
    limits: PlanLimits,
}

fn plan_table() -> HashMap<String, PlanLimits> {
    let json = include_str!("../../config/plans.json");
    serde_json::from_str(json).expect("plans.json must be valid")
}

impl PlanQuota {
    /// Resolve a plan by id. Unknown plans fall back to the free tier.
    pub fn for_plan(plan_id: &str) -> Self {
        let mut table = plan_table();
        let (plan_id, limits) = match table.remove(plan_id) {
            Some(limits) => (plan_id.to_string(), limits),
            None => {
                log::warn!("Unknown plan '{}', using free tier limits", plan_id);
                let free = table
                    .remove("free")
                    .expect("plans.json must define a 'free' plan");
                ("free".to_string(), free)
            }
        };
        Self { plan_id, limits }
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }
}

impl QuotaSource for PlanQuota {
    fn feature_limit(&self, feature: &str) -> i64 {
        match feature {
            AI_GENERATIONS => self.limits.ai_generations,
            _ => UNLIMITED,
        }
    }
}

/// True when another generation is permitted under `limit` with `used` already consumed.
pub fn within_limit(used: usize, limit: i64) -> bool {
    limit == UNLIMITED || (used as i64) < limit
}
