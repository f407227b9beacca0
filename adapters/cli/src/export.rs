use anyhow::{Context, Result};
use card_sort_core::{EXPERIMENT_NAME, PLAN_VERSION};
use card_sort_session::ExperimentPlan;
use serde::{Deserialize, Serialize};

/// JSON document handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlanDocument {
    name: String,
    version: String,
    seed: u64,
    plan: ExperimentPlan,
}

impl PlanDocument {
    pub(crate) fn new(plan: ExperimentPlan) -> Self {
        Self {
            name: EXPERIMENT_NAME.to_owned(),
            version: PLAN_VERSION.to_owned(),
            seed: plan.seed(),
            plan,
        }
    }

    /// Encodes the document as pretty-printed JSON.
    pub(crate) fn encode(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize the experiment plan")
    }
}
