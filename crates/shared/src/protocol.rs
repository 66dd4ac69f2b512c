use serde::{Deserialize, Serialize};

use crate::{
    domain::{Acceptability, InstanceIndex, InstanceQuality, ModelId, Preference},
    error::ApiErrorBody,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub model: ModelId,
    pub completion: String,
}

impl Completion {
    pub fn new(model: impl Into<String>, completion: impl Into<String>) -> Self {
        Self {
            model: ModelId::new(model),
            completion: completion.into(),
        }
    }
}

/// Body of `GET /api/model-outputs/{index}`. The server answers 200 for both
/// shapes, so the variant is told apart by its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelOutputsResponse {
    Instance {
        prompt: String,
        completions: Vec<Completion>,
    },
    Error(ApiErrorBody),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancesStatus {
    pub count_left_indices: u64,
    pub count_all_indices: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSubmission {
    pub index: InstanceIndex,
    pub model_a: ModelId,
    pub model_b: ModelId,
    pub prompt: String,
    pub completion_a: String,
    pub completion_b: String,
    pub completion_a_is_acceptable: Acceptability,
    pub completion_b_is_acceptable: Acceptability,
    pub preference: Preference,
    pub evaluator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub index: InstanceIndex,
    pub model_a: ModelId,
    pub model_b: ModelId,
    pub prompt: String,
    pub completion_a: String,
    pub completion_b: String,
    pub instance_quality: Option<InstanceQuality>,
    pub comment: String,
    pub evaluator: String,
}
