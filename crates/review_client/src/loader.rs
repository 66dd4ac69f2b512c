use anyhow::anyhow;
use futures::future;
use shared::{domain::InstanceIndex, protocol::ModelOutputsResponse};
use tracing::{debug, warn};

use crate::{
    error::ReviewError,
    view::{HistoryMessage, InstanceView},
    ReviewApi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(InstanceView),
    OutOfRange,
}

/// Fetches the instance at `index` together with the progress counts. Both
/// requests run concurrently and nothing is returned until both finished.
pub async fn load_instance(
    api: &dyn ReviewApi,
    index: InstanceIndex,
) -> Result<LoadOutcome, ReviewError> {
    debug!(index = index.0, "review: fetching instance and progress");
    let (outputs, status) = future::join(api.model_outputs(index), api.instances_status()).await;

    let outputs = outputs.map_err(|source| ReviewError::LoadFailed { index, source })?;
    let (prompt, mut completions) = match outputs {
        ModelOutputsResponse::Error(body) if body.is_index_out_of_range() => {
            return Ok(LoadOutcome::OutOfRange);
        }
        ModelOutputsResponse::Error(body) => {
            warn!(index = index.0, error = %body.error, "review: instance endpoint returned error");
            return Err(ReviewError::LoadFailed {
                index,
                source: anyhow!("server error: {}", body.error),
            });
        }
        ModelOutputsResponse::Instance {
            prompt,
            completions,
        } => (prompt, completions),
    };

    if completions.len() != 2 {
        return Err(ReviewError::LoadFailed {
            index,
            source: anyhow!("expected 2 completions, got {}", completions.len()),
        });
    }
    let progress = status.map_err(|source| ReviewError::LoadFailed { index, source })?;
    let completion_b = completions.remove(1);
    let completion_a = completions.remove(0);

    Ok(LoadOutcome::Loaded(InstanceView {
        index,
        messages: vec![HistoryMessage::user(prompt)],
        completion_a,
        completion_b,
        progress,
    }))
}
