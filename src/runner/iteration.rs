use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::HttpError;
use crate::http::{HttpTransport, RequestTemplate, materialize, merge_headers, merge_query};
use crate::mapping::MappingPlan;
use crate::source::{CollectionRef, DocumentSource};

use super::stats::{FailureReason, IterationRecord, Outcome};

/// Everything one iteration needs, shared read-only by all of them.
pub(super) struct IterationContext {
    pub(super) template: RequestTemplate,
    pub(super) plan: MappingPlan,
    pub(super) collection: CollectionRef,
    pub(super) source: Arc<dyn DocumentSource>,
    pub(super) transport: Arc<dyn HttpTransport>,
    pub(super) request_timeout: Option<Duration>,
}

/// Runs one fetch, resolve, materialize, send cycle and times it.
pub(super) async fn run_iteration(context: Arc<IterationContext>, index: usize) -> IterationRecord {
    let start = Instant::now();
    let outcome = context.attempt(index).await;
    IterationRecord {
        elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        outcome,
    }
}

impl IterationContext {
    async fn attempt(&self, index: usize) -> Outcome {
        let record = match self.source.fetch_sample_record(&self.collection).await {
            Ok(record) => record,
            Err(err) => {
                debug!("Iteration {}: fetching from {} failed: {}", index, self.collection, err);
                return Outcome::Failure(FailureReason::Source);
            }
        };

        let resolved = self.plan.resolve(&record);
        let query_params = merge_query(&self.template.query_params, &resolved.query_params);
        let headers = merge_headers(&self.template.headers, &resolved.headers);
        let request = match materialize(
            &self.template.method,
            &self.template.url,
            &query_params,
            &headers,
            &resolved.body,
        ) {
            Ok(request) => request,
            Err(err) => {
                debug!("Iteration {}: building request failed: {}", index, err);
                return Outcome::Failure(FailureReason::Mapping);
            }
        };

        let response = match self.request_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.transport.perform(request)).await {
                    Ok(response) => response,
                    Err(_elapsed) => {
                        debug!("Iteration {}: request timed out after {:?}", index, limit);
                        return Outcome::Failure(FailureReason::Timeout);
                    }
                }
            }
            None => self.transport.perform(request).await,
        };

        match response {
            Ok(response) if response.is_success() => Outcome::Success,
            Ok(response) => {
                debug!("Iteration {}: status {}", index, response.status);
                Outcome::Failure(FailureReason::Status(response.status))
            }
            Err(HttpError::Timeout { timeout_ms }) => {
                debug!("Iteration {}: transport timed out after {}ms", index, timeout_ms);
                Outcome::Failure(FailureReason::Timeout)
            }
            Err(err) => {
                debug!("Iteration {}: {}", index, err);
                Outcome::Failure(FailureReason::Transport)
            }
        }
    }
}
