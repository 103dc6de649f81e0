//! Load test orchestration.
//!
//! A run submits `num_requests` iterations to a [`BoundedExecutor`] and folds
//! each iteration's outcome into a [`RunResult`] from a single task. Only
//! invalid run parameters abort a run; every per-iteration error becomes a
//! failure count.
mod iteration;
mod stats;


use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use url::Url;

use crate::error::{AppResult, ValidationError};
use crate::executor::BoundedExecutor;
use crate::http::{HttpTransport, RequestTemplate};
use crate::mapping::{FieldMappingConfig, MappingPlan};
use crate::source::{CollectionRef, DocumentSource};

use iteration::{IterationContext, run_iteration};
use stats::{FailureReason, IterationRecord, Outcome, RunAccumulator};

pub use stats::RunResult;

/// Parameters of one load test run.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub num_requests: usize,
    pub concurrency: usize,
    pub collection: CollectionRef,
    /// Limit on each transport call; expiry counts as a failed iteration.
    pub request_timeout: Option<Duration>,
    /// Fallback HS256 secret for `jwt` special fields.
    pub jwt_secret: Option<String>,
}

/// A validated run, ready to execute.
pub struct LoadTest {
    context: Arc<IterationContext>,
    num_requests: usize,
    concurrency: usize,
}

impl LoadTest {
    /// Validates the run before any iteration starts.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `num_requests` or `concurrency` is 0 or
    /// the template URL is not absolute, and a mapping error for malformed
    /// field paths.
    pub fn prepare(
        template: &RequestTemplate,
        mapping: &FieldMappingConfig,
        source: Arc<dyn DocumentSource>,
        transport: Arc<dyn HttpTransport>,
        params: &RunParams,
    ) -> AppResult<Self> {
        if params.num_requests == 0 {
            return Err(ValidationError::FieldMustBePositive { field: "requests" }.into());
        }
        if params.concurrency == 0 {
            return Err(ValidationError::FieldMustBePositive {
                field: "concurrency",
            }
            .into());
        }
        Url::parse(&template.url).map_err(|err| ValidationError::InvalidBaseUrl {
            url: template.url.clone(),
            source: err,
        })?;
        let plan = MappingPlan::compile(mapping, params.jwt_secret.as_deref())?;

        Ok(Self {
            context: Arc::new(IterationContext {
                template: template.clone(),
                plan,
                collection: params.collection.clone(),
                source,
                transport,
                request_timeout: params.request_timeout,
            }),
            num_requests: params.num_requests,
            concurrency: params.concurrency,
        })
    }

    /// Workers to start: never more than there are iterations to run.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.concurrency.min(self.num_requests)
    }

    /// Runs every iteration and returns the aggregate once all have settled.
    ///
    /// # Errors
    ///
    /// Returns an error only when a worker of the executor cannot be joined.
    pub async fn run(self) -> AppResult<RunResult> {
        info!(
            "Starting load test: {} requests at concurrency {} against {}",
            self.num_requests, self.concurrency, self.context.template.url
        );
        let started = Instant::now();
        let executor = BoundedExecutor::new(self.worker_count())?;

        let handles: Vec<_> = (0..self.num_requests)
            .map(|index| executor.enqueue(run_iteration(Arc::clone(&self.context), index)))
            .collect();

        let mut accumulator = RunAccumulator::with_capacity(self.num_requests);
        for handle in handles {
            match handle.await {
                Ok(record) => accumulator.record(record),
                Err(err) => {
                    warn!("Iteration did not complete: {}", err);
                    accumulator.record(IterationRecord {
                        elapsed_ms: 0,
                        outcome: Outcome::Failure(FailureReason::Panic),
                    });
                }
            }
        }
        executor.shutdown().await?;

        let result = accumulator.finish(started.elapsed());
        info!(
            "Load test finished: {} succeeded, {} failed in {}ms",
            result.successful_requests, result.failed_requests, result.duration_ms
        );
        Ok(result)
    }
}

/// Validates and runs a load test in one call.
///
/// # Errors
///
/// Returns configuration errors from [`LoadTest::prepare`]; per-iteration
/// failures are counted in the result instead.
pub async fn execute_load_test(
    template: &RequestTemplate,
    mapping: &FieldMappingConfig,
    source: Arc<dyn DocumentSource>,
    transport: Arc<dyn HttpTransport>,
    params: &RunParams,
) -> AppResult<RunResult> {
    LoadTest::prepare(template, mapping, source, transport, params)?
        .run()
        .await
}
