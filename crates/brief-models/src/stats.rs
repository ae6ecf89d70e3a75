//! Derived job statistics.
//!
//! Stats are recomputed on demand from the job records and are never
//! stored.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::job::{Job, JobStatus};

/// Aggregate for one (kind, status) bucket.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobStats {
    /// Job kind name
    pub kind: String,
    /// Job status
    pub status: JobStatus,
    /// Number of jobs in the bucket
    pub count: u64,
    /// Average execution duration in seconds, over jobs with a known
    /// duration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_duration_seconds: Option<f64>,
    /// Highest attempt count observed
    pub max_attempts_observed: u32,
}

/// Compute (kind, status) aggregates over a set of job records.
pub fn compute_stats(jobs: &[Job]) -> Vec<JobStats> {
    struct Bucket {
        count: u64,
        duration_sum: f64,
        duration_count: u64,
        max_attempts: u32,
    }

    let mut buckets: BTreeMap<(String, &'static str), (JobStatus, Bucket)> = BTreeMap::new();

    for job in jobs {
        let key = (job.kind.name().to_string(), job.status.as_str());
        let entry = buckets.entry(key).or_insert((
            job.status,
            Bucket {
                count: 0,
                duration_sum: 0.0,
                duration_count: 0,
                max_attempts: 0,
            },
        ));

        entry.1.count += 1;
        entry.1.max_attempts = entry.1.max_attempts.max(job.attempts);
        if let Some(duration) = job.duration() {
            entry.1.duration_sum += duration.num_milliseconds() as f64 / 1000.0;
            entry.1.duration_count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|((kind, _), (status, bucket))| JobStats {
            kind,
            status,
            count: bucket.count,
            avg_duration_seconds: if bucket.duration_count > 0 {
                Some(bucket.duration_sum / bucket.duration_count as f64)
            } else {
                None
            },
            max_attempts_observed: bucket.max_attempts,
        })
        .collect()
}
