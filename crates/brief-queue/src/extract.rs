//! Job extraction from validated manifests.

use brief_models::{BriefId, Job, JobId, ProductionManifest};

/// Turn a manifest's job specs into durable job records.
///
/// Each record carries the manifest's scheduling priority and traces
/// back to the originating brief. Spec IDs are preserved so the caller
/// can correlate jobs with the manifest it submitted.
pub fn jobs_from_manifest(manifest: &ProductionManifest) -> Vec<Job> {
    let brief_id = manifest
        .source_refs
        .brief_id
        .as_deref()
        .map(BriefId::from_string);
    let priority = manifest.metadata.priority.unwrap_or(0);

    manifest
        .jobs
        .iter()
        .map(|spec| {
            let mut job = Job::new(spec.kind.clone()).with_priority(priority);
            job.id = JobId::from_string(spec.id.clone());
            if let Some(brief_id) = &brief_id {
                job = job.with_brief(brief_id.clone());
            }
            job
        })
        .collect()
}
