//! Job status roll-up and grouping for the scan report detail view.

use std::collections::BTreeMap;

use crate::models::{GeneralStatus, Job, StageStatus};

/// Number of jobs one rules run produces for a table.
pub const JOBS_PER_RUN: usize = 3;

/// Roll the jobs of a table up into one status.
///
/// Any running job wins, then any failure. Only a non-empty set of completed
/// jobs is complete; everything else has not started.
pub fn general_status(jobs: &[Job]) -> GeneralStatus {
    let statuses: Vec<Option<StageStatus>> = jobs.iter().map(Job::stage_status).collect();

    if statuses.contains(&Some(StageStatus::InProgress)) {
        return GeneralStatus::InProgress;
    }
    if statuses.contains(&Some(StageStatus::Failed)) {
        return GeneralStatus::Failed;
    }
    if !statuses.is_empty() && statuses.iter().all(|s| *s == Some(StageStatus::Complete)) {
        return GeneralStatus::Complete;
    }
    GeneralStatus::NotStarted
}

/// Split jobs into runs of three, each ordered by `created_at`.
///
/// A trailing run with fewer than three jobs is still in flight and is dropped.
pub fn divide_jobs(jobs: Vec<Job>) -> Vec<Vec<Job>> {
    jobs.chunks_exact(JOBS_PER_RUN)
        .map(|run| {
            let mut run = run.to_vec();
            run.sort_by_key(|job| job.created_at);
            run
        })
        .collect()
}

/// Group jobs by the table they ran for. Jobs without a table are skipped.
pub fn jobs_by_table(jobs: Vec<Job>) -> BTreeMap<i64, Vec<Job>> {
    let mut grouped: BTreeMap<i64, Vec<Job>> = BTreeMap::new();
    for job in jobs {
        if let Some(table_id) = job.scan_report_table_id {
            grouped.entry(table_id).or_default().push(job);
        }
    }
    grouped
}
