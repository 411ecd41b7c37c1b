//! Fire times of schedule triggers.

use chrono::{DateTime, Utc};
use jobspec_core::{BuildSpec, JobTrigger};

/// The next `count` times after `after` at which `trigger` fires.
///
/// Empty for non-schedule triggers and unparsable expressions.
pub fn next_fire_times(trigger: &JobTrigger, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    match trigger.cron_schedule() {
        Some(schedule) => schedule.after(&after).take(count).collect(),
        None => vec![],
    }
}

/// A schedule trigger due to fire, with the job that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledFire<'a> {
    pub job_name: &'a str,
    pub cron_expression: &'a str,
    pub at: DateTime<Utc>,
}

/// Next fire time of every schedule trigger in `spec`, earliest first.
pub fn upcoming<'a>(spec: &'a BuildSpec, after: DateTime<Utc>) -> Vec<ScheduledFire<'a>> {
    let mut fires: Vec<ScheduledFire<'a>> = spec
        .jobs
        .iter()
        .flat_map(|job| job.triggers.iter().map(move |trigger| (job, trigger)))
        .filter_map(|(job, trigger)| {
            let JobTrigger::Schedule {
                cron_expression, ..
            } = trigger
            else {
                return None;
            };
            let at = next_fire_times(trigger, after, 1).into_iter().next()?;
            Some(ScheduledFire {
                job_name: job.name.as_str(),
                cron_expression: cron_expression.as_str(),
                at,
            })
        })
        .collect();
    fires.sort_by_key(|fire| fire.at);
    tracing::debug!(count = fires.len(), "Computed upcoming schedule fires");
    fires
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jobspec_core::Job;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, h, m, 0).unwrap()
    }

    fn schedule(expr: &str) -> JobTrigger {
        JobTrigger::Schedule {
            cron_expression: expr.into(),
            branches: vec![],
        }
    }

    #[test]
    fn test_next_fire_times() {
        let times = next_fire_times(&schedule("0 0 * * * *"), at(10, 30), 2);
        assert_eq!(times, vec![at(11, 0), at(12, 0)]);
    }

    #[test]
    fn test_non_schedule_trigger() {
        let trigger = JobTrigger::TagCreate { tags: vec![] };
        assert!(next_fire_times(&trigger, at(0, 0), 3).is_empty());
        assert!(next_fire_times(&schedule("bogus"), at(0, 0), 3).is_empty());
    }

    #[test]
    fn test_upcoming_sorted() {
        let mut nightly = Job::new("nightly", "alpine", vec!["true".into()]);
        nightly.triggers = vec![schedule("0 0 2 * * *")];
        let mut hourly = Job::new("hourly", "alpine", vec!["true".into()]);
        hourly.triggers = vec![schedule("0 15 * * * *")];
        let spec = BuildSpec::new(vec![nightly, hourly]);

        let fires = upcoming(&spec, at(0, 0));
        let names: Vec<&str> = fires.iter().map(|f| f.job_name).collect();
        assert_eq!(names, vec!["hourly", "nightly"]);
        assert_eq!(fires[0].at, at(0, 15));
        assert_eq!(fires[1].at, at(2, 0));
    }
}
