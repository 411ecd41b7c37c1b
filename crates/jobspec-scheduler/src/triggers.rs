//! Dispatching project events to the jobs they trigger.

use jobspec_core::{BuildSpec, JobTrigger, ProjectEvent};
use serde::Serialize;

/// A job selected to run for an event, with the trigger that selected it.
#[derive(Debug, Clone, Serialize)]
pub struct Dispatch<'a> {
    pub job_name: &'a str,
    /// Index of the matched trigger within the job's trigger list.
    pub trigger_index: usize,
    pub trigger: &'a JobTrigger,
}

/// Asks every job of a build spec whether an event fires it.
pub struct TriggerDispatcher;

impl TriggerDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Jobs fired by `event`, in job declaration order.
    ///
    /// Each job contributes at most one dispatch: its first matching trigger.
    pub fn dispatch<'a>(&self, spec: &'a BuildSpec, event: &ProjectEvent) -> Vec<Dispatch<'a>> {
        let dispatches: Vec<Dispatch<'a>> = spec
            .jobs
            .iter()
            .filter_map(|job| {
                let trigger = job.matched_trigger(event)?;
                let trigger_index = job
                    .triggers
                    .iter()
                    .position(|t| std::ptr::eq(t, trigger))?;
                Some(Dispatch {
                    job_name: job.name.as_str(),
                    trigger_index,
                    trigger,
                })
            })
            .collect();

        tracing::info!(
            event = event.kind(),
            jobs = dispatches.len(),
            "Dispatched event"
        );
        dispatches
    }
}

impl Default for TriggerDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobspec_core::Job;
    use jobspec_core::dependency::JobDependency;
    use jobspec_core::event::BuildStatus;

    fn spec() -> BuildSpec {
        let mut build = Job::new("build", "rust", vec!["cargo build".into()]);
        build.triggers = vec![
            JobTrigger::PullRequest {
                branches: vec![],
                paths: vec![],
                actions: vec![],
            },
            JobTrigger::BranchUpdate {
                branches: vec!["main".into()],
                paths: vec![],
            },
        ];

        let mut docs = Job::new("docs", "node", vec!["npm run docs".into()]);
        docs.triggers = vec![JobTrigger::BranchUpdate {
            branches: vec![],
            paths: vec!["docs/**".into()],
        }];

        let mut deploy = Job::new("deploy", "alpine", vec!["./deploy.sh".into()]);
        deploy.job_dependencies = vec![JobDependency::on("build")];
        deploy.triggers = vec![JobTrigger::DependencyFinished {
            require_successful: true,
        }];

        BuildSpec::new(vec![build, docs, deploy])
    }

    #[test]
    fn test_push_dispatch() {
        let spec = spec();
        let event = ProjectEvent::RefUpdated {
            ref_name: "refs/heads/main".into(),
            old_commit: "aa".parse().unwrap(),
            new_commit: "bb".parse().unwrap(),
            changed_files: vec!["docs/index.md".into()],
        };
        let dispatches = TriggerDispatcher::new().dispatch(&spec, &event);
        let fired: Vec<(&str, usize)> = dispatches
            .iter()
            .map(|d| (d.job_name, d.trigger_index))
            .collect();
        assert_eq!(fired, vec![("build", 1), ("docs", 0)]);
    }

    #[test]
    fn test_dependency_finished_dispatch() {
        let spec = spec();
        let event = ProjectEvent::BuildFinished {
            job_name: "build".into(),
            status: BuildStatus::Successful,
            ref_name: Some("refs/heads/main".into()),
        };
        let dispatches = TriggerDispatcher::new().dispatch(&spec, &event);
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].job_name, "deploy");
    }

    #[test]
    fn test_manual_event_fires_nothing() {
        let spec = spec();
        let dispatches =
            TriggerDispatcher::new().dispatch(&spec, &ProjectEvent::Manual { user: None });
        assert!(dispatches.is_empty());
    }
}
