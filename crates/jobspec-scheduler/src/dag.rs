//! DAG resolution for the jobs of a build spec.
//!
//! Jobs only guarantee that their own dependency lists are duplicate-free.
//! Whether every dependency resolves and the graph is acyclic is decided
//! here, before anything is scheduled.

use jobspec_core::{BuildSpec, Job};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DagError {
    #[error("Cycle detected in job dependencies: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),
    #[error("Job '{job}' depends on unknown job '{dependency}'")]
    UnknownDependency { job: String, dependency: String },
    #[error("Build spec has no jobs")]
    EmptySpec,
}

/// A node in the job DAG.
#[derive(Debug, Clone)]
pub struct DagNode<'a> {
    pub name: &'a str,
    pub job: &'a Job,
}

/// Directed acyclic graph of job dependencies. Edges point from a dependency
/// to the job that needs it.
#[derive(Debug)]
pub struct JobDag<'a> {
    graph: DiGraph<DagNode<'a>, ()>,
    name_to_index: HashMap<&'a str, NodeIndex>,
}

impl<'a> JobDag<'a> {
    /// Jobs without dependencies.
    pub fn roots(&self) -> Vec<&DagNode<'a>> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .count()
                    == 0
            })
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Jobs that depend on `job_name`.
    pub fn successors(&self, job_name: &str) -> Vec<&DagNode<'a>> {
        self.name_to_index
            .get(job_name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Outgoing)
                    .filter_map(|n| self.graph.node_weight(n))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Jobs that `job_name` depends on.
    pub fn predecessors(&self, job_name: &str) -> Vec<&DagNode<'a>> {
        self.name_to_index
            .get(job_name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .filter_map(|n| self.graph.node_weight(n))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Jobs in an order where every job comes after its dependencies.
    pub fn topological_order(&self) -> Result<Vec<&DagNode<'a>>, DagError> {
        toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&idx| self.graph.node_weight(idx))
                    .collect()
            })
            .map_err(|_| DagError::CycleDetected(self.find_cycle()))
    }

    pub fn jobs(&self) -> Vec<&DagNode<'a>> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Whether all dependencies of `job_name` are in `completed`.
    pub fn is_ready(&self, job_name: &str, completed: &[String]) -> bool {
        self.predecessors(job_name)
            .iter()
            .all(|pred| completed.iter().any(|c| c == pred.name))
    }

    fn find_cycle(&self) -> Vec<String> {
        let cycle = tarjan_scc(&self.graph).into_iter().find(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| self.graph.contains_edge(idx, idx))
        });
        let mut names: Vec<String> = cycle
            .unwrap_or_default()
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx))
            .map(|node| node.name.to_string())
            .collect();
        names.sort();
        names
    }
}

/// Builder for constructing job DAGs.
pub struct DagBuilder;

impl DagBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a DAG from a build spec.
    pub fn build<'a>(&self, spec: &'a BuildSpec) -> Result<JobDag<'a>, DagError> {
        if spec.jobs.is_empty() {
            return Err(DagError::EmptySpec);
        }

        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();

        for job in &spec.jobs {
            let node = DagNode {
                name: job.name.as_str(),
                job,
            };
            let idx = graph.add_node(node);
            name_to_index.insert(job.name.as_str(), idx);
        }

        for job in &spec.jobs {
            let job_idx = name_to_index[job.name.as_str()];
            for dep in job.dependency_names() {
                let dep_idx =
                    name_to_index
                        .get(dep)
                        .ok_or_else(|| DagError::UnknownDependency {
                            job: job.name.clone(),
                            dependency: dep.to_string(),
                        })?;
                graph.update_edge(*dep_idx, job_idx, ());
            }
        }

        let dag = JobDag {
            graph,
            name_to_index,
        };

        dag.topological_order()?;
        tracing::debug!(jobs = spec.jobs.len(), "Built job DAG");

        Ok(dag)
    }
}

impl Default for DagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobspec_core::dependency::JobDependency;

    fn make_job(name: &str, depends_on: Vec<&str>) -> Job {
        let mut job = Job::new(name, "alpine", vec!["echo test".to_string()]);
        job.job_dependencies = depends_on.into_iter().map(JobDependency::on).collect();
        job
    }

    #[test]
    fn test_linear_dag() {
        let spec = BuildSpec::new(vec![
            make_job("build", vec![]),
            make_job("test", vec!["build"]),
            make_job("deploy", vec!["test"]),
        ]);

        let builder = DagBuilder::new();
        let dag = builder.build(&spec).unwrap();

        let roots = dag.roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "build");

        let order: Vec<&str> = dag
            .topological_order()
            .unwrap()
            .iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(order, vec!["build", "test", "deploy"]);
    }

    #[test]
    fn test_parallel_dag() {
        let spec = BuildSpec::new(vec![
            make_job("build", vec![]),
            make_job("test-unit", vec!["build"]),
            make_job("test-integration", vec!["build"]),
            make_job("deploy", vec!["test-unit", "test-integration"]),
        ]);

        let dag = DagBuilder::new().build(&spec).unwrap();

        assert_eq!(dag.successors("build").len(), 2);
        assert_eq!(dag.predecessors("deploy").len(), 2);
        assert!(dag.is_ready("deploy", &["test-unit".into(), "test-integration".into()]));
        assert!(!dag.is_ready("deploy", &["test-unit".into()]));
    }

    #[test]
    fn test_cycle_detected() {
        let spec = BuildSpec::new(vec![
            make_job("a", vec!["c"]),
            make_job("b", vec!["a"]),
            make_job("c", vec!["b"]),
            make_job("d", vec![]),
        ]);

        let err = DagBuilder::new().build(&spec).unwrap_err();
        assert_eq!(
            err,
            DagError::CycleDetected(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(
            err.to_string(),
            "Cycle detected in job dependencies: a -> b -> c"
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let spec = BuildSpec::new(vec![make_job("a", vec!["a"])]);
        assert_eq!(
            DagBuilder::new().build(&spec).unwrap_err(),
            DagError::CycleDetected(vec!["a".into()])
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let spec = BuildSpec::new(vec![make_job("a", vec!["ghost"])]);
        assert_eq!(
            DagBuilder::new().build(&spec).unwrap_err(),
            DagError::UnknownDependency {
                job: "a".into(),
                dependency: "ghost".into()
            }
        );
    }

    #[test]
    fn test_empty_spec() {
        let spec = BuildSpec::new(vec![]);
        assert_eq!(
            DagBuilder::new().build(&spec).unwrap_err(),
            DagError::EmptySpec
        );
    }
}
