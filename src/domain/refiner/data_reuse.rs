use std::collections::HashSet;

use crate::domain::catalog::replica_catalog::ReplicaCatalog;
use crate::domain::utils::id::JobId;
use crate::domain::workflow::job::Job;
use crate::domain::workflow::workflow::Workflow;
use crate::error::GraphError;

/**
 * Removes jobs whose results already exist.
 *
 * Jobs are marked on the graph as handed in, before anything is removed:
 *
 * - a job with at least one output, all of them registered in the replica catalog, is marked;
 * - a job whose outputs are each either registered or intermediate (not marked for transfer) is
 *   marked once all of its children are marked, cascading upwards.
 *
 * A job without outputs is never marked. Removing a marked job connects each of its parents to
 * each of its children, so no dependency between the remaining jobs is lost. Dependents of a
 * removed job get the data from the replica catalog through stage-in jobs later on.
 */
#[derive(Debug)]
pub struct DataReuseEngine<'a> {
    replica_catalog: &'a dyn ReplicaCatalog,
}

impl<'a> DataReuseEngine<'a> {
    pub fn new(replica_catalog: &'a dyn ReplicaCatalog) -> Self {
        DataReuseEngine { replica_catalog }
    }

    /// Removes all reusable jobs and returns their ids in workflow order. A second call on the
    /// result removes nothing.
    pub fn reduce(&self, workflow: &mut Workflow) -> Result<Vec<JobId>, GraphError> {
        let marked = self.reusable_jobs(workflow);
        let deleted: Vec<JobId> = workflow.job_ids().into_iter().filter(|id| marked.contains(id)).collect();

        for id in &deleted {
            Self::remove_with_rewiring(workflow, id)?;
            log::debug!("Data reuse removed job {}.", id);
        }

        log::info!("Data reuse removed {} of the workflow's jobs.", deleted.len());
        Ok(deleted)
    }

    /// Marks the reusable jobs of the unreduced graph.
    pub fn reusable_jobs(&self, workflow: &Workflow) -> HashSet<JobId> {
        let mut marked: HashSet<JobId> = workflow.jobs().filter(|job| self.outputs_in_catalog(job)).map(|job| job.id.clone()).collect();

        // Cascade until stable; a cyclic graph simply stops growing.
        let mut changed = true;
        while changed {
            changed = false;
            for job in workflow.jobs() {
                if marked.contains(&job.id) || !self.outputs_disposable(job) {
                    continue;
                }
                if workflow.graph.children(&job.id).iter().all(|child| marked.contains(child)) {
                    log::trace!("Job {} only feeds reused jobs.", job.id);
                    marked.insert(job.id.clone());
                    changed = true;
                }
            }
        }
        marked
    }

    fn outputs_in_catalog(&self, job: &Job) -> bool {
        let mut outputs = job.output_files().peekable();
        outputs.peek().is_some() && outputs.all(|file| self.replica_catalog.contains(&file.lfn))
    }

    fn outputs_disposable(&self, job: &Job) -> bool {
        let mut outputs = job.output_files().peekable();
        outputs.peek().is_some() && outputs.all(|file| !file.transfer || self.replica_catalog.contains(&file.lfn))
    }

    fn remove_with_rewiring(workflow: &mut Workflow, id: &JobId) -> Result<(), GraphError> {
        let parents = workflow.graph.parents(id).to_vec();
        let children = workflow.graph.children(id).to_vec();

        for child in &children {
            let dependency = workflow.graph.edge(id, child).copied().unwrap_or_default();
            for parent in &parents {
                workflow.add_dependency(parent, child, dependency)?;
            }
        }
        workflow.graph.remove_node(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::replica_catalog::InMemoryReplicaCatalog;
    use crate::domain::workflow::dependency::Dependency;
    use crate::domain::workflow::job::{Job, WorkflowFile};

    fn id(id: &str) -> JobId {
        JobId::new(id)
    }

    /// p -> x -> c, x writes x.out which c reads.
    fn p_x_c() -> Workflow {
        let mut workflow = Workflow::new("pxc");
        workflow.add_job(Job::new("p", "t", 1.0).with_file(WorkflowFile::output("p.out"))).unwrap();
        workflow
            .add_job(Job::new("x", "t", 1.0).with_file(WorkflowFile::input("p.out")).with_file(WorkflowFile::output("x.out")))
            .unwrap();
        workflow.add_job(Job::new("c", "t", 1.0).with_file(WorkflowFile::input("x.out")).with_file(WorkflowFile::output("c.out"))).unwrap();
        workflow.add_dependency(&id("p"), &id("x"), Dependency::default()).unwrap();
        workflow.add_dependency(&id("x"), &id("c"), Dependency::default()).unwrap();
        workflow
    }

    #[test]
    fn test_job_with_existing_outputs_is_replaced_by_an_edge() {
        let catalog = InMemoryReplicaCatalog::new().with_replica("x.out", "gsiftp://archive/x.out");
        let mut workflow = p_x_c();

        let deleted = DataReuseEngine::new(&catalog).reduce(&mut workflow).unwrap();

        assert_eq!(deleted, vec![id("x")]);
        assert!(!workflow.graph.contains(&id("x")));
        assert!(workflow.graph.has_edge(&id("p"), &id("c")));
        assert_eq!(workflow.graph.edge_count(), 1);
    }

    #[test]
    fn test_reduction_is_idempotent() {
        let catalog = InMemoryReplicaCatalog::new().with_replica("x.out", "file:///x.out").with_replica("p.out", "file:///p.out");
        let mut workflow = p_x_c();
        let engine = DataReuseEngine::new(&catalog);

        let first = engine.reduce(&mut workflow).unwrap();
        let second = engine.reduce(&mut workflow).unwrap();

        assert_eq!(first, vec![id("p"), id("x")]);
        assert!(second.is_empty());
        assert_eq!(workflow.job_ids(), vec![id("c")]);
    }

    #[test]
    fn test_job_without_outputs_is_never_reusable() {
        let catalog = InMemoryReplicaCatalog::new();
        let mut workflow = Workflow::new("w");
        workflow.add_job(Job::new("sink", "t", 1.0).with_file(WorkflowFile::input("in"))).unwrap();

        assert!(DataReuseEngine::new(&catalog).reduce(&mut workflow).unwrap().is_empty());
    }

    #[test]
    fn test_intermediate_output_read_by_a_child_blocks_reuse() {
        let catalog = InMemoryReplicaCatalog::new();
        let mut workflow = Workflow::new("w");
        workflow.add_job(Job::new("a", "t", 1.0).with_file(WorkflowFile::output("tmp").with_transfer(false))).unwrap();
        workflow.add_job(Job::new("b", "t", 1.0).with_file(WorkflowFile::input("tmp"))).unwrap();
        workflow.add_dependency(&id("a"), &id("b"), Dependency::default()).unwrap();
        let engine = DataReuseEngine::new(&catalog);

        assert!(engine.reusable_jobs(&workflow).is_empty());
        assert!(engine.reduce(&mut workflow).unwrap().is_empty());
    }

    #[test]
    fn test_connectivity_between_remaining_jobs_is_preserved() {
        // a -> {m1, m2} -> z, both middle jobs are satisfied.
        let catalog = InMemoryReplicaCatalog::new().with_replica("m1.out", "file:///m1").with_replica("m2.out", "file:///m2");
        let mut workflow = Workflow::new("w");
        workflow.add_job(Job::new("a", "t", 1.0).with_file(WorkflowFile::output("a.out"))).unwrap();
        workflow.add_job(Job::new("m1", "t", 1.0).with_file(WorkflowFile::output("m1.out"))).unwrap();
        workflow.add_job(Job::new("m2", "t", 1.0).with_file(WorkflowFile::output("m2.out"))).unwrap();
        workflow.add_job(Job::new("z", "t", 1.0).with_file(WorkflowFile::output("z.out"))).unwrap();
        for (parent, child) in [("a", "m1"), ("a", "m2"), ("m1", "z"), ("m2", "z")] {
            workflow.add_dependency(&id(parent), &id(child), Dependency::default()).unwrap();
        }

        let deleted = DataReuseEngine::new(&catalog).reduce(&mut workflow).unwrap();

        assert_eq!(deleted, vec![id("m1"), id("m2")]);
        assert_eq!(workflow.graph.edges(), vec![(id("a"), id("z"))]);
        assert!(workflow.graph.check_acyclic().is_ok());
    }

    #[test]
    fn test_intermediate_producer_with_a_live_child_is_kept() {
        // p -> {x, y}; only x reads p.tmp and x is reused, y still has to run after p.
        let catalog = InMemoryReplicaCatalog::new().with_replica("x.out", "file:///x.out");
        let mut workflow = Workflow::new("w");
        workflow.add_job(Job::new("p", "t", 1.0).with_file(WorkflowFile::output("p.tmp").with_transfer(false))).unwrap();
        workflow.add_job(Job::new("x", "t", 1.0).with_file(WorkflowFile::input("p.tmp")).with_file(WorkflowFile::output("x.out"))).unwrap();
        workflow.add_job(Job::new("y", "t", 1.0).with_file(WorkflowFile::output("y.out"))).unwrap();
        workflow.add_dependency(&id("p"), &id("x"), Dependency::default()).unwrap();
        workflow.add_dependency(&id("p"), &id("y"), Dependency::default()).unwrap();
        let engine = DataReuseEngine::new(&catalog);

        let first = engine.reduce(&mut workflow).unwrap();
        let second = engine.reduce(&mut workflow).unwrap();

        assert_eq!(first, vec![id("x")]);
        assert!(second.is_empty());
        assert_eq!(workflow.job_ids(), vec![id("p"), id("y")]);
        assert!(workflow.graph.has_edge(&id("p"), &id("y")));
    }

    #[test]
    fn test_intermediate_producer_of_reused_jobs_only_is_removed() {
        // p -> x, x is reused and p.tmp is not kept, so p has nothing left to do.
        let catalog = InMemoryReplicaCatalog::new().with_replica("x.out", "file:///x.out");
        let mut workflow = Workflow::new("w");
        workflow.add_job(Job::new("p", "t", 1.0).with_file(WorkflowFile::output("p.tmp").with_transfer(false))).unwrap();
        workflow.add_job(Job::new("x", "t", 1.0).with_file(WorkflowFile::input("p.tmp")).with_file(WorkflowFile::output("x.out"))).unwrap();
        workflow.add_dependency(&id("p"), &id("x"), Dependency::default()).unwrap();

        let deleted = DataReuseEngine::new(&catalog).reduce(&mut workflow).unwrap();

        assert_eq!(deleted, vec![id("p"), id("x")]);
        assert!(workflow.is_empty());
    }

    #[test]
    fn test_output_marked_for_transfer_blocks_the_cascade() {
        // p.out is kept but not registered, so p has to run even though x is reused.
        let catalog = InMemoryReplicaCatalog::new().with_replica("x.out", "file:///x.out");
        let mut workflow = Workflow::new("w");
        workflow.add_job(Job::new("p", "t", 1.0).with_file(WorkflowFile::output("p.out"))).unwrap();
        workflow.add_job(Job::new("x", "t", 1.0).with_file(WorkflowFile::input("p.out")).with_file(WorkflowFile::output("x.out"))).unwrap();
        workflow.add_dependency(&id("p"), &id("x"), Dependency::default()).unwrap();

        let deleted = DataReuseEngine::new(&catalog).reduce(&mut workflow).unwrap();

        assert_eq!(deleted, vec![id("x")]);
        assert_eq!(workflow.job_ids(), vec![id("p")]);
    }

    #[test]
    fn test_isolated_reusable_job_is_removed_outright() {
        let catalog = InMemoryReplicaCatalog::new().with_replica("solo.out", "file:///solo.out");
        let mut workflow = Workflow::new("w");
        workflow.add_job(Job::new("solo", "t", 1.0).with_file(WorkflowFile::output("solo.out"))).unwrap();
        workflow.add_job(Job::new("other", "t", 1.0).with_file(WorkflowFile::output("other.out"))).unwrap();

        let deleted = DataReuseEngine::new(&catalog).reduce(&mut workflow).unwrap();

        assert_eq!(deleted, vec![id("solo")]);
        assert_eq!(workflow.job_ids(), vec![id("other")]);
        assert_eq!(workflow.graph.edge_count(), 0);
    }
}
