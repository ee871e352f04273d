/// Scheduling scenarios for the site selectors.
#[cfg(test)]
mod tests {
    use crate::domain::catalog::site_catalog::SiteEntry;
    use crate::domain::catalog::transformation_catalog::InMemoryTransformationCatalog;
    use crate::domain::scheduler::cost_model::CostModel;
    use crate::domain::scheduler::heft_site_selector::HeftSiteSelector;
    use crate::domain::scheduler::site_selector::SiteSelection;
    use crate::domain::scheduler::site_selector_type::SiteSelectorType;
    use crate::domain::utils::id::{JobId, SiteName};
    use crate::domain::workflow::dependency::Dependency;
    use crate::domain::workflow::job::Job;
    use crate::domain::workflow::workflow::Workflow;
    use crate::error::StageError;

    fn id(id: &str) -> JobId {
        JobId::new(id)
    }

    /// a -> {b, c} -> d, every job runs 10 seconds.
    fn diamond() -> Workflow {
        let mut workflow = Workflow::new("diamond");
        for job in ["a", "b", "c", "d"] {
            workflow.add_job(Job::new(job, "t", 10.0)).unwrap();
        }
        for (parent, child) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
            workflow.add_dependency(&id(parent), &id(child), Dependency::default()).unwrap();
        }
        workflow
    }

    fn catalog_for(sites: &[SiteEntry]) -> InMemoryTransformationCatalog {
        sites.iter().fold(InMemoryTransformationCatalog::new(), |catalog, site| catalog.with_entry("t", site.name.as_str(), None))
    }

    fn run_heft(workflow: &mut Workflow, sites: &[SiteEntry]) -> Result<SiteSelection, StageError> {
        let catalog = catalog_for(sites);
        let cost_model = CostModel::new(&catalog, sites, 2.5, 10);
        HeftSiteSelector::new().map_workflow(workflow, &cost_model)
    }

    fn times(selection: &SiteSelection, job: &str) -> (f64, f64) {
        let bag = selection.bag(&id(job)).unwrap();
        (bag.actual_start_time, bag.actual_finish_time)
    }

    #[test]
    fn test_diamond_on_two_processors() {
        let mut workflow = diamond();
        let selection = run_heft(&mut workflow, &[SiteEntry::new("local", 2)]).unwrap();

        assert_eq!(times(&selection, "a"), (0.0, 10.0));
        assert_eq!(times(&selection, "b"), (10.0, 20.0));
        assert_eq!(times(&selection, "c"), (10.0, 20.0));
        assert_eq!(times(&selection, "d"), (20.0, 30.0));
        assert_eq!(selection.makespan(), 30.0);
        assert!(workflow.jobs().all(|job| job.site == Some(SiteName::new("local"))));
    }

    #[test]
    fn test_diamond_on_one_processor_serializes_the_branches() {
        let mut workflow = diamond();
        let selection = run_heft(&mut workflow, &[SiteEntry::new("local", 1)]).unwrap();

        assert_eq!(times(&selection, "a"), (0.0, 10.0));
        assert_eq!(times(&selection, "b"), (10.0, 20.0));
        assert_eq!(times(&selection, "c"), (20.0, 30.0));
        assert_eq!(times(&selection, "d"), (30.0, 40.0));
        assert_eq!(selection.order, vec![id("a"), id("b"), id("c"), id("d")]);
    }

    #[test]
    fn test_diamond_on_two_sites_pays_for_transfers() {
        let mut workflow = diamond();
        let selection = run_heft(&mut workflow, &[SiteEntry::new("beta", 1), SiteEntry::new("alpha", 1)]).unwrap();

        // Equal finish times on both sites go to the lexicographically smaller name.
        assert_eq!(selection.bag(&id("a")).unwrap().site, Some(SiteName::new("alpha")));
        assert_eq!(times(&selection, "b"), (10.0, 20.0));
        assert_eq!(selection.bag(&id("c")).unwrap().site, Some(SiteName::new("beta")));
        assert_eq!(times(&selection, "c"), (12.5, 22.5));
        assert_eq!(selection.bag(&id("d")).unwrap().site, Some(SiteName::new("beta")));
        assert_eq!(times(&selection, "d"), (22.5, 32.5));
        assert_eq!(selection.makespan(), 32.5);
    }

    #[test]
    fn test_ranks_are_stored_in_bags() {
        let mut workflow = diamond();
        let selection = run_heft(&mut workflow, &[SiteEntry::new("local", 2)]).unwrap();

        let rank = |job: &str| selection.bag(&id(job)).unwrap().upward_rank;
        assert_eq!(rank("d"), 10.0);
        assert_eq!(rank("b"), 22.5);
        assert_eq!(rank("a"), 35.0);
        assert_eq!(selection.bag(&id("d")).unwrap().downward_rank, 25.0);
        for (parent, child) in workflow.graph.edges() {
            assert!(selection.bag(&parent).unwrap().upward_rank > selection.bag(&child).unwrap().upward_rank);
        }
    }

    #[test]
    fn test_identical_inputs_give_identical_schedules() {
        let sites = [SiteEntry::new("x", 1), SiteEntry::new("y", 3), SiteEntry::new("z", 2)];
        let mut first = diamond();
        let mut second = diamond();

        let a = run_heft(&mut first, &sites).unwrap().summary();
        let b = run_heft(&mut second, &sites).unwrap().summary();

        assert_eq!(a, b);
    }

    #[test]
    fn test_job_without_candidate_site_stays_unmapped() {
        let mut workflow = diamond();
        workflow.add_job(Job::new("e", "not-installed", 5.0)).unwrap();
        workflow.add_dependency(&id("d"), &id("e"), Dependency::default()).unwrap();

        let selection = run_heft(&mut workflow, &[SiteEntry::new("local", 2)]).unwrap();

        assert_eq!(selection.warnings.len(), 1);
        assert_eq!(selection.warnings[0].job, id("e"));
        assert_eq!(workflow.job(&id("e")).unwrap().site_handle(), "NONE");
        assert_eq!(times(&selection, "e"), (32.5, 32.5));
        assert_eq!(workflow.unmapped_compute_jobs(), vec![id("e")]);
    }

    #[test]
    fn test_execution_site_hint_restricts_candidates() {
        let mut workflow = diamond();
        workflow.job_mut(&id("c")).unwrap().execution_site_hint = Some(SiteName::new("slow"));
        let catalog = InMemoryTransformationCatalog::new().with_entry("t", "fast", Some(1.0)).with_entry("t", "slow", Some(100.0));
        let sites = [SiteEntry::new("fast", 4), SiteEntry::new("slow", 4)];
        let cost_model = CostModel::new(&catalog, &sites, 2.5, 10);

        HeftSiteSelector::new().map_workflow(&mut workflow, &cost_model).unwrap();

        assert_eq!(workflow.job(&id("c")).unwrap().site, Some(SiteName::new("slow")));
        assert_eq!(workflow.job(&id("b")).unwrap().site, Some(SiteName::new("fast")));
    }

    #[test]
    fn test_cycle_is_reported_with_its_edge() {
        let mut workflow = diamond();
        workflow.add_dependency(&id("d"), &id("b"), Dependency::default()).unwrap();

        match run_heft(&mut workflow, &[SiteEntry::new("local", 2)]) {
            Err(StageError::Cyclic(error)) => assert_eq!(error.edge, Some(("d".to_string(), "b".to_string()))),
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_cost_ties_keep_precedence() {
        let mut workflow = Workflow::new("zero");
        workflow.add_job(Job::new("z", "t", 0.0)).unwrap();
        workflow.add_job(Job::new("a", "t", 0.0)).unwrap();
        workflow.add_dependency(&id("z"), &id("a"), Dependency::with_transfer_cost(0.0)).unwrap();

        let selection = run_heft(&mut workflow, &[SiteEntry::new("local", 1)]).unwrap();

        assert_eq!(selection.order, vec![id("z"), id("a")]);
    }

    #[test]
    fn test_registry_builds_every_selector() {
        let sites = [SiteEntry::new("x", 1), SiteEntry::new("y", 1)];
        let catalog = catalog_for(&sites);
        let cost_model = CostModel::new(&catalog, &sites, 2.5, 10);

        for name in ["HEFT", "RoundRobin", "Random"] {
            let selector_type: SiteSelectorType = name.parse().unwrap();
            let mut workflow = diamond();
            let selection = SiteSelectorType::get_instance(selector_type, 42).map_workflow(&mut workflow, &cost_model).unwrap();

            assert!(selection.warnings.is_empty(), "{}", name);
            assert!(workflow.unmapped_compute_jobs().is_empty(), "{}", name);
            assert!(selection.makespan() >= 30.0, "{}", name);
        }
        assert!("Min-Min".parse::<SiteSelectorType>().is_err());
    }

    #[test]
    fn test_round_robin_alternates_sites() {
        let sites = [SiteEntry::new("x", 1), SiteEntry::new("y", 1)];
        let catalog = catalog_for(&sites);
        let cost_model = CostModel::new(&catalog, &sites, 2.5, 10);
        let mut workflow = diamond();

        SiteSelectorType::get_instance(SiteSelectorType::RoundRobin, 0).map_workflow(&mut workflow, &cost_model).unwrap();

        let site = |job: &str| workflow.job(&id(job)).unwrap().site_handle().to_string();
        assert_eq!((site("a"), site("b"), site("c"), site("d")), ("x".into(), "y".into(), "x".into(), "y".into()));
    }

    #[test]
    fn test_random_selector_is_reproducible_for_a_seed() {
        let sites = [SiteEntry::new("x", 1), SiteEntry::new("y", 1), SiteEntry::new("z", 1)];
        let catalog = catalog_for(&sites);
        let cost_model = CostModel::new(&catalog, &sites, 2.5, 10);

        let mut first = diamond();
        let mut second = diamond();
        SiteSelectorType::get_instance(SiteSelectorType::Random, 7).map_workflow(&mut first, &cost_model).unwrap();
        SiteSelectorType::get_instance(SiteSelectorType::Random, 7).map_workflow(&mut second, &cost_model).unwrap();

        let sites_of = |workflow: &Workflow| workflow.jobs().map(|job| job.site_handle().to_string()).collect::<Vec<_>>();
        assert_eq!(sites_of(&first), sites_of(&second));
    }
}
