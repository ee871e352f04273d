use uuid::Uuid;

use crate::domain::catalog::replica_catalog::ReplicaCatalog;
use crate::domain::catalog::site_authenticator::{ReachabilityAuthenticator, SiteAuthenticator};
use crate::domain::catalog::site_catalog::SiteCatalog;
use crate::domain::catalog::transformation_catalog::TransformationCatalog;
use crate::domain::pipeline::options::PlannerOptions;

/// Everything the refinement stages share during one planning run.
#[derive(Debug)]
pub struct PlannerContext {
    pub run_id: Uuid,
    pub options: PlannerOptions,
    pub site_catalog: Box<dyn SiteCatalog>,
    pub replica_catalog: Box<dyn ReplicaCatalog>,
    pub transformation_catalog: Box<dyn TransformationCatalog>,
    pub authenticator: Box<dyn SiteAuthenticator>,
}

impl PlannerContext {
    pub fn new(
        options: PlannerOptions,
        site_catalog: Box<dyn SiteCatalog>,
        replica_catalog: Box<dyn ReplicaCatalog>,
        transformation_catalog: Box<dyn TransformationCatalog>,
    ) -> Self {
        PlannerContext {
            run_id: Uuid::new_v4(),
            options,
            site_catalog,
            replica_catalog,
            transformation_catalog,
            authenticator: Box::new(ReachabilityAuthenticator),
        }
    }

    pub fn with_authenticator(mut self, authenticator: Box<dyn SiteAuthenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }
}
