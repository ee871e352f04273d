use crate::api::options_dto::PlannerOptionsDto;
use crate::domain::refiner::cleanup::CleanupMode;
use crate::domain::refiner::clustering::ClusteringType;
use crate::domain::scheduler::cost_model::{DEFAULT_AVERAGE_COMMUNICATION_COST, DEFAULT_PROCESSOR_COUNT};
use crate::domain::scheduler::site_selector_type::SiteSelectorType;
use crate::domain::utils::id::SiteName;
use crate::error::ConversionError;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOptions {
    pub execution_sites: Vec<SiteName>,
    pub site_selector: SiteSelectorType,
    pub force: bool,
    pub authenticate: bool,
    pub clustering: Vec<ClusteringType>,
    pub horizontal_cluster_size: usize,
    pub create_directories: bool,
    pub cleanup: CleanupMode,
    pub output_site: Option<SiteName>,
    pub average_communication_cost: f64,
    pub default_processor_count: usize,
    pub random_seed: u64,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        PlannerOptions {
            execution_sites: Vec::new(),
            site_selector: SiteSelectorType::Heft,
            force: false,
            authenticate: true,
            clustering: Vec::new(),
            horizontal_cluster_size: 2,
            create_directories: false,
            cleanup: CleanupMode::None,
            output_site: None,
            average_communication_cost: DEFAULT_AVERAGE_COMMUNICATION_COST,
            default_processor_count: DEFAULT_PROCESSOR_COUNT,
            random_seed: 0,
        }
    }
}

impl TryFrom<PlannerOptionsDto> for PlannerOptions {
    type Error = ConversionError;

    fn try_from(dto: PlannerOptionsDto) -> Result<Self, Self::Error> {
        let clustering = dto.clustering.iter().map(|name| name.parse()).collect::<Result<Vec<ClusteringType>, _>>()?;

        Ok(PlannerOptions {
            execution_sites: dto.execution_sites.into_iter().map(SiteName::new).collect(),
            site_selector: dto.site_selector.parse()?,
            force: dto.force,
            authenticate: dto.authenticate,
            clustering,
            horizontal_cluster_size: dto.horizontal_cluster_size,
            create_directories: dto.create_directories,
            cleanup: dto.cleanup.parse()?,
            output_site: dto.output_site.map(SiteName::new),
            average_communication_cost: dto.average_communication_cost,
            default_processor_count: dto.default_processor_count,
            random_seed: dto.random_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let dto: PlannerOptionsDto = serde_json::from_str("{}").unwrap();

        let options = PlannerOptions::try_from(dto).unwrap();

        assert_eq!(options, PlannerOptions::default());
        assert_eq!(options.average_communication_cost, 2.5);
        assert_eq!(options.default_processor_count, 10);
    }

    #[test]
    fn test_names_are_parsed() {
        let dto: PlannerOptionsDto = serde_json::from_str(
            r#"{"siteSelector": "RoundRobin", "clustering": ["label", "horizontal"], "cleanup": "inplace", "executionSites": ["b", "a"], "outputSite": "archive"}"#,
        )
        .unwrap();

        let options = PlannerOptions::try_from(dto).unwrap();

        assert_eq!(options.site_selector, SiteSelectorType::RoundRobin);
        assert_eq!(options.clustering, vec![ClusteringType::Label, ClusteringType::Horizontal]);
        assert_eq!(options.cleanup, CleanupMode::InPlace);
        assert_eq!(options.execution_sites, vec![SiteName::new("b"), SiteName::new("a")]);
        assert_eq!(options.output_site, Some(SiteName::new("archive")));
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let unknown_selector = PlannerOptionsDto { site_selector: "MinMin".to_string(), ..Default::default() };
        let unknown_cleanup = PlannerOptionsDto { cleanup: "later".to_string(), ..Default::default() };

        assert_eq!(PlannerOptions::try_from(unknown_selector), Err(ConversionError::UnknownSiteSelector("MinMin".to_string())));
        assert_eq!(PlannerOptions::try_from(unknown_cleanup), Err(ConversionError::UnknownCleanupMode("later".to_string())));
    }
}
