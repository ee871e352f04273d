use serde::{Deserialize, Serialize};

/// Planner configuration as read from JSON. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerOptionsDto {
    /// Sites to plan for; empty means every site of the site catalog.
    pub execution_sites: Vec<String>,
    pub site_selector: String,

    /// Skip data reuse and plan every job.
    pub force: bool,
    pub authenticate: bool,
    pub clustering: Vec<String>,
    pub horizontal_cluster_size: usize,
    pub create_directories: bool,
    pub cleanup: String,
    pub output_site: Option<String>,
    pub average_communication_cost: f64,
    pub default_processor_count: usize,
    pub random_seed: u64,
}

impl Default for PlannerOptionsDto {
    fn default() -> Self {
        PlannerOptionsDto {
            execution_sites: Vec::new(),
            site_selector: "HEFT".to_string(),
            force: false,
            authenticate: true,
            clustering: Vec::new(),
            horizontal_cluster_size: 2,
            create_directories: false,
            cleanup: "none".to_string(),
            output_site: None,
            average_communication_cost: 2.5,
            default_processor_count: 10,
            random_seed: 0,
        }
    }
}
