use crate::domain::utils::id::SiteName;

/// Scheduling attributes of one job, kept beside the workflow while sites are selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeftBag {
    pub average_compute_time: f64,
    pub upward_rank: f64,
    pub downward_rank: f64,
    pub actual_start_time: f64,
    pub actual_finish_time: f64,
    pub site: Option<SiteName>,
}

impl HeftBag {
    pub fn new(average_compute_time: f64) -> Self {
        HeftBag { average_compute_time, ..Default::default() }
    }
}
