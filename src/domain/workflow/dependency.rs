/// Represents a parent -> child edge of the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dependency {
    /// Estimated time in seconds to move the data of this edge between two different sites.
    /// If unset, the configured average communication cost is used.
    pub transfer_cost: Option<f64>,
}

impl Dependency {
    pub fn with_transfer_cost(transfer_cost: f64) -> Self {
        Dependency { transfer_cost: Some(transfer_cost) }
    }
}
