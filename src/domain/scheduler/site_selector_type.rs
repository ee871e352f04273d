use std::fmt;
use std::str::FromStr;

use crate::domain::scheduler::heft_site_selector::HeftSiteSelector;
use crate::domain::scheduler::random_site_selector::RandomSiteSelector;
use crate::domain::scheduler::round_robin_site_selector::RoundRobinSiteSelector;
use crate::domain::scheduler::site_selector::SiteSelector;
use crate::error::ConversionError;

/// The available site selection algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteSelectorType {
    /// **Heterogeneous Earliest Finish Time**: list scheduling by upward rank, every job goes to
    /// the site finishing it first.
    Heft,
    RoundRobin,
    /// Uniform random choice among the candidate sites, driven by a seeded generator.
    Random,
}

impl SiteSelectorType {
    /// Factory method to return a concrete instance of a [`SiteSelector`] based on the enum variant.
    pub fn get_instance(selector_type: SiteSelectorType, random_seed: u64) -> Box<dyn SiteSelector> {
        match selector_type {
            SiteSelectorType::Heft => HeftSiteSelector::new(),
            SiteSelectorType::RoundRobin => RoundRobinSiteSelector::new(),
            SiteSelectorType::Random => RandomSiteSelector::new(random_seed),
        }
    }
}

impl FromStr for SiteSelectorType {
    type Err = ConversionError;

    fn from_str(selector: &str) -> Result<SiteSelectorType, Self::Err> {
        match selector {
            "HEFT" | "Heft" => Ok(SiteSelectorType::Heft),
            "RoundRobin" | "Round-Robin" => Ok(SiteSelectorType::RoundRobin),
            "Random" => Ok(SiteSelectorType::Random),
            _ => Err(ConversionError::UnknownSiteSelector(selector.to_string())),
        }
    }
}

impl fmt::Display for SiteSelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SiteSelectorType::Heft => "HEFT",
            SiteSelectorType::RoundRobin => "RoundRobin",
            SiteSelectorType::Random => "Random",
        };
        write!(f, "{}", name)
    }
}
