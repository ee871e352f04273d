use crate::api::catalog_dto::SiteCatalogDto;
use crate::domain::utils::id::SiteName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEntry {
    pub name: SiteName,

    /// Free processors reported by the site; `None` if the site does not report it.
    pub processors: Option<usize>,

    /// Whether the site's gatekeeper answers; used by the reachability authenticator.
    pub reachable: bool,
}

impl SiteEntry {
    pub fn new(name: impl Into<String>, processors: usize) -> Self {
        SiteEntry { name: SiteName::new(name), processors: Some(processors), reachable: true }
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }
}

pub trait SiteCatalog: std::fmt::Debug {
    fn list_sites(&self) -> Vec<SiteEntry>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySiteCatalog {
    sites: Vec<SiteEntry>,
}

impl InMemorySiteCatalog {
    pub fn new(sites: Vec<SiteEntry>) -> Self {
        InMemorySiteCatalog { sites }
    }

    pub fn from_dto(dto: SiteCatalogDto) -> Self {
        let sites = dto
            .sites
            .into_iter()
            .map(|site| SiteEntry { name: SiteName::new(site.name), processors: site.processors, reachable: site.reachable })
            .collect();
        InMemorySiteCatalog { sites }
    }
}

impl SiteCatalog for InMemorySiteCatalog {
    fn list_sites(&self) -> Vec<SiteEntry> {
        self.sites.clone()
    }
}
