use std::collections::HashMap;

use crate::api::catalog_dto::ReplicaCatalogDto;
use crate::domain::utils::id::{Lfn, SiteName};

/// Where a physical copy of a logical file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalLocation {
    pub url: String,
    pub site: Option<SiteName>,
}

/// Read-only oracle mapping logical file names to their physical copies.
pub trait ReplicaCatalog: std::fmt::Debug {
    fn lookup(&self, lfn: &Lfn) -> Vec<PhysicalLocation>;

    fn contains(&self, lfn: &Lfn) -> bool {
        !self.lookup(lfn).is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryReplicaCatalog {
    entries: HashMap<Lfn, Vec<PhysicalLocation>>,
}

impl InMemoryReplicaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dto(dto: ReplicaCatalogDto) -> Self {
        let mut catalog = Self::new();
        for replica in dto.replicas {
            catalog.insert(Lfn::new(replica.lfn), PhysicalLocation { url: replica.pfn, site: replica.site.map(SiteName::new) });
        }
        log::debug!("Replica catalog loaded with {} logical files.", catalog.len());
        catalog
    }

    pub fn insert(&mut self, lfn: Lfn, location: PhysicalLocation) {
        let locations = self.entries.entry(lfn).or_default();
        if !locations.contains(&location) {
            locations.push(location);
        }
    }

    /// Registers `lfn` with a single location; mostly useful in tests.
    pub fn with_replica(mut self, lfn: &str, url: &str) -> Self {
        self.insert(Lfn::new(lfn), PhysicalLocation { url: url.to_string(), site: None });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReplicaCatalog for InMemoryReplicaCatalog {
    fn lookup(&self, lfn: &Lfn) -> Vec<PhysicalLocation> {
        self.entries.get(lfn).cloned().unwrap_or_default()
    }
}
