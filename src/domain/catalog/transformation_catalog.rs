use std::collections::HashMap;

use crate::api::catalog_dto::TransformationCatalogDto;
use crate::domain::utils::id::{SiteName, TransformationName};

/// A transformation installed on one site.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationEntry {
    pub transformation: TransformationName,
    pub site: SiteName,
    pub pfn: Option<String>,

    /// Expected runtime in seconds on this site, if known.
    pub runtime: Option<f64>,
}

pub trait TransformationCatalog: std::fmt::Debug {
    /// Returns the entry for `transformation` on `site`, or `None` if it cannot run there.
    fn lookup(&self, transformation: &TransformationName, site: &SiteName) -> Option<TransformationEntry>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTransformationCatalog {
    entries: HashMap<(TransformationName, SiteName), TransformationEntry>,
}

impl InMemoryTransformationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dto(dto: TransformationCatalogDto) -> Self {
        let mut catalog = Self::new();
        for entry in dto.entries {
            catalog.insert(TransformationEntry {
                transformation: TransformationName::new(entry.transformation),
                site: SiteName::new(entry.site),
                pfn: entry.pfn,
                runtime: entry.runtime,
            });
        }
        log::debug!("Transformation catalog loaded with {} entries.", catalog.entries.len());
        catalog
    }

    pub fn insert(&mut self, entry: TransformationEntry) {
        let key = (entry.transformation.clone(), entry.site.clone());
        if self.entries.insert(key, entry).is_some() {
            log::warn!("Transformation catalog entry was overwritten by a later entry for the same site.");
        }
    }

    /// Registers `transformation` on `site`; mostly useful in tests.
    pub fn with_entry(mut self, transformation: &str, site: &str, runtime: Option<f64>) -> Self {
        self.insert(TransformationEntry { transformation: TransformationName::new(transformation), site: SiteName::new(site), pfn: None, runtime });
        self
    }
}

impl TransformationCatalog for InMemoryTransformationCatalog {
    fn lookup(&self, transformation: &TransformationName, site: &SiteName) -> Option<TransformationEntry> {
        self.entries.get(&(transformation.clone(), site.clone())).cloned()
    }
}
