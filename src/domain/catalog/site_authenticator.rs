use crate::domain::catalog::site_catalog::SiteEntry;
use crate::error::SiteAuthenticationError;

/// Verifies that the planner may submit to a site.
pub trait SiteAuthenticator: std::fmt::Debug {
    fn authenticate(&self, site: &SiteEntry) -> Result<(), SiteAuthenticationError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllAuthenticator;

impl SiteAuthenticator for AcceptAllAuthenticator {
    fn authenticate(&self, _site: &SiteEntry) -> Result<(), SiteAuthenticationError> {
        Ok(())
    }
}

/// Rejects every site the site catalog marks as unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachabilityAuthenticator;

impl SiteAuthenticator for ReachabilityAuthenticator {
    fn authenticate(&self, site: &SiteEntry) -> Result<(), SiteAuthenticationError> {
        if site.reachable {
            return Ok(());
        }
        Err(SiteAuthenticationError { site: site.name.clone(), reason: "gatekeeper is unreachable".to_string() })
    }
}
