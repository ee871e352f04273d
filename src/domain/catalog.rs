pub mod replica_catalog;
pub mod site_authenticator;
pub mod site_catalog;
pub mod transformation_catalog;
