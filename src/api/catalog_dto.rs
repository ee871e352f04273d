use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SiteCatalogDto {
    pub sites: Vec<SiteDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SiteDto {
    pub name: String,

    /// Number of free processors, if the site reports one.
    pub processors: Option<usize>,

    #[serde(default = "default_reachable")]
    pub reachable: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaCatalogDto {
    pub replicas: Vec<ReplicaDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaDto {
    pub lfn: String,
    pub pfn: String,
    pub site: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransformationCatalogDto {
    pub entries: Vec<TransformationDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransformationDto {
    pub transformation: String,
    pub site: String,
    pub pfn: Option<String>,

    /// Expected runtime in seconds on this site.
    pub runtime: Option<f64>,
}

fn default_reachable() -> bool {
    true
}
