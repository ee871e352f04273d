use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDto {
    pub label: String,

    pub jobs: Vec<JobDto>,

    #[serde(default)]
    pub dependencies: Vec<DependencyDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: String,
    pub transformation: String,

    /// Runtime estimate in seconds.
    #[serde(default)]
    pub runtime: f64,

    #[serde(default)]
    pub files: Vec<FileDto>,

    pub label: Option<String>,
    pub execution_site: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub lfn: String,

    /// "input" or "output"
    pub role: String,

    #[serde(default = "default_transfer")]
    pub transfer: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDto {
    pub parent: String,
    pub child: String,
    pub transfer_cost: Option<f64>,
}

fn default_transfer() -> bool {
    true
}
