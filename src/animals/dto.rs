use serde::Deserialize;

/// Request body for admin animal insertion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimalRequest {
    pub name: String,
    pub description: String,
    pub species: String,
    #[serde(default)]
    pub photo_location: Option<String>,
}
