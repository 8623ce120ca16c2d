use serde::{Deserialize, Serialize};
use std::env;

/// Institutional identity printed on issued certificates: letterhead name,
/// postal address, and website for the footer line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionConfig {
    pub name: String,
    pub address: String,
    pub website: String,
}

impl InstitutionConfig {
    pub fn from_env() -> Self {
        let defaults = InstitutionConfig::default();
        InstitutionConfig {
            name: env::var("INSTITUTION_NAME").unwrap_or(defaults.name),
            address: env::var("INSTITUTION_ADDRESS").unwrap_or(defaults.address),
            website: env::var("INSTITUTION_WEBSITE").unwrap_or(defaults.website),
        }
    }
}

impl Default for InstitutionConfig {
    fn default() -> Self {
        InstitutionConfig {
            name: "TKR College of Engineering & Technology".to_string(),
            address: "Survey No.8/A, Medbowli, Meerpet, Saroornagar, Hyderabad - 500097"
                .to_string(),
            website: "www.tkrcet.ac.in".to_string(),
        }
    }
}
