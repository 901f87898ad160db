use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::core::Record;

/// Construction site where purchased material is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    /// Exact name
    pub name: Option<String>,
}

impl Record for Location {
    type Draft = NewLocation;
    /// Locations are created and deleted, never edited
    type Patch = Infallible;
    type Filter = LocationFilter;

    const TABLE: &'static str = "locais_aplicacao";

    fn id(&self) -> i64 {
        self.id
    }
}
