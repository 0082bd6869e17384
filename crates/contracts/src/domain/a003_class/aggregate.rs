use serde::{Deserialize, Serialize};

use crate::domain::common::EntityMetadata;

crate::uuid_aggregate_id!(
    /// Identifier of a class record
    ClassId
);

/// A class grouping inside one school. Capacity is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: ClassId,
    pub school_name: String,
    pub name: String,
    pub capacity: u32,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl ClassRecord {
    pub fn new_for_insert(school_name: String, name: String, capacity: u32) -> Self {
        Self {
            id: ClassId::new_v4(),
            school_name,
            name: name.trim().to_string(),
            capacity,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Class name must not be empty".into());
        }
        if self.capacity == 0 {
            return Err("Class capacity must be positive".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassDto {
    pub name: String,
}
