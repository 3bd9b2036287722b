//! Department reference data.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A named, unique grouping. Support staff belong to one department and
/// every ticket is filed against one. Deletion is blocked while referenced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
}
