//! Contributor persona entity
//!
//! Static reference data: the fixed set of approved author personas
//! assigned to generated articles for stylistic consistency.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contributors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Stable slug used by articles (contributor_key)
    #[sea_orm(column_type = "Text", unique)]
    pub key: String,

    #[sea_orm(column_type = "Text")]
    pub display_name: String,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    /// Expertise keywords as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub expertise: serde_json::Value,

    /// Mapped author ID on the WordPress site
    pub wordpress_author_id: i64,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Expertise keywords as plain strings
    pub fn expertise_list(&self) -> Vec<String> {
        self.expertise
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
