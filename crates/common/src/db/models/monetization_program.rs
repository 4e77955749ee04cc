//! Monetization program entity
//!
//! Static taxonomy of sponsored degree programs (~155 concentrations across
//! 13 degree levels), seeded once and read-only at runtime. Articles are
//! matched against these records by topic.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monetization_programs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Broad category (business, healthcare, technology, ...)
    #[sea_orm(column_type = "Text")]
    pub category: String,

    /// Concentration name (e.g. "health informatics")
    #[sea_orm(column_type = "Text")]
    pub concentration: String,

    /// Degree level (e.g. "bachelors", "masters", "doctorate")
    #[sea_orm(column_type = "Text")]
    pub degree_level: String,

    /// Match keywords as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub keywords: serde_json::Value,

    /// Identifier embedded in the generated shortcode
    #[sea_orm(column_type = "Text")]
    pub shortcode_id: String,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Match keywords as plain strings
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
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
pub enum Relation {
    #[sea_orm(has_many = "super::article::Entity")]
    Articles,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
