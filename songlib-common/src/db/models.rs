//! Row models shared by the catalog crates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Song joined with its current group
///
/// Group columns are optional because listings use a LEFT JOIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub group_id: Option<i64>,
    #[serde(rename = "group")]
    pub group_name: Option<String>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    #[serde(default, with = "crate::date_format::option")]
    pub release_date: Option<NaiveDate>,
}

/// Performing act, created on first reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}
