pub mod admin;
pub mod contact;
pub mod job;
pub mod patch;
pub mod university;
pub mod user;

pub use admin::*;
pub use contact::*;
pub use job::*;
pub use patch::*;
pub use university::*;
pub use user::*;

use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::Deserialize;

use crate::utils::error::AppError;

pub fn to_rfc3339(dt: &BsonDateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

pub fn parse_object_id(raw: &str, entity: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::validation(format!("Invalid {} ID", entity)))
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Arguments shared by every `list` operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub status: Option<String>,
}

impl ListQuery {
    /// Sort document restricted to `allowed` fields; newest first by default.
    pub fn sort_doc(&self, allowed: &[&str]) -> Result<Document, AppError> {
        let field = match self.sort_by.as_deref() {
            None => "createdAt",
            Some(f) if allowed.contains(&f) => f,
            Some(f) => return Err(AppError::validation(format!("Cannot sort by '{}'", f))),
        };
        let direction = match self.order.unwrap_or(SortOrder::Desc) {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        Ok(doc! { field: direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_is_newest_first() {
        let query = ListQuery::default();
        assert_eq!(query.sort_doc(&["name"]).unwrap(), doc! { "createdAt": -1 });
    }

    #[test]
    fn test_sort_field_is_whitelisted() {
        let query = ListQuery {
            sort_by: Some("name".into()),
            order: Some(SortOrder::Asc),
            status: None,
        };
        assert_eq!(query.sort_doc(&["name"]).unwrap(), doc! { "name": 1 });

        let query = ListQuery { sort_by: Some("password".into()), ..Default::default() };
        assert!(query.sort_doc(&["name"]).is_err());
    }

    #[test]
    fn test_invalid_object_id() {
        let err = parse_object_id("nope", "Job").unwrap_err();
        assert_eq!(err.to_string(), "Invalid Job ID");
        assert!(parse_object_id("65f0c0ffee65f0c0ffee65f0", "Job").is_ok());
    }
}
