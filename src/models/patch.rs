use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::error::AppError;

/// One field of a partial update.
///
/// `Missing` leaves the stored value alone, `Null` clears it, `Value` sets it.
/// Fields must carry `#[serde(default)]` so that an absent key deserializes
/// to `Missing` rather than `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Accumulates `$set` / `$unset` operations for one update.
#[derive(Debug, Default)]
pub struct UpdateBuilder {
    set: Document,
    unset: Document,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field that must always hold a value: `Null` is rejected.
    pub fn required<T: Serialize>(
        &mut self,
        field: &str,
        label: &str,
        patch: &Patch<T>,
    ) -> Result<&mut Self, AppError> {
        match patch {
            Patch::Missing => {}
            Patch::Null => return Err(AppError::validation(format!("{} cannot be null", label))),
            Patch::Value(v) => {
                self.set.insert(field, mongodb::bson::to_bson(v)?);
            }
        }
        Ok(self)
    }

    /// A field that may be cleared: `Null` becomes `$unset`.
    pub fn optional<T: Serialize>(&mut self, field: &str, patch: &Patch<T>) -> Result<&mut Self, AppError> {
        match patch {
            Patch::Missing => {}
            Patch::Null => {
                self.unset.insert(field, "");
            }
            Patch::Value(v) => {
                self.set.insert(field, mongodb::bson::to_bson(v)?);
            }
        }
        Ok(self)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Bson>) -> &mut Self {
        self.set.insert(field, value);
        self
    }

    /// Builds the update document, stamping `updatedAt`.
    pub fn build(mut self) -> Document {
        self.set.insert("updatedAt", mongodb::bson::DateTime::now());
        let mut update = Document::new();
        update.insert("$set", self.set);
        if !self.unset.is_empty() {
            update.insert("$unset", self.unset);
        }
        update
    }
}
