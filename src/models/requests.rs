//! Request DTOs for the items API
//!
//! Defines the structure of incoming HTTP request bodies. Validation happens
//! here, before any store or cache is touched.

use serde::Deserialize;

use super::item::{ItemPatch, NewItem};

/// Maximum item name length in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// Request body for POST /api/items
///
/// Both fields are required; they are optional here so a missing field is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateItemRequest {
    /// Validates the request and converts it into a [`NewItem`].
    ///
    /// Returns the error message if validation fails.
    pub fn validate(self) -> Result<NewItem, String> {
        let name = match self.name {
            Some(name) if is_valid_name(&name) => name,
            _ => {
                return Err(format!(
                    "Name is required and must be a string of at most {} characters",
                    MAX_NAME_LENGTH
                ))
            }
        };
        let description = match self.description {
            Some(description) if !description.is_empty() => description,
            _ => return Err("Description is required and must be a string".to_string()),
        };

        Ok(NewItem { name, description })
    }
}

/// Request body for PUT /api/items/:id
///
/// At least one field must be present; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateItemRequest {
    /// Validates the request and converts it into an [`ItemPatch`].
    pub fn validate(self) -> Result<ItemPatch, String> {
        const MESSAGE: &str = "At least one valid field (name or description) is required";

        if self.name.as_deref().is_some_and(|name| !is_valid_name(name))
            || self.description.as_deref().is_some_and(str::is_empty)
        {
            return Err(MESSAGE.to_string());
        }

        let patch = ItemPatch {
            name: self.name,
            description: self.description,
        };
        if patch.is_empty() {
            return Err(MESSAGE.to_string());
        }
        Ok(patch)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().count() <= MAX_NAME_LENGTH
}
