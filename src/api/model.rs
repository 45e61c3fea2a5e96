//! User record and payload validation.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use uuid::Uuid;

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Kept as a JSON number so integers round-trip without gaining a `.0`.
    pub age: Number,
    pub hobbies: Vec<String>,
}

impl User {
    /// New record with a freshly generated id.
    pub fn new(fields: UserFields) -> Self {
        Self::with_id(Uuid::new_v4(), fields)
    }

    /// Record with the given id, e.g. when replacing an existing user.
    pub fn with_id(id: Uuid, fields: UserFields) -> Self {
        Self {
            id,
            username: fields.username,
            age: fields.age,
            hobbies: fields.hobbies,
        }
    }
}

/// Client-supplied user fields, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFields {
    pub username: String,
    pub age: Number,
    pub hobbies: Vec<String>,
}

/// Why a user payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Username is required and must be a string")]
    Username,

    #[error("Age is required and must be a number")]
    Age,

    #[error("Hobbies must be an array")]
    HobbiesNotArray,

    #[error("Hobbies must be an array of strings")]
    HobbiesNotStrings,
}

impl UserFields {
    /// Validate a decoded JSON body.
    ///
    /// Checks run in order: username, age, hobbies. A missing `hobbies`
    /// field means an empty list; an explicit `null` is rejected.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let username = match value.get("username") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(ValidationError::Username),
        };

        let age = match value.get("age") {
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.clone(),
            _ => return Err(ValidationError::Age),
        };

        let hobbies = match value.get("hobbies") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .ok_or(ValidationError::HobbiesNotStrings)?,
            Some(_) => return Err(ValidationError::HobbiesNotArray),
        };

        Ok(Self { username, age, hobbies })
    }
}
