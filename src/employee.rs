//! Employee record shapes.
//!
//! Decoding is forgiving in the same places the published feed is loose:
//! missing fields and JSON `null` both decode to empty values, unknown
//! fields are ignored, and the capitalised key spellings are accepted.
//! A value of the wrong type still fails the whole entry.

use serde::{Deserialize, Deserializer};

/// One element of an archive entry's JSON array, as published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawEmployee {
    #[serde(alias = "DOB", alias = "Dob", deserialize_with = "null_as_default")]
    pub dob: String,
    #[serde(alias = "Name", deserialize_with = "null_as_default")]
    pub name: Name,
    #[serde(alias = "Roles", deserialize_with = "roles")]
    pub roles: Vec<String>,
    #[serde(alias = "Email", deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(alias = "Department", deserialize_with = "null_as_default")]
    pub department: String,
    /// Only used to identify the record in diagnostics.
    #[serde(alias = "Username", deserialize_with = "null_as_default")]
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Name {
    #[serde(alias = "First", deserialize_with = "null_as_default")]
    pub first: String,
    #[serde(alias = "Last", deserialize_with = "null_as_default")]
    pub last: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` roles, and `null` elements inside them, become empty.
fn roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let roles: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(roles
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// The reduced record written to CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanEmployee {
    pub full_name: String,
    pub department: String,
    pub email: String,
}

/// Decode one archive entry.
///
/// A top-level `null` counts as no records; a `null` element is an
/// all-empty record.
pub fn decode_employees(bytes: &[u8]) -> Result<Vec<RawEmployee>, serde_json::Error> {
    let employees: Option<Vec<Option<RawEmployee>>> = serde_json::from_slice(bytes)?;
    Ok(employees
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}
