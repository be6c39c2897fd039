//! Resource kinds served by the catalog and the contract each kind fulfils

use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

use crate::validation::{FieldValues, Schema, ValidationErrors};

/// The kinds of resource exposed over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Movie,
    User,
}

impl ResourceKind {
    /// Lower-case singular name, e.g. `movie`
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Movie => "movie",
            ResourceKind::User => "user",
        }
    }

    /// Lower-case plural name, also the table name
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Movie => "movies",
            ResourceKind::User => "users",
        }
    }

    /// Capitalised singular name for user-facing messages
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Movie => "Movie",
            ResourceKind::User => "User",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resource the mutation pipeline can drive.
///
/// Implemented by each stored record type. The associated types describe the
/// validated create payload (`Draft`), the validated partial update
/// (`Changes`) and the list filters accepted on the query string.
pub trait Resource: Send + Sync + 'static {
    const KIND: ResourceKind;

    type Record: Serialize + Clone + Send + Sync + 'static;
    type Draft: Send + Sync + 'static;
    type Changes: Send + Sync + 'static;
    type Filters: DeserializeOwned + Send + Sync + 'static;

    /// Field rules and natural key of this kind
    fn schema() -> &'static Schema;

    /// Build a create payload from values that passed create validation
    fn draft(values: FieldValues) -> Result<Self::Draft, ValidationErrors>;

    /// Build a partial update from values that passed update validation
    fn changes(values: FieldValues) -> Self::Changes;

    /// Overlay `changes` onto `record`, keeping every field not submitted
    fn merge(record: Self::Record, changes: Self::Changes) -> Self::Record;

    /// Materialise a stored record from a draft and its assigned id
    fn build(id: i64, draft: Self::Draft) -> Self::Record;

    fn id(record: &Self::Record) -> i64;

    /// Natural key of a stored record
    fn key(record: &Self::Record) -> &str;

    /// Natural key a draft will be stored under
    fn draft_key(draft: &Self::Draft) -> &str;

    /// Whether `record` satisfies every filter that is set
    fn matches(record: &Self::Record, filters: &Self::Filters) -> bool;
}
