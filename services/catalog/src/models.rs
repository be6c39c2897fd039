//! Catalog models: stored records, validated payloads and list filters

pub mod movie;
pub mod user;

pub use movie::{Movie, MovieChanges, MovieFilters, NewMovie};
pub use user::{NewUser, User, UserChanges, UserFilters};
