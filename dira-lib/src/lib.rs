//! Core library for dira, an apartment-hunting toolkit.
//!
//! Landlords publish listings, seekers track them (or apartments found
//! elsewhere), fill in private checklists, and control how checklist fields
//! are ordered and which ones are required through reusable preference
//! profiles. The [`Repository`] owns all persistent data; the [`prefs`]
//! module is a pure engine over in-memory profile snapshots that the
//! repository loads and saves wholesale.

use thiserror::Error;

pub mod checklist;
pub mod fields;
mod fs;
pub mod prefs;
mod repository;

pub use repository::{
    Repository, TrackSource,
    entities::{Account, Error as RepositoryError, Listing, Profile, TrackedListing},
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Repository(#[from] repository::entities::Error),
    #[error(transparent)]
    Rejected(#[from] prefs::Rejection),
    #[error(transparent)]
    Checklist(#[from] checklist::ChecklistError),
    #[error(transparent)]
    Field(#[from] fields::FieldError),
}
