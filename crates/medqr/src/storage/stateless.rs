//! Stateless profile "storage".
//!
//! Nothing is written anywhere. The profile URL carries every field in its
//! query string and reads rebuild the record from those parameters.

use crate::config::Backend;
use crate::error::{Error, Result};
use crate::identifier::IdStrategy;
use crate::profile::{Profile, ProfileFields, ProfileId};

use super::ProfileStore;

/// Backend that keeps profiles only in their URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatelessStore;

impl StatelessStore {
    /// Create the stateless backend.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProfileStore for StatelessStore {
    fn backend(&self) -> Backend {
        Backend::Stateless
    }

    fn create(&self, profile: &Profile) -> Result<ProfileId> {
        Ok(IdStrategy::ContentHash.derive(profile))
    }

    /// The identifier is never dereferenced; a missing parameter means the
    /// record cannot be rebuilt.
    fn read(&self, _id: &ProfileId, query: &ProfileFields) -> Result<Profile> {
        query.clone().into_profile(false).map_err(|err| match err {
            Error::MissingField { .. } => Error::NotFound,
            other => other,
        })
    }

    fn canonical_id(&self, _id: &ProfileId, profile: &Profile) -> ProfileId {
        IdStrategy::ContentHash.derive(profile)
    }

    fn id_from_query(&self, query: &ProfileFields) -> Option<ProfileId> {
        let profile = query.clone().into_profile(false).ok()?;
        Some(IdStrategy::ContentHash.derive(&profile))
    }
}
