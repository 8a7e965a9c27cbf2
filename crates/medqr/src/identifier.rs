//! Profile identifier derivation.
//!
//! Two strategies exist. Content hashing makes resubmission of an identical
//! field set land on the same identifier; random tokens are independent of
//! content and are what new deployments should use.

use serde::{Deserialize, Serialize};

use crate::profile::{Profile, ProfileId};

/// Number of hex characters kept from the content digest.
const CONTENT_HASH_HEX_LEN: usize = 32;

/// Number of random bytes in a token identifier.
const TOKEN_BYTES: usize = 16;

/// How a backend derives identifiers for new profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// BLAKE3 over the order-independent field set.
    ContentHash,
    /// Cryptographically random hex token.
    RandomToken,
}

impl IdStrategy {
    /// Derive an identifier for `profile`.
    #[must_use]
    pub fn derive(self, profile: &Profile) -> ProfileId {
        match self {
            Self::ContentHash => content_hash(profile),
            Self::RandomToken => random_token(),
        }
    }
}

impl std::fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentHash => write!(f, "content_hash"),
            Self::RandomToken => write!(f, "random_token"),
        }
    }
}

/// Hash the record's field set.
///
/// Pairs are sorted by key before hashing and every key and value is
/// length-prefixed, so field order never matters and no two distinct field
/// sets share an encoding.
#[must_use]
pub fn content_hash(profile: &Profile) -> ProfileId {
    let mut pairs = profile.field_pairs();
    pairs.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (key, value) in pairs {
        for part in [key, value] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
    }

    let mut hex = hasher.finalize().to_hex().to_string();
    hex.truncate(CONTENT_HASH_HEX_LEN);
    ProfileId::new_unchecked(hex)
}

/// Generate a fresh random token identifier.
#[must_use]
pub fn random_token() -> ProfileId {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    ProfileId::new_unchecked(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MedicalDetails;

    fn jane() -> Profile {
        Profile {
            name: "Jane Doe".to_string(),
            phone: "555-1234".to_string(),
            blood_group: "O-".to_string(),
            template: "basic".to_string(),
            password: "secret".to_string(),
            medical: MedicalDetails::default(),
        }
    }

    #[test]
    fn test_content_hash_deterministic() {
        assert_eq!(content_hash(&jane()), content_hash(&jane()));
    }

    #[test]
    fn test_content_hash_length_and_charset() {
        let id = content_hash(&jane());
        assert_eq!(id.as_str().len(), CONTENT_HASH_HEX_LEN);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(ProfileId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_content_hash_differs_per_field() {
        let mut other = jane();
        other.blood_group = "A+".to_string();
        assert_ne!(content_hash(&jane()), content_hash(&other));
    }

    #[test]
    fn test_content_hash_no_boundary_ambiguity() {
        let mut a = jane();
        a.name = "ab".to_string();
        a.phone = "c".to_string();
        let mut b = jane();
        b.name = "a".to_string();
        b.phone = "bc".to_string();
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_content_hash_swapped_values_differ() {
        let mut a = jane();
        a.name = "x".to_string();
        a.phone = "y".to_string();
        let mut b = jane();
        b.name = "y".to_string();
        b.phone = "x".to_string();
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_random_token_shape() {
        let id = random_token();
        assert_eq!(id.as_str().len(), TOKEN_BYTES * 2);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_tokens_differ() {
        assert_ne!(random_token(), random_token());
        assert_ne!(
            IdStrategy::RandomToken.derive(&jane()),
            IdStrategy::RandomToken.derive(&jane())
        );
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(IdStrategy::ContentHash.to_string(), "content_hash");
        assert_eq!(IdStrategy::RandomToken.to_string(), "random_token");
    }
}
