//! Core profile types for medqr.
//!
//! This module defines the profile record submitted through the web form, the
//! raw field set it is validated from, and the identifier used to address it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum accepted identifier length.
const MAX_ID_LEN: usize = 128;

/// Optional medical details, only collected by the database backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalDetails {
    /// Who to call in an emergency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    /// Known medical conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    /// Known allergies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    /// Current medications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
}

impl MedicalDetails {
    /// Check whether no medical detail is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emergency_contact.is_none()
            && self.medical_conditions.is_none()
            && self.allergies.is_none()
            && self.medications.is_none()
    }

    /// Labelled details that are present, in display order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Emergency contact", &self.emergency_contact),
            ("Medical conditions", &self.medical_conditions),
            ("Allergies", &self.allergies),
            ("Medications", &self.medications),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

/// A profile record as submitted by a user.
///
/// Records are immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Blood group, e.g. `O-`.
    pub blood_group: String,
    /// Display layout tag chosen on the landing page.
    pub template: String,
    /// Shared secret gating the medical details. Stored in plaintext.
    pub password: String,
    /// Optional medical details.
    #[serde(flatten)]
    pub medical: MedicalDetails,
}

impl Profile {
    /// Every present field as a `(key, value)` pair.
    ///
    /// The order is unspecified; callers that need a canonical form must sort.
    #[must_use]
    pub fn field_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("name", self.name.as_str()),
            ("phone", self.phone.as_str()),
            ("blood_group", self.blood_group.as_str()),
            ("template", self.template.as_str()),
            ("password", self.password.as_str()),
        ];
        let medical = [
            ("emergency_contact", &self.medical.emergency_contact),
            ("medical_conditions", &self.medical.medical_conditions),
            ("allergies", &self.medical.allergies),
            ("medications", &self.medical.medications),
        ];
        pairs.extend(
            medical
                .into_iter()
                .filter_map(|(key, value)| value.as_deref().map(|v| (key, v))),
        );
        pairs
    }

    /// Encode the required fields as a URL query string.
    ///
    /// This is the whole record for the stateless backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the fields cannot be URL-encoded.
    pub fn to_query(&self) -> Result<String> {
        let query = serde_urlencoded::to_string(&[
            ("name", self.name.as_str()),
            ("phone", self.phone.as_str()),
            ("blood_group", self.blood_group.as_str()),
            ("template", self.template.as_str()),
            ("password", self.password.as_str()),
        ])?;
        Ok(query)
    }
}

/// Raw, unvalidated profile fields.
///
/// Deserialized from the submission form and from query strings. Every
/// field is optional here; [`ProfileFields::into_profile`] enforces the
/// schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    /// Display name.
    pub name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Blood group.
    pub blood_group: Option<String>,
    /// Display template tag.
    pub template: Option<String>,
    /// Display-gating password.
    pub password: Option<String>,
    /// Emergency contact.
    pub emergency_contact: Option<String>,
    /// Medical conditions.
    pub medical_conditions: Option<String>,
    /// Allergies.
    pub allergies: Option<String>,
    /// Medications.
    pub medications: Option<String>,
}

impl ProfileFields {
    /// Parse a URL-encoded query string or form body.
    ///
    /// The first occurrence of a repeated key wins and unknown keys are
    /// ignored. Input that cannot be decoded yields no fields at all, which
    /// later surfaces as a missing field or an unresolvable profile.
    #[must_use]
    pub fn from_urlencoded(input: &[u8]) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input).unwrap_or_default();

        let mut fields = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut fields.name,
                "phone" => &mut fields.phone,
                "blood_group" => &mut fields.blood_group,
                "template" => &mut fields.template,
                "password" => &mut fields.password,
                "emergency_contact" => &mut fields.emergency_contact,
                "medical_conditions" => &mut fields.medical_conditions,
                "allergies" => &mut fields.allergies,
                "medications" => &mut fields.medications,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        fields
    }

    /// Validate the fields into a [`Profile`].
    ///
    /// Required fields must be present and non-empty. Empty optional fields
    /// are dropped. Medical details are kept only when `with_medical` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] naming the first absent required field.
    pub fn into_profile(self, with_medical: bool) -> Result<Profile> {
        let medical = if with_medical {
            MedicalDetails {
                emergency_contact: non_empty(self.emergency_contact),
                medical_conditions: non_empty(self.medical_conditions),
                allergies: non_empty(self.allergies),
                medications: non_empty(self.medications),
            }
        } else {
            MedicalDetails::default()
        };

        Ok(Profile {
            name: required("name", self.name)?,
            phone: required("phone", self.phone)?,
            blood_group: required("blood_group", self.blood_group)?,
            template: required("template", self.template)?,
            password: required("password", self.password)?,
            medical,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    non_empty(value).ok_or_else(|| Error::missing_field(field))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Opaque identifier addressing one stored profile.
///
/// Identifiers double as URL path segments and file names, so they are
/// limited to ASCII alphanumerics, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Parse an identifier, returning `None` if it contains characters that
    /// no backend ever generates.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(raw.to_string()))
    }

    /// Wrap a freshly generated identifier.
    pub(crate) fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name offered for the downloaded QR image.
    #[must_use]
    pub fn download_name(&self) -> String {
        format!("qr_code_{}.png", self.0)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
