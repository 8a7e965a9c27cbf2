//! Profile operations shared by the HTTP handlers and the CLI.
//!
//! [`ProfileService`] ties a [`ProfileStore`] to a [`QrRenderer`] and knows
//! how each backend shapes its profile URLs. All methods are blocking.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Backend;
use crate::error::{Error, Result};
use crate::profile::{Profile, ProfileFields, ProfileId};
use crate::qr::QrRenderer;
use crate::storage::file::QR_FILE_SUFFIX;
use crate::storage::ProfileStore;

/// Result of a successful form submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Identifier of the new profile.
    pub id: ProfileId,
    /// Absolute URL encoded in the QR code.
    pub profile_url: String,
    /// Server-relative URL of the QR download.
    pub download_url: String,
    /// Server-relative URL of the stored QR image, for backends that keep one.
    pub image_url: Option<String>,
    /// Rendered QR code.
    pub qr_png: Vec<u8>,
}

/// A resolved profile ready for display.
#[derive(Debug, Clone)]
pub struct ProfileView {
    /// Identifier the profile was resolved through.
    pub id: ProfileId,
    /// The record.
    pub profile: Profile,
    /// Whether the medical details may be shown.
    pub show_sensitive: bool,
}

/// A QR image offered as a file download.
#[derive(Debug, Clone)]
pub struct QrDownload {
    /// Identifier the image belongs to.
    pub id: ProfileId,
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl QrDownload {
    /// Attachment file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.id.download_name()
    }
}

/// Profile operations over one storage backend.
#[derive(Debug, Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    qr: QrRenderer,
}

impl ProfileService {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>, qr: QrRenderer) -> Self {
        Self { store, qr }
    }

    /// Backend serving this service.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.store.backend()
    }

    /// Whether the submission form collects medical details.
    #[must_use]
    pub fn collects_medical(&self) -> bool {
        self.backend() == Backend::Database
    }

    /// Validate and store a submission, then render its QR code.
    ///
    /// `base_url` is the absolute origin embedded in the QR payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for incomplete submissions, or a
    /// storage or rendering error.
    pub fn submit(&self, fields: ProfileFields, base_url: &str) -> Result<Submission> {
        let profile = fields.into_profile(self.collects_medical())?;
        let id = self.store.create(&profile)?;

        let profile_url = self.profile_url(base_url, &id, &profile)?;
        let qr_png = self.qr.render_png(&profile_url)?;
        self.store.save_qr(&id, &qr_png)?;

        let image_url = self
            .store
            .keeps_qr_images()
            .then(|| format!("/profiles/{id}{QR_FILE_SUFFIX}"));

        info!("Created profile {} on {} backend", id, self.backend());
        Ok(Submission {
            download_url: self.download_url(&id, &profile)?,
            id,
            profile_url,
            image_url,
            qr_png,
        })
    }

    /// Resolve a profile for display.
    ///
    /// Medical details are revealed only on the database backend, and only
    /// when `query.password` equals the stored password exactly. This gates
    /// display; it is not access control.
    ///
    /// `raw_id` is the identifier as it appeared in the request path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing is addressed.
    pub fn view(&self, raw_id: &str, query: &ProfileFields) -> Result<ProfileView> {
        let id = self.resolve_id(Some(raw_id), query)?;
        let profile = self.store.read(&id, query)?;
        let show_sensitive = self.collects_medical()
            && query
                .password
                .as_deref()
                .is_some_and(|given| !given.is_empty() && given == profile.password);

        debug!("Viewing profile {} (sensitive: {})", id, show_sensitive);
        Ok(ProfileView {
            id,
            profile,
            show_sensitive,
        })
    }

    /// Produce the QR image for download.
    ///
    /// Backends that keep images serve the stored file. Others confirm the
    /// profile resolves and render it again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no image or profile is addressed.
    pub fn download(
        &self,
        raw_id: Option<&str>,
        query: &ProfileFields,
        base_url: &str,
    ) -> Result<QrDownload> {
        let id = self.resolve_id(raw_id, query)?;

        if self.store.keeps_qr_images() {
            let png = self.store.stored_qr(&id)?.ok_or(Error::NotFound)?;
            return Ok(QrDownload { id, png });
        }

        let profile = self.store.read(&id, query)?;
        let id = self.store.canonical_id(&id, &profile);
        let url = self.profile_url(base_url, &id, &profile)?;
        let png = self.qr.render_png(&url)?;
        Ok(QrDownload { id, png })
    }

    /// Identifier a request addresses.
    ///
    /// A well-formed path identifier is used as is. Backends that rebuild
    /// records from the query never dereference the path, so for them a
    /// missing or malformed one is replaced by the identifier of the queried
    /// record.
    fn resolve_id(&self, raw_id: Option<&str>, query: &ProfileFields) -> Result<ProfileId> {
        raw_id
            .and_then(ProfileId::parse)
            .or_else(|| self.store.id_from_query(query))
            .ok_or(Error::NotFound)
    }

    /// Fetch a stored QR image by its file name, e.g. `<id>_qr.png`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for any other name, for backends that keep
    /// no images, or when the file is missing.
    pub fn stored_image(&self, file_name: &str) -> Result<Vec<u8>> {
        if !self.store.keeps_qr_images() {
            return Err(Error::NotFound);
        }
        let id = file_name
            .strip_suffix(QR_FILE_SUFFIX)
            .and_then(ProfileId::parse)
            .ok_or(Error::NotFound)?;
        self.store.stored_qr(&id)?.ok_or(Error::NotFound)
    }

    /// Absolute URL that displays `profile`.
    ///
    /// The stateless backend appends the whole record as query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be URL-encoded.
    pub fn profile_url(&self, base_url: &str, id: &ProfileId, profile: &Profile) -> Result<String> {
        let base = base_url.trim_end_matches('/');
        Ok(match self.backend() {
            Backend::Stateless => format!("{base}/profile/{id}?{}", profile.to_query()?),
            Backend::File | Backend::Database => format!("{base}/profile/{id}"),
        })
    }

    /// Server-relative URL of the QR download for `profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be URL-encoded.
    pub fn download_url(&self, id: &ProfileId, profile: &Profile) -> Result<String> {
        Ok(match self.backend() {
            Backend::Stateless => format!("/download_qr?{}", profile.to_query()?),
            Backend::File | Backend::Database => format!("/download_qr/{id}"),
        })
    }
}
