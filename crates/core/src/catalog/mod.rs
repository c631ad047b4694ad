//! Format catalog: which target formats a kind may be converted to, and
//! which encoder does the work.
//!
//! Both lookups are pure and total over [`MediaKind`]. The legal format
//! table is static; the encoder slots are fixed when the catalog is built.

mod table;

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::encoder::{DocumentEncoder, Encoder, ImageEncoder, PassThroughEncoder};
use crate::media::{MediaKind, TargetFormat};

/// Maps media kinds to legal target formats and encoders.
#[derive(Clone)]
pub struct FormatCatalog {
    image: Option<Arc<dyn Encoder>>,
    document: Option<Arc<dyn Encoder>>,
    audio: Option<Arc<dyn Encoder>>,
    video: Option<Arc<dyn Encoder>>,
}

impl FormatCatalog {
    /// Builds the default encoder set from configuration.
    pub fn from_config(config: &Config) -> Self {
        let prefix = config.output.filename_prefix.as_str();
        Self::builder()
            .image(Arc::new(ImageEncoder::new(&config.image, prefix)))
            .document(Arc::new(DocumentEncoder::new(config.document.clone(), prefix)))
            .audio(Arc::new(PassThroughEncoder::new("audio", prefix)))
            .video(Arc::new(PassThroughEncoder::new("video", prefix)))
            .build()
    }

    /// Starts a catalog with no encoders registered.
    pub fn builder() -> FormatCatalogBuilder {
        FormatCatalogBuilder::default()
    }

    /// Ordered legal target formats for `kind`.
    pub fn legal_formats(&self, kind: MediaKind) -> &'static [TargetFormat] {
        table::legal_formats(kind)
    }

    /// Whether `format` is legal for `kind`.
    pub fn is_legal(&self, kind: MediaKind, format: &TargetFormat) -> bool {
        self.legal_formats(kind).contains(format)
    }

    /// The encoder responsible for `kind`, if any.
    pub fn encoder_for(&self, kind: MediaKind) -> Option<Arc<dyn Encoder>> {
        let slot = match kind {
            MediaKind::Image => &self.image,
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
            kind if kind.is_text_like() => &self.document,
            _ => return None,
        };
        slot.clone()
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl fmt::Debug for FormatCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |slot: &Option<Arc<dyn Encoder>>| slot.as_ref().map(|e| e.name().to_string());
        f.debug_struct("FormatCatalog")
            .field("image", &name(&self.image))
            .field("document", &name(&self.document))
            .field("audio", &name(&self.audio))
            .field("video", &name(&self.video))
            .finish()
    }
}

/// Builder for [`FormatCatalog`], used to inject custom encoders.
#[derive(Default)]
pub struct FormatCatalogBuilder {
    image: Option<Arc<dyn Encoder>>,
    document: Option<Arc<dyn Encoder>>,
    audio: Option<Arc<dyn Encoder>>,
    video: Option<Arc<dyn Encoder>>,
}

impl FormatCatalogBuilder {
    pub fn image(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.image = Some(encoder);
        self
    }

    /// Encoder for plain text, Word documents and CSV.
    pub fn document(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.document = Some(encoder);
        self
    }

    pub fn audio(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.audio = Some(encoder);
        self
    }

    pub fn video(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.video = Some(encoder);
        self
    }

    /// Registers the same encoder for every kind.
    pub fn all(self, encoder: Arc<dyn Encoder>) -> Self {
        self.image(Arc::clone(&encoder))
            .document(Arc::clone(&encoder))
            .audio(Arc::clone(&encoder))
            .video(encoder)
    }

    pub fn build(self) -> FormatCatalog {
        FormatCatalog {
            image: self.image,
            document: self.document,
            audio: self.audio,
            video: self.video,
        }
    }
}
