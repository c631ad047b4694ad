//! Encoder module for turning one input payload into an output file.
//!
//! This module provides the `Encoder` trait and the kind-specific
//! implementations the format catalog dispatches to.
//!
//! # Encoders
//!
//! - `ImageEncoder`: raster decode + re-encode (PNG, JPEG, BMP, GIF, TIFF, WebP, ICO)
//! - `DocumentEncoder`: text, CSV and Word payloads rendered into a paginated PDF
//! - `PassThroughEncoder`: audio and video stand-in returning the input unchanged
//!
//! # Example
//!
//! ```ignore
//! use batchconv_core::encoder::{EncodeRequest, Encoder, ImageEncoder};
//! use batchconv_core::media::TargetFormat;
//!
//! let encoder = ImageEncoder::with_defaults();
//! let request = EncodeRequest::new(
//!     "photo.png",
//!     "image/png",
//!     payload,
//!     TargetFormat::parse("jpeg").unwrap(),
//! );
//!
//! let output = encoder.convert(request).await?;
//! println!("{} ({} bytes)", output.file_name, output.size_bytes());
//! ```

mod document;
mod error;
mod passthrough;
mod raster;
mod traits;
mod types;

pub use document::DocumentEncoder;
pub use error::EncoderError;
pub use passthrough::PassThroughEncoder;
pub use raster::{thumbnail, ImageEncoder};
pub use traits::Encoder;
pub use types::{EncodeRequest, EncodedOutput};
