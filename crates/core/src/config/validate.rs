use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Event buffer and read chunk size are not 0
/// - Output prefix does not contain path separators
/// - JPEG quality is within 1-100
/// - The document page leaves room for at least one line of text
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.pipeline.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.event_buffer cannot be 0".to_string(),
        ));
    }

    if config.pipeline.thumbnails && config.pipeline.thumbnail_size == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.thumbnail_size cannot be 0 when thumbnails are enabled".to_string(),
        ));
    }

    if config.source.chunk_size == 0 {
        return Err(ConfigError::ValidationError(
            "source.chunk_size cannot be 0".to_string(),
        ));
    }

    if config.output.filename_prefix.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(
            "output.filename_prefix cannot contain path separators".to_string(),
        ));
    }

    if !(1..=100).contains(&config.image.jpeg_quality) {
        return Err(ConfigError::ValidationError(format!(
            "image.jpeg_quality must be within 1-100, got {}",
            config.image.jpeg_quality
        )));
    }

    let doc = &config.document;
    if doc.font_size_pt <= 0.0 || doc.line_height_mm <= 0.0 {
        return Err(ConfigError::ValidationError(
            "document.font_size_pt and document.line_height_mm must be positive".to_string(),
        ));
    }
    let printable_width = doc.page_width_mm - 2.0 * doc.margin_mm;
    let printable_height = doc.page_height_mm - 2.0 * doc.margin_mm;
    if printable_width <= 0.0 || printable_height < doc.line_height_mm {
        return Err(ConfigError::ValidationError(
            "document page is too small for its margins".to_string(),
        ));
    }

    Ok(())
}
