//! Text-to-PDF encoder.
//!
//! Plain text, CSV and Word documents are all rendered the same way: the
//! payload is decoded as UTF-8 (lossily), wrapped to the printable width
//! and laid out on as many pages as it needs with a builtin Helvetica face.

use async_trait::async_trait;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::debug;

use crate::config::DocumentConfig;
use crate::media::file_stem;

use super::error::EncoderError;
use super::traits::Encoder;
use super::types::{EncodeRequest, EncodedOutput};

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.5;

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 0.352_778;

const TAB_WIDTH: usize = 4;

/// Renders text-like payloads into a paginated PDF.
#[derive(Debug, Clone)]
pub struct DocumentEncoder {
    config: DocumentConfig,
    prefix: String,
}

impl DocumentEncoder {
    /// Creates a new document encoder.
    pub fn new(config: DocumentConfig, prefix: impl Into<String>) -> Self {
        Self {
            config,
            prefix: prefix.into(),
        }
    }

    /// Creates a document encoder with default settings.
    pub fn with_defaults() -> Self {
        Self::new(DocumentConfig::default(), "converted_")
    }
}

/// Page geometry derived from the configuration.
#[derive(Debug, Clone, Copy)]
struct Layout {
    columns: usize,
    lines_per_page: usize,
}

impl Layout {
    fn from_config(config: &DocumentConfig) -> Self {
        let printable_width = config.page_width_mm - 2.0 * config.margin_mm;
        let printable_height = config.page_height_mm - 2.0 * config.margin_mm;
        let glyph_width_mm = config.font_size_pt * AVG_GLYPH_WIDTH_EM * MM_PER_PT;

        Self {
            columns: ((printable_width / glyph_width_mm).floor() as usize).max(1),
            lines_per_page: ((printable_height / config.line_height_mm).floor() as usize).max(1),
        }
    }
}

/// Splits text into display lines no longer than `columns` characters.
///
/// Words are kept whole where possible; a word longer than a full line is
/// hard-split.
fn wrap_lines(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for raw in text.lines() {
        let expanded = raw.replace('\t', &" ".repeat(TAB_WIDTH));
        let mut current = String::new();
        let mut current_len = 0;
        let mut fresh = true;

        for word in expanded.split(' ') {
            let word_len = word.chars().count();
            let needed = if fresh { word_len } else { current_len + 1 + word_len };

            if needed <= columns {
                if !fresh {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = needed;
                fresh = false;
                continue;
            }

            if !fresh {
                lines.push(std::mem::take(&mut current));
            }
            current_len = 0;
            fresh = true;

            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(columns).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    lines.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                    fresh = false;
                }
            }
        }

        lines.push(current);
    }

    lines
}

fn render_pdf(title: &str, text: &str, config: &DocumentConfig) -> Result<Vec<u8>, EncoderError> {
    let layout = Layout::from_config(config);
    let lines = wrap_lines(text, layout.columns);
    let width = Mm(config.page_width_mm);
    let height = Mm(config.page_height_mm);

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| EncoderError::encode_failed(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);

    for (page_number, page_lines) in lines.chunks(layout.lines_per_page).enumerate() {
        if page_number > 0 {
            let (page, page_layer) = doc.add_page(width, height, "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
        }

        let mut y = config.page_height_mm - config.margin_mm - config.font_size_pt * MM_PER_PT;
        for line in page_lines {
            if !line.is_empty() {
                layer.use_text(line.as_str(), config.font_size_pt, Mm(config.margin_mm), Mm(y), &font);
            }
            y -= config.line_height_mm;
        }
    }

    doc.save_to_bytes()
        .map_err(|e| EncoderError::encode_failed(e.to_string()))
}

#[async_trait]
impl Encoder for DocumentEncoder {
    fn name(&self) -> &str {
        "document"
    }

    async fn convert(&self, request: EncodeRequest) -> Result<EncodedOutput, EncoderError> {
        if request.target.as_str() != "pdf" {
            return Err(EncoderError::unsupported_target(
                self.name(),
                request.target.as_str(),
            ));
        }

        let file_name = request.output_name(&self.prefix, "pdf");
        let title = file_stem(&request.file_name).to_string();
        let payload = request.payload.clone();
        let config = self.config.clone();

        let bytes = tokio::task::spawn_blocking(move || {
            let text = String::from_utf8_lossy(&payload);
            render_pdf(&title, &text, &config)
        })
        .await??;

        debug!(
            file = %request.file_name,
            output = %file_name,
            size_bytes = bytes.len(),
            "Text rendered to PDF"
        );

        Ok(EncodedOutput {
            file_name,
            media_type: "application/pdf".to_string(),
            bytes,
        })
    }
}
