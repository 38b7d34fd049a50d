use std::path::PathBuf;

use mupdf::{Colorspace, Document, ImageFormat, Matrix, TextPageFlags};

use citegraph_core::{ExtractError, Extracted, Extractor, ImageHandle};

/// MuPDF-based implementation of [`Extractor`].
///
/// Lives in its own crate so the AGPL-3.0 mupdf dependency stays out of
/// non-PDF code paths.
///
/// By default, text in the bottom 5% of each page (footers) and top 4%
/// (headers) is excluded, keeping running heads and page numbers out of
/// the reference text the resolver sees. Each page is also rendered to a
/// PNG under `<output_root>/<paper_id>/`, one image artifact per page.
pub struct MupdfExtractor {
    /// Directory under which per-paper image directories are created.
    output_root: PathBuf,
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    /// Default 0.05. `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// Default 0.04. `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
    /// Zoom factor for page rendering. Default 2.0.
    render_scale: f32,
}

impl MupdfExtractor {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            footer_exclusion_ratio: Some(0.05),
            header_exclusion_ratio: Some(0.04),
            render_scale: 2.0,
        }
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the page render zoom factor.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }
}

impl Extractor for MupdfExtractor {
    fn extract(&self, bytes: &[u8], paper_id: &str) -> Result<Extracted, ExtractError> {
        let document =
            Document::from_bytes(bytes, "pdf").map_err(|e| ExtractError::Open(e.to_string()))?;

        let paper_dir = self.output_root.join(paper_id);
        std::fs::create_dir_all(&paper_dir)?;

        let mut pages_text = Vec::new();
        let mut images = Vec::new();

        for (page_index, page_result) in document
            .pages()
            .map_err(|e| ExtractError::Extraction(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| ExtractError::Extraction(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;

            // Get page bounds for header/footer exclusion
            let page_bounds = page
                .bounds()
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;
            let page_height = page_bounds.y1 - page_bounds.y0;

            let header_threshold = self
                .header_exclusion_ratio
                .map(|r| page_bounds.y0 + page_height * r);
            let footer_threshold = self
                .footer_exclusion_ratio
                .map(|r| page_bounds.y1 - page_height * r);

            let mut page_text = String::new();
            for block in text_page.blocks() {
                let block_bounds = block.bounds();

                // Skip blocks entirely within the header region
                if let Some(threshold) = header_threshold {
                    if block_bounds.y1 <= threshold {
                        continue;
                    }
                }

                // Skip blocks whose top edge is in the footer region
                if let Some(threshold) = footer_threshold {
                    if block_bounds.y0 >= threshold {
                        continue;
                    }
                }

                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);

            let matrix = Matrix::new_scale(self.render_scale, self.render_scale);
            let pixmap = page
                .to_pixmap(&matrix, &Colorspace::device_rgb(), 0.0, false)
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;

            let file_name = format!("page-{:03}.png", page_index + 1);
            let path = paper_dir.join(&file_name);
            let path_str = path
                .to_str()
                .ok_or_else(|| ExtractError::Open("invalid path encoding".into()))?;
            pixmap
                .save_as(path_str, ImageFormat::PNG)
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;

            images.push(ImageHandle { file_name, path });
        }

        Ok(Extracted {
            text: pages_text.join("\n"),
            images,
        })
    }
}
