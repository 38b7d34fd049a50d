use std::io::Write;

use citegraph_core::{Crawler, PaperNode};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print one crawled paper: identifier, artifact counts, and its
/// resolved reference list.
pub fn print_paper(
    w: &mut dyn Write,
    node: &PaperNode,
    print_text: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "Paper {}", node.id.bold())?;
    } else {
        writeln!(w, "Paper {}", node.id)?;
    }
    writeln!(w, "  source: {}", node.source_url)?;
    writeln!(
        w,
        "  text: {} chars, images: {}",
        node.text_content.len(),
        node.images.len()
    )?;

    if print_text {
        writeln!(w, "\n{}\n", node.text_content)?;
    }

    if !node.references_processed {
        if color.enabled() {
            writeln!(w, "  references: {}", "not yet processed".dimmed())?;
        } else {
            writeln!(w, "  references: not yet processed")?;
        }
        return Ok(());
    }

    writeln!(w, "  references: {}", node.references.len())?;
    for (idx, entry) in node.references.iter().enumerate() {
        let short = if entry.raw_text.len() > 60 {
            format!("{}...", &entry.raw_text[..60])
        } else {
            entry.raw_text.clone()
        };
        match &entry.resolved_link {
            Some(link) => {
                if color.enabled() {
                    writeln!(w, "  [{}] {} -> {}", idx + 1, short, link.green())?;
                } else {
                    writeln!(w, "  [{}] {} -> {}", idx + 1, short, link)?;
                }
            }
            None => {
                if color.enabled() {
                    writeln!(w, "  [{}] {} -> {}", idx + 1, short, "not found".yellow())?;
                } else {
                    writeln!(w, "  [{}] {} -> not found", idx + 1, short)?;
                }
            }
        }
    }
    Ok(())
}

/// Print the final crawl summary.
pub fn print_summary(
    w: &mut dyn Write,
    crawler: &Crawler,
    color: ColorMode,
) -> std::io::Result<()> {
    let total_papers = crawler.ids().len();
    let total_refs: usize = crawler.nodes().map(|n| n.references.len()).sum();
    let resolved: usize = crawler
        .nodes()
        .flat_map(|n| n.references.iter())
        .filter(|e| e.resolved_link.is_some())
        .count();

    writeln!(w)?;
    let line = format!(
        "{} papers crawled, {} references ({} resolved, {} not found)",
        total_papers,
        total_refs,
        resolved,
        total_refs - resolved
    );
    if color.enabled() {
        writeln!(w, "{}", line.bold())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}
