//! Turns raw model output into an HTML document that is safe to embed.
//!
//! Model output usually arrives wrapped in markdown fences, surrounded by
//! commentary, and full of `href="#"` placeholder links that would make an
//! embedded viewer navigate away. [`sanitize`] strips the noise, keeps the
//! document, and rewrites same-page links into script-driven smooth scrolls.

use regex::{Captures, Regex};
use thiserror::Error;

/// Target written into every rewritten same-page link.
pub const NOOP_HREF: &str = "javascript:void(0)";

/// Attribute carrying the id a rewritten link scrolls to.
pub const SCROLL_ATTRIBUTE: &str = "data-scroll-to";

/// Marks the injected script so a second pass does not inject it again.
const SCRIPT_MARKER: &str = "data-geniesite=\"anchor-scroll\"";

const ANCHOR_SCRIPT: &str = r#"
    <script data-geniesite="anchor-scroll">
    document.addEventListener('DOMContentLoaded', function() {
      document.querySelectorAll('[data-scroll-to]').forEach(function(link) {
        link.addEventListener('click', function(e) {
          e.preventDefault();
          var target = document.getElementById(this.getAttribute('data-scroll-to'));
          if (target) {
            target.scrollIntoView({ behavior: 'smooth', block: 'start' });
          }
        });
      });
      document.querySelectorAll('a[href="javascript:void(0)"]').forEach(function(link) {
        link.addEventListener('click', function(e) {
          e.preventDefault();
        });
      });
    });
    </script>"#;

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("Generated code does not contain valid HTML structure")]
    NotADocument,
    #[error("invalid sanitizer pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled patterns for the cleaning pipeline.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    fence: Regex,
    bare_anchor: Regex,
    id_anchor: Regex,
}

impl Sanitizer {
    pub fn new() -> Result<Self, SanitizeError> {
        Ok(Self {
            fence: Regex::new(r"```[\w+-]*[ \t]*(?:\r?\n)?")?,
            bare_anchor: Regex::new(r#"href\s*=\s*["']#["']"#)?,
            id_anchor: Regex::new(r#"href\s*=\s*["']#([^"']+)["']"#)?,
        })
    }

    /// Run the full pipeline. Pure: the same input always gives the same output.
    pub fn clean(&self, raw: &str) -> Result<String, SanitizeError> {
        let unfenced = self.fence.replace_all(raw, "");
        let document = extract_document(unfenced.trim());

        let (mut cleaned, scroll_links) = self.rewrite_anchors(document);
        if scroll_links > 0 && !cleaned.contains(SCRIPT_MARKER) {
            cleaned = inject_anchor_script(cleaned);
        }

        if !looks_like_document(&cleaned) {
            return Err(SanitizeError::NotADocument);
        }
        Ok(cleaned)
    }

    /// Rewrite placeholder links. Returns the text and how many links carried an id.
    fn rewrite_anchors(&self, text: &str) -> (String, usize) {
        let text = self
            .bare_anchor
            .replace_all(text, format!("href=\"{}\"", NOOP_HREF).as_str());

        let mut scroll_links = 0;
        let text = self.id_anchor.replace_all(&text, |caps: &Captures| {
            scroll_links += 1;
            format!("href=\"{}\" {}=\"{}\"", NOOP_HREF, SCROLL_ATTRIBUTE, &caps[1])
        });

        (text.into_owned(), scroll_links)
    }
}

/// Sanitize raw generation output into an embeddable HTML document.
pub fn sanitize(raw: &str) -> Result<String, SanitizeError> {
    Sanitizer::new()?.clean(raw)
}

/// Whether the text carries a doctype or an opening `<html` tag.
pub fn looks_like_document(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<!doctype") || lower.contains("<html")
}

/// Cut everything before the document start and after the last `</html>`.
fn extract_document(text: &str) -> &str {
    // ASCII lowercasing keeps byte offsets valid for the original text.
    let lower = text.to_ascii_lowercase();

    let start = lower
        .find("<!doctype")
        .or_else(|| lower.find("<html"))
        .unwrap_or(0);

    let end = lower[start..]
        .rfind("</html>")
        .map(|pos| start + pos + "</html>".len())
        .unwrap_or(text.len());

    &text[start..end]
}

fn inject_anchor_script(mut text: String) -> String {
    let lower = text.to_ascii_lowercase();
    match lower.rfind("</body>").or_else(|| lower.rfind("</html>")) {
        Some(pos) => {
            text.insert_str(pos, &format!("{}\n", ANCHOR_SCRIPT));
            text
        }
        None => {
            log::debug!("No closing body or html tag; anchor script not injected");
            text
        }
    }
}
