//! Text measurement capability.
//!
//! Note resizing and auto-grow need to know how tall a note's content is at
//! a candidate width. Real hosts measure the laid-out element; headless
//! hosts and tests use the deterministic heuristic below.

/// Measures the height a note's content requires at a given width.
pub trait TextMeasurer {
    /// Required height in world units for `content` laid out at `width`.
    fn content_height(&self, content: &str, width: f64) -> f64;
}

/// Word-wrap estimate over the plain text of an HTML fragment.
///
/// Counts one block per `<p>`/`<div>`/`<li>`/`<br>`, wraps each block at an
/// average glyph width, and adds vertical padding. Coarse, but monotonic in
/// content length and inversely monotonic in width, which is all resize
/// clamping needs.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicTextMeasurer {
    pub font_size: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: 20.0,
            padding: 12.0,
        }
    }
}

impl HeuristicTextMeasurer {
    fn block_texts(content: &str) -> Vec<String> {
        let mut blocks = Vec::new();
        let mut current = String::new();
        let mut rest = content;
        while let Some(open) = rest.find('<') {
            current.push_str(&rest[..open]);
            let Some(close) = rest[open..].find('>') else {
                break;
            };
            let tag = rest[open + 1..open + close].trim_start_matches('/');
            let name: String = tag
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if matches!(name.as_str(), "p" | "div" | "li" | "br" | "ul" | "ol") {
                if !current.trim().is_empty() {
                    blocks.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            rest = &rest[open + close + 1..];
        }
        current.push_str(rest);
        if !current.trim().is_empty() {
            blocks.push(current);
        }
        blocks
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn content_height(&self, content: &str, width: f64) -> f64 {
        let inner = (width - self.padding * 2.0).max(1.0);
        let chars_per_line = (inner / (self.font_size * 0.55)).floor().max(1.0);

        let blocks = Self::block_texts(content);
        let mut lines = 0usize;
        for block in &blocks {
            let len = block.trim().chars().count();
            lines += ((len as f64) / chars_per_line).ceil().max(1.0) as usize;
        }
        lines = lines.max(1);

        lines as f64 * self.line_height + self.padding * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_one_line() {
        let m = HeuristicTextMeasurer::default();
        let h = m.content_height("", 200.0);
        assert_eq!(h, m.line_height + m.padding * 2.0);
    }

    #[test]
    fn test_height_grows_with_content() {
        let m = HeuristicTextMeasurer::default();
        let short = m.content_height("<p>hi</p>", 200.0);
        let long = m.content_height(
            "<p>a considerably longer paragraph that will certainly wrap onto several lines at this width</p>",
            200.0,
        );
        assert!(long > short);
    }

    #[test]
    fn test_height_grows_as_width_shrinks() {
        let m = HeuristicTextMeasurer::default();
        let text = "<p>the same paragraph measured at two different candidate widths</p>";
        assert!(m.content_height(text, 120.0) > m.content_height(text, 400.0));
    }

    #[test]
    fn test_blocks_count_separately() {
        let m = HeuristicTextMeasurer::default();
        let one = m.content_height("<p>alpha</p>", 300.0);
        let three = m.content_height("<p>alpha</p><p>beta</p><p>gamma</p>", 300.0);
        assert!(three >= one + 2.0 * m.line_height);
    }
}
