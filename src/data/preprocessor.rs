// ============================================================
// Layer 4 - Paragraph Preprocessor
// ============================================================
// Cleans one paragraph before it joins the context.
//
// Text pulled out of HTML <p> elements tends to carry:
//   - non-breaking spaces (U+00A0) and zero-width spaces (U+200B)
//   - hard line wraps from the page source
//   - tabs and runs of indentation
//   - stray control characters
//
// A context is "paragraphs joined by \n", so each paragraph is
// flattened to a single line with single spaces between words.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Flatten `text` to one trimmed line with single spaces.
    pub fn clean(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pending_space = false;

        for c in text.chars() {
            let is_gap = c.is_whitespace()
                || c.is_control()
                || matches!(c, '\u{200B}' | '\u{FEFF}');
            if is_gap {
                pending_space = !out.is_empty();
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
        out
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
