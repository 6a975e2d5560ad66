//! Text that is safe to place in a PDF content stream
//!
//! Built-in PDF fonts only cover a single-byte character set, and control
//! characters corrupt text operators. Every string that reaches the renderer
//! goes through [`SafeText`]; there is no other way to construct one.
//!
//! String-literal escaping of `(`, `)` and `\` is not done here: the PDF
//! writer escapes every text operand when it serializes the content stream.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeText(String);

impl SafeText {
    /// Sanitizes arbitrary text
    ///
    /// Control characters are dropped (tabs become spaces), common typographic
    /// and accented characters are folded to ASCII, anything else becomes `?`.
    ///
    /// ```
    /// use site2pdf::output::SafeText;
    ///
    /// let text = SafeText::new("Grüße \u{201C}quoted\u{201D}\u{0007}");
    /// assert_eq!(text.as_str(), "Gruesse \"quoted\"");
    /// ```
    pub fn new(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            push_folded(c, &mut out);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits into lines of at most `width` characters
    ///
    /// Breaks at spaces where possible; words longer than a line are cut.
    /// Source line breaks are kept and empty source lines are preserved.
    pub fn wrap(&self, width: usize) -> Vec<SafeText> {
        let width = width.max(1);
        let mut lines = Vec::new();

        for source_line in self.0.split('\n') {
            let mut current = String::new();
            for word in source_line.split(' ').filter(|w| !w.is_empty()) {
                let mut word = word;
                while word.len() > width {
                    if !current.is_empty() {
                        lines.push(SafeText(std::mem::take(&mut current)));
                    }
                    let (head, tail) = word.split_at(width);
                    lines.push(SafeText(head.to_string()));
                    word = tail;
                }

                let needed = if current.is_empty() {
                    word.len()
                } else {
                    current.len() + 1 + word.len()
                };
                if needed > width {
                    lines.push(SafeText(std::mem::take(&mut current)));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            lines.push(SafeText(current));
        }

        lines
    }
}

impl fmt::Display for SafeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ASCII rendering of a single character, if it has one
pub(crate) fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Å' => "A",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => "O",
        'ù' | 'ú' | 'û' => "u",
        'Ù' | 'Ú' | 'Û' => "U",
        'ç' => "c",
        'Ç' => "C",
        'ñ' => "n",
        'Ñ' => "N",
        'æ' => "ae",
        'Æ' => "AE",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => "-",
        '\u{2026}' => "...",
        '\u{2022}' | '\u{00B7}' => "*",
        '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' | '\u{202F}' => " ",
        '\u{20AC}' => "EUR",
        '\u{00A9}' => "(c)",
        '\u{00AE}' => "(R)",
        '\u{2122}' => "(TM)",
        '\u{00B0}' => "deg",
        _ => return None,
    };
    Some(folded)
}

fn push_folded(c: char, out: &mut String) {
    match c {
        '\n' => out.push('\n'),
        '\t' => out.push(' '),
        c if c.is_control() => {}
        // Zero-width characters and the BOM render as nothing
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' | '\u{00AD}' => {}
        c if c.is_ascii() => out.push(c),
        c => out.push_str(fold_char(c).unwrap_or("?")),
    }
}
