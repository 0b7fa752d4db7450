/// Normalize text for event-stream payloads and prompt construction.
///
/// Retrieved documents come from scraped web pages and PDFs and routinely
/// carry BOMs, zero-width joiners, and typographic punctuation that breaks
/// naive byte-oriented consumers. This maps everything down to plain ASCII:
/// smart quotes and dashes become their ASCII cousins, invisible characters
/// are dropped, and anything else outside ASCII becomes a space.
///
/// Total and idempotent: never fails on any input, and a second pass is a
/// no-op because every produced character is ASCII.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            // BOM and zero-width characters: drop entirely
            '\u{FEFF}' | '\u{200B}'..='\u{200D}' | '\u{FFFE}' | '\u{FFFF}' => {}
            // Smart quotes
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            // Figure dash, en dash, em dash, horizontal bar
            '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' => out.push('*'),
            c if c.is_ascii() => out.push(c),
            _ => out.push(' '),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through_unchanged() {
        let s = "plain ASCII text with 'quotes' and - dashes.\n";
        assert_eq!(sanitize(s), s);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_strips_bom_and_zero_width() {
        assert_eq!(sanitize("\u{FEFF}hello\u{200B}\u{200C}\u{200D} world"), "hello world");
        assert_eq!(sanitize("\u{FFFE}\u{FFFF}"), "");
    }

    #[test]
    fn test_normalizes_smart_quotes() {
        assert_eq!(sanitize("\u{2018}single\u{2019}"), "'single'");
        assert_eq!(sanitize("\u{201C}double\u{201D}"), "\"double\"");
    }

    #[test]
    fn test_normalizes_dashes() {
        assert_eq!(sanitize("a\u{2013}b\u{2014}c\u{2012}d\u{2015}e"), "a-b-c-d-e");
    }

    #[test]
    fn test_normalizes_ellipsis_and_bullet() {
        assert_eq!(sanitize("wait\u{2026}"), "wait...");
        assert_eq!(sanitize("\u{2022} item"), "* item");
    }

    #[test]
    fn test_other_non_ascii_becomes_space() {
        assert_eq!(sanitize("caf\u{E9}"), "caf ");
        assert_eq!(sanitize("日本語"), "   ");
    }

    #[test]
    fn test_output_is_always_ascii() {
        let samples = [
            "",
            "already ascii",
            "émoji 🦀 and accents àéîõü",
            "\u{FEFF}\u{2018}\u{201C}\u{2013}\u{2026}\u{2022}",
            "mixed — “quoted” … résumé",
        ];
        for s in samples {
            assert!(sanitize(s).is_ascii(), "non-ASCII output for {s:?}");
        }
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain",
            "smart \u{201C}quotes\u{201D} \u{2014} dashes \u{2026}",
            "unicode soup: 東京 🦀 ß\u{200B}",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }
}
