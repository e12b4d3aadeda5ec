// LaTeX text helpers

/// Escape text so it typesets literally
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '<' => out.push_str("\\textless{}"),
            '>' => out.push_str("\\textgreater{}"),
            '|' => out.push_str("\\textbar{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Score with three decimals, e.g. `0.900`
pub fn score(value: f64) -> String {
    format!("{:.3}", value)
}

/// Fraction as a percentage with one decimal and an escaped percent sign, e.g. `94.7\%`
pub fn percent(value: f64) -> String {
    format!("{:.1}\\%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape("GPT-4o (preview)"), "GPT-4o (preview)");
    }

    #[test]
    fn test_escape_specials() {
        assert_eq!(escape("Retrieval & Context"), "Retrieval \\& Context");
        assert_eq!(escape("100% of $5_x#"), "100\\% of \\$5\\_x\\#");
        assert_eq!(escape("{a}"), "\\{a\\}");
        assert_eq!(escape("a\\b"), "a\\textbackslash{}b");
        assert_eq!(escape("~^"), "\\textasciitilde{}\\textasciicircum{}");
    }

    #[test]
    fn test_escape_angle_brackets_and_bar() {
        assert_eq!(
            escape("A<b>|c"),
            "A\\textless{}b\\textgreater{}\\textbar{}c"
        );
    }

    #[test]
    fn test_score_three_decimals() {
        assert_eq!(score(0.9), "0.900");
        assert_eq!(score(0.947), "0.947");
        assert_eq!(score(1.0), "1.000");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.947), "94.7\\%");
        assert_eq!(percent(0.98), "98.0\\%");
    }
}
