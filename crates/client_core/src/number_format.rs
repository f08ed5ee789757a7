//! Locale-aware integer formatting for display strings.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    tag: String,
}

impl Locale {
    /// Accepts BCP-47 style tags (`en-US`) and POSIX style tags (`de_DE.UTF-8`).
    pub fn new(tag: impl AsRef<str>) -> Self {
        let tag = tag
            .as_ref()
            .split('.')
            .next()
            .unwrap_or_default()
            .replace('_', "-");
        Self { tag }
    }

    pub fn language(&self) -> String {
        self.tag
            .split('-')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    fn grouping_separator(&self) -> &'static str {
        match self.language().as_str() {
            "de" | "es" | "it" | "nl" | "da" | "id" => ".",
            "fr" => "\u{202f}",
            "sv" | "nb" | "no" | "fi" | "pl" | "cs" => "\u{a0}",
            _ => ",",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en-US")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

pub fn format_number(value: i64, locale: &Locale) -> String {
    let digits = value.unsigned_abs().to_string();
    let separator = locale.grouping_separator();

    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 * separator.len() + 1);
    if value < 0 {
        formatted.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push_str(separator);
        }
        formatted.push(digit);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers_are_unchanged() {
        assert_eq!(format_number(7, &Locale::default()), "7");
        assert_eq!(format_number(0, &Locale::default()), "0");
        assert_eq!(format_number(999, &Locale::new("de-DE")), "999");
    }

    #[test]
    fn groups_thousands_per_locale() {
        assert_eq!(format_number(1_234_567, &Locale::new("en-US")), "1,234,567");
        assert_eq!(format_number(1_234_567, &Locale::new("de_DE.UTF-8")), "1.234.567");
        assert_eq!(format_number(12_000, &Locale::new("fr-FR")), "12\u{202f}000");
        assert_eq!(format_number(1_000, &Locale::new("xx")), "1,000");
    }

    #[test]
    fn negative_numbers_keep_sign() {
        assert_eq!(format_number(-1_000, &Locale::default()), "-1,000");
        assert_eq!(format_number(i64::MIN, &Locale::default()), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn locale_normalizes_tag() {
        let locale = Locale::new("pt_BR.UTF-8");
        assert_eq!(locale.to_string(), "pt-BR");
        assert_eq!(locale.language(), "pt");
    }
}
