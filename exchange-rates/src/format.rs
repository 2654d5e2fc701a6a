//! Locale-aware currency text.
//!
//! A small table of CLDR conventions covering the locales the
//! front end ships translations for. Resolution is strict: an unknown locale
//! is reported as `None` so the caller decides on a fallback.

const NBSP: char = '\u{a0}';
const NNBSP: char = '\u{202f}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPosition {
    /// `$81.82`
    Prefix,
    /// `R$ 81,82`
    PrefixSpaced,
    /// `81,82 €`
    Suffix,
}

/// Number and symbol layout for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleFormat {
    pub locale: &'static str,
    decimal: char,
    group: Option<char>,
    position: SymbolPosition,
}

const EN_US: LocaleFormat = LocaleFormat {
    locale: "en_US",
    decimal: '.',
    group: Some(','),
    position: SymbolPosition::Prefix,
};

const LOCALES: &[LocaleFormat] = &[
    EN_US,
    LocaleFormat {
        locale: "en_GB",
        decimal: '.',
        group: Some(','),
        position: SymbolPosition::Prefix,
    },
    LocaleFormat {
        locale: "de_DE",
        decimal: ',',
        group: Some('.'),
        position: SymbolPosition::Suffix,
    },
    LocaleFormat {
        locale: "fr_FR",
        decimal: ',',
        group: Some(NNBSP),
        position: SymbolPosition::Suffix,
    },
    LocaleFormat {
        locale: "es_ES",
        decimal: ',',
        group: Some('.'),
        position: SymbolPosition::Suffix,
    },
    LocaleFormat {
        locale: "it_IT",
        decimal: ',',
        group: Some('.'),
        position: SymbolPosition::Suffix,
    },
    LocaleFormat {
        locale: "nl_NL",
        decimal: ',',
        group: Some('.'),
        position: SymbolPosition::PrefixSpaced,
    },
    LocaleFormat {
        locale: "pt_BR",
        decimal: ',',
        group: Some('.'),
        position: SymbolPosition::PrefixSpaced,
    },
    LocaleFormat {
        locale: "ja_JP",
        decimal: '.',
        group: Some(','),
        position: SymbolPosition::Prefix,
    },
];

/// Region assumed for a bare language tag.
const DEFAULT_REGIONS: &[(&str, &str)] = &[
    ("en", "en_US"),
    ("de", "de_DE"),
    ("fr", "fr_FR"),
    ("es", "es_ES"),
    ("it", "it_IT"),
    ("nl", "nl_NL"),
    ("pt", "pt_BR"),
    ("ja", "ja_JP"),
];

impl LocaleFormat {
    /// The fallback layout.
    pub const fn en_us() -> &'static LocaleFormat {
        &EN_US
    }

    /// Looks up `ll_RR` or a bare `ll`.
    pub fn resolve(locale: &str) -> Option<&'static LocaleFormat> {
        let full = if locale.len() == 2 {
            DEFAULT_REGIONS
                .iter()
                .find(|(lang, _)| *lang == locale)
                .map(|(_, full)| *full)?
        } else {
            locale
        };
        LOCALES.iter().find(|f| f.locale == full)
    }

    /// Formats `amount` in `currency` (ISO code) following this layout.
    pub fn format_currency(&self, amount: f64, currency: &str) -> String {
        let digits = fraction_digits(currency);
        let number = self.format_number(amount.abs(), digits);
        let sign = if amount < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };
        let symbol = symbol(currency, self.locale);
        // Alphabetic codes (CHF, SEK) are always separated from the number.
        let spaced = symbol.chars().all(|c| c.is_ascii_uppercase());

        match self.position {
            SymbolPosition::Prefix if !spaced => format!("{sign}{symbol}{number}"),
            SymbolPosition::Prefix | SymbolPosition::PrefixSpaced => {
                format!("{sign}{symbol}{NBSP}{number}")
            }
            SymbolPosition::Suffix => format!("{sign}{number}{NBSP}{symbol}"),
        }
    }

    fn format_number(&self, value: f64, digits: usize) -> String {
        let fixed = format!("{value:.digits$}");
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
        let len = int_part.len();
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                if let Some(group) = self.group {
                    out.push(group);
                }
            }
            out.push(ch);
        }
        if let Some(frac) = frac_part {
            out.push(self.decimal);
            out.push_str(frac);
        }
        out
    }
}

/// Formats with the layout of `locale`, or `None` when the locale is unknown.
pub fn format_currency(amount: f64, currency: &str, locale: &str) -> Option<String> {
    LocaleFormat::resolve(locale).map(|f| f.format_currency(amount, currency))
}

fn fraction_digits(currency: &str) -> usize {
    match currency {
        "JPY" | "KRW" | "ISK" | "CLP" => 0,
        _ => 2,
    }
}

fn symbol(currency: &str, locale: &str) -> String {
    let sym = match (currency, locale) {
        ("USD", "en_US") => "$",
        ("USD", _) => "US$",
        ("EUR", _) => "€",
        ("GBP", _) => "£",
        ("JPY", "ja_JP") => "￥",
        ("JPY", _) => "¥",
        ("INR", _) => "₹",
        ("BRL", _) => "R$",
        (code, _) => code,
    };
    sym.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_en_us() {
        assert_eq!(format_currency(81.82, "GBP", "en_US").unwrap(), "£81.82");
        assert_eq!(
            format_currency(1234567.5, "USD", "en_US").unwrap(),
            "$1,234,567.50"
        );
    }

    #[test]
    fn test_suffix_locales() {
        assert_eq!(
            format_currency(1234.5, "EUR", "de_DE").unwrap(),
            "1.234,50\u{a0}€"
        );
        assert_eq!(
            format_currency(1234.5, "EUR", "fr_FR").unwrap(),
            "1\u{202f}234,50\u{a0}€"
        );
    }

    #[test]
    fn test_prefix_spaced() {
        assert_eq!(
            format_currency(10.0, "BRL", "pt_BR").unwrap(),
            "R$\u{a0}10,00"
        );
    }

    #[test]
    fn test_language_only_resolves_default_region() {
        assert_eq!(
            format_currency(5.88, "EUR", "de").unwrap(),
            "5,88\u{a0}€"
        );
    }

    #[test]
    fn test_unknown_locale() {
        assert!(format_currency(1.0, "EUR", "xx_XX").is_none());
        assert!(format_currency(1.0, "EUR", "zz").is_none());
    }

    #[test]
    fn test_code_without_symbol() {
        assert_eq!(
            format_currency(12.0, "CHF", "en_US").unwrap(),
            "CHF\u{a0}12.00"
        );
    }

    #[test]
    fn test_zero_fraction_currency() {
        assert_eq!(format_currency(1500.4, "JPY", "en_US").unwrap(), "¥1,500");
    }

    #[test]
    fn test_fallback_layout() {
        assert_eq!(
            LocaleFormat::en_us().format_currency(0.0, "EUR"),
            "€0.00"
        );
    }
}
