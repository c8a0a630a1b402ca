use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Digit-grouping convention for counts shown in the overview card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NumberLocale {
    #[default]
    En,
    De,
    Fr,
    Ch,
}

impl NumberLocale {
    pub fn separator(self) -> char {
        match self {
            NumberLocale::En => ',',
            NumberLocale::De => '.',
            NumberLocale::Fr => '\u{202f}',
            NumberLocale::Ch => '\'',
        }
    }

    pub fn group_digits(self, value: u64) -> String {
        let digits = value.to_string();
        let separator = self.separator();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (index, ch) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                out.push(separator);
            }
            out.push(ch);
        }
        out
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberLocale::En => write!(f, "en"),
            NumberLocale::De => write!(f, "de"),
            NumberLocale::Fr => write!(f, "fr"),
            NumberLocale::Ch => write!(f, "ch"),
        }
    }
}
