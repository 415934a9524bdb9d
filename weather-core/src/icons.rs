//! Day/night icon URL derivation.
//!
//! Provider icon codes end in `d` (day) or `n` (night); the rest names the
//! condition. The opposite variant is the same code with the marker flipped.

use crate::model::IconUrls;

const DAY: char = 'd';
const NIGHT: char = 'n';

#[derive(Debug, Clone)]
pub struct IconUrlDeriver {
    base_url: String,
}

impl IconUrlDeriver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Derive both icon URLs from one code.
    ///
    /// Codes that end in neither marker map to the same URL on both sides.
    pub fn derive(&self, code: &str) -> IconUrls {
        let (day, night) = match code.chars().last() {
            Some(DAY) => (code.to_string(), flip(code, NIGHT)),
            Some(NIGHT) => (flip(code, DAY), code.to_string()),
            _ => (code.to_string(), code.to_string()),
        };

        IconUrls {
            day: self.url(&day),
            night: self.url(&night),
        }
    }

    pub fn url(&self, code: &str) -> String {
        format!("{}/{}@2x.png", self.base_url, code)
    }
}

fn flip(code: &str, marker: char) -> String {
    let mut flipped = code[..code.len() - 1].to_string();
    flipped.push(marker);
    flipped
}
