//! Regex heuristics that pull structured fields out of page text.
//!
//! These are best-effort: each extractor returns the first plausible match
//! or `None`, and never fails.

use std::sync::OnceLock;

use regex::Regex;

/// Sector keywords recognised in page text, mapped to canonical names.
const SECTOR_KEYWORDS: &[(&str, &str)] = &[
    ("fintech", "FinTech"),
    ("islamic finance", "Islamic Finance"),
    ("healthtech", "HealthTech"),
    ("health tech", "HealthTech"),
    ("edtech", "EdTech"),
    ("agritech", "AgriTech"),
    ("agrotech", "AgriTech"),
    ("e-commerce", "E-Commerce"),
    ("ecommerce", "E-Commerce"),
    ("biotech", "BioTech"),
    ("greentech", "GreenTech"),
    ("cleantech", "GreenTech"),
    ("logistics", "Logistics"),
    ("proptech", "PropTech"),
    ("insurtech", "InsurTech"),
    ("deep tech", "DeepTech"),
    ("deeptech", "DeepTech"),
    ("artificial intelligence", "AI"),
    ("machine learning", "AI"),
    ("saas", "SaaS"),
    ("halal", "Halal Economy"),
];

fn deadline_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            // "deadline: 31 December 2025", "closing date - March 15, 2026"
            r"(?i)(?:deadline|closing date|closes|apply by|applications? close[sd]?(?: on)?)\s*[:\-]?\s*([0-9]{1,2}\s+[A-Za-z]+\s+[0-9]{4}|[A-Za-z]+\s+[0-9]{1,2},?\s+[0-9]{4}|[0-9]{1,2}/[0-9]{1,2}/[0-9]{2,4})",
            // Bare long-form dates near the word "deadline" already handled;
            // otherwise pick up an ISO date following "by".
            r"(?i)\bby\s+([0-9]{4}-[0-9]{2}-[0-9]{2})",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

fn amount_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            // "RM150,000", "RM 2.5 million", "up to RM600k"
            r"(?i)((?:up to\s+)?RM\s?[0-9][0-9,\.]*\s?(?:million|mil|k)?)",
            // "USD 100,000", "US$1.5 million", "$250,000"
            r"(?i)((?:up to\s+)?(?:USD?|US\$|\$|SGD)\s?[0-9][0-9,\.]*\s?(?:million|mil|k)?)",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// Extract an application deadline from page text.
#[must_use]
pub fn extract_deadline(text: &str) -> Option<String> {
    for regex in deadline_regexes() {
        if let Some(captures) = regex.captures(text) {
            if let Some(matched) = captures.get(1) {
                return Some(matched.as_str().trim().to_string());
            }
        }
    }
    None
}

/// Extract a funding amount from page text.
#[must_use]
pub fn extract_amount(text: &str) -> Option<String> {
    for regex in amount_regexes() {
        if let Some(captures) = regex.captures(text) {
            if let Some(matched) = captures.get(1) {
                return Some(matched.as_str().trim().to_string());
            }
        }
    }
    None
}

/// Extract a canonical sector keyword from page text.
#[must_use]
pub fn extract_sector(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    SECTOR_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, canonical)| (*canonical).to_string())
}
