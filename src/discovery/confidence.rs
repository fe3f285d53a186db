//! Confidence scoring heuristics.
//!
//! Confidence is a heuristic relevance score, not a statistical guarantee.
//! Boosts only ever increase the score and the result is always clamped to
//! `[0, 1]`.

/// Boost applied when the item's text matches the profile sector.
pub const SECTOR_BOOST: f32 = 0.2;

/// Boost applied when the item's text matches the profile location.
pub const LOCATION_BOOST: f32 = 0.1;

/// Boost applied when the item comes from a trusted source domain.
pub const TRUSTED_SOURCE_BOOST: f32 = 0.15;

/// Base score for items parsed out of a chat completion.
pub const AI_BASE_CONFIDENCE: f32 = 0.8;

/// Anything exposing a confidence score.
pub trait Scored {
    /// Heuristic relevance score in [0, 1].
    fn confidence(&self) -> f32;
}

/// Clamp a score to `[0, 1]`.
#[must_use]
pub fn clamp(score: f32) -> f32 {
    score.clamp(0.0, 1.0)
}

/// Score an item against a profile: base plus sector/location/trusted-source
/// boosts, clamped.
#[must_use]
pub fn score_item(
    base: f32,
    sector_match: bool,
    location_match: bool,
    trusted_source: bool,
) -> f32 {
    let mut score = base;
    if sector_match {
        score += SECTOR_BOOST;
    }
    if location_match {
        score += LOCATION_BOOST;
    }
    if trusted_source {
        score += TRUSTED_SOURCE_BOOST;
    }
    clamp(score)
}

/// Confidence for an AI-parsed result: base 0.8, +0.1 when the sector
/// keyword appears in the text, +0.1 for the location keyword, +0.05 for a
/// description longer than 200 characters, capped at 1.0.
#[must_use]
pub fn ai_confidence(
    title: &str,
    description: &str,
    sector: Option<&str>,
    location: Option<&str>,
) -> f32 {
    let haystack = format!("{} {}", title.to_lowercase(), description.to_lowercase());

    let mut score = AI_BASE_CONFIDENCE;
    if let Some(sector) = sector {
        if !sector.is_empty() && haystack.contains(&sector.to_lowercase()) {
            score += 0.1;
        }
    }
    if let Some(location) = location {
        if !location.is_empty() && haystack.contains(&location.to_lowercase()) {
            score += 0.1;
        }
    }
    if description.len() > 200 {
        score += 0.05;
    }
    clamp(score)
}

/// Keep items at or above the floor, in their original relative order,
/// truncated to `cap`.
#[must_use]
pub fn retain_confident<T: Scored>(items: Vec<T>, floor: f32, cap: usize) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| item.confidence() >= floor)
        .take(cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(f32);

    impl Scored for Item {
        fn confidence(&self) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_clamp_bounds() {
        assert!((clamp(1.7) - 1.0).abs() < f32::EPSILON);
        assert!(clamp(-0.3).abs() < f32::EPSILON);
        assert!((clamp(0.42) - 0.42).abs() < f32::EPSILON);
    }

    #[test]
    fn test_score_item_boosts_cap_at_one() {
        // 0.9 + 0.2 + 0.1 + 0.15 would exceed 1.0.
        let score = score_item(0.9, true, true, true);
        assert!((score - 1.0).abs() < f32::EPSILON);

        let score = score_item(0.5, true, false, true);
        assert!((score - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_ai_confidence_components() {
        // No matches, short description: base only.
        let score = ai_confidence("Some Grant", "short", Some("FinTech"), Some("Malaysia"));
        assert!((score - 0.8).abs() < 1e-6);

        // Sector and location present, long description.
        let long = "FinTech accelerator based in Malaysia. ".repeat(8);
        let score = ai_confidence("Programme", &long, Some("FinTech"), Some("Malaysia"));
        assert!((score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ai_confidence_case_insensitive() {
        let score = ai_confidence("KL fintech grant", "", Some("FinTech"), None);
        assert!((score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_retain_confident_order_and_cap() {
        let items = vec![Item(0.5), Item(0.69), Item(0.7), Item(0.95)];
        let kept = retain_confident(items, 0.7, 20);
        let scores: Vec<f32> = kept.iter().map(Scored::confidence).collect();
        assert_eq!(scores, vec![0.7, 0.95]);

        let many: Vec<Item> = (0..30).map(|_| Item(0.9)).collect();
        assert_eq!(retain_confident(many, 0.7, 20).len(), 20);
    }
}
