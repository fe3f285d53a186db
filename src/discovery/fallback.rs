//! Curated fallback dataset of Malaysian funding programmes.
//!
//! Used whenever live search yields nothing. The provider is pure and
//! synchronous; filtering is substring matching and deliberately broadens to
//! the first few entries rather than returning an empty list.

use crate::discovery::confidence;
use crate::discovery::types::{
    MarketInsights, OpportunityKind, Provenance, ScrapedEvent, ScrapedOpportunity,
};

/// Confidence assigned to curated entries. Above the default floor so they
/// survive the confidence filter.
pub const FALLBACK_CONFIDENCE: f32 = 0.85;

/// How many unfiltered entries to return when no entry matches the filters.
const BROADENED_COUNT: usize = 3;

/// A hand-curated funding programme.
#[derive(Clone, Copy, Debug)]
pub struct FallbackProgramme {
    /// Programme title.
    pub title: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Operating organisation.
    pub organisation: &'static str,
    /// Kind of opportunity.
    pub kind: OpportunityKind,
    /// Sector focus.
    pub sector: &'static str,
    /// Location.
    pub location: &'static str,
    /// Typical funding amount, when published.
    pub amount: Option<&'static str>,
    /// Programme URL.
    pub url: &'static str,
    /// Source domain.
    pub source: &'static str,
}

impl FallbackProgramme {
    /// Map a curated entry into the scraped-opportunity shape.
    #[must_use]
    pub fn to_opportunity(&self) -> ScrapedOpportunity {
        ScrapedOpportunity {
            title: self.title.to_string(),
            description: self.description.to_string(),
            kind: self.kind,
            sector: Some(self.sector.to_string()),
            location: Some(self.location.to_string()),
            deadline: None,
            amount: self.amount.map(str::to_string),
            url: Some(self.url.to_string()),
            source: self.source.to_string(),
            confidence: confidence::clamp(FALLBACK_CONFIDENCE),
            provenance: Provenance::Fallback,
        }
    }
}

/// Source domains of the curated dataset, for provenance checks.
pub const FALLBACK_SOURCE_DOMAINS: &[&str] = &[
    "cradlefund.com.my",
    "mdec.my",
    "mranti.my",
    "1337.ventures",
    "mavcap.com",
    "bnm.gov.my",
    "mystartup.gov.my",
    "smecorp.gov.my",
    "sunwayilabs.com",
    "gobi.vc",
];

/// True when a source domain belongs to the curated dataset.
#[must_use]
pub fn is_fallback_domain(domain: &str) -> bool {
    FALLBACK_SOURCE_DOMAINS
        .iter()
        .any(|known| domain.eq_ignore_ascii_case(known))
}

/// The curated programme list, in priority order.
const PROGRAMMES: &[FallbackProgramme] = &[
    FallbackProgramme {
        title: "Cradle CIP Spark",
        description: "Pre-seed conditional grant from Cradle Fund for early-stage Malaysian \
                      technology startups building towards a commercial prototype.",
        organisation: "Cradle Fund Sdn Bhd",
        kind: OpportunityKind::Grant,
        sector: "Technology",
        location: "Malaysia",
        amount: Some("Up to RM150,000"),
        url: "https://www.cradlefund.com.my/cip-spark/",
        source: "cradlefund.com.my",
    },
    FallbackProgramme {
        title: "Cradle CIP Sprint",
        description: "Commercialisation grant from Cradle Fund for Malaysian startups with a \
                      market-ready product looking to scale revenue.",
        organisation: "Cradle Fund Sdn Bhd",
        kind: OpportunityKind::Grant,
        sector: "Technology",
        location: "Malaysia",
        amount: Some("Up to RM600,000"),
        url: "https://www.cradlefund.com.my/cip-sprint/",
        source: "cradlefund.com.my",
    },
    FallbackProgramme {
        title: "MDEC Founders Centre of Excellence",
        description: "MDEC programme pairing Malaysian digital-economy founders with global \
                      mentors, investors and market-access support.",
        organisation: "Malaysia Digital Economy Corporation",
        kind: OpportunityKind::Accelerator,
        sector: "Digital Economy",
        location: "Malaysia",
        amount: None,
        url: "https://mdec.my/fox",
        source: "mdec.my",
    },
    FallbackProgramme {
        title: "MDEC Digital Content Grant",
        description: "Matching grant from MDEC for Malaysian digital content and creative \
                      technology companies.",
        organisation: "Malaysia Digital Economy Corporation",
        kind: OpportunityKind::Grant,
        sector: "Digital Content",
        location: "Malaysia",
        amount: Some("Up to RM1,000,000"),
        url: "https://mdec.my/digital-content-grant",
        source: "mdec.my",
    },
    FallbackProgramme {
        title: "MRANTI Global Accelerator Programme",
        description: "Equity-free accelerator run by MRANTI for Malaysian deep-tech and \
                      innovation-driven startups preparing for international markets.",
        organisation: "Malaysian Research Accelerator for Technology and Innovation",
        kind: OpportunityKind::Accelerator,
        sector: "DeepTech",
        location: "Kuala Lumpur, Malaysia",
        amount: None,
        url: "https://mranti.my/accelerator",
        source: "mranti.my",
    },
    FallbackProgramme {
        title: "Alpha Startups Pre-Accelerator",
        description: "1337 Ventures' pre-accelerator bootcamp for Southeast Asian idea-stage \
                      founders, with pre-seed investment for top graduates.",
        organisation: "1337 Ventures",
        kind: OpportunityKind::Accelerator,
        sector: "Technology",
        location: "Malaysia",
        amount: Some("Up to RM50,000"),
        url: "https://1337.ventures/alpha-startups",
        source: "1337.ventures",
    },
    FallbackProgramme {
        title: "MAVCAP Venture Funding",
        description: "Venture capital funding from Malaysia Venture Capital Management for \
                      high-growth technology companies from seed to Series B.",
        organisation: "MAVCAP",
        kind: OpportunityKind::Investment,
        sector: "Technology",
        location: "Malaysia",
        amount: Some("RM1,000,000 - RM20,000,000"),
        url: "https://mavcap.com",
        source: "mavcap.com",
    },
    FallbackProgramme {
        title: "BNM FinTech Regulatory Sandbox",
        description: "Bank Negara Malaysia sandbox allowing FinTech startups to test \
                      innovative financial products under relaxed regulatory requirements.",
        organisation: "Bank Negara Malaysia",
        kind: OpportunityKind::Other,
        sector: "FinTech",
        location: "Malaysia",
        amount: None,
        url: "https://www.bnm.gov.my/fintech-regulatory-sandbox",
        source: "bnm.gov.my",
    },
    FallbackProgramme {
        title: "MYStartup Pre-Accelerator",
        description: "National pre-accelerator under MOSTI's MYStartup initiative for \
                      Malaysian founders validating early-stage ideas.",
        organisation: "MOSTI / Cradle",
        kind: OpportunityKind::Accelerator,
        sector: "Technology",
        location: "Malaysia",
        amount: None,
        url: "https://www.mystartup.gov.my",
        source: "mystartup.gov.my",
    },
    FallbackProgramme {
        title: "SME Corp Business Accelerator Programme",
        description: "SME Corp grant and capability-building programme for Malaysian small \
                      and medium enterprises, including tech-enabled businesses.",
        organisation: "SME Corp Malaysia",
        kind: OpportunityKind::Grant,
        sector: "SME",
        location: "Malaysia",
        amount: Some("Up to RM600,000"),
        url: "https://www.smecorp.gov.my/bap",
        source: "smecorp.gov.my",
    },
    FallbackProgramme {
        title: "Sunway iLabs Super Accelerator",
        description: "Corporate accelerator by Sunway iLabs connecting startups with the \
                      Sunway Group's industries across healthcare, education and retail.",
        organisation: "Sunway iLabs",
        kind: OpportunityKind::Accelerator,
        sector: "HealthTech",
        location: "Kuala Lumpur, Malaysia",
        amount: None,
        url: "https://sunwayilabs.com/accelerator",
        source: "sunwayilabs.com",
    },
    FallbackProgramme {
        title: "Gobi Partners SuperSeed Fund",
        description: "Early-stage fund from Gobi Partners investing in seed to Series A \
                      startups across Malaysia and Southeast Asia.",
        organisation: "Gobi Partners",
        kind: OpportunityKind::Investment,
        sector: "Technology",
        location: "Southeast Asia",
        amount: Some("USD 100,000 - USD 1,000,000"),
        url: "https://gobi.vc",
        source: "gobi.vc",
    },
];

/// Curated programmes filtered by sector and location substrings.
///
/// Matching is case-insensitive. When no entry matches both filters the
/// first [`BROADENED_COUNT`] unfiltered entries are returned instead, so the
/// provider always returns something.
#[must_use]
pub fn fallback_results(
    sector: Option<&str>,
    location: Option<&str>,
) -> Vec<&'static FallbackProgramme> {
    let sector = sector.map(str::to_lowercase).filter(|s| !s.is_empty());
    let location = location.map(str::to_lowercase).filter(|l| !l.is_empty());

    let matches: Vec<&'static FallbackProgramme> = PROGRAMMES
        .iter()
        .filter(|p| {
            let sector_ok = sector
                .as_deref()
                .map_or(true, |s| p.sector.to_lowercase().contains(s));
            let location_ok = location
                .as_deref()
                .map_or(true, |l| p.location.to_lowercase().contains(l));
            sector_ok && location_ok
        })
        .collect();

    if matches.is_empty() {
        return PROGRAMMES.iter().take(BROADENED_COUNT).collect();
    }
    matches
}

/// Curated fallback opportunities already mapped into the scraped shape.
#[must_use]
pub fn fallback_opportunities(
    sector: Option<&str>,
    location: Option<&str>,
) -> Vec<ScrapedOpportunity> {
    fallback_results(sector, location)
        .into_iter()
        .map(FallbackProgramme::to_opportunity)
        .collect()
}

/// Curated insight text about the Malaysian startup ecosystem.
#[must_use]
pub fn startup_insights() -> MarketInsights {
    MarketInsights {
        trends: vec![
            "Islamic FinTech and digital banking continue to attract the largest share of \
             Malaysian startup funding."
                .to_string(),
            "Government-linked funds (Cradle, MAVCAP, Khazanah) anchor most pre-seed and \
             seed rounds."
                .to_string(),
            "Regional expansion into Indonesia and Vietnam is the dominant growth play for \
             Series A companies."
                .to_string(),
        ],
        key_findings: vec![
            "Grant funding (CIP Spark/Sprint, MDEC) remains the most accessible first \
             cheque for technical founders."
                .to_string(),
            "Accelerator cohorts in Kuala Lumpur report rising applications from AgriTech \
             and HealthTech teams."
                .to_string(),
        ],
        recommendations: vec![
            "Apply to grant programmes before raising equity; most are non-dilutive."
                .to_string(),
            "Track MDEC and MRANTI cohort deadlines, which typically open quarterly."
                .to_string(),
        ],
        provenance: Provenance::Fallback,
    }
}

/// Curated upcoming ecosystem events.
#[must_use]
pub fn upcoming_events() -> Vec<ScrapedEvent> {
    let events = [
        (
            "KL20 Summit",
            "Flagship government-backed startup summit gathering founders and global VCs \
             in Kuala Lumpur.",
            "Kuala Lumpur, Malaysia",
            "https://www.kl20.my",
            "mystartup.gov.my",
        ),
        (
            "MYStartup Summit",
            "National startup summit by MOSTI with pitching stages, clinics and investor \
             matching.",
            "Kuala Lumpur, Malaysia",
            "https://www.mystartup.gov.my/summit",
            "mystartup.gov.my",
        ),
        (
            "Wild Digital Southeast Asia",
            "Regional conference on digital economy trends, hosted annually in Kuala \
             Lumpur.",
            "Kuala Lumpur, Malaysia",
            "https://www.wilddigital.com",
            "mdec.my",
        ),
    ];

    events
        .into_iter()
        .map(|(title, description, location, url, source)| ScrapedEvent {
            title: title.to_string(),
            description: description.to_string(),
            date: None,
            location: Some(location.to_string()),
            url: Some(url.to_string()),
            source: source.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            provenance: Provenance::Fallback,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_sector_and_location() {
        let results = fallback_results(Some("FinTech"), Some("Malaysia"));
        assert!(!results.is_empty());
        for p in &results {
            assert!(p.sector.to_lowercase().contains("fintech"));
            assert!(p.location.to_lowercase().contains("malaysia"));
        }
    }

    #[test]
    fn test_broadens_to_first_three_when_nothing_matches() {
        let results = fallback_results(Some("quantum basket weaving"), Some("Antarctica"));
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, PROGRAMMES[0].title);
        assert_eq!(results[1].title, PROGRAMMES[1].title);
        assert_eq!(results[2].title, PROGRAMMES[2].title);
    }

    #[test]
    fn test_deterministic() {
        let a = fallback_results(Some("Technology"), None);
        let b = fallback_results(Some("Technology"), None);
        let titles_a: Vec<_> = a.iter().map(|p| p.title).collect();
        let titles_b: Vec<_> = b.iter().map(|p| p.title).collect();
        assert_eq!(titles_a, titles_b);
    }

    #[test]
    fn test_opportunity_mapping() {
        let opportunities = fallback_opportunities(None, None);
        assert_eq!(opportunities.len(), PROGRAMMES.len());
        for opp in &opportunities {
            assert_eq!(opp.provenance, Provenance::Fallback);
            assert!(opp.confidence >= 0.7);
            assert!(is_fallback_domain(&opp.source));
        }
    }

    #[test]
    fn test_known_domains() {
        assert!(is_fallback_domain("mdec.my"));
        assert!(is_fallback_domain("CRADLEFUND.COM.MY"));
        assert!(!is_fallback_domain("example.com"));
    }

    #[test]
    fn test_insights_and_events_are_fallback() {
        let insights = startup_insights();
        assert!(!insights.is_empty());
        assert_eq!(insights.provenance, Provenance::Fallback);

        let events = upcoming_events();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.provenance == Provenance::Fallback));
    }
}
