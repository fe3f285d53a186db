//! Role-tailored search query construction.
//!
//! Pure string building: sector and location are included verbatim so
//! downstream keyword matching lines up with what was asked for.

use crate::discovery::config::DiscoveryConfig;
use crate::profile::{ProfileRole, UserProfile};

/// Build the primary search query for a profile.
///
/// An explicit free-text query from the caller takes precedence over the
/// role template.
#[must_use]
pub fn build_search_query(profile: &UserProfile, free_text: Option<&str>) -> String {
    if let Some(text) = free_text {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let sector = profile.sector.as_deref().unwrap_or("startup");
    let location = profile.location.as_deref().unwrap_or("Malaysia");

    match profile.role {
        ProfileRole::Founder => {
            let mut query =
                format!("funding opportunities grants accelerators for {sector} startups in {location}");
            if let Some(stage) = &profile.stage {
                query.push_str(&format!(" at {stage} stage"));
            }
            query
        }
        ProfileRole::Funder => {
            let mut query =
                format!("promising {sector} startups seeking investment in {location}");
            if let Some(range) = &profile.investment_range {
                query.push_str(&format!(" with ticket size {range}"));
            }
            query
        }
        ProfileRole::Admin | ProfileRole::EcosystemBuilder => {
            format!("{sector} startup ecosystem news programmes and events in {location}")
        }
    }
}

/// Build the 1–3 queries a discovery run executes concurrently.
///
/// The first query is always [`build_search_query`]; the rest widen
/// coverage per role, capped by `config.max_queries`.
#[must_use]
pub fn build_discovery_queries(profile: &UserProfile, config: &DiscoveryConfig) -> Vec<String> {
    let sector = profile.sector.as_deref().unwrap_or("startup");
    let location = profile.location.as_deref().unwrap_or("Malaysia");

    let mut queries = vec![build_search_query(profile, None)];
    match profile.role {
        ProfileRole::Founder => {
            queries.push(format!(
                "government grants and incubator programmes for {sector} in {location}"
            ));
            queries.push(format!(
                "startup competitions and pitch events in {location}"
            ));
        }
        ProfileRole::Funder => {
            queries.push(format!(
                "recently funded {sector} companies in {location}"
            ));
            queries.push(format!("{location} startup demo days and investor events"));
        }
        ProfileRole::Admin | ProfileRole::EcosystemBuilder => {
            queries.push(format!(
                "new accelerators and grants launched in {location}"
            ));
        }
    }

    queries.truncate(config.max_queries);
    queries
}

/// Build the market-insights query for a sector.
#[must_use]
pub fn market_trends_query(sector: &str) -> String {
    format!("market trends in {sector}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn founder() -> UserProfile {
        UserProfile::new(Uuid::new_v4(), ProfileRole::Founder)
            .with_sector("FinTech")
            .with_location("Kuala Lumpur")
    }

    #[test]
    fn test_query_contains_sector_and_location_verbatim() {
        let query = build_search_query(&founder(), None);
        assert!(query.contains("FinTech"));
        assert!(query.contains("Kuala Lumpur"));
    }

    #[test]
    fn test_role_templates_differ() {
        let profile = founder();
        let founder_q = build_search_query(&profile, None);
        assert!(founder_q.contains("grants"));

        let funder = UserProfile::new(Uuid::new_v4(), ProfileRole::Funder)
            .with_sector("FinTech")
            .with_investment_range("RM500k-RM2M");
        let funder_q = build_search_query(&funder, None);
        assert!(funder_q.contains("seeking investment"));
        assert!(funder_q.contains("RM500k-RM2M"));

        let admin = UserProfile::new(Uuid::new_v4(), ProfileRole::Admin);
        let admin_q = build_search_query(&admin, None);
        assert!(admin_q.contains("ecosystem"));
    }

    #[test]
    fn test_free_text_overrides_template() {
        let query = build_search_query(&founder(), Some("halal fintech grants Penang"));
        assert_eq!(query, "halal fintech grants Penang");

        // Blank free text falls back to the template.
        let query = build_search_query(&founder(), Some("   "));
        assert!(query.contains("FinTech"));
    }

    #[test]
    fn test_discovery_queries_capped() {
        let config = DiscoveryConfig::default();
        let queries = build_discovery_queries(&founder(), &config);
        assert!(!queries.is_empty());
        assert!(queries.len() <= config.max_queries);
        assert_eq!(queries[0], build_search_query(&founder(), None));
    }

    #[test]
    fn test_market_trends_query() {
        assert_eq!(market_trends_query("AgriTech"), "market trends in AgriTech");
    }
}
