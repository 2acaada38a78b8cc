//! Tier Resolver (§4.3): a pure classifier mapping a proposed task to an
//! autonomy tier. Grounded on the teacher's `patterns::learning::PhaseType::classify`
//! keyword-substring matcher — same shape, a lowercase haystack and an
//! ordered list of `contains` checks with a fallthrough default.

use crate::domain::AutonomyTier;

const T2_KEYWORDS: &[&str] = &[
    "deploy",
    "production",
    "publish",
    "release",
    "customer",
    "outbound",
    "email send",
    "billing",
    "payment",
    "spend",
    "purchase",
    "delete",
    "destroy",
    "public",
];

const T1_KEYWORDS: &[&str] = &[
    "staging",
    "experiment",
    "a/b test",
    "trial",
    "prototype",
    "draft",
];

/// Rules applied in order (§4.3); a T2 keyword overrides `suggested_tier =
/// T1`, a T1 keyword promotes T0 to T1, and `suggested_tier = T2` is a
/// one-way ratchet that nothing downgrades.
pub fn resolve(title: &str, description: &str, suggested_tier: Option<AutonomyTier>) -> AutonomyTier {
    if suggested_tier == Some(AutonomyTier::T2) {
        return AutonomyTier::T2;
    }

    let haystack = format!("{title} {description}").to_lowercase();

    if T2_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        return AutonomyTier::T2;
    }

    if T1_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        return AutonomyTier::T1;
    }

    if suggested_tier == Some(AutonomyTier::T1) {
        return AutonomyTier::T1;
    }

    AutonomyTier::T0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_to_production_is_t2() {
        assert_eq!(
            resolve("Deploy to production", "", None),
            AutonomyTier::T2
        );
    }

    #[test]
    fn t2_keyword_in_description_triggers_t2() {
        assert_eq!(
            resolve("Update readme", "this touches billing logic", None),
            AutonomyTier::T2
        );
    }

    #[test]
    fn t1_keyword_promotes_t0_to_t1() {
        assert_eq!(
            resolve("Run an experiment", "quick prototype", None),
            AutonomyTier::T1
        );
    }

    #[test]
    fn suggested_t1_is_respected_absent_keywords() {
        assert_eq!(
            resolve("Refactor module", "no risky words here", Some(AutonomyTier::T1)),
            AutonomyTier::T1
        );
    }

    #[test]
    fn default_is_t0() {
        assert_eq!(resolve("Fix typo", "cosmetic change", None), AutonomyTier::T0);
    }

    #[test]
    fn t2_keyword_overrides_suggested_t1() {
        assert_eq!(
            resolve("Prototype", "delete the old table", Some(AutonomyTier::T1)),
            AutonomyTier::T2
        );
    }

    #[test]
    fn suggested_t2_is_a_one_way_ratchet() {
        assert_eq!(
            resolve("Totally harmless", "nothing risky", Some(AutonomyTier::T2)),
            AutonomyTier::T2
        );
    }

    #[test]
    fn tier_ratchet_property_any_t2_keyword_yields_t2() {
        for kw in T2_KEYWORDS {
            assert_eq!(
                resolve(&format!("task about {kw}"), "", None),
                AutonomyTier::T2,
                "keyword {kw} should trigger T2"
            );
        }
    }
}
