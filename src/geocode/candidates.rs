//! Candidate query generation for fallback geocoding.
//!
//! Free-text site names are noisy, and a single fixed query misses often
//! enough to matter. Each site expands into an ordered list of alternative
//! queries derived from its name fields, most specific first; the resolver
//! walks the list until one matches.

use std::collections::HashSet;

use crate::config::CandidateConfig;

/// One rewrite step in the candidate pipeline.
///
/// Rules run in order and each contributes zero or more query strings.
/// The combined sequence is whitespace-normalized and de-duplicated,
/// keeping the first occurrence of each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    /// The geocode name as written
    Raw,
    /// Geocode name with each jurisdiction qualifier appended
    QualifiedGeocodeName,
    /// Site name with each jurisdiction qualifier appended
    QualifiedSiteName,
    /// Geocode name with each noise token removed
    StrippedGeocodeName,
    /// Site name with each noise token removed
    StrippedSiteName,
    /// Site name with every noise token removed, plus the primary qualifier
    StrippedQualifiedSiteName,
}

impl RewriteRule {
    /// Rule order used by the crabbing variant, most specific first.
    pub fn default_order() -> &'static [RewriteRule] {
        &[
            RewriteRule::Raw,
            RewriteRule::QualifiedGeocodeName,
            RewriteRule::QualifiedSiteName,
            RewriteRule::StrippedGeocodeName,
            RewriteRule::StrippedSiteName,
            RewriteRule::StrippedQualifiedSiteName,
        ]
    }

    fn apply(
        &self,
        geocode_name: &str,
        site_name: &str,
        vocab: &CandidateConfig,
        out: &mut Vec<String>,
    ) {
        match self {
            RewriteRule::Raw => out.push(geocode_name.to_string()),
            RewriteRule::QualifiedGeocodeName => {
                for qualifier in &vocab.qualifiers {
                    out.push(format!("{}, {}", geocode_name, qualifier));
                }
            }
            RewriteRule::QualifiedSiteName => {
                for qualifier in &vocab.qualifiers {
                    out.push(format!("{}, {}", site_name, qualifier));
                }
            }
            RewriteRule::StrippedGeocodeName => {
                for token in &vocab.noise_tokens {
                    out.push(strip_token(geocode_name, token));
                }
            }
            RewriteRule::StrippedSiteName => {
                for token in &vocab.noise_tokens {
                    out.push(strip_token(site_name, token));
                }
            }
            RewriteRule::StrippedQualifiedSiteName => {
                let mut name = site_name.to_string();
                for token in &vocab.noise_tokens {
                    name = strip_token(&name, token);
                }
                if let Some(primary) = vocab.qualifiers.first() {
                    out.push(format!("{}, {}", name, primary));
                }
            }
        }
    }
}

/// Remove ` token` occurrences from a name.
fn strip_token(name: &str, token: &str) -> String {
    name.replace(&format!(" {}", token), "").trim().to_string()
}

/// Build the ordered, de-duplicated candidate sequence for one site.
pub fn build_candidates(
    geocode_name: &str,
    site_name: &str,
    vocab: &CandidateConfig,
) -> Vec<String> {
    let mut raw = Vec::new();
    for rule in RewriteRule::default_order() {
        rule.apply(geocode_name, site_name, vocab, &mut raw);
    }

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for candidate in raw {
        let collapsed = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() || !seen.insert(collapsed.clone()) {
            continue;
        }
        candidates.push(collapsed);
    }
    candidates
}
