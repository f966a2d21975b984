use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{IttItem, MatchCandidate, MatchType, ResponseItem};
use crate::service::normalizer::{self, NormalizedText};
use crate::service::similarity;

/// Invalid engine configuration; rejected synchronously before any comparison
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("max_suggestions must be at least 1, got {0}")]
    InvalidMaxSuggestions(usize),
}

fn default_fuzzy_threshold() -> f64 {
    0.75
}
fn default_low_confidence_threshold() -> f64 {
    0.6
}
fn default_enable_fuzzy_matching() -> bool {
    true
}
fn default_max_suggestions() -> usize {
    3
}

/// Engine configuration. Every field is independently overridable; absent
/// fields fall back to the documented defaults on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOptions {
    /// Confidence at/above which a match is classified as high confidence
    /// (logging only, not a cutoff)
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Hard minimum confidence for a candidate to be returned at all
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f64,
    /// When false, only the exact-match stages run
    #[serde(default = "default_enable_fuzzy_matching")]
    pub enable_fuzzy_matching: bool,
    /// Maximum candidates kept per response item, after ranking
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            low_confidence_threshold: default_low_confidence_threshold(),
            enable_fuzzy_matching: default_enable_fuzzy_matching(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl MatchOptions {
    pub fn validate(&self) -> Result<(), MatchError> {
        for (name, value) in [
            ("fuzzy_threshold", self.fuzzy_threshold),
            ("low_confidence_threshold", self.low_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(MatchError::ThresholdOutOfRange { name, value });
            }
        }
        if self.max_suggestions == 0 {
            return Err(MatchError::InvalidMaxSuggestions(self.max_suggestions));
        }
        Ok(())
    }
}

/// Comparison-ready projection of one item, computed once per matching run
#[derive(Debug, Clone)]
struct Projection {
    code: String, // normalized item code, empty when absent
    description: NormalizedText,
    unit: Option<String>,    // lowercased + trimmed
    section: Option<String>, // section id (ITT) or free-text section guess (response)
    qty: Option<BigDecimal>,
}

fn project_itt(item: &IttItem) -> Projection {
    Projection {
        code: item
            .item_code
            .as_deref()
            .map(normalizer::normalize_item_code)
            .unwrap_or_default(),
        description: normalizer::normalize(&item.description, true),
        unit: item.unit.as_deref().map(|u| u.trim().to_lowercase()),
        section: if item.section_id.trim().is_empty() {
            None
        } else {
            Some(item.section_id.clone())
        },
        qty: item.qty.clone(),
    }
}

fn project_response(item: &ResponseItem) -> Projection {
    Projection {
        code: item
            .item_code
            .as_deref()
            .map(normalizer::normalize_item_code)
            .unwrap_or_default(),
        description: normalizer::normalize(&item.description, true),
        unit: item.unit.as_deref().map(|u| u.trim().to_lowercase()),
        section: item
            .section_guess
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .cloned(),
        qty: item.qty.clone(),
    }
}

/// Outcome of the strict-priority rule cascade for one (ITT, response) pair.
/// The first rule that fires wins; later rules are never consulted.
#[derive(Debug, Clone, PartialEq)]
enum RuleHit {
    ExactCode { descriptions_equal: bool },
    ExactDescription,
    FuzzyDescription { similarity: f64 },
    FuzzyCode { similarity: f64 },
}

/// Fuzzy code matching is skipped when the longer code exceeds this length
const MAX_FUZZY_CODE_LEN: usize = 10;
/// Jaccard floor below which a fuzzy description pair is not considered
const FUZZY_DESCRIPTION_FLOOR: f64 = 0.4;
/// Levenshtein similarity floor for fuzzy code pairs
const FUZZY_CODE_FLOOR: f64 = 0.7;

fn evaluate_pair(itt: &Projection, resp: &Projection, options: &MatchOptions) -> Option<RuleHit> {
    let codes_present = !itt.code.is_empty() && !resp.code.is_empty();
    let descriptions_equal = itt.description.key == resp.description.key;

    // 1. exact code
    if codes_present && itt.code == resp.code {
        return Some(RuleHit::ExactCode { descriptions_equal });
    }

    // 2. exact description
    if descriptions_equal {
        return Some(RuleHit::ExactDescription);
    }

    if !options.enable_fuzzy_matching {
        return None;
    }

    // 3. fuzzy description
    let similarity =
        similarity::jaccard_similarity(&itt.description.tokens, &resp.description.tokens);
    if similarity >= FUZZY_DESCRIPTION_FLOOR {
        return Some(RuleHit::FuzzyDescription { similarity });
    }

    // 4. fuzzy code; near-misses on long codes are too ambiguous to suggest
    if codes_present && itt.code.len().max(resp.code.len()) <= MAX_FUZZY_CODE_LEN {
        let similarity = similarity::levenshtein_similarity(&itt.code, &resp.code);
        if similarity >= FUZZY_CODE_FLOOR {
            return Some(RuleHit::FuzzyCode { similarity });
        }
    }

    None
}

/// Code-match confidence. A perfect code match scores 1.0 when the
/// descriptions also agree, 0.9 otherwise. An imperfect base always lands in
/// the damped branch, so a fuzzy code match is capped below the analogous
/// fuzzy description bands (codes are less forgiving of near-misses than
/// prose).
fn code_confidence(base: f64, descriptions_equal: bool) -> f64 {
    if base >= 1.0 {
        if descriptions_equal {
            1.0
        } else {
            0.9
        }
    } else {
        base * 0.8
    }
}

/// Base confidence for a description similarity, by band
fn description_confidence(similarity: f64) -> f64 {
    if similarity >= 1.0 {
        0.8
    } else if similarity >= 0.8 {
        0.7
    } else if similarity >= 0.6 {
        0.6
    } else {
        similarity * 0.8
    }
}

/// Everything a boost gets to look at for one pair
struct PairContext<'a> {
    itt: &'a Projection,
    resp: &'a Projection,
}

type Boost = fn(&PairContext) -> f64;

fn unit_boost(ctx: &PairContext) -> f64 {
    if normalizer::units_equivalent(ctx.itt.unit.as_deref(), ctx.resp.unit.as_deref()) {
        0.05
    } else {
        0.0
    }
}

fn section_boost(ctx: &PairContext) -> f64 {
    let (Some(itt_section), Some(guess)) = (&ctx.itt.section, &ctx.resp.section) else {
        return 0.0;
    };
    let key = normalizer::normalize(itt_section, false).key;
    if !key.is_empty() && key == normalizer::normalize(guess, false).key {
        0.03
    } else {
        0.0
    }
}

fn quantity_boost(ctx: &PairContext) -> f64 {
    let (Some(a), Some(b)) = (&ctx.itt.qty, &ctx.resp.qty) else {
        return 0.0;
    };
    let zero = BigDecimal::zero();
    if *a <= zero || *b <= zero {
        return 0.0;
    }
    let (min, max) = if a <= b { (a, b) } else { (b, a) };
    // min / max >= 0.9, kept exact in decimal arithmetic
    if min * BigDecimal::from(10) >= max * BigDecimal::from(9) {
        0.02
    } else {
        0.0
    }
}

/// Boosts on the code-confidence path (no quantity boost there)
const CODE_BOOSTS: &[Boost] = &[unit_boost, section_boost];
/// Boosts on the description-confidence path
const DESCRIPTION_BOOSTS: &[Boost] = &[unit_boost, section_boost, quantity_boost];

/// Fold the boost pipeline over a base confidence, clamping at 1.0
fn apply_boosts(base: f64, boosts: &[Boost], ctx: &PairContext) -> f64 {
    boosts.iter().fold(base, |acc, boost| acc + boost(ctx)).min(1.0)
}

fn score_pair(hit: &RuleHit, ctx: &PairContext) -> (f64, MatchType, String) {
    match hit {
        RuleHit::ExactCode { descriptions_equal } => {
            let base = code_confidence(1.0, *descriptions_equal);
            let confidence = apply_boosts(base, CODE_BOOSTS, ctx);
            let reason = format!("Exact item code match ({})", ctx.itt.code);
            (confidence, MatchType::ExactCode, reason)
        }
        RuleHit::ExactDescription => {
            let confidence = apply_boosts(0.8, DESCRIPTION_BOOSTS, ctx);
            let reason = "Descriptions identical after normalization".to_string();
            (confidence, MatchType::ExactDescription, reason)
        }
        RuleHit::FuzzyDescription { similarity } => {
            let base = description_confidence(*similarity);
            let confidence = apply_boosts(base, DESCRIPTION_BOOSTS, ctx);
            let reason = format!("Description similarity {:.2} (Jaccard)", similarity);
            (confidence, MatchType::FuzzyDescription, reason)
        }
        RuleHit::FuzzyCode { similarity } => {
            let base = code_confidence(*similarity, false);
            let confidence = apply_boosts(base, CODE_BOOSTS, ctx);
            let reason = format!("Item code similarity {:.2} (Levenshtein)", similarity);
            (confidence, MatchType::FuzzyCode, reason)
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Pure matching engine: compares every response item against every ITT item
/// through the rule cascade and returns ranked, capped candidates.
///
/// Stateless per invocation; identical inputs yield identical output,
/// including order.
pub struct MatchEngine {
    options: MatchOptions,
}

impl MatchEngine {
    /// Rejects out-of-range options up front; the engine has no other failure
    /// modes (sparse item data only lowers match likelihood).
    pub fn new(options: MatchOptions) -> Result<Self, MatchError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Propose correspondence candidates for every response item.
    ///
    /// Output is the concatenation of each response item's kept candidates
    /// (confidence >= `low_confidence_threshold`, descending, at most
    /// `max_suggestions`), in response-item iteration order. No
    /// cross-response-item deduplication: one ITT item may be suggested for
    /// several response items; that conflict is the caller's to resolve.
    pub fn find_matches(
        &self,
        itt_items: &[IttItem],
        response_items: &[ResponseItem],
    ) -> Vec<MatchCandidate> {
        if itt_items.is_empty() || response_items.is_empty() {
            return Vec::new();
        }

        // normalize the ITT side once, reused across the O(N*M) phase
        let itt_projections: Vec<Projection> = itt_items.iter().map(project_itt).collect();

        let mut all_candidates = Vec::new();
        for response_item in response_items {
            let resp_projection = project_response(response_item);

            let mut candidates: Vec<MatchCandidate> = Vec::new();
            for (itt_item, itt_projection) in itt_items.iter().zip(&itt_projections) {
                let Some(hit) = evaluate_pair(itt_projection, &resp_projection, &self.options)
                else {
                    continue;
                };
                let ctx = PairContext {
                    itt: itt_projection,
                    resp: &resp_projection,
                };
                let (confidence, match_type, reason) = score_pair(&hit, &ctx);
                let confidence = round3(confidence);
                if confidence < self.options.low_confidence_threshold {
                    continue;
                }
                candidates.push(MatchCandidate {
                    itt_item_id: itt_item.itt_item_id,
                    response_item_id: response_item.response_item_id,
                    contractor_id: response_item.contractor_id,
                    confidence,
                    match_type,
                    reason,
                });
            }

            // stable sort keeps ITT iteration order among equal confidences
            candidates.sort_by(|a, b| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            candidates.truncate(self.options.max_suggestions);

            if let Some(best) = candidates.first() {
                if best.confidence >= self.options.fuzzy_threshold {
                    tracing::debug!(
                        response_item_id = response_item.response_item_id,
                        confidence = best.confidence,
                        candidates = candidates.len(),
                        "high confidence match"
                    );
                } else {
                    tracing::debug!(
                        response_item_id = response_item.response_item_id,
                        confidence = best.confidence,
                        candidates = candidates.len(),
                        "low confidence match"
                    );
                }
            }

            all_candidates.extend(candidates);
        }

        all_candidates
    }
}
