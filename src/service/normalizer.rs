use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Canonical form of an item description or section label.
///
/// Two strings are exact-description-equivalent iff their `key`s are equal
/// (token order is irrelevant, so "install pipe supply" == "supply install pipe").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub original: String,
    pub normalized: String,         // tokens joined by single spaces, original order
    pub tokens: Vec<String>,
    pub sorted_tokens: Vec<String>, // tokens sorted lexicographically
    pub key: String,                // sorted tokens joined by single spaces
}

impl NormalizedText {
    fn empty(original: &str) -> Self {
        Self {
            original: original.to_string(),
            normalized: String::new(),
            tokens: Vec::new(),
            sorted_tokens: Vec::new(),
            key: String::new(),
        }
    }
}

/// Construction-industry short forms, expanded whole-word before tokenization.
/// Keys are matched case-insensitively on the lowercased input; a trailing dot
/// on the short form ("excav.") is handled by the later punctuation pass.
static ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("excav", "excavate"),
        ("exc", "excavate"),
        ("conc", "concrete"),
        ("rc", "reinforced concrete"),
        ("reinf", "reinforcement"),
        ("rebar", "reinforcement"),
        ("fwk", "formwork"),
        ("bwk", "brickwork"),
        ("blk", "block"),
        ("bldg", "building"),
        ("fdn", "foundation"),
        ("fnd", "foundation"),
        ("ftg", "footing"),
        ("col", "column"),
        ("dia", "diameter"),
        ("diam", "diameter"),
        ("thk", "thick"),
        ("ss", "stainless steel"),
        ("ms", "mild steel"),
        ("gi", "galvanised iron"),
        ("galv", "galvanised"),
        ("alum", "aluminium"),
        ("dpc", "damp proof course"),
        ("dpm", "damp proof membrane"),
        ("insul", "insulation"),
        ("susp", "suspended"),
        ("incl", "including"),
        ("excl", "excluding"),
        ("approx", "approximately"),
        ("min", "minimum"),
        ("max", "maximum"),
        ("avg", "average"),
        ("horiz", "horizontal"),
        ("vert", "vertical"),
        ("ext", "external"),
        ("int", "internal"),
        ("grd", "ground"),
        ("gnd", "ground"),
        ("lvl", "level"),
        ("temp", "temporary"),
        ("perm", "permanent"),
        ("struct", "structural"),
        ("agg", "aggregate"),
        ("asph", "asphalt"),
        ("bit", "bitumen"),
        ("exp", "expansion"),
        ("jnt", "joint"),
        ("elec", "electrical"),
        ("mech", "mechanical"),
        ("ne", "not exceeding"),
    ])
});

/// Single alternation over all abbreviation keys, longest first
static ABBREV_RE: Lazy<Regex> = Lazy::new(|| {
    let mut keys: Vec<&str> = ABBREVIATIONS.keys().copied().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let pattern = format!(r"\b(?:{})\b", keys.join("|"));
    Regex::new(&pattern).expect("abbreviation pattern is valid")
});

/// `<number>mm` with no intervening space, e.g. "300mm", "12.5mm"
static MM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)mm\b").expect("mm pattern is valid")
});

/// Digit run immediately followed by a letter run, e.g. "1.5m", "50kg"
static DIGIT_LETTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d)([a-z])").expect("digit-letter pattern is valid")
});

/// Tokens carrying no matching signal: unit abbreviations, articles, prepositions.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // units of measure
        "mm", "m", "m2", "m3", "mm2", "mm3", "lm", "ea", "nr", "no", "kg", "t",
        "l", "ml", "sum", "item", "hr", "hrs", "wk", "day", "days",
        // articles, conjunctions, prepositions
        "the", "a", "an", "of", "to", "in", "on", "at", "for", "and", "or",
        "with", "per", "as", "by", "from",
    ])
});

/// Normalize a raw description into its canonical token form.
///
/// Pipeline: lowercase/trim/collapse whitespace -> whole-word abbreviation
/// expansion -> millimetre-to-metre conversion and digit/letter splitting ->
/// punctuation stripping (dots kept only before a digit, so "1.2.3" survives)
/// -> tokenize -> stopword filter (when `remove_stopwords`) -> length-1 filter.
///
/// Pure and deterministic; empty input yields an all-empty result.
pub fn normalize(text: &str, remove_stopwords: bool) -> NormalizedText {
    if text.trim().is_empty() {
        return NormalizedText::empty(text);
    }

    // 1. lowercase, trim, collapse internal whitespace
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    // 2. expand abbreviations, whole-word
    let expanded = ABBREV_RE.replace_all(&collapsed, |caps: &regex::Captures| {
        ABBREVIATIONS
            .get(&caps[0])
            .copied()
            .unwrap_or(&caps[0])
            .to_string()
    });

    // 3. standardize numeric-unit pairs: "300mm" -> "0.3 m", then split any
    //    remaining digit+letter junction ("1.5m" -> "1.5 m")
    let metric = MM_RE.replace_all(&expanded, |caps: &regex::Captures| {
        match caps[1].parse::<f64>() {
            Ok(n) => format!("{} m", n / 1000.0),
            Err(_) => caps[0].to_string(),
        }
    });
    let split = DIGIT_LETTER_RE.replace_all(&metric, "$1 $2");

    // 4. strip punctuation; a dot survives only when the next char is a digit
    let mut cleaned = String::with_capacity(split.len());
    let chars: Vec<char> = split.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() || c.is_whitespace() {
            cleaned.push(c);
        } else if c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }

    // 5-7. tokenize, drop stopwords and signal-free single characters
    let tokens: Vec<String> = cleaned
        .split_whitespace()
        .filter(|t| !remove_stopwords || !STOPWORDS.contains(t))
        .filter(|t| t.chars().count() > 1 || t.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|t| t.to_string())
        .collect();

    let mut sorted_tokens = tokens.clone();
    sorted_tokens.sort();

    NormalizedText {
        original: text.to_string(),
        normalized: tokens.join(" "),
        key: sorted_tokens.join(" "),
        tokens,
        sorted_tokens,
    }
}

/// Canonical form of an item code: lowercased, whitespace removed, only word
/// characters and dots retained ("§ 1.2.3-A " -> "1.2.3a").
pub fn normalize_item_code(code: &str) -> String {
    code.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        .collect()
}

/// True iff both units are present and normalize (keeping stopwords, since
/// units themselves are stopwords) to the same comparison key.
pub fn units_equivalent(unit_a: Option<&str>, unit_b: Option<&str>) -> bool {
    match (unit_a, unit_b) {
        (Some(a), Some(b)) => {
            let ka = normalize(a, false).key;
            let kb = normalize(b, false).key;
            !ka.is_empty() && ka == kb
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_tokens_are_a_permutation_and_key_is_their_join() {
        let n = normalize("Supply and install 300mm PVC pipe", true);
        let mut resorted = n.tokens.clone();
        resorted.sort();
        assert_eq!(resorted, n.sorted_tokens);
        assert_eq!(n.key, n.sorted_tokens.join(" "));
        assert_eq!(n.normalized, n.tokens.join(" "));
    }

    #[test]
    fn abbreviations_expand_whole_word() {
        let a = normalize("excav. trench", true);
        let b = normalize("Excavate trench", true);
        assert_eq!(a.key, b.key);
        // "excavator" must not be rewritten by the "excav" short form
        let c = normalize("excavator hire", true);
        assert!(c.tokens.contains(&"excavator".to_string()));
    }

    #[test]
    fn millimetres_convert_to_metres() {
        let n = normalize("300mm pipe", true);
        // "300mm" -> "0.3 m"; "m" is then dropped as a unit stopword
        assert_eq!(n.tokens, vec!["0.3", "pipe"]);
        let kept = normalize("300mm pipe", false);
        assert!(kept.tokens.contains(&"m".to_string()));
    }

    #[test]
    fn digit_letter_runs_are_split() {
        let n = normalize("1.5m deep", true);
        assert_eq!(n.tokens, vec!["1.5", "deep"]);
    }

    #[test]
    fn hierarchical_codes_keep_their_dots() {
        let n = normalize("item 1.2.3 excavation", true);
        assert!(n.tokens.contains(&"1.2.3".to_string()));
    }

    #[test]
    fn trailing_dots_and_punctuation_are_stripped() {
        let n = normalize("trench, backfill.", true);
        assert_eq!(n.tokens, vec!["trench", "backfill"]);
    }

    #[test]
    fn stopwords_are_removed_only_on_request() {
        let with = normalize("supply of pipe per m", true);
        assert_eq!(with.tokens, vec!["supply", "pipe"]);
        let without = normalize("supply of pipe per m", false);
        assert_eq!(without.tokens, vec!["supply", "of", "pipe", "per", "m"]);
    }

    #[test]
    fn empty_input_yields_empty_normalized_text() {
        let n = normalize("   ", true);
        assert!(n.tokens.is_empty());
        assert!(n.sorted_tokens.is_empty());
        assert!(n.key.is_empty());
        assert!(n.normalized.is_empty());
    }

    #[test]
    fn single_digits_and_letters_survive_the_length_filter() {
        let n = normalize("grade 5 type x", true);
        assert!(n.tokens.contains(&"5".to_string()));
        assert!(n.tokens.contains(&"x".to_string()));
    }

    #[test]
    fn item_codes_normalize_to_word_chars_and_dots() {
        assert_eq!(normalize_item_code("  1.2.3-A "), "1.2.3a");
        assert_eq!(normalize_item_code("B / 4 . 1"), "b4.1");
        assert_eq!(normalize_item_code(""), "");
    }

    #[test]
    fn unit_equivalence_requires_both_present() {
        assert!(units_equivalent(Some("m2"), Some("M2")));
        assert!(units_equivalent(Some(" m "), Some("m")));
        assert!(!units_equivalent(Some("m2"), Some("m3")));
        assert!(!units_equivalent(Some("m"), None));
        assert!(!units_equivalent(None, None));
        assert!(!units_equivalent(Some(""), Some("")));
    }
}
