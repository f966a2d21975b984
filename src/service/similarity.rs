use std::collections::HashSet;

/// Token-set Jaccard similarity: |A ∩ B| / |A ∪ B|, duplicates collapsed.
/// Both empty -> 1.0; exactly one empty -> 0.0.
pub fn jaccard_similarity<S: AsRef<str>>(tokens_a: &[S], tokens_b: &[S]) -> f64 {
    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let set_a: HashSet<&str> = tokens_a.iter().map(|t| t.as_ref()).collect();
    let set_b: HashSet<&str> = tokens_b.iter().map(|t| t.as_ref()).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

/// Standard Levenshtein edit distance (insert / delete / substitute, cost 1
/// each), full (|b|+1) x (|a|+1) DP matrix.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut matrix = vec![vec![0usize; a_chars.len() + 1]; b_chars.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=a_chars.len() {
        matrix[0][j] = j;
    }

    for i in 1..=b_chars.len() {
        for j in 1..=a_chars.len() {
            let cost = usize::from(b_chars[i - 1] != a_chars[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[b_chars.len()][a_chars.len()]
}

/// Levenshtein distance rescaled to [0,1]: (max_len - distance) / max_len.
/// Both empty -> 1.0.
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_identity_is_one() {
        let tokens = vec!["excavate", "trench", "rock"];
        assert_eq!(jaccard_similarity(&tokens, &tokens), 1.0);
    }

    #[test]
    fn jaccard_empty_conventions() {
        let empty: Vec<&str> = vec![];
        let some = vec!["pipe"];
        assert_eq!(jaccard_similarity(&empty, &empty), 1.0);
        assert_eq!(jaccard_similarity(&some, &empty), 0.0);
        assert_eq!(jaccard_similarity(&empty, &some), 0.0);
    }

    #[test]
    fn jaccard_collapses_duplicates() {
        let a = vec!["pipe", "pipe", "bend"];
        let b = vec!["pipe", "bend", "bend"];
        assert_eq!(jaccard_similarity(&a, &b), 1.0);
    }

    #[test]
    fn jaccard_partial_overlap() {
        let a = vec!["supply", "install", "pipe", "bend"];
        let b = vec!["supply", "install", "pipe", "valve"];
        // intersection 3, union 5
        assert_eq!(jaccard_similarity(&a, &b), 0.6);
    }

    #[test]
    fn levenshtein_textbook_case() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
    }

    #[test]
    fn levenshtein_similarity_bounds() {
        assert_eq!(levenshtein_similarity("1.2.3", "1.2.3"), 1.0);
        assert_eq!(levenshtein_similarity("", ""), 1.0);
        assert_eq!(levenshtein_similarity("1.2.3", "1.2.4"), 0.8);
        assert_eq!(levenshtein_similarity("abc", "xyz"), 0.0);
    }
}
