//! Lexical distance functions
//!
//! All functions return a similarity score in [0.0, 1.0] where 1.0 means
//! identical. Inputs are expected to be normalized (see [`crate::normalize`]).

use crate::ops;
use ahash::AHashMap;

/// Jaro similarity between two strings.
pub fn jaro(s1: &str, s2: &str) -> f32 {
    jaro_f64(s1, s2) as f32
}

fn jaro_f64(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, &ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut j = 0usize;
    for (i, &ca) in a.iter().enumerate() {
        if a_matched[i] {
            while !b_matched[j] {
                j += 1;
            }
            if ca != b[j] {
                transpositions += 1;
            }
            j += 1;
        }
    }

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - (transpositions / 2) as f64) / m) / 3.0
}

/// Jaro-Winkler similarity: Jaro boosted by up to 4 characters of common prefix.
pub fn jaro_winkler(s1: &str, s2: &str) -> f32 {
    let jaro = jaro_f64(s1, s2);
    let prefix = s1
        .chars()
        .zip(s2.chars())
        .take(4)
        .take_while(|(c1, c2)| c1 == c2)
        .count();
    (jaro + prefix as f64 * 0.1 * (1.0 - jaro)) as f32
}

/// Lexical similarity: Jaro-Winkler with two multiplicative bonuses.
///
/// A 10% boost when either string starts with the other's first 3 characters
/// and a 15% boost when one string contains the other, each clamped to 1.0.
/// The bonuses reward the compound terms the vision model tends to emit
/// ("necrose severe" against "necrose").
pub fn lexical_similarity(s1: &str, s2: &str) -> f32 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let mut score = jaro_winkler(s1, s2);

    let c1: Vec<char> = s1.chars().collect();
    let c2: Vec<char> = s2.chars().collect();
    if c1.len() >= 3 && c2.len() >= 3 {
        let p1: String = c1[..3].iter().collect();
        let p2: String = c2[..3].iter().collect();
        if s1.starts_with(&p2) || s2.starts_with(&p1) {
            score = (score * 1.1).min(1.0);
        }
    }

    if s1.contains(s2) || s2.contains(s1) {
        score = (score * 1.15).min(1.0);
    }

    score
}

/// Cosine similarity over character bigram frequency vectors.
///
/// Strings are padded with `$` boundary markers before bigram extraction, so
/// first and last characters carry positional weight.
pub fn bigram_cosine(s1: &str, s2: &str) -> f32 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let counts1 = bigram_counts(s1);
    let counts2 = bigram_counts(s2);

    let mut keys: Vec<(char, char)> = counts1.keys().copied().collect();
    for key in counts2.keys() {
        if !counts1.contains_key(key) {
            keys.push(*key);
        }
    }

    let v1: Vec<f32> = keys.iter().map(|k| counts1.get(k).copied().unwrap_or(0.0)).collect();
    let v2: Vec<f32> = keys.iter().map(|k| counts2.get(k).copied().unwrap_or(0.0)).collect();

    ops::cosine(&v1, &v2)
}

fn bigram_counts(s: &str) -> AHashMap<(char, char), f32> {
    let padded: Vec<char> = std::iter::once('$')
        .chain(s.chars())
        .chain(std::iter::once('$'))
        .collect();
    let mut counts = AHashMap::new();
    for pair in padded.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0.0) += 1.0;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaro_identical() {
        assert_eq!(jaro("necrose", "necrose"), 1.0);
    }

    #[test]
    fn test_jaro_disjoint() {
        assert_eq!(jaro("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_jaro_empty() {
        assert_eq!(jaro("", "necrose"), 0.0);
        assert_eq!(jaro("", ""), 0.0);
    }

    #[test]
    fn test_jaro_winkler_known_value() {
        // Classic reference pair
        let score = jaro_winkler("martha", "marhta");
        assert!((score - 0.9611).abs() < 0.001, "got {}", score);
    }

    #[test]
    fn test_jaro_winkler_prefix_beats_jaro() {
        let j = jaro("helminthosporiose", "helminthosporios");
        let jw = jaro_winkler("helminthosporiose", "helminthosporios");
        assert!(jw >= j);
    }

    #[test]
    fn test_lexical_substring_bonus() {
        let plain = jaro_winkler("necrose", "necrose severe");
        let boosted = lexical_similarity("necrose", "necrose severe");
        assert!(boosted > plain);
        assert!(boosted <= 1.0);
    }

    #[test]
    fn test_lexical_bounded() {
        // Bonuses must clamp, never overflow 1.0
        let score = lexical_similarity("chlorose", "chlorose");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_bigram_cosine_identical() {
        assert!((bigram_cosine("rouille", "rouille") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bigram_cosine_related_terms() {
        let close = bigram_cosine("necrose", "necrose severe");
        let far = bigram_cosine("necrose", "vert fonce");
        assert!(close > far);
    }

    #[test]
    fn test_bigram_cosine_empty() {
        assert_eq!(bigram_cosine("", "necrose"), 0.0);
    }
}
