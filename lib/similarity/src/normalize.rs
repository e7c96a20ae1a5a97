//! String normalization for lexical matching
//!
//! Upstream lemmas arrive in mixed case with French diacritics and assorted
//! separators. All lexical comparisons run on the normalized form: lowercase,
//! diacritics folded to ASCII, underscores and hyphens treated as spaces,
//! whitespace collapsed.

/// Normalize a string for lexical matching.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = true;
    for c in s.chars() {
        let c = match c {
            '_' | '-' => ' ',
            other => other,
        };
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        for lower in c.to_lowercase() {
            push_folded(&mut out, lower);
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Fold a lowercase Latin character with diacritics to its ASCII base form.
///
/// Covers the accented forms that occur in the French agronomic vocabulary;
/// anything else passes through unchanged.
fn push_folded(out: &mut String, c: char) {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => out.push('a'),
        'é' | 'è' | 'ê' | 'ë' => out.push('e'),
        'î' | 'ï' | 'í' | 'ì' => out.push('i'),
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => out.push('o'),
        'ù' | 'û' | 'ü' | 'ú' => out.push('u'),
        'ç' => out.push('c'),
        'ñ' => out.push('n'),
        'ÿ' | 'ý' => out.push('y'),
        'œ' => out.push_str("oe"),
        'æ' => out.push_str("ae"),
        other => out.push(other),
    }
}
