//! Search-side normalization and query preparation.
//!
//! Folds here are more aggressive than the enhancement pipeline's: they
//! trade orthographic fidelity for recall, so they apply only to the index
//! and query representations, never to stored text.

use crate::text::chars;

/// Minimum letters an affix-stripped variant must keep to be emitted.
const MIN_STEM_LEN: usize = 2;

/// Prefix morphemes stripped when generating match variants: the definite
/// article, its particle-fused forms, and the bare conjunction waw. Bare
/// waw demands a longer stem since many roots begin with it.
const STRIP_PREFIXES: &[(&str, usize)] = &[
    ("و", MIN_STEM_LEN + 1),
    ("وال", MIN_STEM_LEN),
    ("بال", MIN_STEM_LEN),
    ("كال", MIN_STEM_LEN),
    ("فال", MIN_STEM_LEN),
    ("لل", MIN_STEM_LEN),
    ("ال", MIN_STEM_LEN),
];

/// Suffix morphemes stripped when generating match variants. Ta marbuta is
/// already folded to heh by the search folds, so a trailing heh covers both
/// the feminine ending and the attached pronoun; `ها` is the feminine
/// attached pronoun.
const STRIP_SUFFIXES: &[&str] = &["ها", "ه"];

/// Produce the indexable form of a text: aggressive character folds,
/// lowercased Latin, collapsed whitespace, followed by every affix-stripped
/// variant of every token (deduplicated, original tokens first).
///
/// Idempotent: the emitted variants are the transitive closure under
/// stripping, so re-normalizing the output adds nothing.
pub fn normalize_for_index(text: &str) -> String {
    let folded = fold_text(text);
    let tokens: Vec<&str> = folded.split_whitespace().collect();

    let mut out: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    for token in &tokens {
        for variant in affix_variants(token) {
            if !out.iter().any(|t| *t == variant) {
                out.push(variant);
            }
        }
    }
    out.join(" ")
}

/// Turn free text into a full-text query expression. Single tokens expand
/// to exact-or-prefix clauses over the token and its affix variants;
/// multi-token queries prefer the exact phrase but fall back to requiring
/// every token.
pub fn prepare_query(query: &str) -> String {
    let folded = fold_text(query);
    let tokens: Vec<&str> = folded.split_whitespace().collect();
    match tokens.as_slice() {
        [] => String::new(),
        [token] => single_token_expression(token),
        _ => {
            let phrase = format!("\"{}\"", tokens.join(" "));
            let required = tokens
                .iter()
                .map(|t| format!("(\"{t}\" OR {t}*)"))
                .collect::<Vec<_>>()
                .join(" AND ");
            format!("({phrase}) OR ({required})")
        }
    }
}

fn single_token_expression(token: &str) -> String {
    let mut clauses = vec![format!("\"{token}\" OR {token}*")];
    for variant in affix_variants(token) {
        clauses.push(format!("\"{variant}\" OR {variant}*"));
    }
    clauses.join(" OR ")
}

/// Apply the search character folds and canonicalize whitespace. Latin is
/// lowercased so queries match regardless of case.
fn fold_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match chars::unify_char(c) {
            Some(mapped) => {
                for m in mapped.chars() {
                    push_folded(&mut out, m);
                }
            }
            None => push_folded(&mut out, c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_folded(out: &mut String, c: char) {
    if chars::is_strippable(c) {
        return;
    }
    let c = chars::normalize_digit(chars::fold_for_search(c));
    out.extend(c.to_lowercase());
}

/// All distinct affix-stripped variants of a token, transitively: stripping
/// the article from a particle-stripped form is itself a variant. Order is
/// breadth-first and deterministic.
fn affix_variants(token: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    let mut queue: Vec<String> = vec![token.to_string()];
    let mut i = 0;
    while i < queue.len() {
        let current = queue[i].clone();
        i += 1;
        for stripped in strip_once(&current) {
            if stripped != token && !variants.iter().any(|v| *v == stripped) {
                variants.push(stripped.clone());
                queue.push(stripped);
            }
        }
    }
    variants
}

/// Single-step affix strips that keep a plausible stem.
fn strip_once(token: &str) -> Vec<String> {
    let mut out = Vec::new();
    let letters = |t: &str| t.chars().filter(|c| chars::is_arabic_letter(*c)).count();

    for (prefix, min_len) in STRIP_PREFIXES {
        if let Some(rest) = token.strip_prefix(prefix) {
            if letters(rest) >= *min_len && !out.iter().any(|v| v == rest) {
                out.push(rest.to_string());
            }
        }
    }
    for suffix in STRIP_SUFFIXES {
        if let Some(rest) = token.strip_suffix(suffix) {
            if letters(rest) >= MIN_STEM_LEN && !out.iter().any(|v| v == rest) {
                out.push(rest.to_string());
            }
        }
    }
    out
}
