//! Deterministic text enhancement for recognized Arabic text.
//!
//! `enhance` is a pure pipeline of seven ordered transforms. The ordering
//! is part of the contract: later stages assume earlier ones already ran
//! (e.g. word repair sees collapsed spaces and canonical letters). Every
//! stage is idempotent in isolation and in composition, so
//! `enhance(enhance(t)) == enhance(t)` holds for all inputs.

use std::sync::LazyLock;

use regex::Regex;

use super::chars;

/// Acceptance threshold for dictionary-assisted substitution.
const DICTIONARY_ACCEPTANCE: f32 = 0.7;

/// Bound on the word-repair fixpoint loop; rule chains are short.
const MAX_REPAIR_PASSES: usize = 8;

/// Known ligature misreadings. Pair fixes merge two standalone tokens;
/// in-token fixes rewrite sequences inside one token.
const LIGATURE_PAIR_FIXES: &[(&str, &str, &str)] = &[("ل", "ا", "لا")];
const LIGATURE_FIXES: &[(&str, &str)] = &[("ىى", "ى"), ("ةة", "ة"), ("ءء", "ء")];

/// Clean up raw recognized text: unify glyph forms, fix digits and
/// punctuation spacing, repair broken lines and words, and correct against
/// a small high-frequency word list.
///
/// Pure and deterministic; stages cannot fail, so the pipeline always
/// returns the best text achieved rather than erroring.
pub fn enhance(raw: &str) -> String {
    let text = unify_characters(raw);
    let text = correct_digit_forms(&text);
    let text = normalize_punctuation_spacing(&text);
    let text = repair_line_breaks(&text);
    let text = repair_word_boundaries(&text);
    let text = correct_ligatures(&text);
    let text = correct_with_dictionary(&text);
    text.trim().to_string()
}

/// Stage 1: one canonical codepoint per letter. Presentation forms map to
/// base letters, the alef family folds to bare alef, harakat/tatweel and
/// zero-width marks are stripped.
fn unify_characters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match chars::unify_char(c) {
            Some(mapped) => {
                for m in mapped.chars() {
                    push_canonical(&mut out, m);
                }
            }
            None => push_canonical(&mut out, c),
        }
    }
    out
}

fn push_canonical(out: &mut String, c: char) {
    if chars::is_strippable(c) {
        return;
    }
    out.push(chars::fold_alef(c));
}

/// Stage 2: Eastern-Arabic digits always become Arabic-Indic; ASCII digit
/// runs convert only when the nearest non-space neighbor on either side
/// (same line) is Arabic. Digits in Latin-only context are untouched.
fn correct_digit_forms(text: &str) -> String {
    let cs: Vec<char> = text.chars().map(chars::normalize_digit).collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < cs.len() {
        if cs[i].is_ascii_digit() {
            let mut j = i;
            while j < cs.len() && cs[j].is_ascii_digit() {
                j += 1;
            }
            let arabic = neighbor_is_arabic(cs[..i].iter().rev()) || neighbor_is_arabic(cs[j..].iter());
            for &c in &cs[i..j] {
                out.push(if arabic { chars::ascii_to_arabic_digit(c) } else { c });
            }
            i = j;
        } else {
            out.push(cs[i]);
            i += 1;
        }
    }
    out
}

fn neighbor_is_arabic<'a>(mut it: impl Iterator<Item = &'a char>) -> bool {
    it.find(|c| **c != ' ' && **c != '\t')
        .is_some_and(|c| chars::is_arabic_letter(*c) || chars::is_arabic_digit(*c))
}

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+([.،؛؟!?:])").unwrap());
static PUNCT_THEN_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.،؛؟!?:])([^\s.،؛؟!?:0-9٠-٩/%])").unwrap());
static SPACE_RUN_3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{3,}").unwrap());
static SPACE_RUN_2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Stage 3: canonical single space after sentence and clause punctuation,
/// no space before it, bounded space runs collapsed to one.
fn normalize_punctuation_spacing(text: &str) -> String {
    let text = SPACE_BEFORE_PUNCT.replace_all(text, "${1}");
    let text = PUNCT_THEN_GLYPH.replace_all(&text, "${1} ${2}");
    let text = SPACE_RUN_3.replace_all(&text, "  ");
    SPACE_RUN_2.replace_all(&text, " ").into_owned()
}

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Stage 4: collapse blank-line runs and join a word broken across a line
/// boundary. A break qualifies when both sides end/start with Arabic-letter
/// tokens and one side is a lone letter; paragraph boundaries (blank lines)
/// never join.
fn repair_line_breaks(text: &str) -> String {
    let collapsed = BLANK_RUN.replace_all(text, "\n\n");

    let mut lines: Vec<String> = Vec::new();
    for line in collapsed.split('\n') {
        if let Some(prev) = lines.last_mut() {
            if should_join_lines(prev, line) {
                let joined = format!("{}{}", prev.trim_end(), line.trim_start());
                *prev = joined;
                continue;
            }
        }
        lines.push(line.to_string());
    }
    lines.join("\n")
}

fn should_join_lines(prev: &str, next: &str) -> bool {
    let Some(last) = prev.trim_end().rsplit(' ').next().filter(|t| !t.is_empty()) else {
        return false;
    };
    let Some(first) = next.trim_start().split(' ').next().filter(|t| !t.is_empty()) else {
        return false;
    };
    let all_arabic = |t: &str| t.chars().all(chars::is_arabic_letter);
    if !all_arabic(last) || !all_arabic(first) {
        return false;
    }
    last.chars().count() == 1 || first.chars().count() == 1
}

/// Stage 5: re-join words split by recognition noise. Ordered rules, run
/// to a fixpoint so one rule's output can feed another:
/// 1. runs of three or more spaced single letters become one word;
/// 2. a standalone definite article joins the following word;
/// 3. a single-letter particle (و ف ب ل ك) joins the following word.
fn repair_word_boundaries(text: &str) -> String {
    text.split('\n')
        .map(repair_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn repair_line(line: &str) -> String {
    let mut tokens: Vec<String> = line
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    for _ in 0..MAX_REPAIR_PASSES {
        let mut changed = false;

        // Rule 1: merge runs of >= 3 single letters.
        let mut i = 0;
        while i < tokens.len() {
            let run_len = tokens[i..]
                .iter()
                .take_while(|t| is_single_arabic_letter(t))
                .count();
            if run_len >= 3 {
                let merged: String = tokens[i..i + run_len].concat();
                tokens.splice(i..i + run_len, [merged]);
                changed = true;
            }
            i += 1;
        }

        // Rules 2 and 3: article and particle joins. Right-to-left so a
        // particle can absorb the word its article just joined.
        let mut i = tokens.len().saturating_sub(1);
        while i > 0 {
            i -= 1;
            let next_ok = arabic_letter_count(&tokens[i + 1]) >= 2
                && tokens[i + 1]
                    .chars()
                    .next()
                    .is_some_and(chars::is_arabic_letter);
            // "لا" is a standalone negation and never takes the article.
            let article_join = tokens[i] == "ال"
                && next_ok
                && !tokens[i + 1].starts_with("ال")
                && tokens[i + 1] != "لا";
            let particle_join = is_single_arabic_letter(&tokens[i])
                && tokens[i]
                    .chars()
                    .next()
                    .is_some_and(|c| chars::PREFIX_PARTICLES.contains(&c))
                && next_ok;
            if article_join || particle_join {
                let merged = format!("{}{}", tokens[i], tokens[i + 1]);
                tokens.splice(i..i + 2, [merged]);
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
    tokens.join(" ")
}

fn is_single_arabic_letter(token: &str) -> bool {
    let mut it = token.chars();
    matches!((it.next(), it.next()), (Some(c), None) if chars::is_arabic_letter(c))
}

fn arabic_letter_count(token: &str) -> usize {
    token.chars().filter(|c| chars::is_arabic_letter(*c)).count()
}

/// Stage 6: fixed table of known ligature misreadings.
fn correct_ligatures(text: &str) -> String {
    text.split('\n')
        .map(correct_ligatures_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn correct_ligatures_line(line: &str) -> String {
    let mut tokens: Vec<String> = line
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let mut i = 0;
    while i + 1 < tokens.len() {
        let mut merged = false;
        for (a, b, joined) in LIGATURE_PAIR_FIXES {
            if tokens[i] == *a && tokens[i + 1] == *b {
                tokens.splice(i..i + 2, [joined.to_string()]);
                merged = true;
                break;
            }
        }
        if !merged {
            i += 1;
        }
    }

    for token in &mut tokens {
        for (from, to) in LIGATURE_FIXES {
            while token.contains(from) {
                *token = token.replace(from, to);
            }
        }
    }
    tokens.join(" ")
}

/// Stage 7: dictionary-assisted correction. Tokens with Arabic letters and
/// length >= 2 that miss the curated list are compared against it by
/// position-wise character match ratio (length-bounded, not general edit
/// distance); a close-enough entry replaces the token.
fn correct_with_dictionary(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            line.split(' ')
                .map(correct_token)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn correct_token(token: &str) -> String {
    let Some(start) = token.find(|c| chars::is_arabic_letter(c)) else {
        return token.to_string();
    };
    let end = token
        .char_indices()
        .filter(|(_, c)| chars::is_arabic_letter(*c))
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(token.len());
    let core = &token[start..end];
    if core.chars().any(|c| !chars::is_arabic_letter(c)) {
        return token.to_string();
    }
    let core_len = core.chars().count();
    if core_len < 2 || chars::DICTIONARY.contains(&core) {
        return token.to_string();
    }

    let mut best: Option<(f32, &str)> = None;
    for word in chars::DICTIONARY {
        let word_len = word.chars().count();
        if word_len.abs_diff(core_len) > 1 {
            continue;
        }
        let sim = position_similarity(core, word);
        if sim >= DICTIONARY_ACCEPTANCE && best.map_or(true, |(b, _)| sim > b) {
            best = Some((sim, word));
        }
    }

    match best {
        Some((_, word)) => format!("{}{}{}", &token[..start], word, &token[end..]),
        None => token.to_string(),
    }
}

/// Fraction of positions where both words carry the same character,
/// measured over the longer word.
fn position_similarity(a: &str, b: &str) -> f32 {
    let ac: Vec<char> = a.chars().collect();
    let bc: Vec<char> = b.chars().collect();
    let longest = ac.len().max(bc.len());
    if longest == 0 {
        return 0.0;
    }
    let matches = ac.iter().zip(bc.iter()).filter(|(x, y)| x == y).count();
    matches as f32 / longest as f32
}
