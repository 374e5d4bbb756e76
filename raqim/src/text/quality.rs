//! Heuristic quality scoring for enhanced text.
//!
//! The score is advisory: it never gates the pipeline, it only feeds the
//! report so callers can decide whether a rescan is worth it.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use super::chars;

/// Quality assessment of one extraction.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    /// Heuristic score in [0, 100]; not an engine confidence.
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

// Same punctuation set the enhancer spaces out, so residuals are counted.
static UNSPACED_PUNCT: LazyLock<Regex> = LazyLock::new(|| {
    let class = chars::ARABIC_LETTER_CLASS;
    Regex::new(&format!("[{class}][.،؛؟!?:][{class}]")).unwrap()
});
static SCRIPT_TRANSITION: LazyLock<Regex> = LazyLock::new(|| {
    let class = chars::ARABIC_LETTER_CLASS;
    Regex::new(&format!("[{class}][A-Za-z]|[A-Za-z][{class}]")).unwrap()
});

/// Score enhanced text. Text with no Arabic at all short-circuits to zero
/// with a single issue; otherwise independent penalties subtract from 100.
pub fn score(text: &str) -> QualityReport {
    if !text.chars().any(chars::is_arabic_char) {
        return QualityReport {
            score: 0,
            issues: vec!["no Arabic text detected".to_string()],
            suggestions: vec![
                "verify the image contains Arabic script, or extend the language set".to_string(),
            ],
        };
    }

    let mut score: i32 = 100;
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();

    let trimmed = text.trim();
    let words: Vec<&str> = trimmed.unicode_words().collect();

    let broken_runs = count_single_letter_runs(&words);
    if broken_runs > 0 {
        score -= (broken_runs as i32 * 8).min(30);
        issues.push(format!(
            "{broken_runs} run(s) of spaced single letters suggest broken words"
        ));
        suggestions.push("try a cleaner scan or higher resolution".to_string());
    }

    let unspaced = UNSPACED_PUNCT.find_iter(trimmed).count();
    if unspaced > 0 {
        score -= (unspaced as i32 * 3).min(15);
        issues.push(format!("{unspaced} punctuation mark(s) embedded without spacing"));
    }

    let transitions = SCRIPT_TRANSITION.find_iter(trimmed).count();
    if transitions > 0 {
        score -= (transitions as i32 * 2).min(20);
        issues.push(format!(
            "{transitions} direct Arabic/Latin transition(s) without whitespace"
        ));
        suggestions.push("mixed-script output often indicates misrecognized letters".to_string());
    }

    if trimmed.chars().count() < 20 {
        score -= 25;
        issues.push("very little text was recognized".to_string());
        suggestions.push("check that the page is not blank or severely degraded".to_string());
    }

    let arabic_words = words
        .iter()
        .filter(|w| w.chars().filter(|c| chars::is_arabic_letter(*c)).count() >= 2)
        .count();
    if arabic_words == 0 {
        score -= 40;
        issues.push("no complete Arabic words were recognized".to_string());
        suggestions.push("the page may be rotated or in a different script".to_string());
    }

    QualityReport {
        score: score.clamp(0, 100) as u8,
        issues,
        suggestions,
    }
}

/// Count maximal runs of three or more consecutive single-Arabic-letter
/// words; each run counts once.
fn count_single_letter_runs(words: &[&str]) -> usize {
    let mut runs = 0;
    let mut current = 0;
    for word in words {
        let mut it = word.chars();
        let single = matches!(
            (it.next(), it.next()),
            (Some(c), None) if chars::is_arabic_letter(c)
        );
        if single {
            current += 1;
        } else {
            if current >= 3 {
                runs += 1;
            }
            current = 0;
        }
    }
    if current >= 3 {
        runs += 1;
    }
    runs
}
