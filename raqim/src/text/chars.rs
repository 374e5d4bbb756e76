//! Shared Arabic character tables.
//!
//! The enhancement pipeline and the search normalizer both build on these
//! mappings; the enhancer keeps orthographic hamza letters while the search
//! side folds them further for recall (see `search`).

/// Canonical form for a presentation-form or positional-form glyph.
/// Returns `None` when the character is already canonical.
///
/// Covers Arabic Presentation Forms-B (U+FE70–FEFF: the positional variants
/// the engine emits most) plus the Forms-A codepoints seen in practice.
pub fn unify_char(c: char) -> Option<&'static str> {
    let mapped = match c {
        // Harakat presentation forms; the pipeline strips harakat anyway.
        '\u{FE70}'..='\u{FE7F}' => "",
        '\u{FE80}' => "ء",
        '\u{FE81}' | '\u{FE82}' => "آ",
        '\u{FE83}' | '\u{FE84}' => "أ",
        '\u{FE85}' | '\u{FE86}' => "ؤ",
        '\u{FE87}' | '\u{FE88}' => "إ",
        '\u{FE89}'..='\u{FE8C}' => "ئ",
        '\u{FE8D}' | '\u{FE8E}' => "ا",
        '\u{FE8F}'..='\u{FE92}' => "ب",
        '\u{FE93}' | '\u{FE94}' => "ة",
        '\u{FE95}'..='\u{FE98}' => "ت",
        '\u{FE99}'..='\u{FE9C}' => "ث",
        '\u{FE9D}'..='\u{FEA0}' => "ج",
        '\u{FEA1}'..='\u{FEA4}' => "ح",
        '\u{FEA5}'..='\u{FEA8}' => "خ",
        '\u{FEA9}' | '\u{FEAA}' => "د",
        '\u{FEAB}' | '\u{FEAC}' => "ذ",
        '\u{FEAD}' | '\u{FEAE}' => "ر",
        '\u{FEAF}' | '\u{FEB0}' => "ز",
        '\u{FEB1}'..='\u{FEB4}' => "س",
        '\u{FEB5}'..='\u{FEB8}' => "ش",
        '\u{FEB9}'..='\u{FEBC}' => "ص",
        '\u{FEBD}'..='\u{FEC0}' => "ض",
        '\u{FEC1}'..='\u{FEC4}' => "ط",
        '\u{FEC5}'..='\u{FEC8}' => "ظ",
        '\u{FEC9}'..='\u{FECC}' => "ع",
        '\u{FECD}'..='\u{FED0}' => "غ",
        '\u{FED1}'..='\u{FED4}' => "ف",
        '\u{FED5}'..='\u{FED8}' => "ق",
        '\u{FED9}'..='\u{FEDC}' => "ك",
        '\u{FEDD}'..='\u{FEE0}' => "ل",
        '\u{FEE1}'..='\u{FEE4}' => "م",
        '\u{FEE5}'..='\u{FEE8}' => "ن",
        '\u{FEE9}'..='\u{FEEC}' => "ه",
        '\u{FEED}' | '\u{FEEE}' => "و",
        '\u{FEEF}' | '\u{FEF0}' => "ى",
        '\u{FEF1}'..='\u{FEF4}' => "ي",
        '\u{FEF5}' | '\u{FEF6}' => "لآ",
        '\u{FEF7}' | '\u{FEF8}' => "لأ",
        '\u{FEF9}' | '\u{FEFA}' => "لإ",
        '\u{FEFB}' | '\u{FEFC}' => "لا",
        // Forms-A: alef wasla variants and the Allah ligature.
        '\u{FB50}' | '\u{FB51}' => "ٱ",
        '\u{FDF2}' => "الله",
        '\u{FEFF}' => "",
        _ => return None,
    };
    Some(mapped)
}

/// Alef family folded to bare alef: آ أ إ ٱ → ا.
pub fn fold_alef(c: char) -> char {
    match c {
        'آ' | 'أ' | 'إ' | 'ٱ' => 'ا',
        _ => c,
    }
}

/// Extra matching-oriented folds used only at search time:
/// hamza carriers, alef maqsura and ta marbuta collapse with their plain
/// counterparts so prefixed/suffixed and hamza-variant spellings match.
pub fn fold_for_search(c: char) -> char {
    match fold_alef(c) {
        'ؤ' => 'و',
        'ئ' | 'ى' => 'ي',
        'ة' => 'ه',
        other => other,
    }
}

/// Characters removed outright during normalization: harakat, the
/// superscript alef, tatweel and zero-width joiners.
pub fn is_strippable(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}' | '\u{200C}' | '\u{200D}')
}

pub fn is_arabic_letter(c: char) -> bool {
    matches!(c, '\u{0621}'..='\u{064A}' | '\u{0671}')
}

pub fn is_arabic_digit(c: char) -> bool {
    matches!(c, '\u{0660}'..='\u{0669}')
}

/// Any character of the target script, including presentation forms and
/// digits. Used to decide whether text "contains Arabic" at all.
pub fn is_arabic_char(c: char) -> bool {
    is_arabic_letter(c)
        || is_arabic_digit(c)
        || matches!(c,
            '\u{064B}'..='\u{0670}'
                | '\u{06F0}'..='\u{06FF}'
                | '\u{FB50}'..='\u{FDFF}'
                | '\u{FE70}'..='\u{FEFF}'
                | '،' | '؛' | '؟')
}

/// Eastern-Arabic (Persian/Urdu) digit → Arabic-Indic digit, identity for
/// everything else.
pub fn normalize_digit(c: char) -> char {
    match c {
        '\u{06F0}'..='\u{06F9}' => {
            char::from_u32(c as u32 - 0x06F0 + 0x0660).unwrap_or(c)
        }
        _ => c,
    }
}

/// ASCII digit → Arabic-Indic digit; identity for everything else.
pub fn ascii_to_arabic_digit(c: char) -> char {
    match c {
        '0'..='9' => char::from_u32(c as u32 - '0' as u32 + 0x0660).unwrap_or(c),
        _ => c,
    }
}

/// Arabic-letter character class fragment for building regexes.
pub(crate) const ARABIC_LETTER_CLASS: &str = r"\x{0621}-\x{064A}\x{0671}";

/// Single-letter particles (conjunction/preposition prefixes) that attach
/// to the following word in correct orthography.
pub const PREFIX_PARTICLES: &[char] = &['و', 'ف', 'ب', 'ل', 'ك'];

/// Curated high-frequency word list for dictionary-assisted correction.
/// Entries are stored in pipeline-normalized form (bare alef, no harakat).
pub const DICTIONARY: &[&str] = &[
    "في", "من", "على", "الى", "عن", "مع", "هذا", "هذه", "ذلك", "تلك", "التي", "الذي", "الذين",
    "الله", "محمد", "كتاب", "الكتاب", "يوم", "اليوم", "قال", "قالت", "كان", "كانت", "يكون", "هو",
    "هي", "هم", "ان", "انه", "انها", "لا", "ما", "لم", "لن", "قد", "كل", "بعد", "قبل", "عند",
    "غير", "بين", "حتى", "اذا", "او", "ثم", "منذ", "حيث", "عليه", "عليها", "فيه", "فيها", "منه",
    "منها", "له", "لها", "به", "بها", "الا", "ايضا", "بعض", "عام", "سنة", "مدينة", "دولة",
    "العربية", "الاسلام", "التاريخ", "العالم", "الناس", "الارض", "الامر", "الامام", "الشيخ",
    "ابن", "ابو", "بن",
];
