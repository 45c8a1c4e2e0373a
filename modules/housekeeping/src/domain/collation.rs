//! Turkish alphabetic collation for catalog names.
//!
//! Byte order puts `Ç` after `Z`; the checklist must follow the Turkish
//! alphabet instead: `a b c ç d e f g ğ h ı i j k l m n o ö p r s ş t u ü v y z`
//! (with `q w x` in their Latin positions). Accented letters outside that
//! alphabet (`â î û`, `é`, ...) weigh as their base letter. Comparison ignores
//! accents and case at the primary level; on ties the unaccented form sorts
//! first, then lowercase before uppercase.

use std::cmp::Ordering;

const ALPHABET: &str = "abcçdefgğhıijklmnoöpqrsştuüvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Weight {
    Space,
    Punct(u32),
    Digit(u32),
    Letter(usize),
    Other(u32),
}

/// Turkish lowercase of a single character (`I` → `ı`, `İ` → `i`).
pub fn fold_char(c: char) -> char {
    match c {
        'I' => 'ı',
        'İ' => 'i',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

/// Turkish lowercase of a string.
pub fn fold(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

fn primary(c: char) -> Weight {
    if c.is_whitespace() {
        return Weight::Space;
    }
    if let Some(d) = c.to_digit(10) {
        return Weight::Digit(d);
    }
    let folded = fold_char(c);
    let base = base_letter(folded).unwrap_or(folded);
    if let Some(pos) = ALPHABET.chars().position(|a| a == base) {
        return Weight::Letter(pos);
    }
    if c.is_alphanumeric() {
        Weight::Other(folded as u32)
    } else {
        Weight::Punct(c as u32)
    }
}

/// Base letter of an accent variant. `ç ğ ı ö ş ü` are letters of their own
/// and are not mapped.
fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'â' | 'á' | 'à' | 'ä' | 'ã' | 'å' => 'a',
        'ê' | 'é' | 'è' | 'ë' => 'e',
        'î' | 'í' | 'ì' | 'ï' => 'i',
        'ô' | 'ó' | 'ò' | 'õ' => 'o',
        'û' | 'ú' | 'ù' => 'u',
        'ñ' => 'n',
        'ÿ' | 'ý' => 'y',
        _ => return None,
    };
    Some(base)
}

fn is_accented(c: char) -> bool {
    base_letter(fold_char(c)).is_some()
}

fn is_upper(c: char) -> bool {
    fold_char(c) != c
}

/// Compare two names in Turkish alphabetic order.
pub fn compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary)
        .cmp(b.chars().map(primary))
        .then_with(|| a.chars().map(is_accented).cmp(b.chars().map(is_accented)))
        .then_with(|| a.chars().map(is_upper).cmp(b.chars().map(is_upper)))
        .then_with(|| a.cmp(b))
}

/// Case-insensitive (Turkish-aware) substring test used by checklist search.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}
