//! Name normalization
//!
//! `normalize` folds a printed recipe title into the key used for matching:
//! lower-cased, parenthetical asides removed ("(GF)", "[V]"), punctuation
//! dropped, hyphens and slashes treated as word breaks, whitespace collapsed.
//! Digits are kept, so "3-Bean Salad" becomes "3 bean salad".
//!
//! Lower-casing is followed by the case folds `to_lowercase` leaves out:
//! "ß" becomes "ss" and final sigma "ς" becomes "σ", so "Straße" and
//! "STRASSE" share a key.
//!
//! The output contains only alphanumeric characters separated by single
//! spaces, which makes normalization idempotent.

/// Collapse runs of whitespace to one space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key for a recipe name
///
/// An aside is only removed when its bracket is closed. When a name is nothing
/// but an aside ("(Basic Vinaigrette)") the text inside is kept.
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let key = fold(&strip_asides(&lowered));
    if key.is_empty() {
        fold(&lowered)
    } else {
        key
    }
}

/// Remove balanced `(...)` and `[...]` spans, including nested ones
fn strip_asides(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut open: Vec<(usize, char)> = Vec::new();

    for c in text.chars() {
        match c {
            '(' | '[' => {
                open.push((out.len(), c));
                out.push(c);
            }
            ')' | ']' => {
                let opener = if c == ')' { '(' } else { '[' };
                match open.last() {
                    Some(&(start, o)) if o == opener => {
                        out.truncate(start);
                        out.push(' ');
                        open.pop();
                    }
                    _ => out.push(c),
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Keep alphanumerics, turn separators into spaces, drop other punctuation
fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == 'ß' {
            out.push_str("ss");
        } else if c == 'ς' {
            out.push('σ');
        } else if c.is_alphanumeric() {
            out.push(c);
        } else if c == '&' {
            out.push_str(" and ");
        } else if c.is_whitespace() || matches!(c, '-' | '_' | '/' | '–' | '—') {
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize("  COCONUT   Macadamia "), "coconut macadamia");
        assert_eq!(normalize("Pad\tThai\n"), "pad thai");
    }

    #[test]
    fn test_strips_allergen_tags() {
        assert_eq!(normalize("Cold Carrot Tofu Salad (GF)"), "cold carrot tofu salad");
        assert_eq!(normalize("Granola [V] (DF, GF)"), "granola");
        assert_eq!(normalize("Stew (with (nested) aside) Supreme"), "stew supreme");
    }

    #[test]
    fn test_keeps_numerals() {
        assert_eq!(normalize("3-Bean Salad"), "3 bean salad");
        assert_eq!(normalize("5-Minute, No-Bake Bars."), "5 minute no bake bars");
    }

    #[test]
    fn test_punctuation_and_ampersand() {
        assert_eq!(normalize("Mom's Mac & Cheese!"), "moms mac and cheese");
        assert_eq!(normalize("Salt/Pepper Rub"), "salt pepper rub");
    }

    #[test]
    fn test_folds_sharp_s_and_final_sigma() {
        assert_eq!(normalize("Straße Pretzels"), normalize("STRASSE PRETZELS"));
        assert_eq!(normalize("GROẞE Torte"), "grosse torte");
        assert_eq!(normalize("ΟΔΟΣ"), normalize("οδοσ"));
        assert_eq!(normalize(&normalize("Straße")), "strasse");
    }

    #[test]
    fn test_unbalanced_bracket_keeps_text() {
        assert_eq!(normalize("Chili (spicy"), "chili spicy");
        assert_eq!(normalize("Chili) mild"), "chili mild");
    }

    #[test]
    fn test_aside_only_name_falls_back() {
        assert_eq!(normalize("(Basic Vinaigrette)"), "basic vinaigrette");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_unicode_letters_preserved() {
        assert_eq!(normalize("Crème Brûlée"), "crème brûlée");
        assert_eq!(normalize("JALAPEÑO Poppers"), "jalapeño poppers");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(name in "[A-Za-z0-9éñüßẞΣς ,.'&()\\[\\]/_-]{0,48}") {
            let once = normalize(&name);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_normalized_has_no_edge_or_double_spaces(name in "[A-Za-z0-9 ,.()-]{0,48}") {
            let key = normalize(&name);
            prop_assert!(!key.starts_with(' '));
            prop_assert!(!key.ends_with(' '));
            prop_assert!(!key.contains("  "));
        }
    }
}
