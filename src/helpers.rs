use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a string for matching: trim, strip diacritics, lowercase.
///
/// Example: "  Locação " → "locacao"
pub fn fold_key(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Locale-style string ordering.
///
/// Compares base letters first (accents and case ignored), then accents
/// (unaccented before accented), then case (lowercase before uppercase).
/// "Eletro" < "Élite" < "Energia" under this ordering, whereas a plain
/// byte comparison would push "Élite" after every unaccented word.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> String {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase()
    };
    let secondary = |s: &str| -> String { s.nfd().collect::<String>().to_lowercase() };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| {
            a.nfd()
                .map(|c| (c.is_uppercase(), c))
                .cmp(b.nfd().map(|c| (c.is_uppercase(), c)))
        })
}

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_key_strips_accents_and_case() {
        assert_eq!(fold_key("  Locação "), "locacao");
        assert_eq!(fold_key("AVALIAÇÃO"), "avaliacao");
        assert_eq!(fold_key("Soluções B2B"), "solucoes b2b");
    }

    #[test]
    fn accented_words_sort_next_to_their_base_letter() {
        let mut words = vec!["Zeta", "Élite", "Energia", "Eletro", "Árvore", "Banco"];
        words.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(
            words,
            vec!["Árvore", "Banco", "Eletro", "Élite", "Energia", "Zeta"]
        );
    }

    #[test]
    fn unaccented_sorts_before_accented_twin() {
        assert_eq!(locale_cmp("e", "é"), Ordering::Less);
        assert_eq!(locale_cmp("é", "e"), Ordering::Greater);
        assert_eq!(locale_cmp("é", "é"), Ordering::Equal);
    }

    #[test]
    fn lowercase_sorts_before_uppercase_twin() {
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("a", "B"), Ordering::Less);
        assert_eq!(locale_cmp("B", "a"), Ordering::Greater);
    }

    #[test]
    fn contains_ignore_case_matches_any_case() {
        assert!(contains_ignore_case("Manutenção de Drones", "drones"));
        assert!(!contains_ignore_case("Manutenção de Drones", "solar"));
    }
}
