use unicode_categories::UnicodeCategories;
use unicode_normalization::{is_nfc, UnicodeNormalization};

/// U+0306, комбинируемое бреве. Буква `й` в NFD - это `и` + бреве,
/// поэтому из всех несоединимых знаков сохраняется только он.
const BREVE: char = '\u{0306}';

/// Канонический вид слова: без внешних пробелов, в нижнем регистре,
/// `ё` заменена на `е`, диакритика снята (кроме бреве у `й`).
///
/// Операция идемпотентна: повторная нормализация ничего не меняет.
pub fn normalize(word: &str) -> String {
    let word = word.trim().to_lowercase().replace('ё', "е");

    if is_nfc(&word) && !word.chars().any(|c| c.is_mark_nonspacing()) {
        return word;
    }

    word.nfd()
        .filter(|&c| c == BREVE || !c.is_mark_nonspacing())
        .nfc()
        .collect()
}

#[cfg(test)]
mod test {
    use super::normalize;
    use test_case::test_case;

    #[test_case("  Ёжик\u{0301}  " => "ежик"; "trim_lowercase_yo_accent")]
    #[test_case("й" => "й"; "breve_preserved")]
    #[test_case("и\u{0306}" => "й"; "breve_recomposed")]
    #[test_case("сло́во" => "слово"; "acute_stripped")]
    #[test_case("ПОДЪЁМ" => "подъем"; "uppercase_yo")]
    #[test_case("" => ""; "empty")]
    #[test_case("зайка" => "зайка"; "short_i_inside_word")]
    #[test_case("е\u{0308}ж" => "еж"; "decomposed_yo")]
    fn test_normalize(word: &str) -> String {
        normalize(word)
    }

    #[test]
    fn test_idempotent() {
        for word in ["  Ёжик\u{0301}  ", "й", "Объём", "naïve", "a\u{0306}b"] {
            let once = normalize(word);
            assert_eq!(once, normalize(&once));
        }
    }

    #[test]
    fn test_lowercase() {
        let normalized = normalize("СТАЛЕВАР Ё");
        assert!(normalized.chars().all(|c| !c.is_uppercase()));
        assert!(!normalized.contains('ё'));
    }
}
