use smallvec::{smallvec, SmallVec};
use unicode_categories::UnicodeCategories;

use crate::text::{keywords::Keywords, normalizer::normalize};

/// Количество частей, которое вмещает подавляющая часть токенов без аллокации:
/// слово, дефис и еще одно слово.
pub const SMALLPARTS: usize = 3;

#[rustfmt::skip]
#[derive(Debug, derive_more::Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Класс токена. `Other` - одиночные символы вне остальных классов,
/// в первую очередь дефисы.
pub enum TokenType {
    Unknown,
    Word,
    Number,
    Sym,
    Punct,
    Space,
    Other,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Часть токена до пост-слияний. Сохраняется для инспекции:
/// по частям видно, из чего был склеен составной токен.
pub struct TokenPart {
    pub text: String,
    pub kind: TokenType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenType,
    text: String,
    parts: SmallVec<[TokenPart; SMALLPARTS]>,
}

impl Token {
    fn single(text: String, kind: TokenType) -> Self {
        Self {
            kind,
            parts: smallvec![TokenPart {
                text: text.clone(),
                kind,
            }],
            text,
        }
    }

    /// Склейка последовательности токенов в один с переназначением класса.
    fn merge(tokens: &[Token], kind: TokenType) -> Self {
        let mut text = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
        let mut parts = SmallVec::new();
        for token in tokens {
            text.push_str(&token.text);
            parts.extend(token.parts.iter().cloned());
        }
        Self { kind, text, parts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TokenType {
        self.kind
    }

    pub fn parts(&self) -> &[TokenPart] {
        &self.parts
    }

    fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }
}

/// Разбиение текста на токены: нормализация, первичный проход,
/// склейка чисел, дефисных составных слов и сокращений, фильтрация пробелов.
pub fn tokenize(text: &str, keywords: &Keywords) -> Vec<Token> {
    let normalized = normalize(text);

    let tokens = split(&normalized, keywords);
    let tokens = merge_numbers(tokens);
    let tokens = merge_hyphenated_words(tokens);
    let tokens = merge_abbreviations(tokens);
    filter_words(tokens)
}

/// Сборка токенов из уже разбитых слов. Класс определяется по содержимому
/// с приоритетом Word > Number > Punct > Space > Other.
pub fn tokens_from_words<S: AsRef<str>>(words: &[S]) -> Vec<Token> {
    words
        .iter()
        .map(|word| {
            let word = word.as_ref();
            let mut kind = TokenType::Other;
            for priority in [
                TokenType::Space,
                TokenType::Punct,
                TokenType::Number,
                TokenType::Word,
            ] {
                let hit = word.chars().any(|c| match priority {
                    TokenType::Space => c.is_whitespace(),
                    TokenType::Punct => is_punct(c),
                    TokenType::Number => c.is_number_decimal_digit(),
                    TokenType::Word => is_word_char(c),
                    _ => false,
                });
                if hit {
                    kind = priority;
                }
            }
            Token::single(normalize(word), kind)
        })
        .collect()
}

/// Первичный проход: в начале каждого токена жадно пробуется ключевое слово,
/// иначе символ классифицируется и токен тянется, пока класс стабилен.
fn split(text: &str, keywords: &Keywords) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(32);
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some(len) = match_keyword(rest, keywords) {
            tokens.push(Token::single(rest[..len].to_owned(), TokenType::Keyword));
            pos += len;
            continue;
        }

        let Some(first) = rest.chars().next() else {
            break;
        };
        let kind = classify(first);

        let mut len = first.len_utf8();
        for c in rest[len..].chars() {
            if !continues(kind, first, c) {
                break;
            }
            len += c.len_utf8();
        }

        tokens.push(Token::single(rest[..len].to_owned(), kind));
        pos += len;
    }

    tokens
}

/// Продление префикса, пока он остается префиксом ключа;
/// выход на первом полном совпадении.
fn match_keyword(rest: &str, keywords: &Keywords) -> Option<usize> {
    let mut len = 0;
    for c in rest.chars() {
        len += c.len_utf8();
        if !keywords.is_keyword_prefix(&rest[..len]) {
            return None;
        }
        if keywords.is_keyword(&rest[..len]) {
            return Some(len);
        }
    }
    None
}

fn classify(c: char) -> TokenType {
    if c.is_alphabetic() {
        TokenType::Word
    } else if c.is_number_decimal_digit() {
        TokenType::Number
    } else if c.is_whitespace() {
        TokenType::Space
    } else if is_sym(c) {
        TokenType::Sym
    } else if is_punct(c) {
        TokenType::Punct
    } else {
        TokenType::Other
    }
}

fn continues(kind: TokenType, first: char, c: char) -> bool {
    match kind {
        // Начавшееся слово продолжают и цифры, и комбинируемые знаки.
        TokenType::Word => is_word_char(c),
        TokenType::Number => c.is_number_decimal_digit(),
        TokenType::Space => c.is_whitespace(),
        TokenType::Sym => is_sym(c),
        // Пунктуация тянется только одним и тем же символом: "!!" - один токен, "!?" - два.
        TokenType::Punct => is_punct(c) && c == first,
        TokenType::Other => classify(c) == TokenType::Other,
        TokenType::Unknown | TokenType::Keyword => false,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_number_decimal_digit() || c.is_mark()
}

fn is_sym(c: char) -> bool {
    matches!(c, '%' | '+' | '°')
}

fn is_hyphen(c: char) -> bool {
    matches!(c, '-' | '\u{2010}' | '\u{2011}' | '\u{2012}')
}

fn is_punct(c: char) -> bool {
    !is_hyphen(c) && c.is_punctuation()
}

/// `Number Punct Number` с разделителем из `. , / :` складывается в одно слово:
/// дроби, даты, время.
fn merge_numbers(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if i + 2 < tokens.len()
            && tokens[i].kind == TokenType::Number
            && tokens[i + 1].kind == TokenType::Punct
            && matches!(tokens[i + 1].text(), "." | "," | "/" | ":")
            && tokens[i + 2].kind == TokenType::Number
        {
            merged.push(Token::merge(&tokens[i..i + 3], TokenType::Word));
            i += 3;
            continue;
        }

        merged.push(tokens[i].clone());
        i += 1;
    }

    merged
}

/// Максимальная цепочка из слов, чисел и одиночных дефисов,
/// начатая словом или числом, складывается в одно слово.
fn merge_hyphenated_words(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if matches!(tokens[i].kind, TokenType::Word | TokenType::Number) {
            let mut j = i + 1;
            while j < tokens.len() && chains_hyphenated(&tokens[j]) {
                j += 1;
            }

            if i + 1 < j {
                merged.push(Token::merge(&tokens[i..j], TokenType::Word));
                i = j;
                continue;
            }
        }

        merged.push(tokens[i].clone());
        i += 1;
    }

    merged
}

fn chains_hyphenated(token: &Token) -> bool {
    match token.kind {
        TokenType::Word | TokenType::Number => true,
        TokenType::Other => {
            let mut chars = token.text().chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if is_hyphen(c))
        }
        _ => false,
    }
}

/// Точка приклеивается к предшествующему слову, когда контекст выдает сокращение:
/// следом иная пунктуация, слово с заглавной, либо после пробела идет
/// строчное слово или число.
fn merge_abbreviations(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].kind == TokenType::Word && i + 3 < tokens.len() && tokens[i + 1].text() == "."
        {
            let abbreviation = (tokens[i + 2].kind == TokenType::Punct
                && tokens[i + 2].text() != ".")
                || tokens[i].first_char().is_some_and(char::is_uppercase)
                || (tokens[i + 2].kind == TokenType::Space
                    && ((tokens[i + 3].kind == TokenType::Word
                        && tokens[i + 3].first_char().is_some_and(char::is_lowercase))
                        || tokens[i + 3].kind == TokenType::Number));

            if abbreviation {
                merged.push(Token::merge(&tokens[i..i + 2], TokenType::Word));
                i += 2;
                continue;
            }
        }

        merged.push(tokens[i].clone());
        i += 1;
    }

    merged
}

/// Пробельные и нераспознанные токены выбрасываются, остальные остаются.
fn filter_words(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenType::Space | TokenType::Unknown))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::text::keywords::DEFAULT_KEYWORDS;
    use itertools::Itertools;
    use test_case::test_case;

    fn keywords() -> Keywords {
        Keywords::new(DEFAULT_KEYWORDS)
    }

    fn texts(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| t.text().to_owned()).collect_vec()
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenType> {
        tokens.iter().map(|t| t.kind()).collect_vec()
    }

    #[test]
    fn test_keywords_numbers_punct() {
        let tokens = tokenize("т.е. 3,14 — хорошо!", &keywords());

        assert_eq!(vec!["т.е.", "3,14", "—", "хорошо", "!"], texts(&tokens));
        assert_eq!(
            vec![
                TokenType::Keyword,
                TokenType::Word,
                TokenType::Punct,
                TokenType::Word,
                TokenType::Punct,
            ],
            kinds(&tokens)
        );
    }

    #[test]
    fn test_hyphenated_single_word() {
        let tokens = tokenize("по-настоящему", &keywords());

        assert_eq!(vec!["по-настоящему"], texts(&tokens));
        assert_eq!(vec![TokenType::Word], kinds(&tokens));
        // Части склейки сохраняются для инспекции.
        assert_eq!(3, tokens[0].parts().len());
        assert_eq!(TokenType::Other, tokens[0].parts()[1].kind);
    }

    #[test_case("из-под" => vec!["из-под"])]
    #[test_case("жар-птица и еж" => vec!["жар-птица", "и", "еж"])]
    #[test_case("25-го" => vec!["25-го"])]
    #[test_case("- одинокий дефис" => vec!["-", "одинокий", "дефис"])]
    #[test_case("теле- и радиовещание" => vec!["теле-", "и", "радиовещание"])]
    fn test_hyphens(text: &str) -> Vec<String> {
        texts(&tokenize(text, &keywords()))
    }

    #[test_case("12.05" => vec!["12.05"]; "date")]
    #[test_case("12.05.2024" => vec!["12.05", ".", "2024"]; "merge_does_not_chain")]
    #[test_case("3:14" => vec!["3:14"]; "time")]
    #[test_case("1/2" => vec!["1/2"]; "fraction")]
    #[test_case("5 , 5" => vec!["5", ",", "5"]; "spaced_comma_not_merged")]
    fn test_merge_numbers(text: &str) -> Vec<String> {
        texts(&tokenize(text, &keywords()))
    }

    #[test]
    fn test_punct_runs() {
        let tokens = tokenize("ну!! да!?", &keywords());
        assert_eq!(vec!["ну", "!!", "да", "!", "?"], texts(&tokens));
    }

    #[test]
    fn test_abbreviation_before_lowercase() {
        // "руб." перед строчным словом - сокращение, точка уходит в слово.
        let tokens = tokenize("100 руб. за штуку", &keywords());
        assert_eq!(vec!["100", "руб.", "за", "штуку"], texts(&tokens));
    }

    #[test]
    fn test_abbreviation_before_number() {
        let tokens = tokenize("гл. 5 тома бебекает", &keywords());
        assert_eq!(vec!["гл.", "5", "тома", "бебекает"], texts(&tokens));
    }

    #[test]
    fn test_dot_before_lowercase_merges() {
        // Текст уже приведен к нижнему регистру, поэтому точка перед
        // строчным словом уходит в предыдущее слово; финальная остается.
        let tokens = tokenize("Еж уснул. Мы ушли домой.", &keywords());
        assert_eq!(
            vec!["еж", "уснул.", "мы", "ушли", "домой", "."],
            texts(&tokens)
        );
    }

    #[test]
    fn test_sym_and_percent() {
        let tokens = tokenize("скидка 50% + 5°", &keywords());
        assert_eq!(vec!["скидка", "50", "%", "+", "5", "°"], texts(&tokens));
        assert_eq!(TokenType::Sym, tokens[2].kind());
    }

    /// Конкатенация частей всех токенов до фильтрации
    /// восстанавливает нормализованный текст байт в байт.
    #[test_case("т.е. 3,14 — хорошо!")]
    #[test_case("по-настоящему, т. е. 1/2 часа ?!")]
    #[test_case("Еж   ушел\tв 19:30 (ул. Лесная, д. 5)")]
    #[test_case("")]
    fn test_partition(text: &str) {
        let normalized = normalize(text);
        let keywords = keywords();

        let tokens = split(&normalized, &keywords);
        let tokens = merge_numbers(tokens);
        let tokens = merge_hyphenated_words(tokens);
        let tokens = merge_abbreviations(tokens);

        let rebuilt: String = tokens
            .iter()
            .flat_map(|t| t.parts())
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(normalized, rebuilt);
    }

    #[test]
    fn test_tokens_from_words() {
        let tokens = tokens_from_words(&["Ёжик", "3", "?!", " ", "\u{2014}"]);
        assert_eq!(
            vec![
                TokenType::Word,
                TokenType::Number,
                TokenType::Punct,
                TokenType::Space,
                TokenType::Punct,
            ],
            kinds(&tokens)
        );
        assert_eq!("ежик", tokens[0].text());
    }
}
