/// Таблицы ключевых слов и стоп-слов.
pub mod keywords;
/// Приведение поверхностной формы слова к каноническому виду.
pub mod normalizer;
/// Разбиение нормализованного текста на типизированные токены.
pub mod tokenizer;

pub use keywords::{Keywords, Stopwords, DEFAULT_KEYWORDS, DEFAULT_STOPWORDS};
pub use normalizer::normalize;
pub use tokenizer::{tokenize, tokens_from_words, Token, TokenPart, TokenType};
