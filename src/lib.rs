/// Снятие омонимии, словарь, предсказание несловарных слов.
pub(crate) mod analyzer;
pub mod errors;
/// Морфологический тег и грамматические признаки.
pub mod morph;
/// Нормализация, токенизация, таблицы ключевых и стоп-слов.
pub(crate) mod text;

/// Инфраструктура для юнит-тестов.
#[cfg(test)]
pub(crate) mod test_infrastructure;

use std::path::Path;

use allocative::Allocative;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::LemmaResult;

pub use analyzer::{
    DictionaryBase, DictionaryBuilder, Form, FormEntry, FormText, Lemma, LemmaEntry, LemmaString,
    Link, LinkType, Prediction, PredictionRule, StatisticalTagger, SuffixNode, SuffixPredictorBase,
    SuffixPredictorBuilder, Word, SMALLFORMS, SMALLLEMMA,
};
pub use morph::feats::{
    Animacy, Aspect, Case, Degree, Feats, Gender, Number, Person, Pos, Variant, VerbForm, Voice,
};
pub use text::{
    normalize, tokenize, tokens_from_words, Keywords, Stopwords, Token, TokenPart, TokenType,
    DEFAULT_KEYWORDS, DEFAULT_STOPWORDS,
};

/// Загруженные артефакты: словарь и суффиксный предсказатель.
/// Оба собираются офлайн и после загрузки не меняются, поэтому
/// лемматизатор свободно разделяется между потоками на чтение.
#[derive(Debug, Default, Serialize, Deserialize, Allocative)]
pub struct LemmatizerData {
    pub dictionary: DictionaryBase,
    pub predictor: SuffixPredictorBase,
}

/// Лемматизатор: словарь с хеш-индексом форм, предсказатель по хвостам
/// и статистическое снятие омонимии.
#[derive(Debug, Allocative)]
pub struct Lemmatizer {
    pub(crate) base: LemmatizerData,
    #[allocative(skip)]
    pub(crate) keywords: Keywords,
    #[allocative(skip)]
    pub(crate) stopwords: Stopwords,
}

impl Lemmatizer {
    /// Создание лемматизатора с таблицами по умолчанию.
    ///
    /// Ошибка, если в словаре отсутствует любой из важных типов связей.
    pub fn new(data: LemmatizerData) -> LemmaResult<Self> {
        Self::with_tables(
            data,
            Keywords::new(DEFAULT_KEYWORDS),
            Stopwords::new(DEFAULT_STOPWORDS),
        )
    }

    /// Создание лемматизатора с собственными таблицами ключевых и стоп-слов.
    pub fn with_tables(
        mut data: LemmatizerData,
        keywords: Keywords,
        stopwords: Stopwords,
    ) -> LemmaResult<Self> {
        data.dictionary.resolve_important_links()?;

        info!(
            "Лемматизатор инициализирован: {} лемм, {} форм, {} узлов предсказателя",
            data.dictionary.lemmas.len(),
            data.dictionary.forms.len(),
            data.predictor.node_pool.len()
        );

        Ok(Self {
            base: data,
            keywords,
            stopwords,
        })
    }

    /// Открытие артефактов `dict.json` и `oov.json` из каталога.
    pub fn open<P: AsRef<Path>>(dir: P) -> LemmaResult<Self> {
        let dictionary = DictionaryBase::open(&dir)?;
        let predictor = SuffixPredictorBase::open(&dir)?;

        Self::new(LemmatizerData {
            dictionary,
            predictor,
        })
    }

    /// Лемматизация сырого текста: на выходе по строке на токен,
    /// значимые токены заменены леммами.
    pub fn lemmatize_text(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text, &self.keywords);
        self.lemmatize_tokens(&tokens)
    }

    /// Лемматизация одного слова: словарь, затем предсказатель,
    /// затем само нормализованное слово.
    pub fn lemmatize_word(&self, word: &str) -> String {
        let word = normalize(word);

        if let Some((lemma, _)) = self.lemmatize_by_dict(&word) {
            return lemma;
        }

        if let Some(prediction) = self.base.predictor.predict(&word).into_iter().next() {
            return prediction.lemma.as_str().to_owned();
        }

        word
    }

    /// Токенизация текста таблицей ключевых слов лемматизатора.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text, &self.keywords)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.is_keyword(word)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.is_stopword(word)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_infrastructure::infrastructure::{empty_lemmatizer, make_lemmatizer};
    use itertools::Itertools;
    use test_case::test_case;

    #[test]
    fn test_lemmatize_by_dict() {
        let lemmatizer = make_lemmatizer();

        // Омограф "стали": глагольный разбор статистически тяжелее.
        let (lemma, pos) = lemmatizer.lemmatize_by_dict("стали").unwrap();
        assert_eq!("стать", lemma);
        assert_eq!(Some(Pos::Verb), pos);
    }

    #[test]
    fn test_lemmatize_by_dict_follows_links() {
        let lemmatizer = make_lemmatizer();

        let (lemma, pos) = lemmatizer.lemmatize_by_dict("лучше").unwrap();
        assert_eq!("хороший", lemma);
        assert_eq!(Some(Pos::Adj), pos);
    }

    #[test]
    fn test_lemmatize_by_dict_miss() {
        assert!(make_lemmatizer().lemmatize_by_dict("бебека").is_none());
    }

    #[test_case("сталью" => "сталь"; "dictionary_word")]
    #[test_case("КОЗАМИ" => "коза"; "predictor_word")]
    #[test_case("еж" => "еж"; "unknown_passthrough")]
    fn test_lemmatize_word(word: &str) -> String {
        make_lemmatizer().lemmatize_word(word)
    }

    #[test]
    fn test_lemmatize_word_empty_dictionary() {
        // Пустой словарь и бор без ребра на последний символ:
        // слово возвращается нормализованным как есть.
        let lemmatizer = empty_lemmatizer();
        assert_eq!("еж", lemmatizer.lemmatize_word("Ёж"));
    }

    #[test]
    fn test_lemmatize_text() {
        let lemmatizer = make_lemmatizer();

        let lemmas = lemmatizer.lemmatize_text("стали лучше, т.е. хорошими!");
        assert_eq!(
            vec!["стать", "хороший", ",", "т.е.", "хороший", "!"],
            lemmas
        );
    }

    #[test]
    fn test_lemmatize_text_oov() {
        let lemmatizer = make_lemmatizer();

        // Несловарное слово сводится предсказателем по хвосту "ами".
        let lemmas = lemmatizer.lemmatize_text("козами");
        assert_eq!(vec!["коза"], lemmas);
    }

    #[test]
    fn test_disambiguate_positions_and_pos() {
        let lemmatizer = make_lemmatizer();
        let tokens = lemmatizer.tokenize("еж, стали!");

        let words = lemmatizer.disambiguate(&tokens);
        // Пунктуация не попадает в слова, позиции указывают в исходный список.
        assert_eq!(2, words.len());
        assert_eq!(
            vec![("еж", 0), ("стали", 2)],
            words
                .iter()
                .map(|w| (w.text.as_str(), w.token_id))
                .collect_vec()
        );
        assert_eq!(Some(Pos::Verb), words[1].pos);
        assert!(words.iter().all(|w| w.options.len() == 1));
    }

    #[test]
    fn test_disambiguate_generic_candidates() {
        let lemmatizer = make_lemmatizer();
        let tokens = lemmatizer.tokenize("еж");

        // "еж" нет ни в словаре, ни в боре: четыре универсальных кандидата
        // до Витерби, один после.
        let words = lemmatizer.disambiguate(&tokens);
        assert_eq!(1, words.len());
        assert_eq!(1, words[0].options.len());
        assert_eq!(0, words[0].options[0].lemma_idx);
    }

    #[test]
    fn test_construction_requires_link_types() {
        let data = LemmatizerData::default();
        assert!(Lemmatizer::new(data).is_err());
    }

    #[test]
    fn test_stopwords_table() {
        let lemmatizer = make_lemmatizer();
        assert!(!lemmatizer.is_stopword("и"));
        assert!(lemmatizer.is_keyword("т.е."));
    }

    #[test]
    fn test_open_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let lemmatizer = make_lemmatizer();
        lemmatizer.base.dictionary.save(dir.path()).unwrap();
        lemmatizer.base.predictor.save(dir.path()).unwrap();

        let reopened = Lemmatizer::open(dir.path()).unwrap();
        assert_eq!("сталь", reopened.lemmatize_word("сталью"));
        assert_eq!(
            lemmatizer.base.dictionary.form_text_index,
            reopened.base.dictionary.form_text_index
        );
    }
}
