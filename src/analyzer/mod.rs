use smallstr::SmallString;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::{
    morph::feats::{Feats, Pos},
    text::tokenizer::{Token, TokenType},
    Lemmatizer,
};

/// Сборка и чтение словаря.
pub(crate) mod dictionary;
pub use dictionary::{
    DictionaryBase, DictionaryBuilder, Form, FormEntry, FormText, Lemma, LemmaEntry, Link,
    LinkType,
};

/// Предсказание несловарных слов по хвосту.
pub(crate) mod predictor;
pub use predictor::{Prediction, PredictionRule, SuffixNode, SuffixPredictorBase, SuffixPredictorBuilder};

/// Сглаженные статистические таблицы.
pub(crate) mod tagger;
pub use tagger::StatisticalTagger;

/// Декодер последовательности тегов.
pub(crate) mod viterbi;

// Значения для Small-хранения вычислены по словарю: большинство слов
// имеет не больше четырех разборов, большинство лемм короче 16 байт.

/// Количество кандидатов-разборов слова, хранимых без аллокации.
pub const SMALLFORMS: usize = 4;
/// Количество байт, вмещающее большую часть лемм.
pub const SMALLLEMMA: usize = 16;

/// Нормальная форма слова.
pub type LemmaString = SmallString<[u8; SMALLLEMMA]>;

#[derive(Debug, Clone, PartialEq)]
/// Значимое слово предложения: текст, позиция в исходном списке токенов,
/// кандидаты-разборы и выбранная часть речи.
pub struct Word {
    pub text: String,
    pub token_id: usize,
    pub options: SmallVec<[Form; SMALLFORMS]>,
    pub pos: Option<Pos>,
}

impl Lemmatizer {
    /// Снятие омонимии на списке токенов. Для каждого значимого токена
    /// собираются кандидаты: словарные разборы, затем предсказания по хвосту
    /// в пределах лучшей глубины совпадения минус один, затем четыре
    /// универсальных кандидата. Витерби оставляет по одному разбору на слово.
    pub fn disambiguate(&self, tokens: &[Token]) -> Vec<Word> {
        let mut words = Vec::with_capacity(tokens.len());

        for (token_id, token) in tokens.iter().enumerate() {
            if !matches!(
                token.kind(),
                TokenType::Word | TokenType::Number | TokenType::Keyword
            ) {
                continue;
            }

            let mut options: SmallVec<[Form; SMALLFORMS]> =
                SmallVec::from_vec(self.base.dictionary.get_forms(token.text()));

            if options.is_empty() {
                let predictions = self.base.predictor.predict(token.text());
                if let Some(first) = predictions.first() {
                    let band = first.match_len.saturating_sub(1);
                    for prediction in predictions.iter().take_while(|p| p.match_len >= band) {
                        options.push(Form {
                            lemma_idx: 0,
                            feats: prediction.tag & Feats::BIGRAM_MASK,
                            count_total: clamp_counter(prediction.rule_counter),
                            count_docs: 0,
                        });
                    }
                } else {
                    debug!("{} не предсказано, универсальные кандидаты", token.text());
                    for pos in [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv] {
                        options.push(Form {
                            feats: Feats::default().set_pos(pos),
                            ..Form::default()
                        });
                    }
                }
            }

            words.push(Word {
                text: token.text().to_owned(),
                token_id,
                options,
                pos: None,
            });
        }

        let chosen = viterbi::viterbi(&self.base.dictionary.tagger, &words);
        for (word, form) in words.iter_mut().zip(chosen) {
            word.options = smallvec![form];
            word.pos = form.feats.pos();
        }

        words
    }

    /// Лемматизация списка токенов. Значимые токены заменяются леммами,
    /// остальные проходят насквозь своим текстом.
    pub fn lemmatize_tokens(&self, tokens: &[Token]) -> Vec<String> {
        let mut results: Vec<String> = tokens.iter().map(|t| t.text().to_owned()).collect();

        for word in self.disambiguate(tokens) {
            let Some(&form) = word.options.first() else {
                continue;
            };

            if form.lemma_idx == 0 {
                // Словарного якоря нет: лемму дает предсказатель.
                if let Some(prediction) = self.base.predictor.predict(&word.text).into_iter().next()
                {
                    results[word.token_id] = prediction.lemma.as_str().to_owned();
                }
                continue;
            }

            let (lemma_idx, _) = self.base.dictionary.follow_links(form.lemma_idx);
            if let Some(lemma) = self.base.dictionary.lemmas.get(lemma_idx as usize) {
                results[word.token_id] = self.base.dictionary.lemma_text(lemma).to_owned();
            }
        }

        results
    }

    /// Лемматизация одного слова по словарю: из всех разборов берется
    /// максимум по `50 * count_docs + count_total + счет цепочки связей`.
    /// Успех только при строго положительном максимуме.
    pub(crate) fn lemmatize_by_dict(&self, word: &str) -> Option<(String, Option<Pos>)> {
        let dictionary = &self.base.dictionary;

        let mut max_score = i64::MIN;
        let mut best: Option<(u32, Feats)> = None;

        for form in dictionary.get_forms(word) {
            let (lemma_idx, lemma_score) = dictionary.follow_links(form.lemma_idx);
            let score =
                50 * i64::from(form.count_docs) + i64::from(form.count_total) + lemma_score;

            if score > max_score {
                max_score = score;
                best = Some((lemma_idx, form.feats));
            }
        }

        let (lemma_idx, feats) = best?;
        if max_score <= 0 {
            return None;
        }

        let lemma = dictionary.lemmas.get(lemma_idx as usize)?;
        Some((dictionary.lemma_text(lemma).to_owned(), feats.pos()))
    }
}

/// Счетчик правила укладывается в 16 бит словоформы с насыщением.
fn clamp_counter(counter: u32) -> u16 {
    u16::try_from(counter).unwrap_or(u16::MAX)
}
