use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    analyzer::dictionary::Form,
    morph::feats::{Case, Feats, Pos},
};

/// Константа аддитивного сглаживания Лапласа.
pub const DEFAULT_ALPHA: f64 = 0.25;

/// Понижающий коэффициент для цепочки глагол -> существительное
/// в винительном или втором родительном падеже: статистика переоценивает
/// разборы с прямым дополнением.
const VERB_NOUN_COEFF: f64 = 0.85;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Статистические таблицы, посчитанные при обучении на размеченном корпусе.
/// Все ключи уже замаскированы `BIGRAM_MASK`.
pub struct StatisticalTagger {
    pub transition_counts: HashMap<Feats, HashMap<Feats, u32>>,
    pub tag_total_counts: HashMap<Feats, u32>,
    pub unique_words: u32,
    pub unique_tags: u32,
    pub alpha: f64,
}

impl Default for StatisticalTagger {
    fn default() -> Self {
        Self {
            transition_counts: HashMap::new(),
            tag_total_counts: HashMap::new(),
            unique_words: 0,
            unique_tags: 0,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl StatisticalTagger {
    fn transition_count(&self, prev: Feats, curr: Feats) -> u32 {
        self.transition_counts
            .get(&prev)
            .and_then(|row| row.get(&curr))
            .copied()
            .unwrap_or(0)
    }

    fn tag_total(&self, tag: Feats) -> u32 {
        self.tag_total_counts.get(&tag).copied().unwrap_or(0)
    }

    /// Логарифмическая оценка пары тегов на слове: сглаженная вероятность
    /// перехода плюс сглаженная лексическая вероятность эмиссии.
    ///
    /// Отсутствующие ключи читаются как ноль, поэтому сентинел
    /// `Feats::SENTINEL` дает равномерный лапласовский приор.
    pub fn log_score(&self, prev_tag: Feats, current_tag: Feats, options: &[Form]) -> f64 {
        let prev = prev_tag & Feats::BIGRAM_MASK;
        let curr = current_tag & Feats::BIGRAM_MASK;

        let trans_count = self.transition_count(prev, curr);
        let trans_denom = f64::from(self.tag_total(prev)) + self.alpha * f64::from(self.unique_tags);
        let prob_trans = (f64::from(trans_count) + self.alpha) / trans_denom;

        let word_count: u32 = options
            .iter()
            .filter(|f| f.feats & Feats::BIGRAM_MASK == curr)
            .map(|f| u32::from(f.count_total))
            .sum();

        let word_denom = f64::from(self.tag_total(curr)) + self.alpha * f64::from(self.unique_words);
        let prob_emission = (f64::from(word_count) + self.alpha) / word_denom;

        let coeff = if prev_tag.pos() == Some(Pos::Verb)
            && current_tag.pos() == Some(Pos::Noun)
            && matches!(current_tag.case(), Some(Case::Par) | Some(Case::Acc))
        {
            VERB_NOUN_COEFF
        } else {
            1.0
        };

        prob_trans.ln() * coeff + prob_emission.ln()
    }
}
