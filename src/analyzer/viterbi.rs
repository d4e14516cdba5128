use crate::{
    analyzer::{dictionary::Form, tagger::StatisticalTagger, Word},
    morph::feats::Feats,
};

#[derive(Debug, Copy, Clone)]
struct ViterbiStep {
    log_prob: f64,
    back_ptr: usize,
}

/// Маркер обратного указателя первого слова.
const NO_BACK_PTR: usize = usize::MAX;

/// Поиск наиболее вероятной последовательности тегов предложения
/// динамическим программированием по решетке кандидатов.
///
/// Таблица живет только внутри вызова. Кандидат без достижимого
/// предшественника пропускается; при равных вероятностях побеждает
/// кандидат с меньшим индексом, что делает выдачу воспроизводимой.
pub(crate) fn viterbi(tagger: &StatisticalTagger, sentence: &[Word]) -> Vec<Form> {
    let n = sentence.len();
    if n == 0 {
        return Vec::new();
    }

    let mut dp: Vec<Vec<Option<ViterbiStep>>> = sentence
        .iter()
        .map(|word| vec![None; word.options.len()])
        .collect();

    for (k, form) in sentence[0].options.iter().enumerate() {
        let log_prob = tagger.log_score(Feats::SENTINEL, form.feats, &sentence[0].options);
        dp[0][k] = Some(ViterbiStep {
            log_prob,
            back_ptr: NO_BACK_PTR,
        });
    }

    for i in 1..n {
        let word = &sentence[i];
        let prev_word = &sentence[i - 1];
        let prev_steps = dp[i - 1].clone();

        for (k, curr) in word.options.iter().enumerate() {
            let mut best: Option<ViterbiStep> = None;

            for (p, prev) in prev_word.options.iter().enumerate() {
                let Some(prev_step) = prev_steps[p] else {
                    continue;
                };

                let log_prob =
                    prev_step.log_prob + tagger.log_score(prev.feats, curr.feats, &word.options);
                if best.map_or(true, |b| log_prob > b.log_prob) {
                    best = Some(ViterbiStep {
                        log_prob,
                        back_ptr: p,
                    });
                }
            }

            dp[i][k] = best;
        }
    }

    let mut result = vec![Form::default(); n];

    let mut best_last: Option<(usize, f64)> = None;
    for (k, step) in dp[n - 1].iter().enumerate() {
        if let Some(step) = step {
            if best_last.map_or(true, |(_, max)| step.log_prob > max) {
                best_last = Some((k, step.log_prob));
            }
        }
    }

    // Решетка может оказаться целиком недостижимой только у слова
    // без кандидатов; тогда выдаются пустые формы.
    let Some((mut k, _)) = best_last else {
        return result;
    };

    for i in (0..n).rev() {
        result[i] = sentence[i].options.get(k).copied().unwrap_or_default();
        if i > 0 {
            match dp[i][k] {
                Some(step) => k = step.back_ptr,
                None => break,
            }
        }
    }

    result
}
