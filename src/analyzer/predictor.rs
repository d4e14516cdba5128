use allocative::Allocative;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs::File, io::Write, path::Path};
use tracing::debug;

use crate::{
    analyzer::LemmaString,
    errors::{LemmaErr, LemmaResult, PredictorErr},
    morph::feats::Feats,
};

/// Узел обратно-суффиксного бора. Дети и правила лежат непрерывными
/// срезами в общих пулах, узел хранит только индекс и длину.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Allocative)]
pub struct SuffixNode {
    pub children_idx: u32,
    pub rules_idx: u32,
    /// Сумма счетчиков правил узла, знаменатель вероятности.
    pub counter: u32,
    pub children_len: u8,
    pub rules_len: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub ch: char,
    pub node_idx: u32,
}

/// Правило лемматизации: отрезать `cut` символов с конца
/// и приписать хвост из `append_texts`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Allocative)]
pub struct PredictionRule {
    pub tag: Feats,
    pub counter: u32,
    pub append_start: u32,
    pub cut: u8,
    pub append_len: u8,
}

/// Предсказатель несловарных слов: арена узлов бора, ключом служат
/// символы слова с конца. Строится офлайн, после загрузки не меняется.
#[derive(Debug, Default, Serialize, Deserialize, Allocative)]
pub struct SuffixPredictorBase {
    pub node_pool: Vec<SuffixNode>,
    #[allocative(skip)]
    pub edges_pool: Vec<Edge>,
    pub rule_pool: Vec<PredictionRule>,
    #[allocative(skip)]
    pub append_texts: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub lemma: LemmaString,
    pub tag: Feats,
    pub score: f64,
    pub rule_counter: u32,
    pub node_counter: u32,
    /// Сколько символов хвоста совпало.
    pub match_len: usize,
}

impl SuffixPredictorBase {
    fn child(&self, node: &SuffixNode, c: char) -> Option<&SuffixNode> {
        let start = node.children_idx as usize;
        let end = start + node.children_len as usize;
        self.edges_pool
            .get(start..end)?
            .iter()
            .find(|edge| edge.ch == c)
            .and_then(|edge| self.node_pool.get(edge.node_idx as usize))
    }

    fn rules(&self, node: &SuffixNode) -> &[PredictionRule] {
        let start = node.rules_idx as usize;
        let end = start + node.rules_len as usize;
        self.rule_pool.get(start..end).unwrap_or(&[])
    }

    fn append_text(&self, rule: &PredictionRule) -> &str {
        let start = rule.append_start as usize;
        let end = start + rule.append_len as usize;
        self.append_texts.get(start..end).unwrap_or("")
    }

    /// Проход по бору от последнего символа слова к началу. На каждом
    /// достигнутом узле выдаются все его правила; обход обрывается на первом
    /// символе без ребра. Результат отсортирован по глубине совпадения,
    /// при равной глубине - по вероятности.
    pub fn predict(&self, word: &str) -> Vec<Prediction> {
        let Some(root) = self.node_pool.first() else {
            return Vec::new();
        };

        let chars: Vec<char> = word.chars().collect();
        let mut node = root;
        let mut results = Vec::new();

        for (depth, &c) in chars.iter().rev().enumerate() {
            match self.child(node, c) {
                Some(next) => node = next,
                None => break,
            }
            let match_len = depth + 1;

            for rule in self.rules(node) {
                let keep = chars.len().saturating_sub(rule.cut as usize);
                let mut lemma = LemmaString::default();
                for &c in &chars[..keep] {
                    lemma.push(c);
                }
                lemma.push_str(self.append_text(rule));

                results.push(Prediction {
                    lemma,
                    tag: rule.tag,
                    score: f64::from(rule.counter) / f64::from(node.counter),
                    rule_counter: rule.counter,
                    node_counter: node.counter,
                    match_len,
                });
            }
        }

        results.sort_by(|a, b| {
            b.match_len
                .cmp(&a.match_len)
                .then(b.score.total_cmp(&a.score))
        });
        results
    }

    /// Открытие предсказателя из `oov.json`.
    pub fn open<P: AsRef<Path>>(path: P) -> LemmaResult<Self> {
        let path = path.as_ref().join("oov.json");
        let buf = std::fs::read_to_string(&path)
            .map_err(|error| LemmaErr::File { file: path, error })?;
        let base: Self = serde_json::from_str(&buf).map_err(LemmaErr::Serde)?;

        debug!(
            "Предсказатель открыт: {} узлов, {} правил",
            base.node_pool.len(),
            base.rule_pool.len()
        );
        Ok(base)
    }

    /// Сохранение предсказателя в `oov.json`.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> LemmaResult<()> {
        let path = dir.as_ref().join("oov.json");
        let mut writer = File::create(path).map_err(LemmaErr::IO)?;

        let bytes = serde_json::to_vec(self).map_err(LemmaErr::Serde)?;
        writer.write_all(&bytes).map_err(LemmaErr::IO)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct BuildNode {
    children: BTreeMap<char, BuildNode>,
    rules: Vec<BuildRule>,
}

#[derive(Debug)]
struct BuildRule {
    tag: Feats,
    counter: u32,
    cut: u8,
    append: String,
}

/// Офлайн-сборка бора из обученных правил `суффикс -> (cut, append, tag)`.
#[derive(Debug, Default)]
pub struct SuffixPredictorBuilder {
    root: BuildNode,
}

impl SuffixPredictorBuilder {
    /// Добавление правила на суффикс. Путь в боре прокладывается
    /// по символам суффикса с конца.
    pub fn rule(
        mut self,
        suffix: &str,
        cut: u8,
        append: &str,
        tag: Feats,
        counter: u32,
    ) -> Result<Self, PredictorErr> {
        if suffix.is_empty() {
            return Err(PredictorErr::EmptySuffix(append.to_owned()));
        }

        let mut node = &mut self.root;
        for c in suffix.chars().rev() {
            node = node.children.entry(c).or_default();
        }
        node.rules.push(BuildRule {
            tag,
            counter,
            cut,
            append: append.to_owned(),
        });
        Ok(self)
    }

    /// Выкладка дерева в арены. Дети каждого узла занимают непрерывный
    /// срез пула ребер, счетчик узла - сумма счетчиков его правил.
    pub fn build(self) -> Result<SuffixPredictorBase, PredictorErr> {
        let mut base = SuffixPredictorBase::default();
        base.node_pool.push(SuffixNode::default());

        let mut queue = std::collections::VecDeque::from([(self.root, 0usize)]);
        while let Some((build, idx)) = queue.pop_front() {
            let rules_idx = base.rule_pool.len() as u32;
            let rules_len = u8::try_from(build.rules.len())
                .map_err(|_| PredictorErr::RuleOverflow(format!("node {idx}")))?;

            let mut counter = 0u32;
            for rule in build.rules {
                let append_start = base.append_texts.len() as u32;
                let append_len = u8::try_from(rule.append.len())
                    .map_err(|_| PredictorErr::AppendOverflow(rule.append.clone()))?;
                base.append_texts.push_str(&rule.append);

                counter += rule.counter;
                base.rule_pool.push(PredictionRule {
                    tag: rule.tag,
                    counter: rule.counter,
                    append_start,
                    cut: rule.cut,
                    append_len,
                });
            }

            let children_idx = base.edges_pool.len() as u32;
            let children_len = u8::try_from(build.children.len())
                .map_err(|_| PredictorErr::EdgeOverflow(format!("node {idx}")))?;

            let mut pending = Vec::with_capacity(build.children.len());
            for (ch, child) in build.children {
                let node_idx = (base.node_pool.len() + pending.len()) as u32;
                base.edges_pool.push(Edge { ch, node_idx });
                pending.push(child);
            }
            for child in pending {
                let node_idx = base.node_pool.len();
                base.node_pool.push(SuffixNode::default());
                queue.push_back((child, node_idx));
            }

            base.node_pool[idx] = SuffixNode {
                children_idx,
                rules_idx,
                counter,
                children_len,
                rules_len,
            };
        }

        Ok(base)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::morph::feats::Pos;
    use test_case::test_case;

    fn noun() -> Feats {
        Feats::default().set_pos(Pos::Noun)
    }

    fn verb() -> Feats {
        Feats::default().set_pos(Pos::Verb)
    }

    fn predictor() -> SuffixPredictorBase {
        SuffixPredictorBuilder::default()
            .rule("ами", 3, "а", noun(), 30)
            .unwrap()
            .rule("ами", 3, "о", noun(), 10)
            .unwrap()
            .rule("ет", 2, "еть", verb(), 5)
            .unwrap()
            .rule("ает", 3, "ать", verb(), 4)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_predict_lemma_and_score() {
        let predictions = predictor().predict("козами");

        // Самое глубокое совпадение впереди, при равной глубине - больший score.
        assert_eq!(3, predictions[0].match_len);
        assert_eq!("коза", predictions[0].lemma.as_str());
        assert_eq!(0.75, predictions[0].score);
        assert_eq!("козо", predictions[1].lemma.as_str());
        assert_eq!(0.25, predictions[1].score);
    }

    #[test]
    fn test_predict_depth_order() {
        let predictions = predictor().predict("бебекает");

        // Правило на "ает" глубже правила на "ет" и идет первым.
        assert_eq!(
            vec![3, 2],
            predictions.iter().map(|p| p.match_len).collect::<Vec<_>>()
        );
        assert_eq!("бебекать", predictions[0].lemma.as_str());
        assert_eq!("бебекаеть", predictions[1].lemma.as_str());
    }

    #[test_case("еж"; "no_edge_for_last_char")]
    #[test_case(""; "empty_word")]
    fn test_predict_empty(word: &str) {
        assert!(predictor().predict(word).is_empty());
    }

    #[test]
    fn test_predict_on_empty_base() {
        assert!(SuffixPredictorBase::default().predict("еж").is_empty());
    }

    #[test]
    fn test_node_counter_is_rule_sum() {
        let base = predictor();
        for node in &base.node_pool {
            let start = node.rules_idx as usize;
            let end = start + node.rules_len as usize;
            let sum: u32 = base.rule_pool[start..end].iter().map(|r| r.counter).sum();
            assert_eq!(sum, node.counter);
        }
    }

    #[test]
    fn test_cut_counts_chars_not_bytes() {
        // "ами" - 6 байт, но cut = 3 символа.
        let base = SuffixPredictorBuilder::default()
            .rule("ами", 3, "а", noun(), 1)
            .unwrap()
            .build()
            .unwrap();

        let predictions = base.predict("ножницами");
        assert_eq!("ножница", predictions[0].lemma.as_str());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let base = predictor();
        base.save(dir.path()).unwrap();

        let reopened = SuffixPredictorBase::open(dir.path()).unwrap();
        assert_eq!(base.node_pool, reopened.node_pool);
        assert_eq!(base.edges_pool, reopened.edges_pool);
        assert_eq!(base.rule_pool, reopened.rule_pool);
        assert_eq!(base.append_texts, reopened.append_texts);
    }
}
