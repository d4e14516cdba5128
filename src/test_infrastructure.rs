pub(crate) mod infrastructure {
    use crate::{
        analyzer::{DictionaryBuilder, FormEntry, LemmaEntry, SuffixPredictorBuilder},
        morph::feats::{Case, Degree, Feats, Gender, Number, Pos, VerbForm},
        Lemmatizer, LemmatizerData, StatisticalTagger,
    };

    fn noun(case: Case) -> Feats {
        Feats::default()
            .set_pos(Pos::Noun)
            .set_case(case)
            .set_number(Number::Sing)
            .set_gender(Gender::Fem)
    }

    fn adj() -> Feats {
        Feats::default().set_pos(Pos::Adj)
    }

    /// Маленький, но полный лемматизатор: омограф "стали", цепочка
    /// "лучше" -> "хороший", правила предсказателя на хвост "ами"
    /// и пустые таблицы переходов с ненулевыми знаменателями сглаживания.
    pub(crate) fn make_lemmatizer() -> Lemmatizer {
        let form = |text: &str, feats: Feats, count_total: u16, count_docs: u16| FormEntry {
            text: text.to_owned(),
            feats,
            count_total,
            count_docs,
        };

        let dictionary = DictionaryBuilder::with_default_link_types()
            .tagger(StatisticalTagger {
                unique_words: 100,
                unique_tags: 8,
                ..Default::default()
            })
            .lemma(LemmaEntry {
                text: "сталь".to_owned(),
                feats: noun(Case::Nom),
                count_total: 20,
                count_docs: 4,
                forms: vec![
                    form("сталь", noun(Case::Nom), 12, 3),
                    form("стали", noun(Case::Gen), 8, 2),
                    form("сталью", noun(Case::Ins), 10, 2),
                ],
                links: vec![],
            })
            .lemma(LemmaEntry {
                text: "стать".to_owned(),
                feats: Feats::default().set_pos(Pos::Verb).set_verb_form(VerbForm::Inf),
                count_total: 30,
                count_docs: 6,
                forms: vec![
                    form(
                        "стать",
                        Feats::default().set_pos(Pos::Verb).set_verb_form(VerbForm::Inf),
                        20,
                        4,
                    ),
                    form(
                        "стали",
                        Feats::default()
                            .set_pos(Pos::Verb)
                            .set_verb_form(VerbForm::Fin)
                            .set_number(Number::Plur),
                        15,
                        5,
                    ),
                ],
                links: vec![],
            })
            .lemma(LemmaEntry {
                text: "лучше".to_owned(),
                feats: adj().set_degree(Degree::Cmp),
                count_total: 9,
                count_docs: 2,
                forms: vec![form("лучше", adj().set_degree(Degree::Cmp), 9, 2)],
                links: vec![("хороший".to_owned(), "ADJF-COMP".to_owned())],
            })
            .lemma(LemmaEntry {
                text: "хороший".to_owned(),
                feats: adj(),
                count_total: 25,
                count_docs: 7,
                forms: vec![
                    form("хороший", adj().set_case(Case::Nom).set_number(Number::Sing), 25, 7),
                    form(
                        "хорошими",
                        adj().set_case(Case::Ins).set_number(Number::Plur),
                        6,
                        2,
                    ),
                ],
                links: vec![],
            })
            .build()
            .expect("Test dictionary");

        let predictor = SuffixPredictorBuilder::default()
            .rule("ами", 3, "а", noun(Case::Ins).set_number(Number::Plur), 30)
            .expect("Test rule")
            .rule("ами", 3, "о", noun(Case::Ins).set_number(Number::Plur), 10)
            .expect("Test rule")
            .build()
            .expect("Test predictor");

        Lemmatizer::new(LemmatizerData {
            dictionary,
            predictor,
        })
        .expect("Test lemmatizer")
    }

    /// Лемматизатор с пустым словарем и бором без ребер на кириллические
    /// буквы вне хвоста "ами".
    pub(crate) fn empty_lemmatizer() -> Lemmatizer {
        let dictionary = DictionaryBuilder::with_default_link_types()
            .build()
            .expect("Empty dictionary");
        let predictor = SuffixPredictorBuilder::default()
            .rule("ами", 3, "а", noun(Case::Ins), 1)
            .expect("Test rule")
            .build()
            .expect("Test predictor");

        Lemmatizer::new(LemmatizerData {
            dictionary,
            predictor,
        })
        .expect("Empty lemmatizer")
    }
}
