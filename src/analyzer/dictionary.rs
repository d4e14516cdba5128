use allocative::Allocative;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs::File,
    io::Write,
    path::Path,
};
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::{
    analyzer::tagger::StatisticalTagger,
    errors::{DictionaryErr, LemmaErr, LemmaResult},
    morph::feats::Feats,
};

/// Код типа связи между леммами.
pub type LinkType = u8;

/// Одна словоформа: ссылка на лемму, тег и обученные счетчики.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Allocative)]
pub struct Form {
    pub lemma_idx: u32,
    pub feats: Feats,
    pub count_total: u16,
    pub count_docs: u16,
}

/// Лемма: срез текста в арене, срез входящих связей, тег и счетчики.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Allocative)]
pub struct Lemma {
    pub text_start: u32,
    pub link_idx: u32,
    pub feats: Feats,
    pub count_total: u16,
    pub count_docs: u16,
    pub text_len: u8,
    pub link_len: u8,
}

/// Направленная связь: лемма, от которой ведется данная связь.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Allocative)]
pub struct Link {
    pub from_lemma_idx: u32,
    pub link_type: LinkType,
}

/// Группа форм-омографов, разделяющих одну поверхностную запись.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Allocative)]
pub struct FormText {
    pub text_start: u32,
    pub form_idx: u32,
    pub text_len: u8,
    pub form_len: u8,
}

/// Словарь: арены с 32-битными индексами, единый текстовый блоб
/// и хеш-индекс поверхностных форм. Собирается офлайн,
/// после загрузки только читается.
///
/// Лемма с индексом 0 зарезервирована как пустой якорь:
/// формы несловарного происхождения ссылаются на нее.
#[derive(Debug, Default, Serialize, Deserialize, Allocative)]
pub struct DictionaryBase {
    #[allocative(skip)]
    pub link_types: HashMap<String, LinkType>,

    #[allocative(skip)]
    pub texts: String,

    pub form_texts: Vec<FormText>,
    pub forms: Vec<Form>,
    pub lemmas: Vec<Lemma>,
    pub links: Vec<Link>,

    #[allocative(skip)]
    pub form_text_index: HashMap<u64, u32>,

    #[allocative(skip)]
    pub tagger: StatisticalTagger,

    #[serde(skip)]
    #[allocative(skip)]
    pub(crate) important_links: HashSet<LinkType>,
}

/// Типы связей, по которым идет сведение к канонической лемме:
/// краткие и сравнительные формы прилагательных, личные формы и причастия
/// к инфинитиву, орфографические варианты, пары мужского рода
/// с женским и множественным.
pub(crate) const IMPORTANT_LINKS: [&str; 15] = [
    "ADJF-ADJS",
    "ADJF-COMP",
    "INFN-VERB",
    "INFN-PRTF",
    "INFN-GRND",
    "PRTF-PRTS",
    "ADJF-SUPR_ejsh",
    "ADJF-SUPR_ajsh",
    "ADJF-SUPR_suppl",
    "ADJF-SUPR_nai",
    "ADJF-SUPR_slng",
    "NORM-ORPHOVAR",
    "SBST_MASC-SBST_FEMN",
    "SBST_MASC-SBST_PLUR",
    "ADVB-COMP",
];

/// Потолок рекурсии при обходе связей. Словарь собирается ацикличным,
/// ограничение страхует от испорченного артефакта.
const MAX_LINK_DEPTH: u8 = 16;

impl DictionaryBase {
    /// Стабильный 64-битный дайджест поверхностной формы.
    /// Один и тот же хеш используется при сборке и при поиске.
    pub(crate) fn form_hash(text: &str) -> u64 {
        xxh64(text.as_bytes(), 0)
    }

    /// Все омографичные разборы поверхностной формы за O(1).
    pub fn get_forms(&self, text: &str) -> Vec<Form> {
        let Some(&idx) = self.form_text_index.get(&Self::form_hash(text)) else {
            debug!("{text} не найдено в словаре");
            return Vec::new();
        };
        let Some(form_text) = self.form_texts.get(idx as usize) else {
            return Vec::new();
        };

        let start = form_text.form_idx as usize;
        let end = start + form_text.form_len as usize;
        self.forms.get(start..end).map(<[Form]>::to_vec).unwrap_or_default()
    }

    pub(crate) fn lemma_text(&self, lemma: &Lemma) -> &str {
        let start = lemma.text_start as usize;
        let end = start + lemma.text_len as usize;
        self.texts.get(start..end).unwrap_or("")
    }

    /// Разрешение имен важных связей в коды. Отсутствие любого имени
    /// в загруженном словаре фатально.
    pub(crate) fn resolve_important_links(&mut self) -> Result<(), DictionaryErr> {
        let mut important = HashSet::with_capacity(IMPORTANT_LINKS.len());
        for name in IMPORTANT_LINKS {
            match self.link_types.get(name) {
                Some(&code) => {
                    important.insert(code);
                }
                None => return Err(DictionaryErr::MissingLinkType(name.to_owned())),
            }
        }

        self.important_links = important;
        Ok(())
    }

    /// Сведение леммы к канонической по цепочке важных входящих связей.
    /// Возвращает индекс самой глубокой леммы цепочки и суммарный
    /// `count_docs` вдоль пройденного пути.
    pub(crate) fn follow_links(&self, lemma_idx: u32) -> (u32, i64) {
        self.follow_links_bounded(lemma_idx, MAX_LINK_DEPTH)
    }

    fn follow_links_bounded(&self, lemma_idx: u32, depth: u8) -> (u32, i64) {
        let Some(lemma) = self.lemmas.get(lemma_idx as usize) else {
            return (lemma_idx, 0);
        };
        let own = i64::from(lemma.count_docs);
        if depth == 0 {
            return (lemma_idx, own);
        }

        let start = lemma.link_idx as usize;
        let end = start + lemma.link_len as usize;

        let mut best: Option<(u32, i64)> = None;
        for link in self.links.get(start..end).unwrap_or(&[]) {
            if !self.important_links.contains(&link.link_type) {
                continue;
            }

            let (deep_idx, score) = self.follow_links_bounded(link.from_lemma_idx, depth - 1);
            if best.map_or(true, |(_, max)| score > max) {
                best = Some((deep_idx, score));
            }
        }

        match best {
            Some((deep_idx, score)) => (deep_idx, score + own),
            None => (lemma_idx, own),
        }
    }

    /// Открытие словаря из `dict.json`.
    pub fn open<P: AsRef<Path>>(path: P) -> LemmaResult<Self> {
        let path = path.as_ref().join("dict.json");
        let buf = std::fs::read_to_string(&path)
            .map_err(|error| LemmaErr::File { file: path, error })?;
        let dict: Self = serde_json::from_str(&buf).map_err(LemmaErr::Serde)?;

        debug!(
            "Словарь открыт: {} лемм, {} форм, {} связей",
            dict.lemmas.len(),
            dict.forms.len(),
            dict.links.len()
        );
        Ok(dict)
    }

    /// Сохранение словаря в `dict.json`.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> LemmaResult<()> {
        let path = dir.as_ref().join("dict.json");
        let mut writer = File::create(path).map_err(LemmaErr::IO)?;

        let bytes = serde_json::to_vec(self).map_err(LemmaErr::Serde)?;
        writer.write_all(&bytes).map_err(LemmaErr::IO)?;
        Ok(())
    }
}

/// Словоформа для офлайн-сборки.
#[derive(Debug, Clone)]
pub struct FormEntry {
    pub text: String,
    pub feats: Feats,
    pub count_total: u16,
    pub count_docs: u16,
}

/// Лемма для офлайн-сборки: текст, тег, счетчики, словоформы
/// и входящие связи в виде `(текст исходной леммы, имя типа связи)`.
#[derive(Debug, Clone)]
pub struct LemmaEntry {
    pub text: String,
    pub feats: Feats,
    pub count_total: u16,
    pub count_docs: u16,
    pub forms: Vec<FormEntry>,
    pub links: Vec<(String, String)>,
}

/// Офлайн-сборка арен словаря из перечня лемм и обученных таблиц.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    entries: Vec<LemmaEntry>,
    link_types: HashMap<String, LinkType>,
    tagger: StatisticalTagger,
}

impl DictionaryBuilder {
    /// Сборщик с предзарегистрированным набором важных типов связей.
    pub fn with_default_link_types() -> Self {
        let mut builder = Self::default();
        for name in IMPORTANT_LINKS {
            // Переполнение на фиксированном наборе невозможно.
            let _ = builder.link_type(name);
        }
        builder
    }

    /// Регистрация типа связи; повторная регистрация возвращает прежний код.
    pub fn link_type(&mut self, name: &str) -> Result<LinkType, DictionaryErr> {
        if let Some(&code) = self.link_types.get(name) {
            return Ok(code);
        }

        let code = LinkType::try_from(self.link_types.len())
            .map_err(|_| DictionaryErr::LinkTypeOverflow(name.to_owned()))?;
        self.link_types.insert(name.to_owned(), code);
        Ok(code)
    }

    pub fn lemma(mut self, entry: LemmaEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn tagger(mut self, tagger: StatisticalTagger) -> Self {
        self.tagger = tagger;
        self
    }

    /// Выкладка арен: лемма 0 - пустой якорь, тексты складываются
    /// в общий блоб, формы группируются по поверхностной записи,
    /// связи разрешаются по текстам лемм.
    pub fn build(mut self) -> Result<DictionaryBase, DictionaryErr> {
        let mut base = DictionaryBase {
            link_types: std::mem::take(&mut self.link_types),
            tagger: std::mem::take(&mut self.tagger),
            ..DictionaryBase::default()
        };

        base.lemmas.push(Lemma::default());

        // Индексы лемм известны заранее: связи могут ссылаться вперед.
        let mut lemma_index: HashMap<String, u32> = HashMap::new();
        for (i, entry) in self.entries.iter().enumerate() {
            lemma_index.insert(entry.text.clone(), (i + 1) as u32);
        }

        // Группировка омографов; BTreeMap дает стабильный порядок арен.
        let mut surfaces: BTreeMap<String, Vec<Form>> = BTreeMap::new();

        for entry in &self.entries {
            let lemma_idx = lemma_index[&entry.text];

            let link_idx = base.links.len() as u32;
            for (from_text, type_name) in &entry.links {
                let &from_lemma_idx = lemma_index
                    .get(from_text)
                    .ok_or_else(|| DictionaryErr::LostLemma(from_text.clone()))?;
                let &link_type = base
                    .link_types
                    .get(type_name)
                    .ok_or_else(|| DictionaryErr::MissingLinkType(type_name.clone()))?;

                base.links.push(Link {
                    from_lemma_idx,
                    link_type,
                });
            }
            let link_len = u8::try_from(entry.links.len())
                .map_err(|_| DictionaryErr::LinkOverflow(entry.text.clone()))?;

            let (text_start, text_len) = push_text(&mut base.texts, &entry.text)?;
            base.lemmas.push(Lemma {
                text_start,
                link_idx,
                feats: entry.feats,
                count_total: entry.count_total,
                count_docs: entry.count_docs,
                text_len,
                link_len,
            });

            for form in &entry.forms {
                surfaces.entry(form.text.clone()).or_default().push(Form {
                    lemma_idx,
                    feats: form.feats,
                    count_total: form.count_total,
                    count_docs: form.count_docs,
                });
            }
        }

        for (surface, forms) in surfaces {
            let form_idx = base.forms.len() as u32;
            let form_len = u8::try_from(forms.len())
                .map_err(|_| DictionaryErr::FormOverflow(surface.clone()))?;
            base.forms.extend(forms);

            let (text_start, text_len) = push_text(&mut base.texts, &surface)?;
            let form_text_idx = base.form_texts.len() as u32;
            base.form_texts.push(FormText {
                text_start,
                form_idx,
                text_len,
                form_len,
            });
            base.form_text_index
                .insert(DictionaryBase::form_hash(&surface), form_text_idx);
        }

        Ok(base)
    }
}

fn push_text(texts: &mut String, text: &str) -> Result<(u32, u8), DictionaryErr> {
    let start = texts.len() as u32;
    let len = u8::try_from(text.len()).map_err(|_| DictionaryErr::TextOverflow(text.to_owned()))?;
    texts.push_str(text);
    Ok((start, len))
}
