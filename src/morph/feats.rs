use allocative::Allocative;
use serde::{Deserialize, Serialize};
use std::fmt;

// Смещения полей внутри 32-битного тега, от младших бит к старшим.
const SHIFT_VERB_FORM: u32 = 0;
const SHIFT_VARIANT: u32 = 3;
const SHIFT_DEGREE: u32 = 5;
const SHIFT_PERSON: u32 = 7;
const SHIFT_NUMBER: u32 = 9;
const SHIFT_GENDER: u32 = 11;
const SHIFT_CASE: u32 = 13;
const SHIFT_ANIMACY: u32 = 17;
const SHIFT_ASPECT: u32 = 19;
const SHIFT_VOICE: u32 = 21;
const SHIFT_POS: u32 = 23;

const MASK_VERB_FORM: u32 = 0b111;
const MASK_VARIANT: u32 = 0b11;
const MASK_DEGREE: u32 = 0b11;
const MASK_PERSON: u32 = 0b11;
const MASK_NUMBER: u32 = 0b11;
const MASK_GENDER: u32 = 0b11;
const MASK_CASE: u32 = 0b1111;
const MASK_ANIMACY: u32 = 0b11;
const MASK_ASPECT: u32 = 0b11;
const MASK_VOICE: u32 = 0b11;
const MASK_POS: u32 = 0b11111;

/// Морфологический тег: часть речи и десять грамматических признаков,
/// упакованные в одно 32-битное слово.
///
/// Нулевое значение любого поля означает "признак не определен".
/// Раскладка бит фиксирована и является частью формата словаря.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Allocative,
)]
#[serde(transparent)]
pub struct Feats(pub u32);

impl Feats {
    /// Тег начала предложения для статистических таблиц.
    pub const START_TAG: Feats = Feats(0);

    /// Сентинел "до первого слова" для Витерби.
    /// Не совпадает ни с одним реальным тегом: нулевой тег - это UNKNOWN.
    pub const SENTINEL: Feats = Feats(u32::MAX);

    /// POS + Case + Number + Gender + VerbForm + Person + Voice + Animacy + Aspect.
    pub const SUPER_MASK: Feats = Feats(
        (MASK_POS << SHIFT_POS)
            | (MASK_CASE << SHIFT_CASE)
            | (MASK_NUMBER << SHIFT_NUMBER)
            | (MASK_GENDER << SHIFT_GENDER)
            | (MASK_VERB_FORM << SHIFT_VERB_FORM)
            | (MASK_PERSON << SHIFT_PERSON)
            | (MASK_VOICE << SHIFT_VOICE)
            | (MASK_ANIMACY << SHIFT_ANIMACY)
            | (MASK_ASPECT << SHIFT_ASPECT),
    );

    /// Состояние скрытой марковской модели: POS + Case + Number + Gender + VerbForm + Person.
    pub const BIGRAM_MASK: Feats = Feats(
        (MASK_POS << SHIFT_POS)
            | (MASK_CASE << SHIFT_CASE)
            | (MASK_NUMBER << SHIFT_NUMBER)
            | (MASK_GENDER << SHIFT_GENDER)
            | (MASK_VERB_FORM << SHIFT_VERB_FORM)
            | (MASK_PERSON << SHIFT_PERSON),
    );

    pub const TRIGRAM_MASK: Feats = Self::BIGRAM_MASK;

    fn get(self, shift: u32, mask: u32) -> u32 {
        (self.0 >> shift) & mask
    }

    fn set(self, val: u32, shift: u32, mask: u32) -> Feats {
        Feats((self.0 & !(mask << shift)) | ((val & mask) << shift))
    }

    pub fn verb_form(self) -> Option<VerbForm> {
        VerbForm::from_raw(self.get(SHIFT_VERB_FORM, MASK_VERB_FORM))
    }

    pub fn variant(self) -> Option<Variant> {
        Variant::from_raw(self.get(SHIFT_VARIANT, MASK_VARIANT))
    }

    pub fn degree(self) -> Option<Degree> {
        Degree::from_raw(self.get(SHIFT_DEGREE, MASK_DEGREE))
    }

    pub fn person(self) -> Option<Person> {
        Person::from_raw(self.get(SHIFT_PERSON, MASK_PERSON))
    }

    pub fn number(self) -> Option<Number> {
        Number::from_raw(self.get(SHIFT_NUMBER, MASK_NUMBER))
    }

    pub fn gender(self) -> Option<Gender> {
        Gender::from_raw(self.get(SHIFT_GENDER, MASK_GENDER))
    }

    pub fn case(self) -> Option<Case> {
        Case::from_raw(self.get(SHIFT_CASE, MASK_CASE))
    }

    pub fn animacy(self) -> Option<Animacy> {
        Animacy::from_raw(self.get(SHIFT_ANIMACY, MASK_ANIMACY))
    }

    pub fn aspect(self) -> Option<Aspect> {
        Aspect::from_raw(self.get(SHIFT_ASPECT, MASK_ASPECT))
    }

    pub fn voice(self) -> Option<Voice> {
        Voice::from_raw(self.get(SHIFT_VOICE, MASK_VOICE))
    }

    pub fn pos(self) -> Option<Pos> {
        Pos::from_raw(self.get(SHIFT_POS, MASK_POS))
    }

    pub fn set_verb_form(self, v: VerbForm) -> Feats {
        self.set(v as u32, SHIFT_VERB_FORM, MASK_VERB_FORM)
    }

    pub fn set_variant(self, v: Variant) -> Feats {
        self.set(v as u32, SHIFT_VARIANT, MASK_VARIANT)
    }

    pub fn set_degree(self, v: Degree) -> Feats {
        self.set(v as u32, SHIFT_DEGREE, MASK_DEGREE)
    }

    pub fn set_person(self, v: Person) -> Feats {
        self.set(v as u32, SHIFT_PERSON, MASK_PERSON)
    }

    pub fn set_number(self, v: Number) -> Feats {
        self.set(v as u32, SHIFT_NUMBER, MASK_NUMBER)
    }

    pub fn set_gender(self, v: Gender) -> Feats {
        self.set(v as u32, SHIFT_GENDER, MASK_GENDER)
    }

    pub fn set_case(self, v: Case) -> Feats {
        self.set(v as u32, SHIFT_CASE, MASK_CASE)
    }

    pub fn set_animacy(self, v: Animacy) -> Feats {
        self.set(v as u32, SHIFT_ANIMACY, MASK_ANIMACY)
    }

    pub fn set_aspect(self, v: Aspect) -> Feats {
        self.set(v as u32, SHIFT_ASPECT, MASK_ASPECT)
    }

    pub fn set_voice(self, v: Voice) -> Feats {
        self.set(v as u32, SHIFT_VOICE, MASK_VOICE)
    }

    pub fn set_pos(self, v: Pos) -> Feats {
        self.set(v as u32, SHIFT_POS, MASK_POS)
    }
}

impl std::ops::BitAnd for Feats {
    type Output = Feats;

    fn bitand(self, rhs: Feats) -> Feats {
        Feats(self.0 & rhs.0)
    }
}

impl fmt::Display for Feats {
    /// Человекочитаемая форма тега. Неопределенные признаки опускаются,
    /// полностью пустой тег выводится как `UNKNOWN`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut seg = |f: &mut fmt::Formatter<'_>, name: &str, value: String| -> fmt::Result {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            if name.is_empty() {
                f.write_str(&value)
            } else {
                write!(f, "{name}={value}")
            }
        };

        if let Some(v) = self.pos() {
            seg(f, "", v.to_string())?;
        }
        if let Some(v) = self.case() {
            seg(f, "Case", v.to_string())?;
        }
        if let Some(v) = self.verb_form() {
            seg(f, "VerbForm", v.to_string())?;
        }
        if let Some(v) = self.variant() {
            seg(f, "Variant", v.to_string())?;
        }
        if let Some(v) = self.gender() {
            seg(f, "Gender", v.to_string())?;
        }
        if let Some(v) = self.person() {
            seg(f, "Person", v.to_string())?;
        }
        if let Some(v) = self.number() {
            seg(f, "Number", v.to_string())?;
        }
        if let Some(v) = self.degree() {
            seg(f, "Degree", v.to_string())?;
        }
        if let Some(v) = self.animacy() {
            seg(f, "Animacy", v.to_string())?;
        }
        if let Some(v) = self.aspect() {
            seg(f, "Aspect", v.to_string())?;
        }
        if let Some(v) = self.voice() {
            seg(f, "Voice", v.to_string())?;
        }

        if first {
            f.write_str("UNKNOWN")?;
        }
        Ok(())
    }
}

macro_rules! feats_field {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $val:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, derive_more::Display, Copy, Clone, Deserialize, Serialize,
            PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        pub enum $name {
            $($(#[$vmeta])* $variant = $val,)+
        }

        impl $name {
            pub(crate) fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $(v if v == $val => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

// Defined directly (not via `feats_field!`) because threading per-variant
// `#[display(fmt = "...")]` attributes through a `macro_rules!` wrapper hits
// a macro-hygiene bug in `derive_more` 0.99's `Display` derive.
/// Часть речи по Universal Dependencies. Нулевое значение - UNKNOWN.
#[derive(
    Debug, derive_more::Display, Copy, Clone, Deserialize, Serialize,
    PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Pos {
    #[display(fmt = "ADJ")] Adj = 1,
    #[display(fmt = "ADP")] Adp = 2,
    #[display(fmt = "ADV")] Adv = 3,
    #[display(fmt = "AUX")] Aux = 4,
    #[display(fmt = "CCONJ")] Cconj = 5,
    #[display(fmt = "DET")] Det = 6,
    #[display(fmt = "INTJ")] Intj = 7,
    #[display(fmt = "NOUN")] Noun = 8,
    #[display(fmt = "NUM")] Num = 9,
    #[display(fmt = "PART")] Part = 10,
    #[display(fmt = "PRON")] Pron = 11,
    #[display(fmt = "PROPN")] Propn = 12,
    #[display(fmt = "PUNCT")] Punct = 13,
    #[display(fmt = "SCONJ")] Sconj = 14,
    #[display(fmt = "SYM")] Sym = 15,
    #[display(fmt = "VERB")] Verb = 16,
}

impl Pos {
    pub(crate) fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Adj),
            2 => Some(Self::Adp),
            3 => Some(Self::Adv),
            4 => Some(Self::Aux),
            5 => Some(Self::Cconj),
            6 => Some(Self::Det),
            7 => Some(Self::Intj),
            8 => Some(Self::Noun),
            9 => Some(Self::Num),
            10 => Some(Self::Part),
            11 => Some(Self::Pron),
            12 => Some(Self::Propn),
            13 => Some(Self::Punct),
            14 => Some(Self::Sconj),
            15 => Some(Self::Sym),
            16 => Some(Self::Verb),
            _ => None,
        }
    }
}

feats_field!(
    /// Форма глагола: инфинитив, личная форма, причастие, деепричастие.
    VerbForm {
        Inf = 1,
        Fin = 2,
        Part = 3,
        Conv = 4,
    }
);

feats_field!(
    /// Полная либо краткая форма прилагательного или причастия.
    Variant {
        Full = 1,
        Short = 2,
    }
);

feats_field!(
    /// Степень сравнения.
    Degree {
        Pos = 1,
        Cmp = 2,
        Sup = 3,
    }
);

feats_field!(
    /// Категория лица.
    Person {
        Person1 = 1,
        Person2 = 2,
        Person3 = 3,
    }
);

feats_field!(
    /// Число.
    Number {
        Sing = 1,
        Plur = 2,
    }
);

feats_field!(
    /// Род.
    Gender {
        Neut = 1,
        Fem = 2,
        Masc = 3,
    }
);

feats_field!(
    /// Падеж, включая второй родительный (Par).
    Case {
        Nom = 1,
        Gen = 2,
        Dat = 3,
        Acc = 4,
        Ins = 5,
        Loc = 6,
        Par = 7,
        Voc = 8,
    }
);

feats_field!(
    /// Одушевленность.
    Animacy {
        Inan = 1,
        Anim = 2,
    }
);

feats_field!(
    /// Вид глагола: совершенный, несовершенный.
    Aspect {
        Perf = 1,
        Imp = 2,
    }
);

feats_field!(
    /// Залог.
    Voice {
        Act = 1,
        Mid = 2,
        Pass = 3,
    }
);
