/// Компактный битовый кодек морфологического тега и словарь признаков.
pub mod feats;

pub use feats::{
    Animacy, Aspect, Case, Degree, Feats, Gender, Number, Person, Pos, Variant, VerbForm, Voice,
};
