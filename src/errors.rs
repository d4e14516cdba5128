use std::path::PathBuf;
use thiserror::Error;

pub type LemmaResult<T, E = LemmaErr> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LemmaErr {
    #[error("Couldn't open file {file}: {error}")]
    File {
        file: PathBuf,
        error: std::io::Error,
    },

    #[error("IO err -> {0}")]
    IO(#[from] std::io::Error),

    #[error("Serde err -> {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Dictionary err -> {0}")]
    Dictionary(#[from] DictionaryErr),

    #[error("Predictor err -> {0}")]
    Predictor(#[from] PredictorErr),
}

#[derive(Debug, Error)]
/// Ошибки сборки и инициализации словаря.
pub enum DictionaryErr {
    #[error("Not found link type {0}")]
    MissingLinkType(String),

    #[error("Link type table overflow on {0}")]
    LinkTypeOverflow(String),

    #[error("Lemma '{0}' is referenced by a link but absent")]
    LostLemma(String),

    #[error("Text '{0}' exceeds the arena slice limit")]
    TextOverflow(String),

    #[error("Too many homograph forms for surface '{0}'")]
    FormOverflow(String),

    #[error("Too many incoming links for lemma '{0}'")]
    LinkOverflow(String),
}

#[derive(Debug, Error)]
/// Ошибки сборки суффиксного предсказателя.
pub enum PredictorErr {
    #[error("Empty suffix in rule '{0}'")]
    EmptySuffix(String),

    #[error("Append text '{0}' exceeds the arena slice limit")]
    AppendOverflow(String),

    #[error("Too many children at node for suffix '{0}'")]
    EdgeOverflow(String),

    #[error("Too many rules at node for suffix '{0}'")]
    RuleOverflow(String),
}
