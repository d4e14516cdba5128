use clap::{Parser, Subcommand};
use itertools::Itertools;
use lemma_rs::{normalize, tokenize, Keywords, Lemmatizer, DEFAULT_KEYWORDS};
use mimalloc::MiMalloc;
use std::path::PathBuf;
use tracing::debug;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Лемматизация текста целиком.
    Lemmatize { text: String },
    /// Лемма одного слова.
    Word { word: String },
    /// Разбор текста: слово, выбранный тег, лемма.
    Tag { text: String },
    /// Токенизация без словаря.
    Tokenize { text: String },
    /// Нормализация без словаря.
    Normalize { word: String },
}

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Каталог с артефактами dict.json и oov.json.
    #[clap(short, long, default_value = "data/result/")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let Args { db, command } = Args::parse();

    // Токенизация и нормализация не требуют загрузки артефактов.
    match &command {
        Commands::Tokenize { text } => {
            let keywords = Keywords::new(DEFAULT_KEYWORDS);
            for token in tokenize(text, &keywords) {
                println!("{:?}\t{}", token.kind(), token.text());
            }
            return Ok(());
        }
        Commands::Normalize { word } => {
            println!("{}", normalize(word));
            return Ok(());
        }
        _ => {}
    }

    let start = std::time::Instant::now();
    let lemmatizer = Lemmatizer::open(&db)?;
    debug!("Загрузка артефактов: {:?}", start.elapsed());
    debug!(
        "Весит: {}",
        allocative::size_of_unique_allocated_data(&lemmatizer)
    );

    match command {
        Commands::Lemmatize { text } => {
            println!("{}", lemmatizer.lemmatize_text(&text).iter().join(" "))
        }
        Commands::Word { word } => println!("{}", lemmatizer.lemmatize_word(&word)),
        Commands::Tag { text } => {
            let tokens = lemmatizer.tokenize(&text);
            for word in lemmatizer.disambiguate(&tokens) {
                let feats = word
                    .options
                    .first()
                    .map(|f| f.feats.to_string())
                    .unwrap_or_default();
                println!("{}\t{}\t{}", word.text, feats, lemmatizer.lemmatize_word(&word.text));
            }
        }
        Commands::Tokenize { .. } | Commands::Normalize { .. } => unreachable!(),
    };

    Ok(())
}
