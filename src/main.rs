use anyhow::{Context, Result};
use label_verdict::analysis::{AnalysisMode, LabelAnalyzer};
use label_verdict::config::AppConfig;
use label_verdict::errors::error_logging;
use label_verdict::localization::{self, LocalizationManager};
use label_verdict::observability;
use label_verdict::ocr::{self, TesseractOcr, TextSource};
use label_verdict::report;
use label_verdict::vocabulary::{load_ingredient_vocabulary, load_nutrient_vocabulary};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

/// Print `prompt` and read one trimmed line from stdin
async fn ask(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{} ", prompt).as_bytes()).await?;
    stdout.flush().await?;

    let line = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
        .unwrap_or_default();
    Ok(line.trim().to_string())
}

/// Strip surrounding quotes left by drag-and-drop into a terminal
fn clean_image_path(input: &str) -> PathBuf {
    PathBuf::from(input.trim().trim_matches(|c: char| c == '"' || c == '\''))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    observability::init_observability()?;

    let config = AppConfig::from_env()
        .and_then(|config| config.validate().map(|_| config))
        .inspect_err(|e| error_logging::log_config_error(e, "environment", "startup"))?;
    info!("{}", config.summary());

    let l10n = LocalizationManager::new()?;
    let language = localization::detect_language(Some(&config.report.language));

    // Both tables load before any input is read
    let ingredients = load_ingredient_vocabulary(&config.vocabulary.ingredient_dataset_path)?;
    let nutrients = load_nutrient_vocabulary(config.vocabulary.nutrient_thresholds_path.as_deref())?;
    info!(
        ingredients = ingredients.len(),
        nutrients = nutrients.len(),
        "Vocabularies loaded"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", l10n.get_message_in_language("menu-title", language, None));
    println!("{}", l10n.get_message_in_language("menu-option-ingredients", language, None));
    println!("{}", l10n.get_message_in_language("menu-option-nutrition", language, None));
    let choice = ask(&mut lines, &l10n.get_message_in_language("menu-prompt", language, None)).await?;

    let mode = match choice.parse::<AnalysisMode>() {
        Ok(mode) => mode,
        Err(e) => {
            warn!(choice = %choice, error = %e, "Invalid menu choice");
            println!(
                "{}",
                l10n.get_message_with_args_in_language("invalid-choice", language, &[("choice", choice.as_str())])
            );
            return Ok(());
        }
    };

    let image_input = ask(&mut lines, &l10n.get_message_in_language("image-prompt", language, None)).await?;
    let image_path = clean_image_path(&image_input);

    let source: Arc<dyn TextSource> = Arc::new(TesseractOcr::new(config.ocr.clone()));
    let text = match ocr::extract_label_text(&image_path, &config.ocr, source).await {
        Ok(text) => text,
        Err(e) => {
            let error = e.to_string();
            eprintln!(
                "{}",
                l10n.get_message_with_args_in_language("ocr-failed", language, &[("error", error.as_str())])
            );
            return Err(e.into());
        }
    };

    if text.is_empty() {
        println!("{}", l10n.get_message_in_language("ocr-empty", language, None));
    }

    let scorer = config.matching.algorithm.scorer();
    let analyzer = LabelAnalyzer::new(&ingredients, &nutrients, scorer.as_ref(), config.matching.cutoff);
    let analysis = analyzer.analyze(mode, &text);

    println!("{}", report::render(&analysis, config.report.format, &l10n, language)?);
    info!(mode = %mode, rating = analysis.rating(), "Label analysis finished");

    Ok(())
}
