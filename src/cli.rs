//! Non-interactive subcommands

use std::io::Write;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::Config;
use crate::llm::auth::API_KEY_ENV;
use crate::llm::{ApiKeyManager, CredentialError, ModelGateway};
use crate::quiz::{QuestionKind, QuizSession};
use crate::story::{CefrLevel, LengthBucket, Story};
use crate::tutor::{Phase, Tutor};

/// Print a story the way the reading view shows it
pub fn write_story(out: &mut impl Write, story: &Story) -> Result<()> {
    writeln!(out, "{}", story.title)?;
    writeln!(out, "{} · {} · {} · {} words", story.level.label(), story.theme, story.length, story.word_count())?;
    writeln!(out)?;
    writeln!(out, "{}", story.content)?;
    Ok(())
}

/// Generate a story with the given overrides and print it
pub async fn story(
    tutor: &mut Tutor,
    gateway: &dyn ModelGateway,
    theme: String,
    level: Option<CefrLevel>,
    length: Option<LengthBucket>,
    out: &mut impl Write,
) -> Result<()> {
    if let Some(level) = level {
        tutor.select_level(level)?;
    }
    if let Some(length) = length {
        tutor.select_length(length)?;
    }
    tutor.select_theme(theme)?;

    let story = tutor.generate_story(gateway).await?;
    write_story(out, story)?;
    tutor.flush().await;
    Ok(())
}

/// Outcome of reading one answer line
enum Reply {
    Option(usize),
    Quit,
}

/// Parse a typed answer: a 1-based number or the option text itself
fn parse_reply(line: &str, options: &[String]) -> Option<Reply> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Some(Reply::Quit);
    }
    if let Ok(n) = line.parse::<usize>() {
        return (1..=options.len()).contains(&n).then(|| Reply::Option(n - 1));
    }
    options
        .iter()
        .position(|o| o.trim().to_lowercase() == line.to_lowercase())
        .map(Reply::Option)
}

fn write_question(out: &mut impl Write, quiz: &QuizSession) -> Result<()> {
    let Some(question) = quiz.current() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "Question {} of {}", quiz.index() + 1, quiz.questions().len())?;
    writeln!(out, "{}", question.prompt)?;
    for (i, option) in question.options.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, option)?;
    }
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Run a line-oriented quiz on the stored story
///
/// Answers are read from `input` one per line; `q` stops early.
pub async fn quiz<R, W>(
    tutor: &mut Tutor,
    gateway: &dyn ModelGateway,
    kind: QuestionKind,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if tutor.story().is_none() {
        bail!("No stored story. Run `skazka story --theme <theme>` first");
    }

    let count = tutor.generate_questions(kind, gateway).await?;
    writeln!(out, "{} {} questions", count, kind)?;

    let mut lines = input.lines();
    while tutor.phase() == Phase::Answering {
        write_question(out, tutor.quiz())?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let options = tutor.quiz().current().map(|q| q.options.clone()).unwrap_or_default();
        let option = match parse_reply(&line, &options) {
            Some(Reply::Option(i)) => i,
            Some(Reply::Quit) => break,
            None => {
                writeln!(out, "Type a number from 1 to {}, or q to stop", options.len())?;
                continue;
            }
        };

        tutor.select_option(option)?;
        let record = tutor.submit_answer()?;
        if record.is_correct {
            writeln!(out, "✓ Correct!")?;
        } else {
            writeln!(out, "✗ Incorrect. The answer is: {}", record.correct_answer)?;
        }
        writeln!(out, "  {}", record.explanation)?;

        tutor.next_question()?;
    }

    let score = tutor.quiz().score();
    writeln!(out)?;
    writeln!(out, "Score: {}/{} ({:.0}%)", score.correct, score.total, score.percentage())?;
    if tutor.phase() == Phase::Results {
        writeln!(out, "{}", score.band().message())?;
    }
    tutor.flush().await;
    Ok(())
}

/// Print where things live and the effective settings
pub fn show_config(config: &Config, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Config file: {}", Config::config_path()?.display())?;
    writeln!(out, "Data dir:    {}", Config::data_dir()?.display())?;
    writeln!(out, "Store:       {}", Config::store_path()?.display())?;
    writeln!(out, "Log file:    {}", Config::log_path()?.display())?;
    writeln!(out)?;
    writeln!(out, "{}", serde_json::to_string_pretty(config).context("Failed to serialize config")?)?;
    Ok(())
}

/// Report where the API key comes from, masked
pub fn key_status(config: &Config, out: &mut impl Write) -> Result<()> {
    if let Some(key) = &config.api_key {
        writeln!(out, "Using {} from the environment: {}", API_KEY_ENV, ApiKeyManager::mask_key(key))?;
        return Ok(());
    }
    match ApiKeyManager::get_api_key() {
        Ok(key) => writeln!(out, "Using key from the system keyring: {}", ApiKeyManager::mask_key(&key))?,
        Err(CredentialError::NotFound) => writeln!(out, "No API key set. Run `skazka key set`")?,
        Err(e) => return Err(e).context("Failed to read the keyring"),
    }
    Ok(())
}

/// Store an API key in the keyring
pub fn key_set(key: &str, out: &mut impl Write) -> Result<()> {
    ApiKeyManager::set_api_key(key).context("Failed to store API key")?;
    writeln!(out, "Stored API key {}", ApiKeyManager::mask_key(key.trim()))?;
    Ok(())
}

/// Remove the API key from the keyring
pub fn key_clear(out: &mut impl Write) -> Result<()> {
    match ApiKeyManager::delete_api_key() {
        Ok(()) => writeln!(out, "API key removed")?,
        Err(CredentialError::NotFound) => writeln!(out, "No API key was stored")?,
        Err(e) => return Err(e).context("Failed to remove API key"),
    }
    Ok(())
}

/// Forget the stored story and answers
pub async fn reset(tutor: &mut Tutor, out: &mut impl Write) -> Result<()> {
    tutor.clear_story()?;
    tutor.flush().await;
    writeln!(out, "Stored story and answers removed")?;
    Ok(())
}
