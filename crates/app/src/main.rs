mod commands;
mod render;

use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

use lesson_core::model::{Chapter, LessonContentDescriptor};
use serde::Deserialize;
use services::{
    ChannelSink, Clock, LessonSession, QuizAttemptService, QuizCompletion, ViewModel,
};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

use crate::commands::{HELP, Input, parse_command};

const DEFAULT_DB_URL: &str = "sqlite://lessons.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingLesson,
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingLesson => write!(f, "no lesson file given (--lesson or LESSON_FILE)"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  lesson [--lesson <path>] [--db <sqlite_url>] [--json]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LESSON_FILE, LESSON_DB_URL, RUST_LOG");
    eprintln!();
    eprintln!("{HELP}");
}

#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Run(Args),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    lesson_path: PathBuf,
    db_url: String,
    json: bool,
}

impl Args {
    /// Parse flags; `lesson_env` and `db_env` are the environment fallbacks.
    fn parse(
        args: impl IntoIterator<Item = String>,
        lesson_env: Option<String>,
        db_env: Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut lesson_path = lesson_env.filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let mut db_url = db_env
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_owned(), normalize_sqlite_url);
        let mut json = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--lesson" => lesson_path = Some(PathBuf::from(require_value(&mut args, "--lesson")?)),
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--json" => json = true,
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let lesson_path = lesson_path.ok_or(ArgsError::MissingLesson)?;
        Ok(Parsed::Run(Self {
            lesson_path,
            db_url,
            json,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

/// On-disk lesson: the chapter plus whatever the content source returned for it.
#[derive(Debug, Deserialize)]
struct LessonFile {
    chapter: Chapter,
    #[serde(default)]
    content: Option<LessonContentDescriptor>,
}

fn load_lesson(path: &Path) -> Result<LessonFile, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_view(view: &ViewModel, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(view)?);
    } else {
        print!("{}", render::render_text(view));
    }
    Ok(())
}

async fn persist_completions(
    rx: &mpsc::Receiver<QuizCompletion>,
    attempts: &QuizAttemptService,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    while let Ok(completion) = rx.try_recv() {
        let id = attempts.record(&completion).await?;
        let best = attempts.best_score(completion.chapter_id).await?;
        tracing::info!(
            attempt_id = id,
            chapter_id = %completion.chapter_id,
            score = completion.score,
            total = completion.total,
            "quiz completed"
        );
        if json {
            let event = serde_json::json!({
                "event": "quiz_completed",
                "attemptId": id,
                "completion": completion,
                "bestPercent": best.as_ref().map(|item| item.percent),
            });
            println!("{event}");
        } else if let Some(best) = best {
            println!("Best so far: {}/{} ({}%)", best.score, best.total, best.percent);
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(
        std::env::args().skip(1),
        std::env::var("LESSON_FILE").ok(),
        std::env::var("LESSON_DB_URL").ok(),
    )
    .inspect_err(|_| print_usage())?;
    let args = match parsed {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    let lesson = load_lesson(&args.lesson_path)?;

    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let clock = Clock::default();
    let attempts = QuizAttemptService::new(clock, Arc::clone(&storage.attempts));

    let (tx, rx) = mpsc::channel();
    let chapter_id = lesson.chapter.id;
    let mut session = LessonSession::new(lesson.chapter.clone(), ChannelSink::new(tx), move || {
        tracing::info!(chapter_id = %chapter_id, "learner left the lesson");
    })
    .with_clock(clock);

    print_view(&session.loading(lesson.chapter.clone()), args.json)?;
    print_view(&session.open(lesson.content, lesson.chapter), args.json)?;

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let action = match parse_command(&line) {
            Ok(Input::Action(action)) => action,
            Ok(Input::Help) => {
                eprintln!("{HELP}");
                continue;
            }
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match session.dispatch(action) {
            Ok(view) => {
                print_view(&view, args.json)?;
                persist_completions(&rx, &attempts, args.json).await?;
                if matches!(view, ViewModel::Closed) {
                    break;
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, ?action, "action rejected");
                eprintln!("{err}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn flags_override_environment() {
        let parsed = Args::parse(
            argv(&["--lesson", "b.json", "--db", "sqlite::memory:", "--json"]),
            Some("a.json".into()),
            Some("sqlite://env.db".into()),
        )
        .unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Args {
                lesson_path: PathBuf::from("b.json"),
                db_url: "sqlite::memory:".into(),
                json: true,
            })
        );
    }

    #[test]
    fn environment_fills_missing_flags() {
        let parsed = Args::parse(argv(&[]), Some("a.json".into()), None).unwrap();
        let Parsed::Run(args) = parsed else {
            panic!("expected run");
        };
        assert_eq!(args.lesson_path, PathBuf::from("a.json"));
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert!(!args.json);
    }

    #[test]
    fn lesson_is_required() {
        assert!(matches!(
            Args::parse(argv(&[]), None, None),
            Err(ArgsError::MissingLesson)
        ));
        assert!(matches!(
            Args::parse(argv(&["--lesson"]), None, None),
            Err(ArgsError::MissingValue { flag: "--lesson" })
        ));
        assert!(matches!(
            Args::parse(argv(&["--bogus"]), None, None),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/dev.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/dev.db"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn lesson_file_content_may_be_null() {
        let lesson: LessonFile =
            serde_json::from_str(r#"{ "chapter": { "id": 3, "title": "Ch3" }, "content": null }"#)
                .unwrap();
        assert_eq!(lesson.chapter.title, "Ch3");
        assert!(lesson.content.is_none());
    }
}
