use std::fmt;
use std::sync::Arc;

use exam_core::model::{ScoreRecord, TaskId};
use exam_core::scoring::band_score;
use exam_core::timer::format_mm_ss;
use exam_core::Branch;
use services::{
    AdaptiveExamLoop, Clock, Dashboard, HttpScoreStore, ScoreHistoryService, ScoreStoreConfig,
};
use storage::repository::{ScoreRepository, Storage};
use tracing::info;

mod logging;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidTaskId { raw: String, reason: String },
    InvalidBranch { raw: String },
    InvalidAnswers { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing argument: {name}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidTaskId { raw, reason } => {
                write!(f, "invalid task id {raw:?}: {reason}")
            }
            ArgsError::InvalidBranch { raw } => {
                write!(f, "invalid branch {raw:?}, expected hard or easy")
            }
            ArgsError::InvalidAnswers { raw } => {
                write!(f, "invalid answers {raw:?}, expected a string of 1s and 0s")
            }
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

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_task(raw: String) -> Result<TaskId, ArgsError> {
    TaskId::new(raw.as_str()).map_err(|e| ArgsError::InvalidTaskId {
        raw,
        reason: e.to_string(),
    })
}

/// `"11010"` → `[true, true, false, true, false]`.
fn parse_answers(raw: String) -> Result<Vec<bool>, ArgsError> {
    raw.trim()
        .chars()
        .map(|c| match c {
            '1' => Some(true),
            '0' => Some(false),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(ArgsError::InvalidAnswers { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  exam [--db <sqlite_url>] [--scores-url <url>] [-v] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tasks                                     list known practice tasks");
    eprintln!("  scores [--task <id>]                      print the score history");
    eprintln!("  dashboard                                 per-task best/average/latest");
    eprintln!("  record --task <id> --correct <n> --total <n> [--elapsed <s>] [--file <name>]");
    eprintln!("  run --task <id> --module1 <1010..> --module2 <1010..> [--file <name>]");
    eprintln!("                                            replay an adaptive session and submit it");
    eprintln!("  band <pct> <hard|easy>                    look up a band score");
    eprintln!("  clear                                     delete the whole score history");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://scores.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_DB_URL, EXAM_SCORES_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Tasks,
    Scores {
        task: Option<TaskId>,
    },
    Dashboard,
    Record {
        task: TaskId,
        correct: u32,
        total: u32,
        elapsed: u64,
        file: Option<String>,
    },
    Run {
        task: TaskId,
        module1: Vec<bool>,
        module2: Vec<bool>,
        file: Option<String>,
    },
    Band {
        pct: u32,
        branch: Branch,
    },
    Clear,
}

impl Command {
    fn parse(name: &str, rest: Vec<String>) -> Result<Self, ArgsError> {
        let mut args = rest.into_iter();
        match name {
            "tasks" => no_more_args(args).map(|()| Self::Tasks),
            "dashboard" => no_more_args(args).map(|()| Self::Dashboard),
            "clear" => no_more_args(args).map(|()| Self::Clear),
            "scores" => {
                let mut task = None;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--task" => task = Some(parse_task(require_value(&mut args, "--task")?)?),
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Ok(Self::Scores { task })
            }
            "record" => {
                let (mut task, mut correct, mut total) = (None, None, None);
                let (mut elapsed, mut file) = (0, None);
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--task" => task = Some(parse_task(require_value(&mut args, "--task")?)?),
                        "--correct" => {
                            let raw = require_value(&mut args, "--correct")?;
                            correct = Some(parse_number(raw, "--correct")?);
                        }
                        "--total" => {
                            let raw = require_value(&mut args, "--total")?;
                            total = Some(parse_number(raw, "--total")?);
                        }
                        "--elapsed" => {
                            let raw = require_value(&mut args, "--elapsed")?;
                            elapsed = parse_number(raw, "--elapsed")?;
                        }
                        "--file" => file = Some(require_value(&mut args, "--file")?),
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Ok(Self::Record {
                    task: task.ok_or(ArgsError::MissingArgument { name: "--task" })?,
                    correct: correct.ok_or(ArgsError::MissingArgument { name: "--correct" })?,
                    total: total.ok_or(ArgsError::MissingArgument { name: "--total" })?,
                    elapsed,
                    file,
                })
            }
            "run" => {
                let (mut task, mut module1, mut module2, mut file) = (None, None, None, None);
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--task" => task = Some(parse_task(require_value(&mut args, "--task")?)?),
                        "--module1" => {
                            module1 = Some(parse_answers(require_value(&mut args, "--module1")?)?);
                        }
                        "--module2" => {
                            module2 = Some(parse_answers(require_value(&mut args, "--module2")?)?);
                        }
                        "--file" => file = Some(require_value(&mut args, "--file")?),
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Ok(Self::Run {
                    task: task.ok_or(ArgsError::MissingArgument { name: "--task" })?,
                    module1: module1.ok_or(ArgsError::MissingArgument { name: "--module1" })?,
                    module2: module2.unwrap_or_default(),
                    file,
                })
            }
            "band" => {
                let raw_pct = args.next().ok_or(ArgsError::MissingArgument { name: "pct" })?;
                let pct = parse_number(raw_pct, "pct")?;
                let raw_branch = args
                    .next()
                    .ok_or(ArgsError::MissingArgument { name: "branch" })?;
                let branch =
                    Branch::parse(&raw_branch).ok_or(ArgsError::InvalidBranch { raw: raw_branch })?;
                no_more_args(args)?;
                Ok(Self::Band { pct, branch })
            }
            other => Err(ArgsError::UnknownCommand(other.to_string())),
        }
    }

    fn needs_store(&self) -> bool {
        !matches!(self, Self::Tasks | Self::Band { .. })
    }
}

fn no_more_args(mut args: impl Iterator<Item = String>) -> Result<(), ArgsError> {
    match args.next() {
        Some(arg) => Err(ArgsError::UnknownArg(arg)),
        None => Ok(()),
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    scores_url: Option<String>,
    verbose: bool,
    command: Option<Command>,
}

impl Args {
    /// Global flags may appear anywhere; the first bare word picks the command.
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("EXAM_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| "sqlite://scores.sqlite3".into(), normalize_sqlite_url);
        let mut scores_url = std::env::var(services::scores::SCORES_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let mut verbose = false;
        let mut name: Option<String> = None;
        let mut rest = Vec::new();

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--scores-url" => scores_url = Some(require_value(&mut args, "--scores-url")?),
                "-v" | "--verbose" => verbose = true,
                _ if name.is_none() && !arg.starts_with('-') => name = Some(arg),
                _ if name.is_some() => {
                    rest.push(arg);
                    // Command flag values are taken verbatim, even when they look like flags.
                    if rest.last().is_some_and(|a| a.starts_with("--")) {
                        if let Some(value) = args.next() {
                            rest.push(value);
                        }
                    }
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = name
            .map(|name| Command::parse(&name, rest))
            .transpose()?;
        Ok(Self {
            db_url,
            scores_url,
            verbose,
            command,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
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
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
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

/// HTTP store when a score URL is configured, SQLite otherwise.
async fn open_scores(args: &Args) -> Result<Arc<dyn ScoreRepository>, Box<dyn std::error::Error>> {
    if let Some(url) = &args.scores_url {
        let config = ScoreStoreConfig::new(url)?;
        let store = HttpScoreStore::new(&config);
        info!(endpoint = store.endpoint(), "using remote score store");
        return Ok(Arc::new(store));
    }

    // Open + migrate SQLite here so the library crates never touch the filesystem.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    info!(db = %args.db_url, "using sqlite score store");
    Ok(storage.scores)
}

fn print_record(record: &ScoreRecord) {
    let file = record.question_file().unwrap_or("-");
    println!(
        "{}  {:<32} {:>3}/{:<3} {:>3}%  {}  {}",
        record.date().format("%Y-%m-%d %H:%M"),
        record.task_id().as_str(),
        record.correct(),
        record.total(),
        record.pct(),
        format_mm_ss(i64::try_from(record.elapsed_seconds()).unwrap_or(i64::MAX)),
        file,
    );
}

fn print_dashboard(dashboard: &Dashboard) {
    if dashboard.is_empty() {
        println!("no scores recorded yet");
        return;
    }
    for summary in &dashboard.tasks {
        println!(
            "{:<32} sessions {:>3}  best {:>3}%  avg {:>3}%  latest {:>3}%",
            summary.task_id.label(),
            summary.sessions,
            summary.best_pct,
            summary.average_pct,
            summary.latest.pct(),
        );
    }
    println!(
        "overall: {} sessions, avg {}%",
        dashboard.total_sessions, dashboard.average_pct
    );
}

async fn replay(
    history: ScoreHistoryService,
    task: TaskId,
    module1: &[bool],
    module2: &[bool],
    file: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut exam = AdaptiveExamLoop::new(task, history);
    if let Some(file) = file {
        exam = exam.with_question_file(file);
    }

    exam.start();
    for correct in module1 {
        exam.answer(*correct);
    }
    exam.finish_module1();
    let session = exam.session();
    println!(
        "module 1: {}/{} ({}%) -> {} module 2",
        session.module1_correct(),
        session.module1_total(),
        session.module1_pct(),
        session.branch().map_or("?", Branch::as_str),
    );

    exam.start_module2();
    for correct in module2 {
        exam.answer(*correct);
    }
    let stored = exam.finish_module2().await?;
    let session = exam.session();
    println!(
        "total: {}/{} ({}%)  band {}  time {}",
        session.total_correct(),
        session.total_questions(),
        session.total_pct(),
        session.band_score(),
        exam.stopwatch().display(),
    );
    match stored {
        Some(record) => print_record(&record),
        None => println!("no questions answered, nothing recorded"),
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let args = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    logging::init_cli_logger(args.verbose);

    let Some(command) = args.command.clone() else {
        print_usage();
        return Ok(());
    };

    if !command.needs_store() {
        match command {
            Command::Tasks => {
                for task in TaskId::known() {
                    println!("{:<32} {}", task.as_str(), task.label());
                }
            }
            Command::Band { pct, branch } => println!("{}", band_score(pct, branch)),
            _ => {}
        }
        return Ok(());
    }

    let history = ScoreHistoryService::new(Clock::default_clock(), open_scores(&args).await?);
    match command {
        Command::Scores { task } => {
            let records = match &task {
                Some(task) => history.list_for_task(task).await?,
                None => history.list_all().await?,
            };
            if records.is_empty() {
                println!("no scores recorded yet");
            }
            for record in &records {
                print_record(record);
            }
        }
        Command::Dashboard => print_dashboard(&history.dashboard().await?),
        Command::Record {
            task,
            correct,
            total,
            elapsed,
            file,
        } => match history
            .save_score(&task, correct, total, elapsed, file.as_deref())
            .await?
        {
            Some(record) => print_record(&record),
            None => println!("no questions answered, nothing recorded"),
        },
        Command::Run {
            task,
            module1,
            module2,
            file,
        } => replay(history, task, &module1, &module2, file).await?,
        Command::Clear => {
            history.clear_all().await?;
            println!("score history cleared");
        }
        Command::Tasks | Command::Band { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
