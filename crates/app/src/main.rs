mod console;

use std::fmt;
use std::sync::Arc;

use drill_core::catalog::{self, DIFFICULTY_LEVELS};
use drill_core::model::{AnswerMode, DifficultyId, Question};
use drill_core::{GameConfig, QuestionGenerator};
use services::{
    AnswerOutcome, AppServices, Clock, GamePhase, GameSession, ProceedOutcome, SessionProgress,
    SpeechInput,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use console::{ConsoleSpeaker, TypedMicrophone};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDifficulty { raw: String },
    InvalidMode { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw} (expected 1-6)")
            }
            ArgsError::InvalidMode { raw } => {
                write!(f, "invalid --mode value: {raw} (expected choice or speak)")
            }
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_difficulty(raw: String) -> Result<DifficultyId, ArgsError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .map(DifficultyId::new)
        .filter(|id| catalog::find_level(*id).is_some())
        .ok_or(ArgsError::InvalidDifficulty { raw })
}

fn parse_mode(raw: String) -> Result<AnswerMode, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidMode { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [play] [--db <sqlite_url>] [--difficulty <1-6>] [--mode <choice|speak>]");
    eprintln!("                             [--questions <n>] [--seed <u64>]");
    eprintln!("  cargo run -p app -- stats   [--db <sqlite_url>] [--reset]");
    eprintln!("  cargo run -p app -- history [--db <sqlite_url>] [--limit <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:number_game.sqlite3");
    eprintln!("  --difficulty and --mode come from saved settings; passing them saves them");
    eprintln!("  --questions 10, --limit 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  NUMBER_GAME_DB_URL, NUMBER_GAME_DIFFICULTY, NUMBER_GAME_MODE, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Stats,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    difficulty: Option<DifficultyId>,
    mode: Option<AnswerMode>,
    questions: Option<u32>,
    seed: Option<u64>,
    limit: u32,
    reset: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("NUMBER_GAME_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://number_game.sqlite3".into(), normalize_sqlite_url);
        let mut difficulty = std::env::var("NUMBER_GAME_DIFFICULTY")
            .ok()
            .map(parse_difficulty)
            .transpose()?;
        let mut mode = std::env::var("NUMBER_GAME_MODE")
            .ok()
            .map(parse_mode)
            .transpose()?;
        let mut questions = None;
        let mut seed = None;
        let mut limit = 10;
        let mut reset = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--difficulty" => {
                    difficulty = Some(parse_difficulty(require_value(args, "--difficulty")?)?);
                }
                "--mode" => mode = Some(parse_mode(require_value(args, "--mode")?)?),
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    questions = Some(parse_number("--questions", value)?);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(parse_number("--seed", value)?);
                }
                "--limit" => limit = parse_number("--limit", require_value(args, "--limit")?)?,
                "--reset" => reset = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            difficulty,
            mode,
            questions,
            seed,
            limit,
            reset,
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

//
// ─── PLAY ──────────────────────────────────────────────────────────────────────
//

type StdinLines = Lines<BufReader<Stdin>>;

fn print_question(question: &Question, mode: AnswerMode) {
    let level = catalog::level_or_default(question.difficulty());
    println!();
    match mode {
        AnswerMode::Choice => {
            let options: Vec<String> = question.options().iter().map(|o| format!("[{o}]")).collect();
            println!("{}  which number did you hear?  {}", level.name(), options.join(" "));
            println!("  type a number, empty line to replay, q to quit");
        }
        AnswerMode::Speak => {
            println!("{}  say the number you heard ({}-{})", level.name(), level.min(), level.max());
            println!("  type what you say, empty line to replay, q to quit");
        }
    }
}

fn print_outcome(outcome: &AnswerOutcome) {
    if outcome.is_correct {
        println!(
            "  correct! +{} (combo {}, score {})",
            outcome.points, outcome.combo.current_combo, outcome.total_score
        );
    } else {
        println!("  not quite, it was {}", outcome.correct_answer);
    }
}

fn print_progress(progress: SessionProgress) {
    println!(
        "  {}/{} answered, accuracy {}%",
        progress.answered, progress.total, progress.accuracy_percent
    );
}

async fn play(
    services: &AppServices,
    args: &Args,
    lines: &mut StdinLines,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings_service = services.settings();
    let mut settings = settings_service.load().await;
    if let Some(id) = args.difficulty {
        settings = settings_service.set_difficulty(id).await?;
    }
    if let Some(mode) = args.mode {
        settings = settings_service.set_mode(mode).await?;
    }

    let mut config = GameConfig::new();
    if let Some(questions) = args.questions {
        config = config.with_max_questions(questions);
    }
    let auto_next_delay = config.auto_next_delay();
    let generator = args
        .seed
        .map_or_else(QuestionGenerator::from_os_rng, QuestionGenerator::seeded);
    let session = GameSession::with_generator(
        config,
        generator,
        settings.difficulty(),
        settings.preferred_mode(),
    );

    let microphone = Arc::new(TypedMicrophone::default());
    let mut flow = services.game_flow(
        session,
        &settings,
        Arc::new(ConsoleSpeaker),
        Arc::clone(&microphone) as Arc<dyn SpeechInput>,
    );
    let mode = flow.session().mode();

    let Some(question) = flow.start().await else {
        return Ok(());
    };
    print_question(&question, mode);

    loop {
        match flow.phase() {
            GamePhase::Idle => break,
            GamePhase::Playing => {
                let Some(line) = lines.next_line().await? else {
                    flow.quit().await;
                    break;
                };
                let line = line.trim();
                match line {
                    "" => flow.play_current_number().await,
                    "q" | "quit" => {
                        print_finished(flow.quit().await.as_ref());
                        break;
                    }
                    _ if mode == AnswerMode::Speak => {
                        microphone.feed(line.to_string());
                        if let Some(outcome) = flow.listen_and_answer().await {
                            print_outcome(&outcome);
                            print_progress(flow.session().progress());
                        }
                    }
                    _ => match line.parse::<u32>() {
                        Ok(value) => {
                            if let Some(outcome) = flow.answer_choice(value).await {
                                print_outcome(&outcome);
                                print_progress(flow.session().progress());
                            }
                        }
                        Err(_) => println!("  type one of the numbers shown"),
                    },
                }
            }
            GamePhase::Feedback => {
                // Speak mode moves on by itself; choice mode waits for a key.
                let command = if mode == AnswerMode::Speak {
                    tokio::time::sleep(auto_next_delay).await;
                    String::new()
                } else {
                    println!("  enter for next, r to repeat, q to quit");
                    match lines.next_line().await? {
                        Some(line) => line.trim().to_string(),
                        None => "q".to_string(),
                    }
                };
                match command.as_str() {
                    "r" | "repeat" => {
                        if let Some(question) = flow.repeat().await {
                            print_question(&question, mode);
                        }
                    }
                    "q" | "quit" => {
                        print_finished(flow.quit().await.as_ref());
                        break;
                    }
                    _ => match flow.proceed().await {
                        Some(ProceedOutcome::NextQuestion) => {
                            if let Some(question) = flow.session().current_question() {
                                print_question(question, mode);
                            }
                        }
                        Some(ProceedOutcome::Finished(summary)) => {
                            print_finished(Some(&summary));
                            break;
                        }
                        None => {}
                    },
                }
            }
        }
    }

    Ok(())
}

fn print_finished(summary: Option<&drill_core::model::SessionSummary>) {
    let Some(summary) = summary else {
        println!("no answers, nothing saved");
        return;
    };
    let stats = summary.stats();
    println!();
    println!("round over: {}/{} correct", stats.correct_count, stats.total_questions);
    println!("  accuracy      {:.2}%", stats.accuracy_percent);
    println!("  score         {}", stats.total_score);
    println!("  best streak   {}", stats.best_streak);
    println!("  avg response  {} ms", stats.average_response_latency_ms);
}

//
// ─── REPORTS ───────────────────────────────────────────────────────────────────
//

async fn show_stats(services: &AppServices, reset: bool) {
    let stats_service = services.stats();
    if reset {
        if stats_service.reset().await {
            println!("stats cleared");
        } else {
            println!("could not clear stats");
        }
        return;
    }

    let totals = stats_service.load().await;
    let settings = services.settings().load().await;
    let accuracy = drill_core::stats::accuracy_percent(
        u32::try_from(totals.correct_answers).unwrap_or(u32::MAX),
        u32::try_from(totals.total_questions).unwrap_or(u32::MAX),
    );
    println!("sessions played  {}", totals.sessions_played);
    println!("questions        {}", totals.total_questions);
    println!("correct / wrong  {} / {}", totals.correct_answers, totals.wrong_answers);
    println!("accuracy         {accuracy:.2}%");
    println!("total score      {}", totals.total_score);
    println!("best streak      {}", totals.best_streak);
    println!(
        "settings         difficulty {} ({}), mode {}",
        settings.difficulty(),
        catalog::difficulty_name(settings.difficulty()),
        settings.preferred_mode()
    );
    println!("levels:");
    for level in &DIFFICULTY_LEVELS {
        println!(
            "  {}  {}  {}-{}  {} options",
            level.id(),
            level.name(),
            level.min(),
            level.max(),
            level.option_count()
        );
    }
}

async fn show_history(services: &AppServices, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let items = services.session_summaries().list_recent(limit).await?;
    if items.is_empty() {
        println!("no finished sessions yet");
        return Ok(());
    }
    for item in items {
        println!(
            "{}  {} ({})  {}/{}  {:.2}%  score {}  streak {}  {}s",
            item.completed_at.format("%Y-%m-%d %H:%M"),
            item.difficulty_name,
            item.mode,
            item.correct,
            item.total,
            item.accuracy_percent,
            item.score,
            item.best_streak,
            item.play_time_ms / 1000
        );
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup; the only failure that stops the binary.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;

    match cmd {
        Command::Play => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            play(&services, &parsed, &mut lines).await
        }
        Command::Stats => {
            show_stats(&services, parsed.reset).await;
            Ok(())
        }
        Command::History => show_history(&services, parsed.limit).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
