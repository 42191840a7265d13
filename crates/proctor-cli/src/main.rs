//! proctor CLI: exam authoring and timed exam taking from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proctor", version, about = "Exam authoring and timed exam-taking client")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store an access token for one day
    Login {
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Create an account
    Register {
        username: String,

        #[arg(long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Show the logged-in user
    Whoami,

    /// Manage your account
    #[command(subcommand)]
    Account(AccountCommand),

    /// Browse and manage exams
    #[command(subcommand)]
    Exams(ExamsCommand),

    /// Browse and manage the question bank
    #[command(subcommand)]
    Questions(QuestionsCommand),

    /// Check question and exam TOML files without uploading them
    Validate {
        /// Question bank file (repeatable)
        #[arg(long)]
        questions: Vec<PathBuf>,

        /// Exam file
        #[arg(long)]
        exam: Option<PathBuf>,
    },

    /// Take an exam with a live countdown
    Take {
        exam_id: i64,
    },

    /// Show the score of a finished attempt
    Result {
        attempt_id: i64,
    },

    /// Go through a graded attempt question by question
    Review {
        attempt_id: i64,
    },

    /// List your past attempts, newest first
    History {
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Delete one of your attempts
    DeleteAttempt {
        attempt_id: i64,
    },

    /// Create starter config and sample authoring files
    Init,
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Change username and email
    Update {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Change password (prompts on stdin)
    Password,
    /// Permanently delete the account
    Delete {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ExamsCommand {
    /// List exams
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        /// Filter by title
        #[arg(long)]
        search: Option<String>,

        /// Only exams you created
        #[arg(long)]
        mine: bool,
    },
    /// Show one exam
    Show { exam_id: i64 },
    /// Create an exam from a TOML file
    Create { file: PathBuf },
    /// Replace an exam with the contents of a TOML file
    Update { exam_id: i64, file: PathBuf },
    /// Delete an exam
    Delete { exam_id: i64 },
}

#[derive(Subcommand)]
enum QuestionsCommand {
    /// List or search questions
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        /// Match content or tag
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one question with its choices
    Show { question_id: i64 },
    /// Upload every question in a TOML file
    Create { file: PathBuf },
    /// Replace a question with the single question in a TOML file
    Update { question_id: i64, file: PathBuf },
    /// Delete a question
    Delete { question_id: i64 },
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("proctor=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Login { username, password } => {
            commands::account::login(config, username, password).await
        }
        Commands::Logout => commands::account::logout(config),
        Commands::Register {
            username,
            email,
            password,
        } => commands::account::register(config, username, email, password).await,
        Commands::Whoami => commands::account::whoami(config).await,
        Commands::Account(cmd) => match cmd {
            AccountCommand::Update { username, email } => {
                commands::account::update_profile(config, username, email).await
            }
            AccountCommand::Password => commands::account::change_password(config).await,
            AccountCommand::Delete { yes } => commands::account::delete_account(config, yes).await,
        },
        Commands::Exams(cmd) => match cmd {
            ExamsCommand::List { page, search, mine } => {
                commands::exams::list(config, page, search, mine).await
            }
            ExamsCommand::Show { exam_id } => commands::exams::show(config, exam_id).await,
            ExamsCommand::Create { file } => commands::exams::create(config, file).await,
            ExamsCommand::Update { exam_id, file } => {
                commands::exams::update(config, exam_id, file).await
            }
            ExamsCommand::Delete { exam_id } => commands::exams::delete(config, exam_id).await,
        },
        Commands::Questions(cmd) => match cmd {
            QuestionsCommand::List { page, search } => {
                commands::questions::list(config, page, search).await
            }
            QuestionsCommand::Show { question_id } => {
                commands::questions::show(config, question_id).await
            }
            QuestionsCommand::Create { file } => commands::questions::create(config, file).await,
            QuestionsCommand::Update { question_id, file } => {
                commands::questions::update(config, question_id, file).await
            }
            QuestionsCommand::Delete { question_id } => {
                commands::questions::delete(config, question_id).await
            }
        },
        Commands::Validate { questions, exam } => commands::validate::execute(questions, exam),
        Commands::Take { exam_id } => commands::take::execute(config, exam_id).await,
        Commands::Result { attempt_id } => commands::attempts::result(config, attempt_id).await,
        Commands::Review { attempt_id } => commands::attempts::review(config, attempt_id).await,
        Commands::History { page } => commands::attempts::history(config, page).await,
        Commands::DeleteAttempt { attempt_id } => {
            commands::attempts::delete(config, attempt_id).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
