use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use lsc_trainer::commands::{explain, llm, quiz, study, topics};
use lsc_trainer::llm::DEFAULT_MODEL;
use lsc_trainer::logging::{self, LogTarget};
use lsc_trainer::topic::{Topic, find_topic, topic_ids};
use lsc_trainer::tutor::Tutor;

#[derive(Parser, Debug)]
#[command(
    name = "lsc-trainer",
    version,
    about = "Life Safety Code training for nursing home staff.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    /// Model used for explanations and quizzes
    #[arg(
        long,
        global = true,
        value_name = "MODEL",
        env = "LSC_TRAINER_MODEL",
        default_value = DEFAULT_MODEL
    )]
    model: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the training topics
    Topics,
    /// Print an AI explanation of a topic
    Explain {
        /// Topic id, as shown by `topics`
        #[arg(value_name = "TOPIC")]
        topic: String,
    },
    /// Take a generated quiz on a topic
    Quiz {
        #[arg(value_name = "TOPIC")]
        topic: String,
        /// Print the questions and answers instead of opening the quiz screen
        #[arg(long, default_value_t = false)]
        plain: bool,
        /// Randomize question order
        #[arg(long, default_value_t = false)]
        shuffle: bool,
    },
    /// Browse topics, read explanations, and take quizzes
    Study {
        /// Open directly on this topic
        #[arg(long, value_name = "TOPIC")]
        topic: Option<String>,
        /// Randomize question order in quizzes
        #[arg(long, default_value_t = false)]
        shuffle: bool,
    },
    /// Manage LLM helper settings
    Llm {
        /// Store an API key in the local auth file; prompts when no value is given
        #[arg(long, value_name = "KEY", num_args = 0..=1, conflicts_with = "clear")]
        set: Option<Option<String>>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key by calling the OpenAI API
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let log_target = match &cli.command {
        Command::Study { .. } | Command::Quiz { plain: false, .. } => LogTarget::data_file()?,
        _ => LogTarget::Stderr,
    };
    logging::init_tracing(log_target)?;

    match cli.command {
        Command::Topics => topics::run(),
        Command::Explain { topic } => {
            let topic = resolve_topic(&topic)?;
            explain::run(&Tutor::from_configured_key(&cli.model), topic).await?;
        }
        Command::Quiz {
            topic,
            plain,
            shuffle,
        } => {
            let topic = resolve_topic(&topic)?;
            quiz::run(Tutor::from_configured_key(&cli.model), topic, plain, shuffle).await?;
        }
        Command::Study { topic, shuffle } => {
            let topic = topic.as_deref().map(resolve_topic).transpose()?;
            study::run(Tutor::from_configured_key(&cli.model), topic, None, shuffle).await?;
        }
        Command::Llm { set, clear, test } => llm::run(set, clear, test).await?,
    }

    Ok(())
}

fn resolve_topic(id: &str) -> Result<&'static Topic> {
    match find_topic(id) {
        Some(topic) => Ok(topic),
        None => bail!(
            "Unknown topic '{}'. Available topics: {}",
            id.trim(),
            topic_ids().join(", ")
        ),
    }
}
