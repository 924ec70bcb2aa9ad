use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "interview-room", version, about = "Question bank browser and mock interview client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to <config dir>/interview-room/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest question banks and questions
    Home,

    /// List question banks
    Banks {
        #[arg(long, default_value_t = 200)]
        page_size: u32,
    },

    /// Show one question bank and its questions
    Bank {
        id: String,
    },

    /// List questions
    Questions {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Only questions from this bank
        #[arg(short, long)]
        bank: Option<String>,

        #[arg(long)]
        page: Option<u32>,
    },

    /// Show one question with its answer
    Question {
        id: String,
    },

    /// Mock interviews
    Interview {
        #[command(subcommand)]
        action: InterviewAction,
    },
}

#[derive(Subcommand)]
pub enum InterviewAction {
    /// Create a new mock interview
    New {
        #[arg(long)]
        position: String,

        #[arg(long)]
        experience: String,

        #[arg(long)]
        difficulty: String,
    },

    /// Print the transcript of an interview
    Show {
        id: String,
    },

    /// Enter the interview room
    Chat {
        id: String,
    },

    /// List your interviews
    History {
        /// 0 = not started, 1 = in progress, 2 = ended
        #[arg(long)]
        status: Option<u8>,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        page: Option<u32>,
    },
}
