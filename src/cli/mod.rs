pub mod commands;

use crate::api::{ApiClient, PageRequest, RecordId, SortOrder};
use crate::catalog::{HomeFeed, Question, QuestionBank, QuestionBankQuery, QuestionQuery};
use crate::config::ClientConfig;
use crate::interview::{
    parse_history, CreateInterviewRequest, DispatchOutcome, InterviewBackend, InterviewEvent,
    InterviewMessage, InterviewQuery, InterviewSessionViewModel, InterviewStatus, Role, SessionView,
};
use crate::notify::ConsoleNotifier;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use commands::{Cli, Commands, InterviewAction};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run_cli(cli: Cli) -> Result<ExitCode> {
    let mut config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
        config.validate()?;
    }

    let client = ApiClient::from_config(&config.api)?;

    match cli.command {
        Commands::Home => {
            let feed = HomeFeed::load(&client, config.page_size).await;
            println!("最新题库");
            print_banks(&feed.banks);
            println!();
            println!("最新题目");
            print_questions(&feed.questions);
        }
        Commands::Banks { page_size } => {
            let query = QuestionBankQuery {
                page: PageRequest::new(page_size).sorted_by("createTime", SortOrder::Descend),
                ..QuestionBankQuery::default()
            };
            let page = client.list_question_banks(&query).await?;
            println!("题库大全 (共 {} 个)", page.total);
            print_banks(&page.records);
        }
        Commands::Bank { id } => {
            let id = parse_id(&id)?;
            let detail = client.get_question_bank(&id, true, 200).await?;
            println!("{}", detail.bank.title.as_deref().unwrap_or("(untitled)"));
            if let Some(description) = &detail.bank.description {
                println!("{}", description);
            }
            println!();
            print_questions(detail.questions());
        }
        Commands::Questions { search, bank, page } => {
            let mut request = PageRequest::new(config.page_size);
            if let Some(page) = page {
                request = request.page(page);
            }
            let query = QuestionQuery {
                page: request,
                search_text: search,
                question_bank_id: bank.as_deref().map(parse_id).transpose()?,
                ..QuestionQuery::default()
            };
            let page = client.list_questions(&query).await?;
            println!("题目 (共 {} 道)", page.total);
            print_questions(&page.records);
        }
        Commands::Question { id } => {
            let question = client.get_question(&parse_id(&id)?).await?;
            print_question(&question);
        }
        Commands::Interview { action } => return run_interview(action, &client, &config).await,
    }

    Ok(ExitCode::SUCCESS)
}

/// How the chat room was left.
#[derive(Debug, PartialEq, Eq)]
enum RoomExit {
    Closed,
    /// The session could not be loaded; the notifier has already reported why.
    LoadFailed,
}

async fn run_interview(action: InterviewAction, client: &ApiClient, config: &ClientConfig) -> Result<ExitCode> {
    match action {
        InterviewAction::New {
            position,
            experience,
            difficulty,
        } => {
            let request = CreateInterviewRequest {
                job_position: position,
                work_experience: experience,
                difficulty,
            };
            let id = client.create_interview(&request).await?;
            println!("Created interview {}", id);
            println!("Enter the room with: interview-room interview chat {}", id);
        }
        InterviewAction::Show { id } => {
            let session = client.get_session(&parse_id(&id)?).await?;
            let messages = parse_history(session.messages.as_deref())?;
            println!("模拟面试 #{} [{}]", session.id, session.status);
            for message in &messages {
                println!("{}", render_message(message));
            }
        }
        InterviewAction::Chat { id } => {
            if chat(client, config, parse_id(&id)?).await? == RoomExit::LoadFailed {
                return Ok(ExitCode::FAILURE);
            }
        }
        InterviewAction::History {
            status,
            position,
            page,
        } => {
            let status = status
                .map(InterviewStatus::try_from)
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let mut request = PageRequest::new(config.page_size);
            if let Some(page) = page {
                request = request.page(page);
            }
            let query = InterviewQuery {
                page: request,
                status,
                job_position: position,
                ..InterviewQuery::default()
            };
            let page = client.list_my_interviews(&config.current_user(), query).await?;
            println!("面试记录 (共 {} 条)", page.total);
            for session in &page.records {
                println!(
                    "{:<20} | {:<6} | {:<16} | {:<8} | {:<6} | {}",
                    session.id,
                    session.status.label(),
                    session.job_position.as_deref().unwrap_or("-"),
                    session.work_experience.as_deref().unwrap_or("-"),
                    session.difficulty.as_deref().unwrap_or("-"),
                    session.create_time.as_deref().unwrap_or("-"),
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn chat(client: &ApiClient, config: &ClientConfig, id: RecordId) -> Result<RoomExit> {
    let vm = InterviewSessionViewModel::new(
        Arc::new(client.clone()),
        Arc::new(ConsoleNotifier),
        config.current_user(),
    );
    if vm.load(&id).await.is_err() {
        return Ok(RoomExit::LoadFailed);
    }

    let view = vm.snapshot().await;
    print_header(&view);
    for message in &view.messages {
        println!("{}", render_message(message));
    }
    println!("Commands: /start, /end, /quit. Any other line is sent as your answer.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = view.messages.len();

    loop {
        let view = vm.snapshot().await;
        if view.is_ended {
            println!("面试已结束");
            break;
        }
        print!("{} ", prompt(&view));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = line.trim().to_string();
        let outcome = match command.as_str() {
            "/quit" => break,
            "/start" => vm.dispatch_event(InterviewEvent::Start, None).await,
            "/end" => vm.dispatch_event(InterviewEvent::End, None).await,
            _ => {
                vm.set_input(line).await;
                vm.send_message().await
            }
        };

        match outcome {
            DispatchOutcome::Applied { .. } => {
                let view = vm.snapshot().await;
                for message in &view.messages[shown..] {
                    println!("{}", render_message(message));
                }
                shown = view.messages.len();
            }
            DispatchOutcome::Refused(InterviewEvent::Start) => println!("The interview has already started."),
            DispatchOutcome::Refused(_) => println!("Start the interview first with /start."),
            DispatchOutcome::Busy => println!("Still waiting for the interviewer..."),
            DispatchOutcome::EmptyInput | DispatchOutcome::Failed(_) => {}
        }
    }

    Ok(RoomExit::Closed)
}

fn parse_id(raw: &str) -> Result<RecordId> {
    raw.parse().map_err(|e: String| anyhow!(e))
}

fn print_header(view: &SessionView) {
    if let Some(session) = &view.session {
        println!("模拟面试 #{} [{}]", session.id, view.status());
        if let Some(position) = &session.job_position {
            println!(
                "{} · {} · {}",
                position,
                session.work_experience.as_deref().unwrap_or("-"),
                session.difficulty.as_deref().unwrap_or("-"),
            );
        }
    }
}

fn prompt(view: &SessionView) -> &'static str {
    if view.can_chat() {
        "你>"
    } else {
        "(/start)>"
    }
}

fn render_message(message: &InterviewMessage) -> String {
    let time = DateTime::from_timestamp_millis(message.timestamp)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();
    let speaker = match message.role {
        Role::User => "我",
        Role::Assistant => "面试官",
    };
    format!("[{}] {}: {}", time, speaker, message.content)
}

fn print_banks(banks: &[QuestionBank]) {
    if banks.is_empty() {
        println!("  (none)");
    }
    for bank in banks {
        println!(
            "  {:<20} {}",
            bank.id,
            bank.title.as_deref().unwrap_or("(untitled)")
        );
    }
}

fn print_questions(questions: &[Question]) {
    if questions.is_empty() {
        println!("  (none)");
    }
    for question in questions {
        let tags = if question.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", question.tags.join(", "))
        };
        println!(
            "  {:<20} {}{}",
            question.id,
            question.title.as_deref().unwrap_or("(untitled)"),
            tags
        );
    }
}

fn print_question(question: &Question) {
    println!("{}", question.title.as_deref().unwrap_or("(untitled)"));
    if !question.tags.is_empty() {
        println!("标签: {}", question.tags.join(", "));
    }
    if let Some(content) = &question.content {
        println!();
        println!("{}", content);
    }
    if let Some(answer) = &question.answer {
        println!();
        println!("推荐答案");
        println!("{}", answer);
    }
}
