//! VisaPath desktop client: authentication, session persistence, the
//! realtime event channel, and the visa eligibility assessment wizard,
//! all consuming the remote VisaPath platform API.

pub mod api;
pub mod assessment;
pub mod auth;
pub mod config;
pub mod countries;
pub mod error;
pub mod profile;
pub mod realtime;
pub mod session;
pub mod ui;

use std::io::{self, Write};

use log::{error, info};

pub use api::ApiClient;
pub use config::Settings;
pub use error::{ApiError, Result};

use assessment::flow::{Advance, AssessmentFlow, Stage};
use assessment::AssessmentResult;
use ui::{ToastLevel, UiEvent};

/// Full client lifecycle: configuration, storage, session restore,
/// realtime channel, then the interactive assessment wizard.
pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    session::persist::init(&settings.storage.dir);
    let api = ApiClient::new(&settings)?;

    // Render toasts and redirects pushed by the logic layer.
    let mut ui_rx = ui::subscribe();
    tokio::spawn(async move {
        while let Some(event) = ui_rx.recv().await {
            render(event);
        }
    });

    session::restore(&api).await;

    if !session::is_authenticated() && confirm("Log in to your VisaPath account?")? {
        let email = prompt("Email")?;
        let password = prompt("Password")?;
        if auth::login(&api, &email, &password).await.is_err() {
            println!("Continuing without an account.");
        }
    }

    if session::is_authenticated() {
        if let Some(user) = session::current() {
            info!("Signed in as {}", user.full_name());
        }
        // Channel errors are logged only; the wizard works without it.
        if let Err(e) = realtime::connect(&settings).await {
            error!("Realtime channel unavailable: {}", e);
        }
        if assessment::pending::has_pending() {
            println!("Finishing the assessment you started earlier...");
            let _ = assessment::pending::complete(&api).await;
        }
    }

    run_wizard(&api).await?;

    realtime::disconnect();
    Ok(())
}

fn render(event: UiEvent) {
    match event {
        UiEvent::Toast { level, message } => {
            let prefix = match level {
                ToastLevel::Info => "•",
                ToastLevel::Success => "✔",
                ToastLevel::Error => "✖",
            };
            println!("{} {}", prefix, message);
        }
        // The terminal wizard drives its own screens; route changes are
        // informational here.
        UiEvent::Navigate(route) => log::debug!("navigate: {:?}", route),
    }
}

async fn run_wizard(api: &ApiClient) -> anyhow::Result<()> {
    println!();
    println!("=== VisaPath Eligibility Assessment ===");
    println!("Answer a few questions to check your eligibility.");

    loop {
        let Some((from, to)) = select_countries()? else {
            return Ok(());
        };

        let mut flow = AssessmentFlow::new();
        if !flow.begin(&from, &to) {
            continue;
        }
        if flow.load_questions(api).await.is_err() {
            continue;
        }
        if flow.stage() == Stage::NoQuestions {
            println!("No questions available for this destination yet.");
            return Ok(());
        }

        let Some(session_id) = drive_questions(api, &mut flow).await? else {
            continue;
        };

        if let Ok(Some(result)) = assessment::results::fetch(api, Some(&session_id)).await {
            print_result(&result);
        }

        if !confirm("Retake the assessment?")? {
            return Ok(());
        }
    }
}

/// Walks the question list. Returns the scored session id after a
/// successful submission, or `None` when the user bails out.
async fn drive_questions(
    api: &ApiClient,
    flow: &mut AssessmentFlow,
) -> anyhow::Result<Option<String>> {
    loop {
        let Some(question) = flow.current_question() else {
            return Ok(None);
        };
        let (id, text, help_text) = (
            question.id.clone(),
            question.text.clone(),
            question.help_text.clone(),
        );

        println!();
        println!(
            "Question {} of {} ({:.0}% complete)",
            flow.cursor() + 1,
            flow.question_count(),
            flow.progress().round()
        );
        println!("{}", text);
        if let Some(help) = help_text {
            println!("  ({})", help);
        }

        let input = prompt("[y]es / [n]o / [b]ack / [q]uit")?.to_lowercase();
        match input.as_str() {
            "b" | "back" => flow.retreat(),
            "q" | "quit" => return Ok(None),
            "y" | "yes" | "n" | "no" => {
                flow.answer(&id, matches!(input.as_str(), "y" | "yes"));
                if flow.advance() == Advance::Submit {
                    match flow.submit(api).await {
                        Ok(Some(session_id)) => return Ok(Some(session_id)),
                        Ok(None) => {}
                        // Cursor stays on the last question; answering
                        // forward again retries the submission.
                        Err(_) => {}
                    }
                }
            }
            _ => println!("Please answer y, n, b, or q."),
        }
    }
}

fn select_countries() -> io::Result<Option<(String, String)>> {
    println!();
    println!("Where are you applying from?");
    for country in countries::ORIGINS {
        println!("  {} {} ({})", country.flag, country.name, country.code);
    }
    let from = loop {
        let input = prompt("Current country code (q to quit)")?;
        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match countries::origin(&input) {
            Some(country) => break country.code.to_string(),
            None => println!("Unsupported origin country: {}", input),
        }
    };

    println!();
    println!("Where do you want to go?");
    for country in countries::DESTINATIONS {
        println!("  {} {} ({})", country.flag, country.name, country.code);
    }
    let to = loop {
        let input = prompt("Destination country code (q to quit)")?;
        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match countries::destination(&input) {
            Some(country) => break country.code.to_string(),
            None => println!("Unsupported destination country: {}", input),
        }
    };

    Ok(Some((from, to)))
}

fn print_result(result: &AssessmentResult) {
    println!();
    println!("=== Your Assessment Results ===");
    println!(
        "{} -> {} | completed {}",
        result.from_country,
        result.to_country,
        result.completed_at.format("%Y-%m-%d %H:%M")
    );
    println!("Score: {:.0}/100 | Risk level: {:?}", result.score, result.risk_level);
    println!(
        "Status: {} - {}",
        result.eligibility_status.label(),
        result.eligibility_status.summary()
    );
    if !result.recommendations.is_empty() {
        println!("Recommendations:");
        for item in &result.recommendations {
            println!("  - {}", item);
        }
    }
    if !result.next_steps.is_empty() {
        println!("Next steps:");
        for item in &result.next_steps {
            println!("  - {}", item);
        }
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(label: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{} [y/N]", label))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
