//! CreatorsHub CLI - sign in, verify and upload tracks from a terminal.
//!
//! The session is kept in the OS keychain, so a login survives between
//! invocations until `creatorshub logout`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use creatorshub_core::auth::{AuthFlow, KeyringVault, LoginOutcome, SessionManager};
use creatorshub_core::models::AudioFile;
use creatorshub_core::{ApiClient, Config};

const USAGE: &str = "\
Usage: creatorshub <command>

Commands:
  register                              Create an account (prompts for details)
  login                                 Sign in (prompts for email and password)
  verify <userId> <code>                Submit the 6-digit code from your email
  me                                    Show the signed-in user
  upload <file> <title> [description] [--cover <image.jpg>]
                                        Upload an audio track
  status                                Show whether a session is stored
  logout                                Sign out and forget stored tokens";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    match run(command, &args[1..]).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &str, args: &[String]) -> Result<()> {
    let config = Config::load()?;

    let vault = Arc::new(KeyringVault::new(config.vault_service.clone()));
    let session = Arc::new(SessionManager::new(vault));
    session.hydrate();

    let client = ApiClient::new(&config).context("Failed to create API client")?;
    debug!(
        base_url = %client.base_url(),
        vault_service = %config.vault_service,
        "Client ready"
    );
    let flow = AuthFlow::new(client, session.clone());

    match command {
        "register" => register(&flow).await,
        "login" => login(&flow).await,
        "verify" => {
            let (user_id, code) = match args {
                [user_id, code] => (user_id, code),
                _ => anyhow::bail!("Usage: creatorshub verify <userId> <code>"),
            };
            verify(&flow, user_id, code).await
        }
        "me" => {
            let user = flow.current_user().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        "upload" => upload(&flow, args).await,
        "status" => {
            match session.current_user() {
                Some(user) if session.is_authenticated() => {
                    println!("Signed in as {} (@{})", user.greeting_name(), user.username)
                }
                None if session.is_authenticated() => println!("Signed in"),
                _ => println!("Signed out"),
            }
            Ok(())
        }
        "logout" => {
            flow.logout()
                .await
                .map_err(|e| anyhow::anyhow!("Sign-out incomplete: {}", e.user_message()))?;
            println!("Signed out.");
            Ok(())
        }
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => anyhow::bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_password() -> Result<String> {
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

async fn login(flow: &AuthFlow) -> Result<()> {
    let email = prompt("Email")?;
    let password = prompt_password()?;

    match flow.login(&email, &password).await {
        Ok(LoginOutcome::SignedIn(user)) => {
            println!("Welcome back, {}!", user.username);
            Ok(())
        }
        Ok(LoginOutcome::VerificationRequired { user_id }) => {
            println!("Your email is not verified yet.");
            let code = prompt("Verification code")?;
            verify(flow, &user_id, &code).await
        }
        Err(e) => anyhow::bail!("Login failed: {}", e.user_message()),
    }
}

async fn register(flow: &AuthFlow) -> Result<()> {
    let email = prompt("Email")?;
    let password = prompt_password()?;
    let username = prompt("Username")?;
    let display_name = prompt("Display name")?;

    let pending = flow
        .register(&email, &password, &username, &display_name)
        .await
        .map_err(|e| anyhow::anyhow!("Registration failed: {}", e.user_message()))?;

    println!("{}", pending.message);
    if let Some(expires_at) = pending.expires_at {
        println!("The code expires at {}.", expires_at.format("%H:%M UTC"));
    }
    info!(user_id = %pending.user_id, "Registration pending verification");

    let code = prompt("Verification code")?;
    verify(flow, &pending.user_id, &code).await
}

async fn verify(flow: &AuthFlow, user_id: &str, code: &str) -> Result<()> {
    match flow.verify(user_id, code).await {
        Ok(user) => {
            println!("Welcome, {}!", user.greeting_name());
            Ok(())
        }
        Err(e) => anyhow::bail!(
            "Verification failed: {}\nRetry with: creatorshub verify {} <code>",
            e.user_message(),
            user_id
        ),
    }
}

async fn upload(flow: &AuthFlow, args: &[String]) -> Result<()> {
    let mut positional = Vec::new();
    let mut cover_path: Option<PathBuf> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--cover" {
            let path = iter.next().context("--cover needs an image path")?;
            cover_path = Some(PathBuf::from(path));
        } else {
            positional.push(arg.as_str());
        }
    }

    let (file, title, description) = match positional.as_slice() {
        [file, title] => (*file, *title, ""),
        [file, title, description] => (*file, *title, *description),
        _ => anyhow::bail!("Usage: creatorshub upload <file> <title> [description] [--cover <image.jpg>]"),
    };

    let cover = match cover_path {
        Some(path) => Some(
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read cover image {}", path.display()))?,
        ),
        None => None,
    };

    let track = flow
        .upload_track(&AudioFile::new(file), title, description, cover.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("Upload failed: {}", e.user_message()))?;

    println!("Uploaded: {} (ID: {})", track.title, track.track_id);
    Ok(())
}
