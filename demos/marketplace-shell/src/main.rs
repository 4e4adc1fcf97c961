//! Drives the Tradepost client core from a terminal.
//!
//! ```text
//! marketplace-shell [--token-file PATH] [--login EMAIL PASSWORD] [--logout] [PATH...]
//! ```
//!
//! Restores any saved session, optionally logs in or out, then opens each
//! PATH through the gated router and prints what would be shown.
//! `TRADEPOST_API` sets the backend URL, `RUST_LOG` the log filter.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use tradepost::prelude::*;

const DEFAULT_API: &str = "http://127.0.0.1:8000";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    token_file: Option<PathBuf>,
    login: Option<(String, String)>,
    logout: bool,
    paths: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--token-file" => {
                let path = args.next().ok_or("--token-file needs a path")?;
                parsed.token_file = Some(PathBuf::from(path));
            }
            "--login" => {
                let email = args.next().ok_or("--login needs an email")?;
                let password = args.next().ok_or("--login needs a password")?;
                parsed.login = Some((email, password));
            }
            "--logout" => parsed.logout = true,
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag {flag}"));
            }
            _ => parsed.paths.push(arg),
        }
    }
    if parsed.paths.is_empty() {
        parsed.paths.push("/dashboard".to_string());
    }
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn describe(screen: &Screen, session: &SessionSnapshot) -> String {
    match screen {
        Screen::Public(route) => format!("{route}: public"),
        Screen::Protected(mount) => match mount.state() {
            GateState::Checking => format!("{}: checking session", mount.route()),
            GateState::Authenticated => {
                let name = session
                    .user
                    .as_ref()
                    .map_or("?", |u| u.display_name());
                format!("{}: rendered for {name}", mount.route())
            }
            GateState::Redirecting { to, from } => {
                format!("{from}: redirect to {to}")
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

async fn run(args: Args) -> Result<(), ClientError> {
    let base_url =
        std::env::var("TRADEPOST_API").unwrap_or_else(|_| DEFAULT_API.to_string());

    let mut builder = MarketplaceClient::builder().base_url(base_url);
    if let Some(path) = args.token_file {
        builder = builder.token_file(path);
    }
    let client = builder.build()?;
    client.start().await;

    if let Some((email, password)) = &args.login {
        match client.session().login(email, password).await {
            Ok(user) => println!("logged in as {}", user.display_name()),
            Err(e) => {
                println!("login failed: {e}");
                if e.kind() == Some(AuthErrorKind::InvalidCredentials) {
                    println!("check the email and password");
                }
            }
        }
    }
    if args.logout {
        client.session().logout();
        println!("logged out");
    }

    let router = client.router();
    for path in &args.paths {
        let mut screen = router.open(path)?;
        if let Screen::Protected(mount) = &mut screen {
            mount.settle().await;
        }
        println!("{}", describe(&screen, &client.session().snapshot()));
    }

    client.shutdown();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "shell failed");
            ExitCode::FAILURE
        }
    }
}
