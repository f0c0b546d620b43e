//! Sign in and keep the token in the session file

use anyhow::{Context, Result, bail};
use clap::Args;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};

use crate::session::{CliSession, SessionOptions};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted if omitted)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (prompted if omitted)
    #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub async fn run(args: LoginArgs, opts: &SessionOptions) -> Result<()> {
    if opts.token.is_some() {
        bail!("--token is set; the login would only last for this process");
    }

    let email = match args.email {
        Some(email) => email,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Email")
            .interact_text()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?,
    };

    let session = CliSession::open(opts, "/reader/books")?;
    let result = session.controller.login(email.trim(), &password).await;
    session.close().await;
    let response = result.context("Login failed")?;

    match session.view.shown() {
        Some(name) => println!("Logged in as {}", name),
        None => println!("Logged in as {}", response.user.display_name()),
    }
    Ok(())
}
