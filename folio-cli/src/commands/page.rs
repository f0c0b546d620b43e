//! Fetch a server-rendered page with the mirrored cookie only

use anyhow::{Context, Result};
use clap::Args;

use crate::session::{CliSession, SessionOptions};

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Server path, e.g. /reader/books
    pub path: String,

    /// Print the response body
    #[arg(long)]
    pub body: bool,
}

pub async fn run(args: PageArgs, opts: &SessionOptions) -> Result<()> {
    let mut session = CliSession::open(opts, &args.path)?;
    // Reconcile the cookie before the first navigation
    session.context().init();

    let result = session.http.navigate_page(&args.path).await;
    session.drain_events().await;
    session.close().await;

    let response = result.with_context(|| format!("Request for {} failed", args.path))?;
    let status = response.status();
    println!("{} {}", status.as_u16(), response.url());
    if args.body {
        let text = response.text().await.context("Failed to read page body")?;
        println!("{}", text);
    }
    if let Some((path, _)) = session.navigator.last() {
        println!("Session ended, sign in again at {}", path);
    }
    Ok(())
}
