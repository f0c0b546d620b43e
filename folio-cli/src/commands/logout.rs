use anyhow::Result;
use clap::Args;
use folio_core::session::LogoutOutcome;

use crate::session::{CliSession, SessionOptions};

#[derive(Debug, Args)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, opts: &SessionOptions) -> Result<()> {
    let session = CliSession::open(opts, "/reader/books")?;
    if !session.context().store().is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }

    match session.controller.logout().await {
        LogoutOutcome::Completed {
            server_acknowledged: true,
        } => println!("Logged out"),
        LogoutOutcome::Completed {
            server_acknowledged: false,
        } => println!("Logged out locally (server did not acknowledge)"),
        LogoutOutcome::Deferred => println!("Logout handed to the dashboard"),
    }
    session.close().await;
    Ok(())
}
