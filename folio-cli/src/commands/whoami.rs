use anyhow::Result;
use clap::Args;

use crate::session::{CliSession, SessionOptions};

#[derive(Debug, Args)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, opts: &SessionOptions) -> Result<()> {
    let mut session = CliSession::open(opts, "/reader/books")?;
    if !session.context().store().is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }

    session.context().init();
    let name = session.controller.load_user_info().await;
    session.drain_events().await;

    match name {
        Some(name) => println!("{}", name),
        None if session.navigator.last().is_some() => println!("Session expired, log in again"),
        None => println!("Could not load user info"),
    }
    session.close().await;
    Ok(())
}
