//! Look up a word in the reader dictionary

use anyhow::{Context, Result};
use clap::Args;
use folio_core::{DictionaryClient, PopupLayer};

use crate::session::{CliSession, SessionOptions};

#[derive(Debug, Args)]
pub struct DefineArgs {
    /// Word or phrase to define
    pub term: String,

    /// Book the term appears in
    #[arg(long)]
    pub book: Option<String>,

    /// Section within the book
    #[arg(long)]
    pub section: Option<String>,

    /// Print the popup markup instead of plain text
    #[arg(long)]
    pub html: bool,
}

pub async fn run(args: DefineArgs, opts: &SessionOptions) -> Result<()> {
    let mut session = CliSession::open(opts, "/reader/books")?;
    session.context().init();

    let dictionary = DictionaryClient::new(session.http.clone());
    let result = dictionary
        .lookup(&args.term, args.book.as_deref(), args.section.as_deref())
        .await;
    session.drain_events().await;
    session.close().await;

    let definition = result.with_context(|| format!("Lookup failed for '{}'", args.term))?;
    if args.html {
        let mut popup = PopupLayer::new();
        popup.show_definition(&definition, 0, 0);
        if let Some(markup) = popup.render() {
            println!("{}", markup);
        }
    } else {
        println!("{}: {}", definition.term, definition.definition);
        if let Some(example) = &definition.example {
            println!("  e.g. {}", example);
        }
        if let Some(source) = &definition.source {
            println!("  ({})", source);
        }
    }
    Ok(())
}
