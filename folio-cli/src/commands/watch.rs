//! Keep the realtime channel open and print what the dashboard would refresh

use anyhow::Result;
use clap::Args;
use folio_core::{PageEvent, RealtimeEvent};
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::session::{CliSession, SessionOptions};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Page path the session runs on
    #[arg(long, default_value = "/reader/books")]
    pub path: String,

    /// Treat the page as the alternate dashboard
    #[arg(long)]
    pub dashboard: bool,

    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WatchArgs, opts: &SessionOptions) -> Result<()> {
    let session = CliSession::open(opts, &args.path)?;
    let ctx = session.context().clone();
    ctx.page().set_dashboard_flag(args.dashboard);

    ctx.dispatcher().on_help_requests(|| info!("Help requests changed"));
    ctx.dispatcher().on_online_count(|| info!("Online count changed"));

    let mut events = ctx.dispatcher().subscribe();
    let json = args.json;
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{}", describe(&event, json)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut state = ctx.channel().watch_state();
    let states = tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current = *state.borrow_and_update();
            info!(state = current.as_str(), "Realtime channel");
        }
    });

    let sender = session.sender();
    sender.send(PageEvent::Ready)?;
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = sender.send(PageEvent::Unload);
        }
    });

    session.run().await;

    interrupt.abort();
    printer.abort();
    states.abort();
    Ok(())
}

fn describe(event: &RealtimeEvent, json: bool) -> String {
    let data = match event {
        RealtimeEvent::HelpRequest(data)
        | RealtimeEvent::HelpRequestUpdate(data)
        | RealtimeEvent::Activity(data)
        | RealtimeEvent::OnlineUsers(data)
        | RealtimeEvent::Connected(data)
        | RealtimeEvent::Other { data, .. } => data.clone(),
        RealtimeEvent::Login(presence) | RealtimeEvent::Logout(presence) => {
            serde_json::to_value(presence).unwrap_or(Value::Null)
        }
        RealtimeEvent::Heartbeat => Value::Null,
    };

    if json {
        serde_json::json!({ "type": event.type_name(), "data": data }).to_string()
    } else if data.is_null() {
        event.type_name().to_string()
    } else {
        format!("{:<20} {}", event.type_name(), data)
    }
}
