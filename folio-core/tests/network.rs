//! folio-core against a real HTTP server on loopback
//!
//! Covers the paths mocks cannot: reqwest responses through the SSE decoder
//! into the channel, and statuses from real requests into the controller.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Reply, spawn_server};
use folio_core::realtime::MockTransport;
use folio_core::{
    ApiError, AuthorizedClient, ChannelState, ConnectOutcome, CookieJar, DictionaryClient,
    EventTransport, HttpCookieJar, MemoryCookieJar, MemoryTokenStorage, MockReaderApi,
    NavigationMode, PageContext, PageEvent, RecordingNavigator, RecordingView, SessionConfig,
    SessionContext, SessionController, SessionToken, SseTransport, TransportError,
};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn context(
    config: &SessionConfig,
    jar: Arc<dyn CookieJar>,
    transport: Arc<dyn EventTransport>,
) -> Arc<SessionContext> {
    Arc::new(SessionContext::new(
        config.clone(),
        Arc::new(MemoryTokenStorage::with_item("auth_token", "tok123")),
        jar,
        transport,
        Arc::new(PageContext::from_config("/reader/books", config)),
    ))
}

#[tokio::test]
async fn sse_chunks_reach_channel_listeners() {
    let server = spawn_server(|request| {
        if request.path() == "/api/realtime/events" {
            Reply::Stream(vec![
                b": connected\r\n\r\n".as_slice(),
                b"event: activity\r\ndata: {\"type\":\"act".as_slice(),
                b"ivity\",\"data\":{\"action\":\"opened\"}}\r".as_slice(),
                b"\n\r\n".as_slice(),
                b"data: {\"type\":\"login\",\"data\":{\"user_id\":\"u1\"}}\n\n".as_slice(),
            ])
        } else {
            Reply::Status(404, "{}")
        }
    })
    .await;
    let config = SessionConfig::new(server.base_url());
    let transport = Arc::new(SseTransport::from_config(reqwest::Client::new(), &config).unwrap());
    let ctx = context(&config, Arc::new(MemoryCookieJar::new()), transport);

    let (activity_tx, mut activity) = mpsc::unbounded_channel::<Value>();
    ctx.dispatcher().on_activity(move |data| {
        let _ = activity_tx.send(data.clone());
    });
    let (count_tx, mut online_count) = mpsc::unbounded_channel::<()>();
    ctx.dispatcher().on_online_count(move || {
        let _ = count_tx.send(());
    });

    assert!(matches!(
        ctx.channel().connect().await,
        ConnectOutcome::Started { .. }
    ));

    let data = timeout(WAIT, activity.recv()).await.unwrap().unwrap();
    assert_eq!(data, json!({"action": "opened"}));
    timeout(WAIT, online_count.recv()).await.unwrap().unwrap();
    assert_eq!(ctx.channel().state(), ChannelState::Connected);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, "/api/realtime/events?token=tok123");
    assert_eq!(requests[0].header("accept"), Some("text/event-stream"));

    ctx.teardown().await;
    assert_eq!(ctx.channel().state(), ChannelState::Disconnected);
}

#[tokio::test]
async fn sse_error_status_fails_open() {
    let server = spawn_server(|_| Reply::Status(503, "{}")).await;
    let config = SessionConfig::new(server.base_url());
    let transport = SseTransport::from_config(reqwest::Client::new(), &config).unwrap();

    match transport.open(&SessionToken::from("tok123")).await {
        Err(error) => assert_eq!(error, TransportError::Status { status: 503 }),
        Ok(_) => panic!("stream opened on a 503"),
    }
}

#[tokio::test]
async fn unauthorized_get_forces_logout_through_run() {
    let server = spawn_server(|_| Reply::Status(401, r#"{"error":"invalid token"}"#)).await;
    let config = SessionConfig::new(server.base_url());
    let ctx = context(
        &config,
        Arc::new(MemoryCookieJar::new()),
        Arc::new(MockTransport::default()),
    );
    let (tx, rx) = mpsc::unbounded_channel();
    let http = AuthorizedClient::new(
        reqwest::Client::new(),
        config,
        ctx.store().clone(),
        tx.clone(),
    )
    .unwrap();
    let navigator = Arc::new(RecordingNavigator::new());
    let controller = SessionController::new(
        ctx.clone(),
        Arc::new(MockReaderApi::new()),
        Arc::new(RecordingView::new()),
        navigator.clone(),
    );

    let response = http.get("/api/books").await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(
        server.requests()[0].header("authorization"),
        Some("Bearer tok123")
    );

    tx.send(PageEvent::Unload).unwrap();
    controller.run(rx).await;

    assert!(ctx.store().get().is_none());
    assert_eq!(
        navigator.last(),
        Some(("/reader/login".to_string(), NavigationMode::Assign))
    );
}

#[tokio::test]
async fn unauthorized_definition_lookup_is_reported() {
    let server = spawn_server(|_| Reply::Status(401, "{}")).await;
    let config = SessionConfig::new(server.base_url());
    let ctx = context(
        &config,
        Arc::new(MemoryCookieJar::new()),
        Arc::new(MockTransport::default()),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let http =
        AuthorizedClient::new(reqwest::Client::new(), config, ctx.store().clone(), tx).unwrap();
    let dictionary = DictionaryClient::new(Arc::new(http));

    let result = dictionary.lookup("rabbit", None, None).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert!(matches!(
        rx.try_recv(),
        Ok(PageEvent::Response { status: 401, .. })
    ));
    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["term"], "rabbit");
    assert_eq!(body["book_id"], "alice-in-wonderland");
}

#[tokio::test]
async fn unauthorized_after_many_successes_is_kept() {
    let server = spawn_server(|request| {
        if request.path() == "/api/secret" {
            Reply::Status(401, "{}")
        } else {
            Reply::Status(200, "[]")
        }
    })
    .await;
    let config = SessionConfig::new(server.base_url());
    let ctx = context(
        &config,
        Arc::new(MemoryCookieJar::new()),
        Arc::new(MockTransport::default()),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let http =
        AuthorizedClient::new(reqwest::Client::new(), config, ctx.store().clone(), tx).unwrap();

    // Nobody drains the queue while these run
    for _ in 0..40 {
        let response = http.get("/api/books").await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
    http.get("/api/secret").await.unwrap();

    let mut reported = Vec::new();
    while let Ok(event) = rx.try_recv() {
        reported.push(event);
    }
    assert_eq!(reported.len(), 1);
    assert!(matches!(
        &reported[0],
        PageEvent::Response { status: 401, url } if url.ends_with("/api/secret")
    ));
}

#[tokio::test]
async fn page_navigation_carries_cookie_not_bearer() {
    let server = spawn_server(|_| Reply::Status(200, "{}")).await;
    let config = SessionConfig::new(server.base_url());
    let jar = Arc::new(HttpCookieJar::new(config.base().unwrap()));
    let client = reqwest::Client::builder()
        .cookie_provider(jar.store())
        .build()
        .unwrap();
    let ctx = context(&config, jar, Arc::new(MockTransport::default()));
    ctx.store().set(&SessionToken::from("tok123"));
    let (tx, _rx) = mpsc::unbounded_channel();
    let http = AuthorizedClient::new(client, config, ctx.store().clone(), tx).unwrap();

    http.navigate_page("/reader/books").await.unwrap();

    let request = &server.requests()[0];
    assert_eq!(request.header("authorization"), None);
    assert!(
        request
            .header("cookie")
            .is_some_and(|cookie| cookie.contains("auth_token=tok123"))
    );
}
