//! Minimal websocket client for driving `/ws/drafts/{id}` in tests.

use std::net::TcpListener;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use banpick_backend::middleware::request_trace::RequestTrace;
use banpick_backend::middleware::trace_span::TraceSpan;
use banpick_backend::routes;
use banpick_backend::state::app_state::AppState;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketClient {
    /// Connect, retrying while the server is still binding.
    pub async fn connect_retry(url: &str, timeout: Duration) -> TestResult<Self> {
        let start = tokio::time::Instant::now();
        loop {
            match connect_async(url).await {
                Ok((stream, _)) => return Ok(Self { stream }),
                Err(err) => {
                    if start.elapsed() >= timeout {
                        return Err(Box::new(err));
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        }
    }

    pub async fn send_json(&mut self, value: &Value) -> TestResult {
        self.stream.send(Message::Text(value.to_string().into())).await?;
        Ok(())
    }

    /// Next JSON text frame, skipping pings and pongs.
    pub async fn recv_json(&mut self, timeout: Duration) -> TestResult<Value> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let next = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .map_err(|_| "timeout waiting for websocket message")?;
            match next {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(other)) => return Err(format!("unexpected frame: {other:?}").into()),
                Some(Err(e)) => return Err(Box::new(e)),
                None => return Err("websocket closed".into()),
            }
        }
    }

    /// Skip frames until one has `event == name`.
    pub async fn recv_event(&mut self, name: &str, timeout: Duration) -> TestResult<Value> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let msg = self.recv_json(remaining).await?;
            if msg["event"] == name {
                return Ok(msg);
            }
        }
    }

    pub async fn close(&mut self) -> TestResult {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Real server on an ephemeral port so tungstenite can connect.
pub async fn start_test_server(
    state: AppState,
) -> TestResult<(ServerHandle, std::net::SocketAddr)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((handle, addr))
}
