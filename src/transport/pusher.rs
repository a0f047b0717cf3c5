use super::{EventSink, Transport, TransportEvent};
use crate::config::RealtimeConfig;
use crate::infrastructure::{ChannelAuth, ChannelAuthorizer, TaskManager, Timer};
use crate::messaging::{PusherEvent, SystemEvent};
use crate::types::constants::{CLOSE_GRACE, PRESENCE_CHANNEL_PREFIX, PRIVATE_CHANNEL_PREFIX};
use crate::types::{PusherMessage, Result};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Pusher channels protocol (v7) over a tokio-tungstenite socket.
///
/// The adapter never retries on its own: an unexpected close is reported as
/// `Failed` and the lifecycle manager decides when to call `connect` again.
pub struct PusherTransport {
    url: Url,
    authorizer: Option<ChannelAuthorizer>,
    pong_timeout: Duration,
    sink: EventSink,
    session: Arc<Mutex<Session>>,
}

/// State of the current socket. `epoch` changes on every connect and
/// disconnect so tasks of an older socket cannot touch a newer one.
#[derive(Default)]
struct Session {
    epoch: u64,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    socket_id: Option<String>,
    awaiting_pong: bool,
    pong_timer: Timer,
    tasks: TaskManager,
}

impl Session {
    fn clear_ping(&mut self) {
        self.awaiting_pong = false;
        self.pong_timer.cancel();
    }
}

impl PusherTransport {
    pub fn new(config: &RealtimeConfig, sink: EventSink) -> Result<Self> {
        let url = config.socket_url()?;
        let authorizer = match config.auth_url() {
            Ok(endpoint) => Some(ChannelAuthorizer::new(endpoint)),
            Err(e) => {
                tracing::debug!("Private channels unavailable: {}", e);
                None
            }
        };

        Ok(Self {
            url,
            authorizer,
            pong_timeout: config.pong_timeout(),
            sink,
            session: Arc::new(Mutex::new(Session::default())),
        })
    }

    fn current_epoch(&self) -> u64 {
        self.session.lock().epoch
    }
}

impl Transport for PusherTransport {
    fn connect(&self) {
        let mut session = self.session.lock();
        if session.outbound.is_some() {
            tracing::debug!("Socket already open or opening");
            return;
        }

        session.epoch += 1;
        session.clear_ping();
        session.socket_id = None;
        let (tx, rx) = mpsc::unbounded_channel();
        session.outbound = Some(tx);
        let epoch = session.epoch;

        self.sink.emit(TransportEvent::Connecting);
        session.tasks.spawn(run_socket(
            self.url.clone(),
            epoch,
            rx,
            self.sink.clone(),
            Arc::clone(&self.session),
        ));
    }

    fn disconnect(&self) {
        let (outbound, tasks) = {
            let mut session = self.session.lock();
            session.epoch += 1;
            session.socket_id = None;
            session.clear_ping();
            (session.outbound.take(), std::mem::take(&mut session.tasks))
        };

        if let Some(tx) = outbound
            && tx.send(Message::Close(None)).is_err()
        {
            tracing::debug!("Writer already gone, skipping close frame");
        }
        tokio::spawn(tasks.shutdown_after(Duration::from_millis(CLOSE_GRACE)));

        tracing::info!("Disconnected from {}", self.url.host_str().unwrap_or_default());
        self.sink.emit(TransportEvent::Disconnected);
    }

    fn subscribe(&self, channel: &str) {
        let (socket_id, epoch) = {
            let session = self.session.lock();
            (session.socket_id.clone(), session.epoch)
        };
        let Some(socket_id) = socket_id else {
            tracing::debug!("Not connected, deferring subscribe to {}", channel);
            return;
        };

        if !requires_auth(channel) {
            send_frame(&self.session, epoch, &subscribe_frame(channel, None));
            return;
        }

        let Some(authorizer) = self.authorizer.clone() else {
            self.sink.emit(TransportEvent::SubscriptionError {
                channel: channel.to_string(),
                error: "no auth endpoint configured".to_string(),
            });
            return;
        };

        let channel = channel.to_string();
        let session = Arc::clone(&self.session);
        let sink = self.sink.clone();
        self.session.lock().tasks.spawn(async move {
            match authorizer.authorize(&socket_id, &channel).await {
                Ok(auth) => {
                    send_frame(&session, epoch, &subscribe_frame(&channel, Some(&auth)));
                }
                Err(e) => {
                    tracing::error!("Failed to authorize {}: {}", channel, e);
                    sink.emit(TransportEvent::SubscriptionError {
                        channel,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    fn unsubscribe(&self, channel: &str) {
        let frame = PusherMessage::new(SystemEvent::Unsubscribe, json!({ "channel": channel }));
        send_frame(&self.session, self.current_epoch(), &frame);
    }

    fn send_keepalive(&self) {
        let epoch = {
            let mut session = self.session.lock();
            if session.outbound.is_none() {
                return;
            }
            let epoch = session.epoch;
            if session.awaiting_pong {
                drop(session);
                pong_timed_out(&self.session, epoch, &self.sink);
                return;
            }

            session.awaiting_pong = true;
            let (state, sink) = (Arc::clone(&self.session), self.sink.clone());
            session.pong_timer.arm(self.pong_timeout, async move {
                {
                    let mut guard = state.lock();
                    if guard.epoch != epoch || !guard.awaiting_pong {
                        return;
                    }
                    guard.pong_timer.disarm();
                }
                pong_timed_out(&state, epoch, &sink);
            });
            epoch
        };

        let ping = PusherMessage::new(SystemEvent::Ping, json!({}));
        send_frame(&self.session, epoch, &ping);
    }
}

fn pong_timed_out(session: &Mutex<Session>, epoch: u64, sink: &EventSink) {
    tracing::warn!("[Heartbeat] Pong timeout detected, closing connection");
    end_session(
        session,
        epoch,
        sink,
        TransportEvent::Failed {
            reason: "pong timeout".to_string(),
        },
    );
}

fn requires_auth(channel: &str) -> bool {
    channel.starts_with(PRIVATE_CHANNEL_PREFIX) || channel.starts_with(PRESENCE_CHANNEL_PREFIX)
}

fn subscribe_frame(channel: &str, auth: Option<&ChannelAuth>) -> PusherMessage {
    let mut data = json!({ "channel": channel });
    if let Some(auth) = auth {
        data["auth"] = Value::String(auth.auth.clone());
        if let Some(channel_data) = &auth.channel_data {
            data["channel_data"] = Value::String(channel_data.clone());
        }
    }
    PusherMessage::new(SystemEvent::Subscribe, data)
}

/// Queues a frame on the socket of `epoch`. Returns false if that socket is gone.
fn send_frame(session: &Mutex<Session>, epoch: u64, frame: &PusherMessage) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize {}: {}", frame.event, e);
            return false;
        }
    };

    let session = session.lock();
    if session.epoch != epoch {
        return false;
    }
    match &session.outbound {
        Some(tx) => tx.send(Message::Text(json.into())).is_ok(),
        None => false,
    }
}

/// Tears down the socket of `epoch` and reports `event`, unless a newer
/// connect or an explicit disconnect already replaced it.
fn end_session(session: &Mutex<Session>, epoch: u64, sink: &EventSink, event: TransportEvent) {
    let mut tasks = {
        let mut session = session.lock();
        if session.epoch != epoch {
            return;
        }
        session.epoch += 1;
        session.outbound = None;
        session.socket_id = None;
        session.clear_ping();
        std::mem::take(&mut session.tasks)
    };

    sink.emit(event);
    tasks.abort_all();
}

async fn run_socket(
    url: Url,
    epoch: u64,
    outbound: mpsc::UnboundedReceiver<Message>,
    sink: EventSink,
    session: Arc<Mutex<Session>>,
) {
    tracing::info!("Connecting to {}", url.host_str().unwrap_or_default());

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            tracing::error!("WebSocket connect failed: {}", e);
            end_session(
                &session,
                epoch,
                &sink,
                TransportEvent::Failed {
                    reason: e.to_string(),
                },
            );
            return;
        }
    };
    let (mut write_half, mut read_half) = ws_stream.split();

    {
        let mut guard = session.lock();
        if guard.epoch != epoch {
            tracing::debug!("Socket superseded during handshake, dropping it");
            return;
        }
        guard.tasks.spawn(async move {
            let mut outbound = outbound;
            while let Some(message) = outbound.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = write_half.send(message).await {
                    tracing::error!("WebSocket write error: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
            if let Err(e) = write_half.close().await {
                tracing::debug!("Writer close: {}", e);
            }
        });
    }

    let reason = loop {
        match read_half.next().await {
            Some(Ok(Message::Text(text))) => {
                tracing::debug!("Received text message: {}", text);
                match serde_json::from_str::<PusherMessage>(&text) {
                    Ok(message) => handle_frame(message, epoch, &sink, &session),
                    Err(e) => tracing::error!("Failed to parse frame: {} - Raw: {}", e, text),
                }
            }
            Some(Ok(Message::Close(frame))) => {
                break match frame {
                    Some(close_frame) => format!(
                        "server closed connection: code={:?}, reason='{}'",
                        close_frame.code, close_frame.reason
                    ),
                    None => "server closed connection without close frame".to_string(),
                };
            }
            Some(Ok(Message::Ping(data))) => {
                tracing::debug!("Received ping ({} bytes)", data.len());
            }
            Some(Ok(Message::Pong(data))) => {
                tracing::debug!("Received pong ({} bytes)", data.len());
            }
            Some(Ok(Message::Binary(data))) => {
                tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
            }
            Some(Ok(Message::Frame(_))) => {
                tracing::debug!("Received raw frame (internal)");
            }
            Some(Err(e)) => break format!("WebSocket read error: {}", e),
            None => break "socket stream ended".to_string(),
        }
    };

    tracing::warn!("{}", reason);
    end_session(&session, epoch, &sink, TransportEvent::Failed { reason });
}

fn handle_frame(message: PusherMessage, epoch: u64, sink: &EventSink, session: &Mutex<Session>) {
    let data = message.decoded_data();

    match message.event {
        PusherEvent::System(SystemEvent::ConnectionEstablished) => {
            let Some(socket_id) = data.get("socket_id").and_then(Value::as_str) else {
                tracing::warn!("connection_established without socket_id: {}", data);
                return;
            };
            {
                let mut guard = session.lock();
                if guard.epoch != epoch {
                    return;
                }
                guard.socket_id = Some(socket_id.to_string());
            }
            if let Some(timeout) = data.get("activity_timeout") {
                tracing::debug!("Server activity timeout: {}s", timeout);
            }
            sink.emit(TransportEvent::Connected {
                socket_id: socket_id.to_string(),
            });
        }
        PusherEvent::System(SystemEvent::Ping) => {
            let pong = PusherMessage::new(SystemEvent::Pong, json!({}));
            send_frame(session, epoch, &pong);
        }
        PusherEvent::System(SystemEvent::Pong) => {
            let mut guard = session.lock();
            if guard.epoch == epoch {
                guard.clear_ping();
                tracing::debug!("Received heartbeat pong");
            }
        }
        PusherEvent::System(SystemEvent::SubscriptionSucceeded) => {
            if let Some(channel) = message.channel {
                sink.emit(TransportEvent::SubscriptionSucceeded { channel });
            }
        }
        PusherEvent::System(SystemEvent::SubscriptionError) => {
            if let Some(channel) = message.channel {
                sink.emit(TransportEvent::SubscriptionError {
                    channel,
                    error: data.to_string(),
                });
            }
        }
        PusherEvent::System(SystemEvent::Error) => {
            let text = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            let message = match data.get("code").and_then(Value::as_u64) {
                Some(code) => format!("{} (code {})", text, code),
                None => text.to_string(),
            };
            sink.emit(TransportEvent::Error { message });
        }
        PusherEvent::System(other) => {
            tracing::debug!("Ignoring client-only event {}", other.as_str());
        }
        PusherEvent::Custom(event) => match message.channel {
            Some(channel) => sink.emit(TransportEvent::Message {
                channel,
                event,
                data,
            }),
            None => tracing::debug!("Ignoring event {} without channel", event),
        },
    }
}
