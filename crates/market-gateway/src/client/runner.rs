//! Connection task
//!
//! One socket at a time: connect, wait for Hello, Identify, heartbeat until
//! the socket drops, then back off and start over.

use futures_util::{Sink, SinkExt, StreamExt};
use market_common::{RealtimeConfig, TokenStore};
use market_core::Id;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use super::handle::GatewayCommand;
use crate::connection::{Backoff, ConnectionInfo, ConnectionState};
use crate::error::{GatewayError, GatewayResult};
use crate::events::RealtimeEvent;
use crate::protocol::{GatewayMessage, OpCode};

/// Events held back while the consumer is behind; the oldest go first
const MAX_BACKLOG: usize = 1024;

/// What to do after a frame was handled
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct GatewayRunner {
    config: RealtimeConfig,
    tokens: TokenStore,
    info: Arc<ConnectionInfo>,
    commands: mpsc::UnboundedReceiver<GatewayCommand>,
    events: mpsc::Sender<RealtimeEvent>,
    backoff: Backoff,
    /// Conversation subscribed on the current socket
    subscribed: Option<Id>,
    /// Decoded events the event channel had no room for
    backlog: VecDeque<RealtimeEvent>,
}

impl GatewayRunner {
    pub(crate) fn new(
        config: RealtimeConfig,
        tokens: TokenStore,
        info: Arc<ConnectionInfo>,
        commands: mpsc::UnboundedReceiver<GatewayCommand>,
        events: mpsc::Sender<RealtimeEvent>,
    ) -> Self {
        let backoff = Backoff::new(
            Duration::from_millis(config.reconnect_base_ms),
            Duration::from_millis(config.reconnect_max_ms),
        );
        Self {
            config,
            tokens,
            info,
            commands,
            events,
            backoff,
            subscribed: None,
            backlog: VecDeque::new(),
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            self.info.begin_attempt();
            let result = self.run_session().await;
            self.info.mark_disconnected();

            if result.is_err() && self.flush().await == Flow::Stop {
                tracing::info!("Gateway client stopped");
                return;
            }

            match result {
                Ok(()) => {
                    tracing::info!("Gateway client stopped");
                    return;
                }
                Err(e) if !e.is_retryable() => {
                    tracing::warn!(error = %e, "Gateway connection refused, not reconnecting");
                    self.emit(RealtimeEvent::Terminated {
                        reason: e.to_string(),
                    })
                    .await;
                    return;
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        attempt = self.backoff.attempt(),
                        retry_in_ms = delay.as_millis() as u64,
                        "Gateway connection lost"
                    );
                    if self.emit(RealtimeEvent::Disconnected { retry_in: delay }).await == Flow::Stop
                        || self.wait(delay).await == Flow::Stop
                    {
                        tracing::info!("Gateway client stopped");
                        return;
                    }
                }
            }
        }
    }

    /// Sleep between attempts while still honoring shutdown
    async fn wait(&mut self, delay: Duration) -> Flow {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return Flow::Continue,
                command = self.commands.recv() => match command {
                    None | Some(GatewayCommand::Shutdown) => return Flow::Stop,
                    // replayed from the connection state after the next READY
                    Some(_) => {}
                },
            }
        }
    }

    async fn emit(&self, event: RealtimeEvent) -> Flow {
        if self.events.send(event).await.is_err() {
            tracing::debug!("Event receiver dropped");
            return Flow::Stop;
        }
        Flow::Continue
    }

    /// Hand an event over without waiting on the consumer
    ///
    /// Used while a socket is live so heartbeats keep flowing. Events that do
    /// not fit go to the backlog, which is drained from the socket loop.
    fn enqueue(&mut self, event: RealtimeEvent) -> Flow {
        if !self.backlog.is_empty() {
            self.push_backlog(event);
            return Flow::Continue;
        }
        match self.events.try_send(event) {
            Ok(()) => Flow::Continue,
            Err(TrySendError::Full(event)) => {
                tracing::debug!("Event consumer lagging, buffering");
                self.push_backlog(event);
                Flow::Continue
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Event receiver dropped");
                Flow::Stop
            }
        }
    }

    fn push_backlog(&mut self, event: RealtimeEvent) {
        if self.backlog.len() >= MAX_BACKLOG {
            self.backlog.pop_front();
            tracing::warn!(capacity = MAX_BACKLOG, "Event consumer lagging, dropped oldest event");
        }
        self.backlog.push_back(event);
    }

    /// Deliver whatever the last socket left in the backlog
    async fn flush(&mut self) -> Flow {
        while let Some(event) = self.backlog.pop_front() {
            if self.emit(event).await == Flow::Stop {
                self.backlog.clear();
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Drive one socket until it closes. `Ok` means the client was asked to stop.
    async fn run_session(&mut self) -> GatewayResult<()> {
        self.subscribed = None;
        let token = self.tokens.get().ok_or(GatewayError::MissingToken)?;

        tracing::debug!(url = %self.config.url, "Connecting to gateway");
        let (socket, _) = connect_async(self.config.url.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        // Hello comes first
        let hello = loop {
            match stream.next().await {
                None => return Err(GatewayError::Closed(None)),
                Some(frame) => match frame? {
                    Message::Text(text) => {
                        let message = GatewayMessage::from_json(&text)?;
                        break message.as_hello().ok_or(GatewayError::UnexpectedOp {
                            expected: OpCode::Hello,
                            received: message.op,
                        })?;
                    }
                    Message::Close(frame) => {
                        return Err(GatewayError::Closed(frame.map(|f| u16::from(f.code))));
                    }
                    _ => {}
                },
            }
        };

        send(&mut sink, &GatewayMessage::identify(token)).await?;
        self.info.set_state(ConnectionState::Identifying);

        let period = hello.interval();
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !self.info.record_heartbeat() {
                        return Err(GatewayError::HeartbeatTimeout);
                    }
                    send(&mut sink, &GatewayMessage::heartbeat(self.info.last_sequence())).await?;
                }
                permit = self.events.clone().reserve_owned(), if !self.backlog.is_empty() => match permit {
                    Ok(permit) => {
                        if let Some(event) = self.backlog.pop_front() {
                            permit.send(event);
                        }
                    }
                    Err(_) => {
                        tracing::debug!("Event receiver dropped");
                        self.backlog.clear();
                        sink.send(Message::Close(None)).await.ok();
                        return Ok(());
                    }
                },
                command = self.commands.recv() => match command {
                    None | Some(GatewayCommand::Shutdown) => {
                        sink.send(Message::Close(None)).await.ok();
                        return Ok(());
                    }
                    // before READY the desired subscription is replayed instead
                    Some(GatewayCommand::Subscribe(id)) => {
                        if self.info.is_ready() && self.subscribed != Some(id) {
                            send(&mut sink, &GatewayMessage::subscribe(id)).await?;
                            self.subscribed = Some(id);
                        }
                    }
                    Some(GatewayCommand::Unsubscribe(id)) => {
                        if self.info.is_ready() && self.subscribed == Some(id) {
                            send(&mut sink, &GatewayMessage::unsubscribe(id)).await?;
                            self.subscribed = None;
                        }
                    }
                },
                frame = stream.next() => {
                    let frame = match frame {
                        None => return Err(GatewayError::Closed(None)),
                        Some(frame) => frame?,
                    };
                    match frame {
                        Message::Text(text) => match GatewayMessage::from_json(&text) {
                            Ok(message) => {
                                if self.handle_message(message, &mut sink).await? == Flow::Stop {
                                    sink.send(Message::Close(None)).await.ok();
                                    return Ok(());
                                }
                            }
                            Err(e) => tracing::warn!(error = %e, "Dropping undecodable frame"),
                        },
                        Message::Close(frame) => {
                            return Err(GatewayError::Closed(frame.map(|f| u16::from(f.code))));
                        }
                        Message::Binary(_) => tracing::debug!("Ignoring binary frame"),
                        _ => {}
                    }
                }
            }
        }
    }

    async fn handle_message<S>(&mut self, message: GatewayMessage, sink: &mut S) -> GatewayResult<Flow>
    where
        S: Sink<Message, Error = tungstenite::Error> + Unpin,
    {
        match message.op {
            OpCode::Dispatch => {
                if let Some(seq) = message.s {
                    self.info.observe_sequence(seq);
                }

                let event = match RealtimeEvent::from_dispatch(&message) {
                    Ok(Some(event)) => event,
                    Ok(None) => {
                        tracing::debug!(event_type = ?message.t, "Ignoring unknown dispatch");
                        return Ok(Flow::Continue);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping malformed dispatch");
                        return Ok(Flow::Continue);
                    }
                };

                if let RealtimeEvent::Ready { session_id } = &event {
                    self.info.mark_ready(session_id.clone());
                    self.backoff.reset();
                    tracing::info!(session_id = %session_id, "Gateway session ready");

                    if let Some(conversation_id) = self.info.subscription() {
                        tracing::debug!(conversation_id = %conversation_id, "Re-subscribing");
                        send(sink, &GatewayMessage::subscribe(conversation_id)).await?;
                        self.subscribed = Some(conversation_id);
                    }
                }

                Ok(self.enqueue(event))
            }
            OpCode::HeartbeatAck => {
                self.info.ack_heartbeat();
                Ok(Flow::Continue)
            }
            OpCode::Heartbeat => {
                send(sink, &GatewayMessage::heartbeat(self.info.last_sequence())).await?;
                Ok(Flow::Continue)
            }
            OpCode::InvalidSession => Err(GatewayError::InvalidSession),
            op => {
                tracing::debug!(op = %op, "Ignoring frame");
                Ok(Flow::Continue)
            }
        }
    }
}

async fn send<S>(sink: &mut S, message: &GatewayMessage) -> GatewayResult<()>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let json = message.to_json()?;
    tracing::trace!(%message, "Sending frame");
    sink.send(Message::Text(json.into())).await?;
    Ok(())
}
