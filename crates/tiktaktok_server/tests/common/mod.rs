//! In-memory connection harness for session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tiktaktok_game::{ClientEvent, GameFactory, Mark, Matchmaker, ServerEvent};
use tiktaktok_server::{
    Connection, ConnectionError, Frame, FrameSource, Outbound, Outbox, encode_client_event,
    serve_connection,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(2);

/// Frames pushed by the test. Ends when the sender is dropped.
pub struct ChannelFrames {
    rx: mpsc::UnboundedReceiver<Result<Frame, ConnectionError>>,
}

#[async_trait]
impl FrameSource for ChannelFrames {
    async fn next_frame(&mut self) -> Option<Result<Frame, ConnectionError>> {
        self.rx.recv().await
    }
}

pub fn matchmaker() -> Arc<Matchmaker> {
    Arc::new(Matchmaker::new(Arc::new(GameFactory::new())))
}

/// A client driving one `serve_connection` task.
pub struct TestClient {
    frames: Option<mpsc::UnboundedSender<Result<Frame, ConnectionError>>>,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    task: JoinHandle<Result<(), ConnectionError>>,
}

impl TestClient {
    pub fn connect(matchmaker: &Arc<Matchmaker>) -> Self {
        Self::connect_with_limit(matchmaker, 4096)
    }

    pub fn connect_with_limit(matchmaker: &Arc<Matchmaker>, limit: usize) -> Self {
        let (frames, rx) = mpsc::unbounded_channel();
        let (outbox, outbound) = Outbox::channel();
        let connection = Connection::new(ChannelFrames { rx }, outbox, limit);
        let player_id = matchmaker.factory().next_player_id();
        let task = tokio::spawn(serve_connection(
            connection,
            Arc::clone(matchmaker),
            player_id,
        ));
        Self {
            frames: Some(frames),
            outbound,
            task,
        }
    }

    pub fn send_frame(&self, frame: Frame) {
        if let Some(frames) = &self.frames {
            frames.send(Ok(frame)).unwrap();
        }
    }

    pub fn send_text(&self, text: &str) {
        self.send_frame(Frame::text(text));
    }

    pub fn send(&self, event: impl Into<ClientEvent>) {
        self.send_text(&encode_client_event(&event.into()).unwrap());
    }

    pub fn fail_transport(&self, reason: &str) {
        if let Some(frames) = &self.frames {
            frames.send(Err(ConnectionError::transport(reason))).unwrap();
        }
    }

    /// Drops the frame sender, as if the socket vanished.
    pub fn hang_up(&mut self) {
        self.frames = None;
    }

    /// Next queued item.
    pub async fn next(&mut self) -> Outbound {
        timeout(WAIT, self.outbound.recv())
            .await
            .expect("timed out waiting for outbound")
            .expect("outbox closed")
    }

    /// Next queued event; panics on close.
    pub async fn event(&mut self) -> ServerEvent {
        match self.next().await {
            Outbound::Event(event) => event,
            Outbound::Close => panic!("expected an event, got close"),
        }
    }

    /// Collects `n` events.
    pub async fn events(&mut self, n: usize) -> Vec<ServerEvent> {
        let mut events = Vec::with_capacity(n);
        for _ in 0..n {
            events.push(self.event().await);
        }
        events
    }

    /// Whether nothing is queued right now.
    pub async fn is_quiet(&mut self) -> bool {
        timeout(Duration::from_millis(50), self.outbound.recv())
            .await
            .is_err()
    }

    /// Waits for the session task to end.
    pub async fn finished(self) -> Result<(), ConnectionError> {
        timeout(WAIT, self.task)
            .await
            .expect("session did not end")
            .expect("session panicked")
    }
}

/// Readies two clients and drains their start events. Returns (X, O).
pub async fn paired(matchmaker: &Arc<Matchmaker>) -> (TestClient, TestClient) {
    let mut ann = TestClient::connect(matchmaker);
    let mut bob = TestClient::connect(matchmaker);
    ann.send(ready("ann"));
    ann.event().await; // waiting
    bob.send(ready("bob"));

    let ann_events = ann.events(3).await;
    bob.events(3).await;
    match &ann_events[0] {
        ServerEvent::SetMark(set) if set.mark == Mark::X => (ann, bob),
        ServerEvent::SetMark(_) => (bob, ann),
        other => panic!("expected setMark, got {other:?}"),
    }
}

pub fn mv(cell: i64) -> ClientEvent {
    ClientEvent::Move(tiktaktok_game::Move::new(cell))
}

pub fn ready(name: &str) -> ClientEvent {
    ClientEvent::PlayerReady(tiktaktok_game::PlayerReady::new(name))
}

pub fn chat(text: &str) -> ClientEvent {
    ClientEvent::ChatMessage(tiktaktok_game::ChatMessage::new(text))
}
