//! Event loop tying the push channel, command channel, queue stream,
//! countdown timers and rendering together.
//!
//! Transport is line-delimited JSON over TCP: one `ServerMessage` per
//! inbound line, one `ClientCommand` per outbound line. The queue-position
//! stream is a second, on-demand connection whose lines are forwarded
//! through a channel so the main `select!` loop stays single-threaded over
//! the session state.

use crate::game::{GameSession, SyncOutcome};
use crate::input::{InputEvent, InputManager};
use crate::rendering::Renderer;
use crate::requeue::{QueueStep, RequeueAction, RequeueFlow};
use crate::session::{keys, SessionStore};
use log::{error, info, warn};
use shared::{ClientCommand, ServerMessage};
use std::error::Error;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep_until};

pub struct Client {
    reader: Option<Lines<BufReader<OwnedReadHalf>>>,
    writer: OwnedWriteHalf,
    queue_addr: String,
    store: SessionStore,
    session: GameSession,
    requeue: RequeueFlow,
    input: InputManager,
    renderer: Renderer,
    queue_rx: Option<mpsc::UnboundedReceiver<String>>,
    last_frame: Instant,
}

impl Client {
    pub async fn new(
        server_addr: &str,
        queue_addr: &str,
        store: SessionStore,
    ) -> Result<Self, Box<dyn Error>> {
        info!("Connecting to {}...", server_addr);
        let stream = TcpStream::connect(server_addr).await?;
        let (read_half, write_half) = stream.into_split();

        let session = GameSession::new();
        let renderer = Renderer::new(&session);

        Ok(Client {
            reader: Some(BufReader::new(read_half).lines()),
            writer: write_half,
            queue_addr: queue_addr.to_string(),
            store,
            session,
            requeue: RequeueFlow::new(),
            input: InputManager::new(),
            renderer,
            queue_rx: None,
            last_frame: Instant::now(),
        })
    }

    async fn send_command(&mut self, command: &ClientCommand) -> Result<(), Box<dyn Error>> {
        let mut line = serde_json::to_string(command)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Announce ourselves for the current round: spectators watch, players
    /// claim a board.
    async fn announce(&mut self) -> Result<(), Box<dyn Error>> {
        if self.store.is_spectator() {
            info!("is a spectator... showing game id");
            self.send_command(&ClientCommand::spectator_joined()).await
        } else {
            let user_id = self
                .store
                .get(keys::USER_ID)
                .unwrap_or_default()
                .to_string();
            self.send_command(&ClientCommand::player_joined(&user_id))
                .await
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let mut reader = match self.reader.take() {
            Some(reader) => reader,
            None => return Err("client is already running".into()),
        };

        self.announce().await?;

        let mut frame_interval = interval(Duration::from_millis(16));

        loop {
            let loader_deadline = self.session.next_loader_deadline();

            tokio::select! {
                line = reader.next_line() => match line {
                    Ok(Some(line)) => self.handle_line(&line).await?,
                    Ok(None) => {
                        info!("server closed the push channel");
                        break;
                    }
                    Err(e) => {
                        error!("Error occurred: {}", e);
                        break;
                    }
                },

                // pends forever while no queue stream is open
                event = queue_event(&mut self.queue_rx) => {
                    match event {
                        Some(raw) => self.handle_queue_line(&raw).await?,
                        None => {
                            warn!("queue stream closed");
                            self.queue_rx = None;
                        }
                    }
                },

                _ = sleep_until(loader_deadline.unwrap_or_else(Instant::now).into()),
                        if loader_deadline.is_some() => {
                    self.session.expire_loaders(Instant::now());
                    self.redraw();
                },

                _ = frame_interval.tick() => {
                    let events = self.input.poll();
                    for event in events {
                        self.handle_input(event).await?;
                    }
                    self.redraw();
                },
            }
        }

        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<(), Box<dyn Error>> {
        let msg: ServerMessage = match serde_json::from_str(line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("ignoring malformed message: {}", e);
                return Ok(());
            }
        };

        let SyncOutcome { requeue, commands } = self.session.apply(&msg);
        for command in &commands {
            self.send_command(command).await?;
        }
        if let Some(round_id) = requeue {
            self.reload(&round_id).await?;
        }
        self.redraw();
        Ok(())
    }

    async fn handle_queue_line(&mut self, raw: &str) -> Result<(), Box<dyn Error>> {
        match self.requeue.handle_queue_event(raw, &mut self.store) {
            QueueStep::ShowQueuePosition(position) => {
                // the waiting view itself belongs to the surrounding UI
                info!("waiting in queue at position {}", position);
            }
            QueueStep::Ready { round_id } => {
                self.queue_rx = None;
                self.reload(&round_id).await?;
            }
            QueueStep::Ignored => {}
        }
        Ok(())
    }

    async fn handle_input(&mut self, event: InputEvent) -> Result<(), Box<dyn Error>> {
        match event {
            InputEvent::Steer(direction) => {
                self.send_command(&ClientCommand::direction(direction)).await
            }
            InputEvent::StartGame => self.send_command(&ClientCommand::game_start()).await,
            InputEvent::Requeue => match self.requeue.request_rejoin(&self.store) {
                RequeueAction::SendCommand(command) => self.send_command(&command).await,
                RequeueAction::OpenQueueStream { party_id } => {
                    self.queue_rx = Some(open_queue_stream(self.queue_addr.clone(), party_id));
                    Ok(())
                }
            },
        }
    }

    /// Tear the round-scoped pipeline down and start over: fresh session,
    /// fresh trail texture, re-announce for the new round.
    async fn reload(&mut self, round_id: &str) -> Result<(), Box<dyn Error>> {
        info!("reloading into round {}", round_id);
        self.requeue.complete(round_id, &mut self.store);
        self.session = GameSession::new();
        self.renderer = Renderer::new(&self.session);
        self.announce().await
    }

    fn redraw(&mut self) {
        let dt = self.last_frame.elapsed().as_secs_f32();
        self.last_frame = Instant::now();
        self.renderer.render(&mut self.session, dt);
    }
}

async fn queue_event(rx: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Open the queue-position stream for a party: connect, name the party and
/// forward every line. Errors are logged and end the stream; retrying is
/// the user's call, not this layer's.
pub fn open_queue_stream(addr: String, party_id: String) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Error showing queue position: {}", e);
                return;
            }
        };
        if let Err(e) = stream.write_all(format!("{}\n", party_id).as_bytes()).await {
            error!("Error showing queue position: {}", e);
            return;
        }

        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Error showing queue position: {}", e);
                    break;
                }
            }
        }
    });
    rx
}
