//! # Arena Game Client
//!
//! Client-side engine for a grid-based multiplayer light-cycle arena. The
//! server is authoritative for everything: this crate receives a stream of
//! small state-delta messages over a push channel, keeps an in-memory model
//! of players and obstacles in sync, and redraws the board after every
//! message. There is no prediction and no local physics; correctness is
//! entirely about applying partial updates in the right order.
//!
//! ## Architecture Overview
//!
//! ### State Synchronizer (`game`)
//! The heart of the crate. Each inbound message is a bag of optional
//! fields (`requeue`, `obstacles`, `movingObstacles`, `playerlist`,
//! `players`, `countdown`, `keepAlive`) applied in a fixed order. The
//! ordering matters: moving obstacles erase trail cells before the same
//! tick's player updates stamp new ones, and a `requeue` discards the whole
//! session before anything else is looked at. All round-scoped state lives
//! in one `GameSession` built on round join and dropped on requeue.
//!
//! ### Entity Model (`entity`)
//! Plain data for players, tooltips and moving obstacles. Entities carry no
//! drawable handles; the renderer works off the session tables directly, so
//! a moving obstacle's identity is its index.
//!
//! ### Trail Compositor (`trail`)
//! A CPU-side 600x600 raster accumulating where living players have been.
//! Players stamp cell-sized squares of their color; obstacles erase the
//! rectangles they roll onto; the renderer uploads the buffer as a texture
//! whenever it changed.
//!
//! ### Renderer (`rendering`)
//! Immediate-mode drawing in a fixed z-order: trails, static obstacles,
//! moving obstacles, players, tooltips, loader overlay.
//!
//! ### Requeue Workflow (`requeue`, `session`)
//! A small state machine for rejoining a new round: either a direct
//! `GAME_REQUEUE` command, or a queue-position stream watched until a ready
//! signal names the new round. Completion persists the round id in the
//! session store and reloads the pipeline from scratch.
//!
//! ### Event Loop (`network`, `input`)
//! A `tokio::select!` loop over inbound lines, queue-stream events,
//! countdown deadlines and frame ticks. Single-threaded over the session;
//! handlers never block.

pub mod entity;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod requeue;
pub mod session;
pub mod trail;
