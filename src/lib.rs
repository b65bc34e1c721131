//! A terminal arcade cabinet of eight mini-games.
//!
//! Engines live in [`games`] and know nothing about terminals: they take
//! [`input::Input`]s, advance in fixed steps and describe frames on a
//! [`canvas::Canvas`]. [`host::GameHost`] mounts one engine at a time and
//! feeds finished runs to the [`scores::ScoreStore`]. The rest is the
//! ratatui shell.

pub mod app;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod event;
pub mod games;
pub mod host;
pub mod input;
pub mod scores;
pub mod ui;
