//! band-terminal: a terminal-styled site for a music project.
//!
//! The terminal view (command interpreter, history, view switching and the
//! embedded player with its fallback) lives here as a library so it can be
//! driven without a window; `main.rs` wires it to winit and vello.

pub mod commands;
pub mod config;
pub mod embed;
pub mod history;
pub mod logging;
pub mod mount;
pub mod opener;
pub mod output;
pub mod panels;
pub mod paths;
pub mod player;
pub mod render;
pub mod shortcuts;
pub mod terminal;
pub mod view;
