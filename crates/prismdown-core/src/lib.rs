#![forbid(unsafe_code)]

//! Live-preview pipeline for `prismdown` (library used by the CLI and any
//! other front end).
//!
//! The moving parts, leaves first: [`encode`] serializes text into a
//! script-call argument, [`watch`] observes one file for external changes,
//! [`document`] loads and decodes a file, [`bridge`] pushes serialized
//! documents into an opaque render surface, and [`coordinator`] is the state
//! machine arbitrating between user edits, commands, and watcher events.
//! Front ends translate gestures into coordinator commands and pump
//! [`coordinator::Coordinator::poll`] on their owner thread.

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod encode;
pub mod error;
pub mod links;
pub mod markdown;
pub mod template;
pub mod watch;

/// Hard cap on file sizes we will load into memory.
pub const MAX_FILE_BYTES: u64 = 64 * 1024 * 1024;
