//! jobshell - the execution core of a CI build agent
//!
//! jobshell runs external programs on behalf of pipeline-supplied job
//! instructions: it executes argv commands with cancellation and signal
//! handling, prepares git checkouts without letting job input reach a shell
//! or be parsed as a flag, and serializes access to shared mirrors with
//! cross-process file locks.
//!
//! # Architecture
//!
//! - [`core`] - Ref validation, URL normalization, durations, configuration
//! - [`shell`] - Process execution with PTY, capture, interrupt, cancellation
//! - [`git`] - Argv-safe git operations and ssh host resolution
//! - [`lock`] - Advisory file locks with bounded retry
//! - [`cli`] - Command-line front end
//!
//! # Correctness Invariants
//!
//! 1. No job-supplied string is handed to a shell interpreter
//! 2. Invalid refs are rejected before any process starts
//! 3. A cancelled command is signalled, then killed after the grace period
//! 4. At most one holder of a lock path exists across cooperating processes

pub mod cli;
pub mod core;
pub mod git;
pub mod lock;
pub mod shell;
