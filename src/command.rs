//! Command-driven front end over a [`RankTree`] of integers.
//!
//! Input is a whitespace separated token stream:
//!
//! * `k <key>` inserts `key`,
//! * `q <lo> <hi>` writes the number of stored keys in `[lo, hi]` followed
//!   by a space,
//! * any other token, or the end of input, ends the session.
//!
//! A query with `lo > hi` is rejected as a usage error and the session
//! carries on.
use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

use log::{debug, warn};
use thiserror::Error;

use crate::{RankTree, Violation};

pub type Key = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert(Key),
    Query { lo: Key, hi: Key },
    Stop,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to read or write commands: {0}")]
    Io(#[from] io::Error),

    #[error("`{command}` expects {expected} argument(s)")]
    MissingArgument {
        command: &'static str,
        expected: usize,
    },

    #[error("`{token}` is not a valid key")]
    InvalidNumber { token: String },

    #[error("bad range: {lo} > {hi}")]
    ReversedRange { lo: Key, hi: Key },

    #[error("tree invariant broken: {0}")]
    Corrupted(#[from] Violation),
}

impl CommandError {
    /// Usage errors are reported and skipped; everything else ends the
    /// session.
    pub fn is_usage(&self) -> bool {
        matches!(self, CommandError::ReversedRange { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Run [`RankTree::check`] after every insert and fail on the first
    /// violation.
    pub verify_each_insert: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub inserted: usize,
    pub duplicates: usize,
    pub queries: usize,
    pub rejected: usize,
}

/// Splits a reader into whitespace separated tokens, a line at a time.
pub struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    pub fn new(reader: R) -> Self {
        Tokens {
            reader,
            pending: VecDeque::new(),
        }
    }

    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }
}

pub struct Session<R> {
    tokens: Tokens<R>,
    tree: RankTree<Key>,
    config: Config,
    stats: Stats,
}

impl<R: BufRead> Session<R> {
    pub fn new(reader: R, config: Config) -> Self {
        Session {
            tokens: Tokens::new(reader),
            tree: RankTree::new(),
            config,
            stats: Stats::default(),
        }
    }

    pub fn tree(&self) -> &RankTree<Key> {
        &self.tree
    }

    pub fn into_tree(self) -> RankTree<Key> {
        self.tree
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn next_command(&mut self) -> Result<Command, CommandError> {
        let Some(token) = self.tokens.next_token()? else {
            return Ok(Command::Stop);
        };
        match token.as_str() {
            "k" => Ok(Command::Insert(self.argument("k", 1)?)),
            "q" => {
                let lo = self.argument("q", 2)?;
                let hi = self.argument("q", 2)?;
                Ok(Command::Query { lo, hi })
            }
            _ => Ok(Command::Stop),
        }
    }

    fn argument(&mut self, command: &'static str, expected: usize) -> Result<Key, CommandError> {
        let token = self
            .tokens
            .next_token()?
            .ok_or(CommandError::MissingArgument { command, expected })?;
        token
            .parse()
            .map_err(|_| CommandError::InvalidNumber { token })
    }

    /// Applies one command. Returns `false` once the session is over.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<bool, CommandError> {
        match command {
            Command::Insert(key) => {
                if self.tree.insert(key) {
                    self.stats.inserted += 1;
                } else {
                    self.stats.duplicates += 1;
                }
                if self.config.verify_each_insert {
                    self.tree.check()?;
                }
            }
            Command::Query { lo, hi } => {
                if lo > hi {
                    return Err(CommandError::ReversedRange { lo, hi });
                }
                let count = self.tree.count_in_range(&lo, &hi);
                debug!("[{lo}, {hi}] holds {count} keys");
                self.stats.queries += 1;
                write!(out, "{count} ")?;
            }
            Command::Stop => return Ok(false),
        }
        Ok(true)
    }

    /// Runs until a stop token or the end of input. Answers go to `out`,
    /// rejected commands are described on `diag`.
    pub fn run<W: Write, E: Write>(&mut self, out: &mut W, diag: &mut E) -> Result<Stats, CommandError> {
        loop {
            let command = self.next_command()?;
            match self.execute(command, out) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) if err.is_usage() => {
                    warn!("{err}");
                    self.stats.rejected += 1;
                    writeln!(diag, "{err}")?;
                }
                Err(err) => return Err(err),
            }
        }
        debug!("session over: {:?}", self.stats);
        Ok(self.stats)
    }
}
