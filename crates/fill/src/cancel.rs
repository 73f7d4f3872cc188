use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use crate::options::SolveOptions;

/// A cloneable flag that asks a running solve to stop.
///
/// Clones share the same flag, so a token can be handed to another thread
/// (a UI event handler, a signal handler) while the solve holds its own copy.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every solve holding this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`CancelToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Why a solve stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CancelReason {
    /// The configured time limit elapsed.
    TimeLimit,
    /// A [`CancelToken`] was cancelled.
    Token,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeLimit => f.write_str("time limit elapsed"),
            Self::Token => f.write_str("cancellation requested"),
        }
    }
}

/// Checks the stop conditions of a single solve.
///
/// The deadline is fixed when the solve starts; a limit too large to
/// represent never expires. Once either condition trips it stays tripped, so
/// repeated checks agree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Interrupt<'a> {
    deadline: Option<Instant>,
    token: Option<&'a CancelToken>,
}

impl<'a> Interrupt<'a> {
    pub(crate) fn start(options: &'a SolveOptions) -> Self {
        Self {
            deadline: options
                .time_limit()
                .and_then(|limit| Instant::now().checked_add(limit)),
            token: options.cancel_token(),
        }
    }

    pub(crate) fn check(&self) -> Option<CancelReason> {
        if self.token.is_some_and(CancelToken::is_cancelled) {
            return Some(CancelReason::Token);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::TimeLimit),
            _ => None,
        }
    }
}
