//! The error taxonomy for the whole crate.
//!
//! Every fallible operation returns [`AgiError`] (or converts into it). The
//! six kinds below mirror the error handling design: protocol errors and
//! I/O errors are channel-fatal, command rejections and timeouts are not.
use std::fmt::Display;

/// All the ways interacting with a [`Channel`](crate::channel::Channel) can fail.
#[derive(Debug)]
pub enum AgiError {
    /// A header block or response line could not be parsed.
    Protocol(String),
    /// The command's `code`/`result` indicated failure. The channel is still alive.
    CommandRejected {
        /// The wire command that was rejected.
        command: String,
        /// A verb-specific explanation.
        reason: String,
    },
    /// The per-command timer elapsed before a response arrived.
    Timeout {
        /// The wire command that timed out.
        command: String,
        /// The timeout that elapsed, in milliseconds.
        after_ms: u64,
    },
    /// The queue was full (`>= max_queue_size`) at submission time.
    QueueFull {
        /// The wire command that was rejected.
        command: String,
    },
    /// The channel is no longer usable: socket closed, `HANGUP` received, or
    /// [`CommandQueue::clear`](crate::queue::CommandQueue::clear) was called manually.
    ChannelDead {
        /// Why the channel died.
        reason: ChannelDeathReason,
    },
    /// A socket write failed.
    Io(std::io::Error),
}

/// Why a channel transitioned to dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDeathReason {
    /// The underlying socket was closed (read returned 0 bytes, or a write failed).
    ChannelClosed,
    /// Asterisk sent an unsolicited `HANGUP` line.
    Hangup,
    /// [`CommandQueue::clear`](crate::queue::CommandQueue::clear) was called by the application.
    Manual,
}

impl Display for ChannelDeathReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ChannelClosed => write!(f, "channel_closed"),
            Self::Hangup => write!(f, "hangup"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

impl Display for AgiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Protocol(x) => write!(f, "protocol error: {x}"),
            Self::CommandRejected { command, reason } => {
                write!(f, "command `{}` rejected: {reason}", command.trim_end())
            }
            Self::Timeout { command, after_ms } => {
                write!(
                    f,
                    "command `{}` timed out after {after_ms}ms",
                    command.trim_end()
                )
            }
            Self::QueueFull { command } => {
                write!(
                    f,
                    "command queue is full, rejected `{}`",
                    command.trim_end()
                )
            }
            Self::ChannelDead { reason } => {
                write!(f, "channel is dead ({reason})")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}
impl std::error::Error for AgiError {}

impl From<std::io::Error> for AgiError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timeout_message_contains_command_and_duration() {
        let e = AgiError::Timeout {
            command: "ANSWER\n".to_owned(),
            after_ms: 10_000,
        };
        assert_eq!(e.to_string(), "command `ANSWER` timed out after 10000ms");
    }

    #[test]
    fn channel_dead_message_names_reason() {
        let e = AgiError::ChannelDead {
            reason: ChannelDeathReason::Hangup,
        };
        assert_eq!(e.to_string(), "channel is dead (hangup)");
    }
}
