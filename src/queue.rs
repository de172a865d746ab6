//! FIFO command queue: serializes command submissions onto the single
//! underlying socket, per spec §4.4.
//!
//! Grounded on the tokio mpsc+oneshot actor pattern for serializing access
//! to a single transport (see the research pack's `gawd-ai-sctl/modem.rs`:
//! "Callers send commands through an mpsc channel and get responses via
//! oneshot, no mutex"), adapted here to a tokio task owning the write half
//! of a split `TcpStream` instead of a dedicated `std::thread` over a serial
//! fd, matching the teacher's own choice of `tokio::net::TcpStream`.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{broadcast, mpsc, oneshot};
#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

use crate::config::{ChannelConfig, CommandTimeout};
use crate::error::{AgiError, ChannelDeathReason};
use crate::response::Response;

/// The closed set of events a [`Channel`](crate::channel::Channel) and its
/// [`CommandQueue`] publish, replacing the event-emitter pattern per the
/// design note in spec §9.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The header block was fully consumed; the command library is now usable.
    Ready,
    /// Asterisk sent an unsolicited `HANGUP` line.
    Hangup,
    /// The channel has terminated; no further commands will be accepted.
    Close,
    /// A socket-layer error occurred, independent of any in-flight command.
    Error(String),
    /// A command was written to the wire.
    Send { command: String },
    /// A command was appended to the queue.
    CommandQueued { command: String, size: usize },
    /// A command's response arrived and was delivered to its submitter.
    CommandProcessed { command: String, duration_ms: u64 },
    /// A command failed (timeout, I/O error, or rejection at the queue level).
    CommandFailed { command: String, error: String },
    /// The queue transitioned to empty (no command in flight, none waiting).
    QueueEmpty,
    /// The queue was drained, either by termination or a manual `clear()`.
    QueueCleared {
        reason: ChannelDeathReason,
        count: usize,
    },
}

/// Snapshot returned by [`CommandQueue::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Number of commands waiting (not counting the in-flight one).
    pub size: usize,
    /// Number of commands currently in flight (0 or 1).
    pub processing: usize,
    /// Age, in milliseconds, of the oldest still-waiting entry.
    pub oldest_age_ms: u64,
}

struct QueuedCommand {
    command: String,
    timeout: CommandTimeout,
    enqueued_at: Instant,
    reply: oneshot::Sender<Result<Response, AgiError>>,
}

enum WorkerMsg {
    Submit(QueuedCommand),
    Clear(oneshot::Sender<usize>),
    Stats(oneshot::Sender<QueueStats>),
    Shutdown(oneshot::Sender<usize>),
}

/// Fed by the channel's reader task: either a parsed response or the signal
/// that the channel died (socket closed, or `HANGUP` observed).
pub(crate) enum ReaderEvent {
    Response(Response),
    Hangup,
    Closed,
    ProtocolError(String),
}

/// A cloneable handle onto a channel's command queue.
#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::Sender<WorkerMsg>,
    queue_len: Arc<AtomicUsize>,
    alive: Arc<AtomicBool>,
    config: Arc<ChannelConfig>,
}

impl CommandQueue {
    /// Spawn the queue worker over `write_half`, fed by `reader_rx`. Returns the
    /// handle used by submitters.
    pub(crate) fn spawn(
        write_half: OwnedWriteHalf,
        reader_rx: mpsc::UnboundedReceiver<ReaderEvent>,
        events: broadcast::Sender<ChannelEvent>,
        config: Arc<ChannelConfig>,
    ) -> Self {
        let (tx, command_rx) = mpsc::channel(1024);
        let queue_len = Arc::new(AtomicUsize::new(0));
        let alive = Arc::new(AtomicBool::new(true));

        tokio::spawn(run_worker(
            write_half,
            command_rx,
            reader_rx,
            queue_len.clone(),
            alive.clone(),
            events,
        ));

        Self {
            tx,
            queue_len,
            alive,
            config,
        }
    }

    /// Whether the channel is still alive (monotonic: never flips back to true).
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Enqueue `command` and await its response.
    ///
    /// Rejects immediately (without going through the worker) if the channel
    /// is dead or the queue is already at `max_queue_size`.
    pub async fn submit(
        &self,
        command: String,
        timeout: Option<CommandTimeout>,
    ) -> Result<Response, AgiError> {
        if !self.is_alive() {
            return Err(AgiError::ChannelDead {
                reason: ChannelDeathReason::ChannelClosed,
            });
        }
        let max_queue_size = self.config.max_queue_size;
        if self
            .queue_len
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n >= max_queue_size {
                    None
                } else {
                    Some(n + 1)
                }
            })
            .is_err()
        {
            return Err(AgiError::QueueFull { command });
        }

        let effective_timeout =
            timeout.unwrap_or_else(|| self.config.default_timeout_for(&command));
        let (reply_tx, reply_rx) = oneshot::channel();
        let entry = QueuedCommand {
            command: command.clone(),
            timeout: effective_timeout,
            enqueued_at: Instant::now(),
            reply: reply_tx,
        };

        if self.tx.send(WorkerMsg::Submit(entry)).await.is_err() {
            self.queue_len.fetch_sub(1, Ordering::SeqCst);
            return Err(AgiError::ChannelDead {
                reason: ChannelDeathReason::ChannelClosed,
            });
        }

        match reply_rx.await {
            Ok(result) => result,
            Err(_) => Err(AgiError::ChannelDead {
                reason: ChannelDeathReason::ChannelClosed,
            }),
        }
    }

    /// Drain the queue, rejecting every pending (not in-flight) entry with a
    /// "manually cleared" error. Returns the number rejected.
    pub async fn clear(&self) -> usize {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(WorkerMsg::Clear(reply_tx)).await.is_err() {
            return 0;
        }
        reply_rx.await.unwrap_or(0)
    }

    /// Mark the channel dead and drain the queue, as if the socket had closed.
    /// Used by verbs (e.g. `ASYNCAGI BREAK`) that close the channel on success.
    pub async fn close(&self) -> usize {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(WorkerMsg::Shutdown(reply_tx)).await.is_err() {
            return 0;
        }
        reply_rx.await.unwrap_or(0)
    }

    /// A snapshot of the current queue state.
    pub async fn stats(&self) -> QueueStats {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(WorkerMsg::Stats(reply_tx)).await.is_err() {
            return QueueStats {
                size: 0,
                processing: 0,
                oldest_age_ms: 0,
            };
        }
        reply_rx.await.unwrap_or(QueueStats {
            size: 0,
            processing: 0,
            oldest_age_ms: 0,
        })
    }
}

async fn run_worker(
    mut write_half: OwnedWriteHalf,
    mut command_rx: mpsc::Receiver<WorkerMsg>,
    mut reader_rx: mpsc::UnboundedReceiver<ReaderEvent>,
    queue_len: Arc<AtomicUsize>,
    alive: Arc<AtomicBool>,
    events: broadcast::Sender<ChannelEvent>,
) {
    let mut queue: VecDeque<QueuedCommand> = VecDeque::new();
    let mut in_flight: Option<QueuedCommand> = None;
    // Responses arrive strictly in the order their commands were written. A
    // command that times out locally is still owed exactly one reply on the
    // wire; bumping this on timeout and decrementing it on arrival lets a
    // late reply be discarded instead of misattributed to whatever command
    // is in flight by the time it shows up.
    let mut stale_replies_to_discard: u64 = 0;

    loop {
        if in_flight.is_none() {
            match queue.pop_front() {
                Some(entry) => match write_half.write_all(entry.command.as_bytes()).await {
                    Ok(()) => {
                        #[cfg(feature = "tracing")]
                        trace!(command = %entry.command.trim_end(), "wrote command to wire");
                        let _ = events.send(ChannelEvent::Send {
                            command: entry.command.clone(),
                        });
                        in_flight = Some(entry);
                    }
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        warn!(command = %entry.command.trim_end(), error = %e, "socket write failed");
                        let _ = events.send(ChannelEvent::CommandFailed {
                            command: entry.command.clone(),
                            error: e.to_string(),
                        });
                        let _ = entry.reply.send(Err(AgiError::Io(e)));
                        queue_len.fetch_sub(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        continue;
                    }
                },
                None => {
                    let _ = events.send(ChannelEvent::QueueEmpty);
                }
            }
        }

        let timeout_duration = in_flight.as_ref().and_then(|e| match e.timeout {
            CommandTimeout::After(d) => Some(d),
            CommandTimeout::Unbounded => None,
        });

        tokio::select! {
            biased;

            maybe_event = reader_rx.recv() => {
                match maybe_event {
                    Some(ReaderEvent::Response(resp)) => {
                        if stale_replies_to_discard > 0 {
                            stale_replies_to_discard -= 1;
                            #[cfg(feature = "tracing")]
                            trace!(code = resp.code, result = resp.result, "discarded late response to a timed-out command");
                        } else if let Some(entry) = in_flight.take() {
                            let duration_ms = entry.enqueued_at.elapsed().as_millis() as u64;
                            #[cfg(feature = "tracing")]
                            trace!(command = %entry.command.trim_end(), duration_ms, code = resp.code, result = resp.result, "command resolved");
                            let _ = events.send(ChannelEvent::CommandProcessed {
                                command: entry.command.clone(),
                                duration_ms,
                            });
                            let _ = entry.reply.send(Ok(resp));
                            queue_len.fetch_sub(1, Ordering::SeqCst);
                        }
                        tokio::task::yield_now().await;
                    }
                    Some(ReaderEvent::Hangup) | Some(ReaderEvent::Closed) | Some(ReaderEvent::ProtocolError(_)) | None => {
                        let reason = match maybe_event {
                            Some(ReaderEvent::Hangup) => ChannelDeathReason::Hangup,
                            _ => ChannelDeathReason::ChannelClosed,
                        };
                        #[cfg(feature = "tracing")]
                        debug!(%reason, "channel terminating");
                        alive.store(false, Ordering::SeqCst);
                        if let Some(entry) = in_flight.take() {
                            let err = if let Some(ReaderEvent::ProtocolError(msg)) = &maybe_event {
                                AgiError::Protocol(msg.clone())
                            } else {
                                AgiError::ChannelDead { reason }
                            };
                            let _ = entry.reply.send(Err(err));
                            queue_len.fetch_sub(1, Ordering::SeqCst);
                        }
                        let waiting_count = queue.len();
                        while let Some(entry) = queue.pop_front() {
                            let _ = entry.reply.send(Err(AgiError::ChannelDead { reason }));
                            queue_len.fetch_sub(1, Ordering::SeqCst);
                        }
                        let _ = events.send(ChannelEvent::QueueCleared {
                            reason,
                            count: waiting_count,
                        });
                        let _ = events.send(ChannelEvent::Close);
                        return;
                    }
                }
            }

            _ = tokio::time::sleep(timeout_duration.unwrap_or_default()), if timeout_duration.is_some() => {
                if let Some(entry) = in_flight.take() {
                    let after_ms = timeout_duration.expect("guarded by is_some above").as_millis() as u64;
                    #[cfg(feature = "tracing")]
                    warn!(command = %entry.command.trim_end(), after_ms, "command timed out");
                    let _ = events.send(ChannelEvent::CommandFailed {
                        command: entry.command.clone(),
                        error: format!("timeout after {after_ms}ms"),
                    });
                    let _ = entry.reply.send(Err(AgiError::Timeout {
                        command: entry.command,
                        after_ms,
                    }));
                    queue_len.fetch_sub(1, Ordering::SeqCst);
                    stale_replies_to_discard += 1;
                }
                tokio::task::yield_now().await;
            }

            maybe_msg = command_rx.recv() => {
                match maybe_msg {
                    Some(WorkerMsg::Submit(entry)) => {
                        let _ = events.send(ChannelEvent::CommandQueued {
                            command: entry.command.clone(),
                            size: queue.len() + 1,
                        });
                        queue.push_back(entry);
                    }
                    Some(WorkerMsg::Clear(reply)) => {
                        let waiting_count = queue.len();
                        while let Some(entry) = queue.pop_front() {
                            let _ = entry.reply.send(Err(AgiError::ChannelDead {
                                reason: ChannelDeathReason::Manual,
                            }));
                            queue_len.fetch_sub(1, Ordering::SeqCst);
                        }
                        let _ = events.send(ChannelEvent::QueueCleared {
                            reason: ChannelDeathReason::Manual,
                            count: waiting_count,
                        });
                        let _ = reply.send(waiting_count);
                    }
                    Some(WorkerMsg::Stats(reply)) => {
                        let oldest_age_ms = queue
                            .front()
                            .map(|e| e.enqueued_at.elapsed().as_millis() as u64)
                            .unwrap_or(0);
                        let _ = reply.send(QueueStats {
                            size: queue.len(),
                            processing: in_flight.is_some() as usize,
                            oldest_age_ms,
                        });
                    }
                    Some(WorkerMsg::Shutdown(reply)) => {
                        alive.store(false, Ordering::SeqCst);
                        if let Some(entry) = in_flight.take() {
                            let _ = entry.reply.send(Err(AgiError::ChannelDead {
                                reason: ChannelDeathReason::Manual,
                            }));
                            queue_len.fetch_sub(1, Ordering::SeqCst);
                        }
                        let waiting_count = queue.len();
                        while let Some(entry) = queue.pop_front() {
                            let _ = entry.reply.send(Err(AgiError::ChannelDead {
                                reason: ChannelDeathReason::Manual,
                            }));
                            queue_len.fetch_sub(1, Ordering::SeqCst);
                        }
                        let _ = events.send(ChannelEvent::QueueCleared {
                            reason: ChannelDeathReason::Manual,
                            count: waiting_count,
                        });
                        let _ = events.send(ChannelEvent::Close);
                        let _ = reply.send(waiting_count);
                        return;
                    }
                    None => {
                        // the CommandQueue handle (and every clone) was dropped.
                        alive.store(false, Ordering::SeqCst);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::net::{TcpListener, TcpStream};

    #[tokio::test]
    async fn queue_full_rejects_synchronously() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
        let client = TcpStream::connect(addr).await.unwrap();
        let server = accept.await.unwrap();

        let (_read_half, write_half) = server.into_split();
        let (_reader_tx, reader_rx) = mpsc::unbounded_channel();
        let (events, _sub) = broadcast::channel(16);
        let config = ChannelConfig {
            max_queue_size: 1,
            ..ChannelConfig::default()
        };
        let queue = CommandQueue::spawn(write_half, reader_rx, events, Arc::new(config));

        drop(client);

        // Fill the one slot with a command that will never get a response
        // (nothing will ever write back), then a second submit must be
        // rejected synchronously because the queue is already full.
        let q2 = queue.clone();
        let _first = tokio::spawn(async move {
            let _ = q2
                .submit("ANSWER\n".to_owned(), Some(CommandTimeout::Unbounded))
                .await;
        });
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let second = queue
            .submit("HANGUP\n".to_owned(), Some(CommandTimeout::Unbounded))
            .await;
        assert!(matches!(second, Err(AgiError::QueueFull { .. })));
    }
}
