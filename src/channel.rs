//! [`Channel`]: the per-connection object application code talks to.
//!
//! Grounded on the teacher's `Connection` (`src/connection.rs`) for the
//! `TcpStream`-ownership shape, generalized from "write one command, block
//! on one read" into a reader task feeding a [`CommandQueue`] worker task,
//! per spec §2 and §5.
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
#[cfg(feature = "tracing")]
use tracing::{debug, error, trace, warn};

use crate::agiparse::CallMetadata;
use crate::config::{ChannelConfig, CommandTimeout};
use crate::error::AgiError;
use crate::framer::{ChannelState, Framer};
use crate::queue::{ChannelEvent, CommandQueue, QueueStats, ReaderEvent};
use crate::response::{ParsedLine, Response, ResponseParser};

const EVENT_CAPACITY: usize = 256;
const READ_BUF_SIZE: usize = 4096;

/// A single AGI connection: call metadata plus the command queue that
/// serializes access to the socket.
pub struct Channel {
    metadata: CallMetadata,
    queue: CommandQueue,
    events: broadcast::Sender<ChannelEvent>,
}

impl Channel {
    /// Consume `stream`, read the header block, and start the reader/queue
    /// worker tasks. Returns once the channel is `ready` (header consumed);
    /// only then is the command library usable, per spec §4.2.
    pub async fn connect(
        stream: TcpStream,
        config: ChannelConfig,
    ) -> Result<(Self, broadcast::Receiver<ChannelEvent>), AgiError> {
        stream.set_nodelay(true).ok();
        let (mut read_half, write_half) = stream.into_split();

        let (events, events_rx) = broadcast::channel(EVENT_CAPACITY);

        let mut framer = Framer::new();
        let mut buf = vec![0_u8; READ_BUF_SIZE];
        let metadata = loop {
            let n = read_half.read(&mut buf).await?;
            if n == 0 {
                return Err(AgiError::Protocol(
                    "connection closed before header block was complete".to_owned(),
                ));
            }
            let chunk = std::str::from_utf8(&buf[..n])
                .map_err(|_| AgiError::Protocol("header block was not valid utf-8".to_owned()))?;
            let records = framer.push(chunk, ChannelState::Init);
            if let Some(record) = records.into_iter().next() {
                let metadata = CallMetadata::parse(&record);
                #[cfg(feature = "tracing")]
                trace!(channel = %metadata.channel, uniqueid = %metadata.uniqueid, "header block parsed");
                break metadata;
            }
        };

        let (reader_tx, reader_rx) = mpsc::unbounded_channel();
        let config = Arc::new(config);
        let queue = CommandQueue::spawn(write_half, reader_rx, events.clone(), config);

        tokio::spawn(run_reader(read_half, framer, reader_tx));

        #[cfg(feature = "tracing")]
        debug!("channel ready, command library usable");
        let _ = events.send(ChannelEvent::Ready);

        Ok((
            Self {
                metadata,
                queue,
                events,
            },
            events_rx,
        ))
    }

    /// The metadata Asterisk sent in the header block.
    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    /// Subscribe to this channel's events. Subscribers registered after a
    /// given event fired will not observe it (standard broadcast-channel
    /// semantics); subscribe via the receiver returned from
    /// [`Channel::connect`] to never miss `Ready`.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    /// Whether the channel is still usable. Monotonic: once `false`, never `true` again.
    pub fn is_alive(&self) -> bool {
        self.queue.is_alive()
    }

    /// Submit a raw wire command (must already be newline-terminated) and await its
    /// parsed [`Response`]. Used by the command library; exposed for verbs this
    /// crate does not yet implement natively.
    pub async fn send_raw(
        &self,
        command: String,
        timeout: Option<CommandTimeout>,
    ) -> Result<Response, AgiError> {
        self.queue.submit(command, timeout).await
    }

    /// Drain the queue, rejecting every pending entry. Returns how many were rejected.
    pub async fn clear_command_queue(&self) -> usize {
        self.queue.clear().await
    }

    /// A snapshot of the queue's current state.
    pub async fn get_queue_stats(&self) -> QueueStats {
        self.queue.stats().await
    }

    /// Mark this channel dead without waiting for the socket to close. Used by verbs
    /// (`ASYNCAGI BREAK`) that close the channel on success.
    pub async fn close(&self) -> usize {
        self.queue.close().await
    }

    /// Format, submit, and interpret a typed [`AGICommand`](crate::command::AGICommand).
    ///
    /// `200` is delegated to the command's own `Response::try_from`; `510`/`511`/`520`
    /// are the fixed Asterisk status codes (invalid, dead channel, end usage).
    pub async fn send<C>(&self, command: C) -> Result<C::Response, AgiError>
    where
        C: crate::command::AGICommand,
    {
        self.send_with_timeout(command, None).await
    }

    /// As [`Channel::send`], but with an explicit timeout overriding the verb's default.
    pub async fn send_with_timeout<C>(
        &self,
        command: C,
        timeout: Option<CommandTimeout>,
    ) -> Result<C::Response, AgiError>
    where
        C: crate::command::AGICommand,
    {
        let wire = command.to_string();
        let response = self.send_raw(wire.clone(), timeout).await?;
        match response.code {
            200 => C::Response::try_from(response).map_err(|e| AgiError::CommandRejected {
                command: wire,
                reason: e.to_string(),
            }),
            510 => Err(AgiError::CommandRejected {
                command: wire,
                reason: "invalid or unknown command".to_owned(),
            }),
            511 => Err(AgiError::ChannelDead {
                reason: crate::error::ChannelDeathReason::ChannelClosed,
            }),
            520 => Err(AgiError::CommandRejected {
                command: wire,
                reason: "command used the wrong number of arguments".to_owned(),
            }),
            other => Err(AgiError::Protocol(format!(
                "unexpected status code {other} for `{}`",
                wire.trim_end()
            ))),
        }
    }
}

async fn run_reader(
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    mut framer: Framer,
    reader_tx: mpsc::UnboundedSender<ReaderEvent>,
) {
    let mut buf = vec![0_u8; READ_BUF_SIZE];
    loop {
        let n = match read_half.read(&mut buf).await {
            Ok(0) => {
                #[cfg(feature = "tracing")]
                debug!("socket closed by peer");
                let _ = reader_tx.send(ReaderEvent::Closed);
                return;
            }
            Ok(n) => n,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "socket read failed");
                let _ = reader_tx.send(ReaderEvent::Closed);
                return;
            }
        };
        let Ok(chunk) = std::str::from_utf8(&buf[..n]) else {
            let _ = reader_tx.send(ReaderEvent::ProtocolError(
                "response bytes were not valid utf-8".to_owned(),
            ));
            return;
        };
        for line in framer.push(chunk, ChannelState::Waiting) {
            match ResponseParser::parse(&line) {
                Ok(ParsedLine::Hangup) => {
                    #[cfg(feature = "tracing")]
                    debug!("HANGUP received from Asterisk");
                    let _ = reader_tx.send(ReaderEvent::Hangup);
                    return;
                }
                Ok(ParsedLine::Response(resp)) => {
                    #[cfg(feature = "tracing")]
                    trace!(
                        code = resp.code,
                        result = resp.result,
                        "response line parsed"
                    );
                    if reader_tx.send(ReaderEvent::Response(resp)).is_err() {
                        return;
                    }
                }
                Err(AgiError::Protocol(msg)) => {
                    #[cfg(feature = "tracing")]
                    error!(%msg, "protocol error parsing response line");
                    let _ = reader_tx.send(ReaderEvent::ProtocolError(msg));
                    return;
                }
                Err(_) => {
                    let _ = reader_tx.send(ReaderEvent::ProtocolError(
                        "unparsable response line".to_owned(),
                    ));
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::tcp::OwnedReadHalf;
    use tokio::net::{TcpListener, TcpStream};

    use crate::command::dtmf::get_data;
    use crate::command::{GetVariable, SetVariable};
    use crate::error::ChannelDeathReason;

    async fn mock_read_line(reader: &mut BufReader<OwnedReadHalf>) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        line
    }

    async fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
        let client = TcpStream::connect(addr).await.unwrap();
        let server = accept.await.unwrap();
        (client, server)
    }

    const HEADER: &str = "agi_network: yes\n\
        agi_channel: SIP/1\n\
        agi_uniqueid: 1.1\n\n";

    #[tokio::test]
    async fn connect_parses_header_and_emits_ready() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();

        let (channel, mut rx) = Channel::connect(server_stream, ChannelConfig::default())
            .await
            .unwrap();
        assert_eq!(channel.metadata().channel, "SIP/1");
        assert!(matches!(rx.recv().await.unwrap(), ChannelEvent::Ready));
    }

    #[tokio::test]
    async fn answer_then_hangup_round_trip() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();
        let (channel, _rx) = Channel::connect(server_stream, ChannelConfig::default())
            .await
            .unwrap();

        let mock = tokio::spawn(async move {
            let mut buf = [0_u8; 256];
            let n = mock_asterisk.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"ANSWER\n");
            mock_asterisk.write_all(b"200 result=0\n").await.unwrap();
            let n = mock_asterisk.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"HANGUP \n");
            mock_asterisk.write_all(b"200 result=1\n").await.unwrap();
        });

        let answer = channel.send_raw("ANSWER\n".to_owned(), None).await.unwrap();
        assert_eq!(answer.result, 0);
        let hangup = channel
            .send_raw("HANGUP \n".to_owned(), None)
            .await
            .unwrap();
        assert_eq!(hangup.result, 1);
        mock.await.unwrap();
    }

    #[tokio::test]
    async fn get_variable_success_returns_value() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();
        let (channel, _rx) = Channel::connect(server_stream, ChannelConfig::default())
            .await
            .unwrap();

        let mock = tokio::spawn(async move {
            let mut buf = [0_u8; 256];
            let n = mock_asterisk.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"GET VARIABLE foo\n");
            mock_asterisk
                .write_all(b"200 result=1 (bar)\n")
                .await
                .unwrap();
        });

        let value = channel
            .send(GetVariable::new("foo".to_owned()))
            .await
            .unwrap();
        assert_eq!(value.value, "bar");
        mock.await.unwrap();
    }

    #[tokio::test]
    async fn get_variable_unset_is_rejected() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();
        let (channel, _rx) = Channel::connect(server_stream, ChannelConfig::default())
            .await
            .unwrap();

        let mock = tokio::spawn(async move {
            let mut buf = [0_u8; 256];
            let _n = mock_asterisk.read(&mut buf).await.unwrap();
            mock_asterisk.write_all(b"200 result=0\n").await.unwrap();
        });

        let err = channel
            .send(GetVariable::new("foo".to_owned()))
            .await
            .unwrap_err();
        match err {
            AgiError::CommandRejected { reason, .. } => {
                assert!(reason.contains("variable not set"));
            }
            other => panic!("expected CommandRejected, got {other:?}"),
        }
        mock.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_submits_preserve_fifo_wire_order() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();
        let (channel, mut rx) = Channel::connect(server_stream, ChannelConfig::default())
            .await
            .unwrap();
        let channel = Arc::new(channel);

        let (mock_read, mut mock_write) = mock_asterisk.into_split();
        let mut mock_read = BufReader::new(mock_read);

        let mut submitters = Vec::new();
        for (name, value) in [("A", "1"), ("B", "2"), ("C", "3")] {
            let channel = channel.clone();
            submitters.push(tokio::spawn(async move {
                channel
                    .send(SetVariable::new(name.to_owned(), value.to_owned()))
                    .await
            }));
            // Give the worker a chance to pop and write this submission before the
            // next one is spawned, so wire order matches submission order.
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }

        for (name, value) in [("A", "1"), ("B", "2"), ("C", "3")] {
            let line = mock_read_line(&mut mock_read).await;
            assert_eq!(line, format!("SET VARIABLE \"{name}\" \"{value}\"\n"));
            mock_write.write_all(b"200 result=1\n").await.unwrap();
        }

        for submitter in submitters {
            submitter.await.unwrap().unwrap();
        }

        let mut processed_order = Vec::new();
        while processed_order.len() < 3 {
            match rx.recv().await.unwrap() {
                ChannelEvent::CommandProcessed { command, .. } => processed_order.push(command),
                _ => continue,
            }
        }
        assert!(processed_order[0].contains("\"A\""));
        assert!(processed_order[1].contains("\"B\""));
        assert!(processed_order[2].contains("\"C\""));
    }

    #[tokio::test]
    async fn timeout_then_continue_resolves_next_command() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();
        let config = ChannelConfig::default();
        let (channel, _rx) = Channel::connect(server_stream, config).await.unwrap();
        let channel = Arc::new(channel);

        let (mock_read, mut mock_write) = mock_asterisk.into_split();
        let mut mock_read = BufReader::new(mock_read);

        let short_timeout = Some(CommandTimeout::After(Duration::from_millis(50)));
        let c1 = channel.clone();
        let first =
            tokio::spawn(async move { c1.send_raw("ANSWER\n".to_owned(), short_timeout).await });
        let first_line = mock_read_line(&mut mock_read).await;
        assert_eq!(first_line, "ANSWER\n");

        let c2 = channel.clone();
        let second = tokio::spawn(async move {
            c2.send_raw("NOOP\n".to_owned(), Some(CommandTimeout::Unbounded))
                .await
        });

        let first_result = first.await.unwrap();
        assert!(matches!(first_result, Err(AgiError::Timeout { .. })));

        let second_line = mock_read_line(&mut mock_read).await;
        assert_eq!(second_line, "NOOP\n");
        // Asterisk's synchronous protocol still owes a reply for the timed-out
        // command before it can reply to the next one; that late reply must be
        // discarded rather than resolving `second`.
        mock_write.write_all(b"200 result=0\n").await.unwrap();
        mock_write.write_all(b"200 result=0\n").await.unwrap();

        let second_result = second.await.unwrap().unwrap();
        assert_eq!(second_result.result, 0);

        let stats = channel.get_queue_stats().await;
        assert_eq!(stats.size, 0);
        assert_eq!(stats.processing, 0);
    }

    #[tokio::test]
    async fn composite_get_data_drives_four_wait_for_digit_calls() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();
        let (channel, _rx) = Channel::connect(server_stream, ChannelConfig::default())
            .await
            .unwrap();

        let (mock_read, mut mock_write) = mock_asterisk.into_split();
        let mut mock_read = BufReader::new(mock_read);

        let mock = tokio::spawn(async move {
            let stream_file_line = mock_read_line(&mut mock_read).await;
            assert_eq!(stream_file_line, "STREAM FILE prompt \"0123456789*#\"\n");
            mock_write
                .write_all(b"200 result=0 endpos=16000\n")
                .await
                .unwrap();

            let mut wait_for_digit_calls = 0;
            for ascii in [49_i64, 50, 51, 52] {
                let line = mock_read_line(&mut mock_read).await;
                assert_eq!(line, "WAIT FOR DIGIT 3\n");
                wait_for_digit_calls += 1;
                mock_write
                    .write_all(format!("200 result={ascii}\n").as_bytes())
                    .await
                    .unwrap();
            }
            wait_for_digit_calls
        });

        let result = get_data(&channel, "prompt", 10000, Some(4), Some(3000))
            .await
            .unwrap();
        assert_eq!(result.digits, "1234");
        assert!(!result.timeout);
        assert_eq!(mock.await.unwrap(), 4);
    }

    #[tokio::test]
    async fn hangup_during_queue_rejects_in_flight_and_waiting() {
        let (mut mock_asterisk, server_stream) = connected_pair().await;
        mock_asterisk.write_all(HEADER.as_bytes()).await.unwrap();
        let (channel, mut rx) = Channel::connect(server_stream, ChannelConfig::default())
            .await
            .unwrap();
        let channel = Arc::new(channel);

        let c1 = channel.clone();
        let in_flight = tokio::spawn(async move {
            c1.send_raw("ANSWER\n".to_owned(), Some(CommandTimeout::Unbounded))
                .await
        });
        // Let the worker write ANSWER before the second command is submitted,
        // so it queues behind the in-flight one instead of also being written.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let mut buf = [0_u8; 256];
        let n = mock_asterisk.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ANSWER\n");

        let c2 = channel.clone();
        let waiting = tokio::spawn(async move {
            c2.send_raw("NOOP\n".to_owned(), Some(CommandTimeout::Unbounded))
                .await
        });
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        mock_asterisk.write_all(b"HANGUP\n").await.unwrap();

        let in_flight_result = in_flight.await.unwrap();
        let waiting_result = waiting.await.unwrap();
        assert!(matches!(
            in_flight_result,
            Err(AgiError::ChannelDead {
                reason: ChannelDeathReason::Hangup
            })
        ));
        assert!(matches!(
            waiting_result,
            Err(AgiError::ChannelDead {
                reason: ChannelDeathReason::Hangup
            })
        ));

        let mut saw_queue_cleared = false;
        loop {
            match rx.recv().await.unwrap() {
                ChannelEvent::QueueCleared { reason, count } => {
                    assert_eq!(reason, ChannelDeathReason::Hangup);
                    assert_eq!(count, 1);
                    saw_queue_cleared = true;
                }
                ChannelEvent::Close => break,
                _ => continue,
            }
        }
        assert!(saw_queue_cleared);
    }
}
