//! fastagi_channel is a server-side implementation of Asterisk's Gateway
//! Interface protocol over TCP (FastAGI): the per-connection protocol
//! engine, not the listener around it.
//!
//! fastagi_channel requires the use of tokio. Executor independence is
//! currently not a goal.
//!
//! An Asterisk PBX, while processing a call in its dialplan, opens a TCP
//! connection to a FastAGI server, streams a header block describing the
//! call, and then exchanges a sequence of text commands and responses.
//! This crate owns exactly that exchange: accept a byte stream, parse the
//! header block into [`CallMetadata`], and expose a [`Channel`] through
//! which application code issues AGI verbs ([`command::Answer`],
//! [`command::StreamFile`], [`command::GetData`], ...) and gets back typed
//! results.
//!
//! Accepting connections and routing them to application logic is left to
//! the caller: a `TcpListener` loop handing each accepted stream to
//! [`Channel::connect`] is enough, or [`serve::serve`] for the same loop
//! already written out.
//!
//! ```no_run
//! use fastagi_channel::{channel::Channel, command::Answer, config::ChannelConfig};
//! use tokio::net::TcpListener;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let listener = TcpListener::bind("0.0.0.0:4573").await?;
//! loop {
//!     let (stream, _) = listener.accept().await?;
//!     tokio::spawn(async move {
//!         let (channel, _events) = Channel::connect(stream, ChannelConfig::default()).await?;
//!         channel.send(Answer {}).await?;
//!         Ok::<_, fastagi_channel::error::AgiError>(())
//!     });
//! }
//! # }
//! ```
//!
//! See `demos/simple_server.rs` for a complete runnable version.

pub mod agiparse;
pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod framer;
pub mod queue;
pub mod response;
pub mod serve;

pub use agiparse::CallMetadata;
pub use channel::Channel;
pub use error::AgiError;
pub use queue::{ChannelEvent, QueueStats};
pub use response::{Arguments, Response};
pub use serve::serve;
