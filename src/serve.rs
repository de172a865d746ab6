//! A minimal connection-accepting loop, per spec §6.
//!
//! Grounded on the teacher's `serve::serve` for the accept-loop shape
//! (`TcpListener::accept` in a loop, one spawned task per connection), with
//! the teacher's `Router`/`Handler`/`Layer` dispatch removed: this crate's
//! only contract with the listener is handing it a byte stream and letting
//! it observe `ready`/`hangup`/`close`/`error`, so `serve` hands the
//! application a [`Channel`] directly instead of routing by request path.
use std::future::Future;

use tokio::net::TcpListener;
#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::config::ChannelConfig;
use crate::error::AgiError;

/// Accept connections from `listener` forever, spawning a [`Channel`] per
/// connection and handing it to `handler` once the header block is consumed
/// and the channel reports `ready`.
///
/// A single connection failing its header handshake does not stop the
/// loop; it is logged (when the `tracing` feature is enabled) and dropped.
/// Returns only if `listener.accept()` itself fails.
pub async fn serve<H, Fut>(
    listener: TcpListener,
    config: ChannelConfig,
    handler: H,
) -> Result<(), AgiError>
where
    H: Fn(Channel) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        let (stream, _addr) = listener.accept().await?;
        let config = config.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            match Channel::connect(stream, config).await {
                Ok((channel, _events)) => {
                    #[cfg(feature = "tracing")]
                    debug!(channel = %channel.metadata().channel, "handing channel to application");
                    handler(channel).await;
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    warn!(error = %_e, "channel setup failed, dropping connection");
                }
            }
        });
    }
}
