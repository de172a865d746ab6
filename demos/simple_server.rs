//! A minimal FastAGI server: accept connections, answer the call, play a
//! prompt, collect a few digits, and hang up.
use fastagi_channel::channel::Channel;
use fastagi_channel::command::{get_data, Answer, Hangup, Verbose};
use fastagi_channel::config::ChannelConfig;
use tokio::net::TcpListener;

async fn handle(channel: Channel) -> Result<(), fastagi_channel::error::AgiError> {
    channel.send(Answer {}).await?;
    channel.send(Verbose::new("hi there".to_owned())).await?;

    let digits = get_data(&channel, "please-enter-your-pin", 10_000, Some(4), Some(3_000)).await?;
    if digits.timeout {
        channel
            .send(Verbose::new("caller entered no digits".to_owned()))
            .await?;
    }

    channel.send(Hangup {}).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("0.0.0.0:5473").await?;
    loop {
        let (stream, _) = listener.accept().await?;
        tokio::spawn(async move {
            let (channel, _events) = Channel::connect(stream, ChannelConfig::default()).await?;
            handle(channel).await
        });
    }
}
