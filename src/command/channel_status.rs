//! Defines the `CHANNEL STATUS` AGI command, per spec §4.5's "status" verb group.
use super::AGICommand;
use crate::response::Response;

/// Query the state of the current channel, or another named channel.
#[derive(Debug)]
pub struct ChannelStatus {
    pub channel: Option<String>,
}
impl ChannelStatus {
    pub fn this_channel() -> Self {
        Self { channel: None }
    }

    pub fn named(channel: String) -> Self {
        Self {
            channel: Some(channel),
        }
    }
}
impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.channel {
            Some(name) => writeln!(f, "CHANNEL STATUS {name}"),
            None => writeln!(f, "CHANNEL STATUS"),
        }
    }
}
impl AGICommand for ChannelStatus {
    type Response = AsteriskChannelState;
}

/// The channel state Asterisk reports, per its documented `AST_STATE_*`
/// enumeration. Named distinctly from [`crate::framer::ChannelState`], which
/// tracks header-vs-command framing rather than call state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsteriskChannelState {
    Down,
    Reserved,
    OffHook,
    Dialing,
    Ring,
    Ringing,
    Up,
    Busy,
    DialingOffHook,
    PreRing,
    Unknown(i64),
}
impl TryFrom<Response> for AsteriskChannelState {
    type Error = super::CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        Ok(match response.result {
            0 => AsteriskChannelState::Down,
            1 => AsteriskChannelState::Reserved,
            2 => AsteriskChannelState::OffHook,
            3 => AsteriskChannelState::Dialing,
            4 => AsteriskChannelState::Ring,
            5 => AsteriskChannelState::Ringing,
            6 => AsteriskChannelState::Up,
            7 => AsteriskChannelState::Busy,
            8 => AsteriskChannelState::DialingOffHook,
            9 => AsteriskChannelState::PreRing,
            other => AsteriskChannelState::Unknown(other),
        })
    }
}
