//! Defines the `GET FULL VARIABLE` command and its possible responses.
//!
//! Grounded on the teacher's module of the same name: same typestate
//! `TargetChannel` trait so a default (own-channel) and an explicit-channel
//! variant can't be confused at the type level, generalized to parse via
//! the argument bag (`arguments.nokey()`) instead of a raw operational-data
//! tuple.
use super::{AGICommand, CommandError};
use crate::response::Response;

pub trait TargetChannel: Send + Sync + std::fmt::Debug {}
#[derive(Debug, PartialEq)]
/// Use the channel that originated the FastAGI call.
pub struct ThisChannel {}
impl TargetChannel for ThisChannel {}
#[derive(Debug, PartialEq)]
/// Use the given channel name to evaluate the expression.
pub struct OtherChannel {
    channel_name: String,
}
impl TargetChannel for OtherChannel {}

/// Evaluate a dialplan expression in a channel (defaults to the current channel).
#[derive(Debug, PartialEq)]
pub struct GetFullVariable<S: TargetChannel> {
    expression: String,
    channel_name: S,
}
impl GetFullVariable<ThisChannel> {
    pub fn new(expression: String) -> Self {
        Self {
            expression,
            channel_name: ThisChannel {},
        }
    }

    pub fn with_channel(self, channel: String) -> GetFullVariable<OtherChannel> {
        GetFullVariable::<OtherChannel> {
            expression: self.expression,
            channel_name: OtherChannel {
                channel_name: channel,
            },
        }
    }
}

impl std::fmt::Display for GetFullVariable<ThisChannel> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "GET FULL VARIABLE \"{}\"", self.expression)
    }
}
impl std::fmt::Display for GetFullVariable<OtherChannel> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "GET FULL VARIABLE \"{}\" \"{}\"",
            self.expression, self.channel_name.channel_name
        )
    }
}
impl AGICommand for GetFullVariable<OtherChannel> {
    type Response = GetFullVariableResponse;
}
impl AGICommand for GetFullVariable<ThisChannel> {
    type Response = GetFullVariableResponse;
}

/// The value of the evaluated expression, or `None` if Asterisk could not evaluate it
/// (nonexistent function or variable).
#[derive(Debug, PartialEq)]
pub struct GetFullVariableResponse {
    pub value: Option<String>,
}
impl TryFrom<Response> for GetFullVariableResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        match response.result {
            1 => Ok(GetFullVariableResponse {
                value: response.arguments.nokey().map(str::to_owned),
            }),
            0 => Ok(GetFullVariableResponse { value: None }),
            other => Err(CommandError {
                response_to_command: "GET FULL VARIABLE",
                result: other,
                detail: None,
            }),
        }
    }
}
