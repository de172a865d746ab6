//! If you want to use a command that is not yet implemented, use [`RawCommand`].
//! Please check whether the command is already implemented and use the proper
//! type if available: that gives much more type safety than [`RawCommand`].
use super::{AGICommand, CommandError};
use crate::response::Response;

/// Issue a raw command to Asterisk, for verbs this crate does not yet model natively.
#[derive(Debug)]
pub struct RawCommand {
    command: String,
}
impl RawCommand {
    /// A trailing `\n` is added; no other interpolation happens.
    pub fn new(command: String) -> Self {
        Self { command }
    }
}
impl std::fmt::Display for RawCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{}", self.command)
    }
}
impl AGICommand for RawCommand {
    type Response = RawCommandResponse;
}

/// No interpretation happens on the reply; it is destructured as-is.
#[derive(Debug, PartialEq)]
pub struct RawCommandResponse {
    pub result: i64,
    pub arguments: crate::response::Arguments,
}
impl TryFrom<Response> for RawCommandResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        Ok(RawCommandResponse {
            result: response.result,
            arguments: response.arguments,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_command() {
        let cmd = RawCommand::new("SAY DIGITS 1425 07".to_owned());
        assert_eq!(cmd.to_string(), "SAY DIGITS 1425 07\n");
    }
}
