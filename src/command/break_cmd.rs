//! `ASYNCAGI BREAK`, per spec §4.5's "async break" verb: on success, the
//! channel is handed back to the dialplan and the queue is torn down.
use super::{expect_result, AGICommand, CommandError};
use crate::channel::Channel;
use crate::error::AgiError;
use crate::response::Response;

/// `ASYNCAGI BREAK`, the wire command only; see [`break_channel`] for the
/// full operation including the queue shutdown.
#[derive(Debug)]
pub struct Break;
impl std::fmt::Display for Break {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "ASYNCAGI BREAK")
    }
}
impl AGICommand for Break {
    type Response = BreakResponse;
}

#[derive(Debug, PartialEq, Eq)]
pub struct BreakResponse;
impl TryFrom<Response> for BreakResponse {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        expect_result(&response, "ASYNCAGI BREAK", 1).map(|()| BreakResponse)
    }
}

/// Issue `ASYNCAGI BREAK`, and on success close the channel's command queue,
/// rejecting anything still waiting.
pub async fn break_channel(channel: &Channel) -> Result<(), AgiError> {
    channel.send(Break).await?;
    channel.close().await;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::response::{ParsedLine, ResponseParser};

    #[test]
    fn formats_bare() {
        assert_eq!(Break.to_string(), "ASYNCAGI BREAK\n");
    }

    #[test]
    fn parses_success() {
        let ParsedLine::Response(response) = ResponseParser::parse("200 result=1\n").unwrap()
        else {
            panic!("expected response")
        };
        assert!(BreakResponse::try_from(response).is_ok());
    }

    #[test]
    fn rejects_unexpected_result() {
        let ParsedLine::Response(response) = ResponseParser::parse("200 result=0\n").unwrap()
        else {
            panic!("expected response")
        };
        assert!(BreakResponse::try_from(response).is_err());
    }
}
