//! `EXEC Dial`, per spec §4.5's "dial" verb: issue the dialplan application,
//! then read `DIALSTATUS` back via `GET VARIABLE`.
use super::{get_variable::GetVariable, AGICommand, CommandError};
use crate::channel::Channel;
use crate::error::AgiError;
use crate::response::Response;

/// `EXEC Dial target,timeout,params`, the wire command only; see [`dial`]
/// for the full operation including the `DIALSTATUS` read-back.
#[derive(Debug)]
pub struct Dial {
    pub target: String,
    pub timeout_secs: Option<u32>,
    pub params: Option<String>,
}
impl std::fmt::Display for Dial {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut args = self.target.clone();
        if let Some(timeout) = self.timeout_secs {
            args.push(',');
            args.push_str(&timeout.to_string());
        }
        if let Some(params) = &self.params {
            if self.timeout_secs.is_none() {
                args.push(',');
            }
            args.push(',');
            args.push_str(params);
        }
        writeln!(f, "EXEC Dial \"{args}\"")
    }
}
impl AGICommand for Dial {
    type Response = DialExecResult;
}

#[derive(Debug, PartialEq, Eq)]
pub struct DialExecResult;
impl TryFrom<Response> for DialExecResult {
    type Error = CommandError;
    fn try_from(response: Response) -> Result<Self, Self::Error> {
        match response.result {
            -2 => Err(CommandError {
                response_to_command: "EXEC Dial",
                result: response.result,
                detail: Some("application not found".to_owned()),
            }),
            -1 => Err(CommandError {
                response_to_command: "EXEC Dial",
                result: response.result,
                detail: None,
            }),
            _ => Ok(DialExecResult),
        }
    }
}

/// The outcome Asterisk reports via the `DIALSTATUS` channel variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialStatus {
    Answer,
    Busy,
    NoAnswer,
    Cancel,
    Congestion,
    ChanUnavailable,
    DontCall,
    Torture,
    InvalidArgs,
}
impl DialStatus {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "ANSWER" => DialStatus::Answer,
            "BUSY" => DialStatus::Busy,
            "NOANSWER" => DialStatus::NoAnswer,
            "CANCEL" => DialStatus::Cancel,
            "CONGESTION" => DialStatus::Congestion,
            "CHANUNAVAIL" => DialStatus::ChanUnavailable,
            "DONTCALL" => DialStatus::DontCall,
            "TORTURE" => DialStatus::Torture,
            "INVALIDARGS" => DialStatus::InvalidArgs,
            _ => return None,
        })
    }
}

/// Issue `EXEC Dial`, then read `DIALSTATUS` and map it to [`DialStatus`].
pub async fn dial(
    channel: &Channel,
    target: &str,
    timeout_secs: Option<u32>,
    params: Option<&str>,
) -> Result<DialStatus, AgiError> {
    channel
        .send(Dial {
            target: target.to_owned(),
            timeout_secs,
            params: params.map(str::to_owned),
        })
        .await?;
    let status = channel
        .send(GetVariable::new("DIALSTATUS".to_owned()))
        .await?;
    DialStatus::parse(&status.value).ok_or_else(|| AgiError::CommandRejected {
        command: "EXEC Dial".to_owned(),
        reason: format!("unrecognized DIALSTATUS {:?}", status.value),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_target_only() {
        let cmd = Dial {
            target: "SIP/100".to_owned(),
            timeout_secs: None,
            params: None,
        };
        assert_eq!(cmd.to_string(), "EXEC Dial \"SIP/100\"\n");
    }

    #[test]
    fn formats_target_and_timeout() {
        let cmd = Dial {
            target: "SIP/100".to_owned(),
            timeout_secs: Some(30),
            params: None,
        };
        assert_eq!(cmd.to_string(), "EXEC Dial \"SIP/100,30\"\n");
    }

    #[test]
    fn parses_known_status() {
        assert_eq!(DialStatus::parse("BUSY"), Some(DialStatus::Busy));
        assert_eq!(DialStatus::parse("NONSENSE"), None);
    }
}
