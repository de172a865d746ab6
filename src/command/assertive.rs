//! Trivial assertive verbs: a fixed wire format, a single expected `result`
//! on success, a [`CommandError`](super::CommandError) otherwise.
//!
//! Grounded on the teacher's `Answer`/`SetVariable` modules (same
//! Display-formats-the-wire-command, `TryFrom`-interprets-the-reply shape),
//! generalized over a dozen verbs that all share that shape instead of one
//! handwritten impl per verb.
use super::{expect_result, AGICommand, CommandError};
use crate::response::Response;

macro_rules! assertive_command {
    ($name:ident, $response:ident, $verb:literal, $expected:expr, $fmt:expr, ($($field:ident: $ty:ty),*)) => {
        #[derive(Debug)]
        pub struct $name {
            $(pub $field: $ty,)*
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                #[allow(unused_variables)]
                let this = self;
                write!(f, "{}", $fmt(this))
            }
        }
        #[derive(Debug, PartialEq, Eq)]
        pub struct $response;
        impl TryFrom<Response> for $response {
            type Error = CommandError;
            fn try_from(response: Response) -> Result<Self, Self::Error> {
                expect_result(&response, $verb, $expected).map(|()| $response)
            }
        }
        impl AGICommand for $name {
            type Response = $response;
        }
    };
}

assertive_command!(
    Answer,
    AnswerResponse,
    "ANSWER",
    0,
    |_: &Answer| "ANSWER\n".to_owned(),
    ()
);

assertive_command!(
    Noop,
    NoopResponse,
    "NOOP",
    0,
    |_: &Noop| "NOOP\n".to_owned(),
    ()
);

assertive_command!(
    Hangup,
    HangupResponse,
    "HANGUP",
    1,
    |_: &Hangup| "HANGUP \n".to_owned(),
    ()
);

assertive_command!(
    SetContext,
    SetContextResponse,
    "SET CONTEXT",
    0,
    |this: &SetContext| format!("SET CONTEXT {}\n", this.context),
    (context: String)
);

assertive_command!(
    SetExtension,
    SetExtensionResponse,
    "SET EXTENSION",
    0,
    |this: &SetExtension| format!("SET EXTENSION {}\n", this.extension),
    (extension: String)
);

assertive_command!(
    SetPriority,
    SetPriorityResponse,
    "SET PRIORITY",
    0,
    |this: &SetPriority| format!("SET PRIORITY {}\n", this.priority),
    (priority: String)
);

assertive_command!(
    SetAutoHangup,
    SetAutoHangupResponse,
    "SET AUTOHANGUP",
    0,
    |this: &SetAutoHangup| format!("SET AUTOHANGUP {}\n", this.seconds),
    (seconds: u32)
);

assertive_command!(
    SetMusic,
    SetMusicResponse,
    "SET MUSIC",
    0,
    |this: &SetMusic| {
        let toggle = if this.on { "on" } else { "off" };
        match &this.class {
            Some(class) => format!("SET MUSIC {toggle} {class}\n"),
            None => format!("SET MUSIC {toggle}\n"),
        }
    },
    (on: bool, class: Option<String>)
);

assertive_command!(
    TddMode,
    TddModeResponse,
    "TDD MODE",
    1,
    |this: &TddMode| {
        let mode = if this.on { "on" } else { "off" };
        format!("TDD MODE {mode}\n")
    },
    (on: bool)
);

assertive_command!(
    SendImage,
    SendImageResponse,
    "SEND IMAGE",
    0,
    |this: &SendImage| format!("SEND IMAGE {}\n", this.image),
    (image: String)
);

assertive_command!(
    SendText,
    SendTextResponse,
    "SEND TEXT",
    0,
    |this: &SendText| format!("SEND TEXT \"{}\"\n", this.text),
    (text: String)
);

assertive_command!(
    GoSub,
    GoSubResponse,
    "GOSUB",
    0,
    |this: &GoSub| match &this.arg {
        Some(arg) => format!(
            "GOSUB {} {} {} {arg}\n",
            this.context, this.extension, this.priority
        ),
        None => format!("GOSUB {} {} {}\n", this.context, this.extension, this.priority),
    },
    (context: String, extension: String, priority: String, arg: Option<String>)
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn answer_formats_bare() {
        assert_eq!(Answer {}.to_string(), "ANSWER\n");
    }

    #[test]
    fn answer_parses_success() {
        let response = Response {
            code: 200,
            result: 0,
            arguments: Default::default(),
        };
        assert_eq!(AnswerResponse::try_from(response), Ok(AnswerResponse));
    }

    #[test]
    fn answer_rejects_unexpected_result() {
        let response = Response {
            code: 200,
            result: -1,
            arguments: Default::default(),
        };
        assert!(AnswerResponse::try_from(response).is_err());
    }

    #[test]
    fn set_music_formats_with_class() {
        let cmd = SetMusic {
            on: true,
            class: Some("default".to_owned()),
        };
        assert_eq!(cmd.to_string(), "SET MUSIC on default\n");
    }

    #[test]
    fn set_music_formats_without_class() {
        let cmd = SetMusic {
            on: false,
            class: None,
        };
        assert_eq!(cmd.to_string(), "SET MUSIC off\n");
    }

    #[test]
    fn hangup_command_formats_with_trailing_space() {
        assert_eq!(Hangup {}.to_string(), "HANGUP \n");
    }
}
