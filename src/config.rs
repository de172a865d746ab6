//! Construction-time configuration: queue size, default timeouts, and the
//! context-sensitive per-verb timeout table of spec §4.4.
use std::time::Duration;

/// A command's effective timeout. `Unbounded` is a distinct variant (not a
/// magic duration) per the design note in spec §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTimeout {
    /// Disable the timer; the command only resolves on response or channel death.
    Unbounded,
    /// Reject the command if no response arrives within this duration.
    After(Duration),
}

impl CommandTimeout {
    /// A zero or negative (i.e. zero, since we only have unsigned millis) timeout is
    /// treated as unbounded, per spec §8 boundaries.
    pub fn from_millis(millis: i64) -> Self {
        if millis <= 0 {
            Self::Unbounded
        } else {
            Self::After(Duration::from_millis(millis as u64))
        }
    }
}

/// Construction-time-overridable defaults for a [`Channel`](crate::channel::Channel).
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Maximum number of commands that may be queued (including the in-flight one).
    pub max_queue_size: usize,
    /// Default timeout used when a verb's leading token does not match a known prefix.
    pub default_command_timeout: Duration,
    /// Upper bound used as the default timeout for `EXEC` commands.
    pub max_call_duration: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 100,
            default_command_timeout: Duration::from_secs(10),
            max_call_duration: Duration::from_secs(6 * 60 * 60),
        }
    }
}

impl ChannelConfig {
    /// The context-sensitive default timeout for a wire command, selected by its leading
    /// verb per the table in spec §4.4.
    pub fn default_timeout_for(&self, command: &str) -> CommandTimeout {
        let trimmed = command.trim_end();
        let prefix_matches = |prefixes: &[&str]| prefixes.iter().any(|p| trimmed.starts_with(p));

        if prefix_matches(&[
            "ANSWER",
            "HANGUP",
            "CHANNEL STATUS",
            "GET VARIABLE",
            "SET VARIABLE",
            "DATABASE",
        ]) {
            CommandTimeout::After(Duration::from_secs(10))
        } else if prefix_matches(&["STREAM FILE", "SAY", "GET DATA", "GET OPTION"]) {
            CommandTimeout::After(Duration::from_secs(60))
        } else if trimmed.starts_with("RECORD FILE") {
            CommandTimeout::After(Duration::from_secs(10 * 60))
        } else if trimmed.starts_with("EXEC") {
            CommandTimeout::After(self.max_call_duration)
        } else {
            CommandTimeout::After(self.default_command_timeout)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn answer_gets_ten_seconds() {
        let cfg = ChannelConfig::default();
        assert_eq!(
            cfg.default_timeout_for("ANSWER\n"),
            CommandTimeout::After(Duration::from_secs(10))
        );
    }

    #[test]
    fn stream_file_gets_sixty_seconds() {
        let cfg = ChannelConfig::default();
        assert_eq!(
            cfg.default_timeout_for("STREAM FILE foo \"0123\"\n"),
            CommandTimeout::After(Duration::from_secs(60))
        );
    }

    #[test]
    fn record_file_gets_ten_minutes() {
        let cfg = ChannelConfig::default();
        assert_eq!(
            cfg.default_timeout_for("RECORD FILE foo wav # 10000\n"),
            CommandTimeout::After(Duration::from_secs(600))
        );
    }

    #[test]
    fn exec_gets_max_call_duration() {
        let cfg = ChannelConfig::default();
        assert_eq!(
            cfg.default_timeout_for("EXEC Dial SIP/100\n"),
            CommandTimeout::After(cfg.max_call_duration)
        );
    }

    #[test]
    fn unknown_verb_gets_default() {
        let cfg = ChannelConfig::default();
        assert_eq!(
            cfg.default_timeout_for("NOOP\n"),
            CommandTimeout::After(Duration::from_secs(10))
        );
    }

    #[test]
    fn zero_or_negative_timeout_is_unbounded() {
        assert_eq!(CommandTimeout::from_millis(0), CommandTimeout::Unbounded);
        assert_eq!(CommandTimeout::from_millis(-5), CommandTimeout::Unbounded);
    }
}
