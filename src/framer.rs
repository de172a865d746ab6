//! Splits an incrementally-arriving byte stream into records, per spec §4.1.
//!
//! Grounded on the teacher's `AGIMessageBuffer` (`src/connection.rs`), which
//! strips a single line-oriented message off an accumulating buffer. This
//! version generalizes that to the two framing states a `Channel` passes
//! through: the header block (terminated by a blank line) and, after that,
//! individual response lines.

/// Which record shape the [`Framer`] is currently looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Accumulate until a blank line terminates the header block.
    Init,
    /// Emit each newline-terminated line as its own record.
    Waiting,
}

/// Accumulates inbound bytes and yields complete records.
///
/// The Framer is purely data-driven: it never times out, it only
/// accumulates bytes until a record boundary appears.
#[derive(Debug, Default)]
pub struct Framer {
    buf: String,
}

impl Framer {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Append freshly-read bytes and return every record that is now complete,
    /// in arrival order. `state` tells the framer which record shape to expect;
    /// callers must switch it to `Waiting` once the header record has been consumed.
    pub fn push(&mut self, bytes: &str, state: ChannelState) -> Vec<String> {
        self.buf.push_str(bytes);
        match state {
            ChannelState::Init => self.take_header_record(),
            ChannelState::Waiting => self.take_lines(),
        }
    }

    fn take_header_record(&mut self) -> Vec<String> {
        match self.buf.find("\n\n") {
            Some(idx) => {
                let record: String = self.buf.drain(..idx + 2).collect();
                vec![record]
            }
            None => Vec::new(),
        }
    }

    fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=idx).collect();
            // An empty line (bare "\n") is discarded, per spec §4.1.
            if line != "\n" {
                lines.push(line);
            }
        }
        lines
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_record_waits_for_blank_line() {
        let mut f = Framer::new();
        assert_eq!(
            f.push("agi_network: yes\n", ChannelState::Init),
            Vec::<String>::new()
        );
        let out = f.push("agi_channel: SIP/1\n\n", ChannelState::Init);
        assert_eq!(out, vec!["agi_network: yes\nagi_channel: SIP/1\n\n"]);
        assert_eq!(f.buf, "");
    }

    #[test]
    fn waiting_emits_each_line_separately() {
        let mut f = Framer::new();
        let out = f.push("200 result=1\n200 result=0\n", ChannelState::Waiting);
        assert_eq!(out, vec!["200 result=1\n", "200 result=0\n"]);
    }

    #[test]
    fn waiting_buffers_partial_line() {
        let mut f = Framer::new();
        assert_eq!(
            f.push("200 resu", ChannelState::Waiting),
            Vec::<String>::new()
        );
        assert_eq!(
            f.push("lt=1\n", ChannelState::Waiting),
            vec!["200 result=1\n"]
        );
    }

    #[test]
    fn waiting_discards_empty_lines() {
        let mut f = Framer::new();
        let out = f.push("\n200 result=1\n", ChannelState::Waiting);
        assert_eq!(out, vec!["200 result=1\n"]);
    }
}
