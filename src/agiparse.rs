//! Parses the initial AGI header block into [`CallMetadata`].
//!
//! Grounded on the teacher's `AGIVariableDump`/`FromStr` impl
//! (`src/agiparse.rs`): same `agi_`-prefixed line splitting, relaxed per
//! spec §4.2 so that unknown suffixes are dropped silently rather than
//! rejected, and missing known fields default to the empty string rather
//! than making the whole header unparsable.

/// An immutable (once built) record of the named string fields Asterisk
/// sends in the header block, per spec §3.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    pub network: String,
    pub network_script: String,
    pub request: String,
    pub channel: String,
    pub language: String,
    pub r#type: String,
    pub uniqueid: String,
    pub version: String,
    pub callerid: String,
    pub calleridname: String,
    pub callingpres: String,
    pub callingani2: String,
    pub callington: String,
    pub callingtns: String,
    pub dnid: String,
    pub rdnis: String,
    pub context: String,
    pub extension: String,
    pub priority: String,
    pub enhanced: String,
    pub accountcode: String,
    pub threadid: String,
}

impl CallMetadata {
    /// Parse the header record (as emitted by the [`Framer`](crate::framer::Framer) in
    /// [`ChannelState::Init`](crate::framer::ChannelState::Init)) into [`CallMetadata`].
    ///
    /// Splits on newline; for each line splits on the first `:`, trims both
    /// sides. Unknown `agi_`-prefixed suffixes, and lines that don't start
    /// with `agi_` at all, are dropped silently.
    pub fn parse(record: &str) -> Self {
        let mut meta = CallMetadata::default();
        for line in record.lines() {
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let Some(suffix) = key.strip_prefix("agi_") else {
                continue;
            };
            match suffix {
                "network" => meta.network = value.to_owned(),
                "network_script" => meta.network_script = value.to_owned(),
                "request" => meta.request = value.to_owned(),
                "channel" => meta.channel = value.to_owned(),
                "language" => meta.language = value.to_owned(),
                "type" => meta.r#type = value.to_owned(),
                "uniqueid" => meta.uniqueid = value.to_owned(),
                "version" => meta.version = value.to_owned(),
                "callerid" => meta.callerid = value.to_owned(),
                "calleridname" => meta.calleridname = value.to_owned(),
                "callingpres" => meta.callingpres = value.to_owned(),
                "callingani2" => meta.callingani2 = value.to_owned(),
                "callington" => meta.callington = value.to_owned(),
                "callingtns" => meta.callingtns = value.to_owned(),
                "dnid" => meta.dnid = value.to_owned(),
                "rdnis" => meta.rdnis = value.to_owned(),
                "context" => meta.context = value.to_owned(),
                "extension" => meta.extension = value.to_owned(),
                "priority" => meta.priority = value.to_owned(),
                "enhanced" => meta.enhanced = value.to_owned(),
                "accountcode" => meta.accountcode = value.to_owned(),
                "threadid" => meta.threadid = value.to_owned(),
                // Unknown suffixes (including agi_arg_n) are dropped silently per spec §4.2.
                _ => {}
            }
        }
        meta
    }
}
