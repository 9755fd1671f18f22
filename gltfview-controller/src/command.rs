//! Voice command surface

use std::fmt;
use std::str::FromStr;

use crate::error::ControllerError;

/// The spoken triggers the viewer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    Open,
    Reset,
}

impl VoiceCommand {
    pub fn keyword(self) -> &'static str {
        match self {
            VoiceCommand::Open => "open",
            VoiceCommand::Reset => "reset",
        }
    }
}

impl FromStr for VoiceCommand {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim();
        if word.eq_ignore_ascii_case("open") {
            Ok(VoiceCommand::Open)
        } else if word.eq_ignore_ascii_case("reset") {
            Ok(VoiceCommand::Reset)
        } else {
            Err(ControllerError::UnknownCommand(word.to_string()))
        }
    }
}

impl fmt::Display for VoiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
