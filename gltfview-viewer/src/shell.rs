//! Line commands accepted on standard input

use std::str::FromStr;

use gltfview_controller::VoiceCommand;
use gltfview_core::Point3f;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ShellError {
    #[error("Unknown command {0:?} (try: open, reset, head <x> <y> <z>, quit)")]
    Unknown(String),

    #[error("`head` expects three numbers, got {0:?}")]
    BadPosition(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellCommand {
    Voice(VoiceCommand),
    /// Move the viewer's head to a new position
    Head(Point3f),
    Quit,
}

impl FromStr for ShellCommand {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default().to_ascii_lowercase();
        match keyword.as_str() {
            "quit" | "exit" => Ok(ShellCommand::Quit),
            "head" => {
                let rest: Vec<&str> = words.collect();
                let coords: Vec<f32> = rest
                    .iter()
                    .map(|w| w.parse::<f32>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| ShellError::BadPosition(rest.join(" ")))?;
                match coords.as_slice() {
                    &[x, y, z] => Ok(ShellCommand::Head(Point3f::new(x, y, z))),
                    _ => Err(ShellError::BadPosition(rest.join(" "))),
                }
            }
            _ => keyword
                .parse::<VoiceCommand>()
                .map(ShellCommand::Voice)
                .map_err(|_| ShellError::Unknown(line.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("open".parse::<ShellCommand>(), Ok(ShellCommand::Voice(VoiceCommand::Open)));
        assert_eq!("  Reset ".parse::<ShellCommand>(), Ok(ShellCommand::Voice(VoiceCommand::Reset)));
        assert_eq!("quit".parse::<ShellCommand>(), Ok(ShellCommand::Quit));
        assert_eq!(
            "head 1 1.5 -2".parse::<ShellCommand>(),
            Ok(ShellCommand::Head(Point3f::new(1.0, 1.5, -2.0)))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "dance".parse::<ShellCommand>(),
            Err(ShellError::Unknown("dance".to_string()))
        );
        assert!(matches!("head 1 2".parse::<ShellCommand>(), Err(ShellError::BadPosition(_))));
        assert!(matches!("head a b c".parse::<ShellCommand>(), Err(ShellError::BadPosition(_))));
    }
}
