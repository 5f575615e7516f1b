//! Text line protocol spoken over the serial link.

use quadmouse_pacer::Axis;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// One command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialCommand {
    /// Relative motion on one axis, in raw device counts.
    Motion { axis: Axis, delta: i32 },
    Button { pressed: bool },
}

impl SerialCommand {
    pub fn motion(axis: Axis, delta: i32) -> Self {
        SerialCommand::Motion { axis, delta }
    }

    pub fn button(pressed: bool) -> Self {
        SerialCommand::Button { pressed }
    }

    /// Write the command followed by a newline.
    pub fn write_line<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{self}")
    }
}

impl fmt::Display for SerialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialCommand::Motion { axis, delta } => write!(f, "{axis}:{delta}"),
            SerialCommand::Button { pressed } => write!(f, "BTN:{}", u8::from(*pressed)),
        }
    }
}

/// Reasons a line failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("missing ':' separator in {0:?}")]
    MissingSeparator(String),

    #[error("unknown command tag {0:?}")]
    UnknownTag(String),

    #[error("invalid value {0:?}")]
    InvalidValue(String),
}

impl FromStr for SerialCommand {
    type Err = ParseCommandError;

    /// Parse a single line. A trailing `\n` or `\r\n` is accepted.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (tag, value) = line
            .split_once(':')
            .ok_or_else(|| ParseCommandError::MissingSeparator(line.to_string()))?;

        let invalid = || ParseCommandError::InvalidValue(value.to_string());
        match tag {
            "X" | "Y" => {
                let axis = if tag == "X" { Axis::X } else { Axis::Y };
                let delta = value.parse::<i32>().map_err(|_| invalid())?;
                Ok(SerialCommand::motion(axis, delta))
            }
            "BTN" => match value {
                "0" => Ok(SerialCommand::button(false)),
                "1" => Ok(SerialCommand::button(true)),
                _ => Err(invalid()),
            },
            other => Err(ParseCommandError::UnknownTag(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing() -> std::io::Result<()> {
        let mut out = Vec::new();
        SerialCommand::motion(Axis::X, 5).write_line(&mut out)?;
        SerialCommand::motion(Axis::Y, -3).write_line(&mut out)?;
        SerialCommand::button(true).write_line(&mut out)?;
        SerialCommand::button(false).write_line(&mut out)?;
        assert_eq!(out, b"X:5\nY:-3\nBTN:1\nBTN:0\n");
        Ok(())
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            "X:5\n".parse::<SerialCommand>(),
            Ok(SerialCommand::motion(Axis::X, 5))
        );
        assert_eq!(
            "Y:-12\r\n".parse::<SerialCommand>(),
            Ok(SerialCommand::motion(Axis::Y, -12))
        );
        assert_eq!(
            "BTN:0".parse::<SerialCommand>(),
            Ok(SerialCommand::button(false))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "X5".parse::<SerialCommand>(),
            Err(ParseCommandError::MissingSeparator(_))
        ));
        assert!(matches!(
            "Z:1".parse::<SerialCommand>(),
            Err(ParseCommandError::UnknownTag(_))
        ));
        assert!(matches!(
            "BTN:2".parse::<SerialCommand>(),
            Err(ParseCommandError::InvalidValue(_))
        ));
        assert!(matches!(
            "X:fast".parse::<SerialCommand>(),
            Err(ParseCommandError::InvalidValue(_))
        ));
    }
}
