//! Command vocabulary for the control channel
//!
//! The wire grammar is ASCII, case-sensitive, `;`-terminated:
//! `QUIT`, `IMAGE`, `EDGE`, `RAW`, `DOOR`, `MOVE <arg>`, `ROTATE <arg>`.
//! Motion arguments are opaque strings here; the motion link validates them.

/// Camera processing mode selected by `EDGE`/`RAW`/`DOOR`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Resize only
    #[default]
    Raw,
    /// Resize then edge map
    EdgeDetect,
    /// Resize, edge map, then door localizer overlay
    DoorDetect,
}

/// A decoded control-channel command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session and shut down
    Quit,
    /// Capture, process and transmit one still image
    Image,
    /// Switch the camera processing mode
    SetMode(CameraMode),
    /// Drive forward/backward; argument forwarded to the motion link
    Move(String),
    /// Rotate in place; argument forwarded to the motion link
    Rotate(String),
}

impl Command {
    /// Parse one framed token.
    ///
    /// Returns `None` for anything outside the vocabulary; unrecognized
    /// tokens are ignored by the dispatcher, not treated as errors.
    pub fn parse(token: &str) -> Option<Command> {
        match token {
            "QUIT" => Some(Command::Quit),
            "IMAGE" => Some(Command::Image),
            "RAW" => Some(Command::SetMode(CameraMode::Raw)),
            "EDGE" => Some(Command::SetMode(CameraMode::EdgeDetect)),
            "DOOR" => Some(Command::SetMode(CameraMode::DoorDetect)),
            _ => {
                if let Some(arg) = token.strip_prefix("MOVE ") {
                    return Some(Command::Move(arg.to_string()));
                }
                if let Some(arg) = token.strip_prefix("ROTATE ") {
                    return Some(Command::Rotate(arg.to_string()));
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!(Command::parse("QUIT"), Some(Command::Quit));
        assert_eq!(Command::parse("IMAGE"), Some(Command::Image));
        assert_eq!(
            Command::parse("RAW"),
            Some(Command::SetMode(CameraMode::Raw))
        );
        assert_eq!(
            Command::parse("EDGE"),
            Some(Command::SetMode(CameraMode::EdgeDetect))
        );
        assert_eq!(
            Command::parse("DOOR"),
            Some(Command::SetMode(CameraMode::DoorDetect))
        );
        assert_eq!(
            Command::parse("MOVE 5"),
            Some(Command::Move("5".to_string()))
        );
        assert_eq!(
            Command::parse("ROTATE -3"),
            Some(Command::Rotate("-3".to_string()))
        );
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(Command::parse("quit"), None);
        assert_eq!(Command::parse("Image"), None);
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("SELFDESTRUCT"), None);
        assert_eq!(Command::parse("MOVE"), None); // no argument
    }
}
