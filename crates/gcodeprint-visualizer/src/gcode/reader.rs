//! Line reader turning G-code text into [`MotionCommand`] records
//!
//! Only the words the playback engine looks at are extracted
//! (`G`, `X`, `Y`, `Z`, `E`, `F`). There is no modal state: a line without
//! a `G` word, or with a G number other than 0/1, becomes
//! [`CommandKind::Other`].

use super::command::{CommandKind, MotionCommand};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Anything that can turn program text into motion commands
pub trait CommandSource {
    fn commands(&self, text: &str) -> Vec<MotionCommand>;
}

/// Default G-code reader
#[derive(Debug, Clone, Copy, Default)]
pub struct GcodeReader;

impl GcodeReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single line; blank and comment-only lines yield `None`
    pub fn parse_line(&self, line: &str) -> Option<MotionCommand> {
        let line = strip_comments(line);
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut command = MotionCommand::new(CommandKind::Other);
        let mut gcode: Option<u32> = None;

        for part in line.split_whitespace() {
            if part.len() < 2 {
                continue;
            }
            let Some(first_char) = part.chars().next() else {
                continue;
            };
            let value = &part[first_char.len_utf8()..];
            match first_char.to_ascii_uppercase() {
                'G' if gcode.is_none() => gcode = parse_gcode_number(value),
                'X' => command.x = value.parse().ok(),
                'Y' => command.y = value.parse().ok(),
                'Z' => command.z = value.parse().ok(),
                'E' => command.e = value.parse().ok(),
                'F' => command.f = value.parse().ok(),
                _ => {}
            }
        }

        if let Some(number) = gcode {
            command.kind = CommandKind::from_gcode(number);
        }
        Some(command)
    }
}

impl CommandSource for GcodeReader {
    fn commands(&self, text: &str) -> Vec<MotionCommand> {
        debug!("Reading G-code, input size: {} bytes", text.len());
        let commands: Vec<MotionCommand> = text
            .lines()
            .enumerate()
            .filter_map(|(line_num, line)| {
                let cmd = self.parse_line(line)?;
                trace!("Line {}: {}", line_num + 1, cmd.kind);
                Some(cmd)
            })
            .collect();
        debug!("Read {} commands", commands.len());
        commands
    }
}

fn strip_comments(line: &str) -> std::borrow::Cow<'_, str> {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"));
    regex.replace(line, "")
}

/// "01" -> 1, "1.1" -> None (sub-codes are not motion commands)
fn parse_gcode_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moves() {
        let reader = GcodeReader::new();

        let cmd = reader.parse_line("G1 X10.5 Y-3 Z0.2 E1.25 F1800").expect("command");
        assert_eq!(cmd.kind, CommandKind::Linear);
        assert_eq!(cmd.x, Some(10.5));
        assert_eq!(cmd.y, Some(-3.0));
        assert_eq!(cmd.z, Some(0.2));
        assert_eq!(cmd.e, Some(1.25));
        assert_eq!(cmd.f, Some(1800.0));

        let cmd = reader.parse_line("G00 X1 Y2").expect("command");
        assert_eq!(cmd.kind, CommandKind::Rapid);
    }

    #[test]
    fn test_comments_and_blanks() {
        let reader = GcodeReader::new();
        assert!(reader.parse_line("").is_none());
        assert!(reader.parse_line("   ; layer change").is_none());
        assert!(reader.parse_line("(header)").is_none());

        let cmd = reader.parse_line("G1 X1 Y1 ; perimeter").expect("command");
        assert_eq!(cmd.y, Some(1.0));
    }

    #[test]
    fn test_other_commands() {
        let reader = GcodeReader::new();
        assert_eq!(
            reader.parse_line("G28").map(|c| c.kind),
            Some(CommandKind::Other)
        );
        assert_eq!(
            reader.parse_line("M104 S200").map(|c| c.kind),
            Some(CommandKind::Other)
        );
        assert_eq!(
            reader.parse_line("X5 Y5").map(|c| c.kind),
            Some(CommandKind::Other)
        );
    }

    #[test]
    fn test_lowercase_and_bad_numbers() {
        let reader = GcodeReader::new();
        let cmd = reader.parse_line("g1 x2 yabc").expect("command");
        assert_eq!(cmd.kind, CommandKind::Linear);
        assert_eq!(cmd.x, Some(2.0));
        assert_eq!(cmd.y, None);
        assert!(!cmd.is_drawable());
    }

    #[test]
    fn test_commands_skips_empty_lines() {
        let text = "; start\nG0 X0 Y0\n\nG1 X5 Y0 Z1\nM84\n";
        let cmds = GcodeReader::new().commands(text);
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[1].z, Some(1.0));
    }
}
