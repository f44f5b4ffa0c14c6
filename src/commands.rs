//! Serial command vocabulary.
//!
//! The serial source accepts one literal token per line. This vocabulary is
//! the only bit-exact external surface of the crate and is kept verbatim:
//!
//! | Token | Effect |
//! |-------|--------|
//! | `forward_press` / `forward_release` | Drive forward |
//! | `back_press` / `back_release` | Drive backward |
//! | `left_press` / `left_release` | Turn left |
//! | `right_press` / `right_release` | Turn right |
//! | `turret_left_press` / `turret_left_release` | Rotate turret left |
//! | `turret_right_press` / `turret_right_release` | Rotate turret right |
//! | `turret_elevate_press` / `turret_elevate_release` | Raise turret |
//! | `turret_lower_press` / `turret_lower_release` | Lower turret |
//! | `fire_press` / `fire_release` | Flamethrower |
//! | `gear_up` / `gear_down` | Shift one gear |
//!
//! # Example
//!
//! ```rust
//! use tank_control::{Control, SerialCommand};
//!
//! let cmd: SerialCommand = "turret_left_press".parse().unwrap();
//! assert_eq!(cmd, SerialCommand::Press(Control::TurretLeft));
//!
//! assert!("warp_speed".parse::<SerialCommand>().is_err());
//! ```

use core::fmt;
use core::str::FromStr;

use heapless::String as HString;
use thiserror::Error;

/// Longest token kept inside a [`ParseCommandError`].
pub const MAX_TOKEN_LEN: usize = 32;

/// Truncated copy of a rejected token.
pub type Token = HString<MAX_TOKEN_LEN>;

/// One of the nine press/release controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Control {
    /// Drive forward.
    Forward,
    /// Drive backward.
    Back,
    /// Turn left.
    Left,
    /// Turn right.
    Right,
    /// Rotate turret left.
    TurretLeft,
    /// Rotate turret right.
    TurretRight,
    /// Raise turret.
    TurretElevate,
    /// Lower turret.
    TurretLower,
    /// Flamethrower.
    Fire,
}

impl Control {
    /// Every control, in vocabulary order.
    pub const ALL: [Control; 9] = [
        Control::Forward,
        Control::Back,
        Control::Left,
        Control::Right,
        Control::TurretLeft,
        Control::TurretRight,
        Control::TurretElevate,
        Control::TurretLower,
        Control::Fire,
    ];

    /// Token stem shared by the `_press` and `_release` forms.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Control::Forward => "forward",
            Control::Back => "back",
            Control::Left => "left",
            Control::Right => "right",
            Control::TurretLeft => "turret_left",
            Control::TurretRight => "turret_right",
            Control::TurretElevate => "turret_elevate",
            Control::TurretLower => "turret_lower",
            Control::Fire => "fire",
        }
    }

    /// Position in [`Control::ALL`]; used to index press-state arrays.
    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    fn from_stem(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == stem)
    }
}

/// A parsed serial command token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SerialCommand {
    /// `<control>_press`
    Press(Control),
    /// `<control>_release`
    Release(Control),
    /// `gear_up`
    GearUp,
    /// `gear_down`
    GearDown,
}

/// Rejected serial token.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    /// Line was empty after trimming.
    #[error("empty command")]
    Empty,
    /// Token is not part of the vocabulary.
    #[error("unknown command: {0}")]
    Unknown(Token),
}

impl SerialCommand {
    /// Parse a token. Surrounding whitespace is ignored; matching is exact
    /// and case-sensitive.
    pub fn parse_token(token: &str) -> Result<Self, ParseCommandError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ParseCommandError::Empty);
        }

        match token {
            "gear_up" => return Ok(SerialCommand::GearUp),
            "gear_down" => return Ok(SerialCommand::GearDown),
            _ => {}
        }

        let parsed = if let Some(stem) = token.strip_suffix("_press") {
            Control::from_stem(stem).map(SerialCommand::Press)
        } else if let Some(stem) = token.strip_suffix("_release") {
            Control::from_stem(stem).map(SerialCommand::Release)
        } else {
            None
        };

        parsed.ok_or_else(|| ParseCommandError::Unknown(truncate_token(token)))
    }
}

impl FromStr for SerialCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_token(s)
    }
}

impl fmt::Display for SerialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialCommand::Press(c) => write!(f, "{}_press", c.as_str()),
            SerialCommand::Release(c) => write!(f, "{}_release", c.as_str()),
            SerialCommand::GearUp => f.write_str("gear_up"),
            SerialCommand::GearDown => f.write_str("gear_down"),
        }
    }
}

fn truncate_token(s: &str) -> Token {
    let mut out = Token::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn parses_every_press_and_release() {
        for control in Control::ALL {
            let press = format!("{}_press", control.as_str());
            let release = format!("{}_release", control.as_str());
            assert_eq!(
                press.parse::<SerialCommand>(),
                Ok(SerialCommand::Press(control))
            );
            assert_eq!(
                release.parse::<SerialCommand>(),
                Ok(SerialCommand::Release(control))
            );
        }
    }

    #[test]
    fn parses_gear_tokens() {
        assert_eq!("gear_up".parse::<SerialCommand>(), Ok(SerialCommand::GearUp));
        assert_eq!("gear_down".parse::<SerialCommand>(), Ok(SerialCommand::GearDown));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            "  fire_press\r\n".parse::<SerialCommand>(),
            Ok(SerialCommand::Press(Control::Fire))
        );
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            "   ".parse::<SerialCommand>(),
            Err(ParseCommandError::Empty)
        );
    }

    #[test]
    fn rejects_unknown() {
        let err = "jump_press".parse::<SerialCommand>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command: jump_press");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!("FORWARD_PRESS".parse::<SerialCommand>().is_err());
        assert!("Gear_Up".parse::<SerialCommand>().is_err());
    }

    #[test]
    fn rejects_bare_stem_and_bare_suffix() {
        assert!("forward".parse::<SerialCommand>().is_err());
        assert!("_press".parse::<SerialCommand>().is_err());
    }

    #[test]
    fn long_unknown_token_is_truncated() {
        let long = "x".repeat(100);
        match long.parse::<SerialCommand>() {
            Err(ParseCommandError::Unknown(token)) => assert_eq!(token.len(), MAX_TOKEN_LEN),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn display_round_trips_vocabulary() {
        assert_eq!(
            SerialCommand::Press(Control::TurretElevate).to_string(),
            "turret_elevate_press"
        );
        assert_eq!(
            SerialCommand::Release(Control::Back).to_string(),
            "back_release"
        );
        assert_eq!(SerialCommand::GearDown.to_string(), "gear_down");
    }

    #[test]
    fn control_index_matches_all_order() {
        for (i, control) in Control::ALL.iter().enumerate() {
            assert_eq!(control.index(), i);
        }
    }
}
