//! JSON commands accepted by the marquee host
//!
//! `LightCommand` follows the Home Assistant JSON light schema, so a marquee
//! can be driven like any other RGB light.

use serde::{Deserialize, Serialize};

use crate::color::{lenient_hex, Rgb};

/// Home Assistant-style light command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl LightCommand {
    /// `Some(true)` only for the exact string `"ON"`
    pub fn enabled(&self) -> Option<bool> {
        self.state.as_deref().map(|s| s == "ON")
    }
}

/// A message to show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCommand {
    pub text: String,
    /// `false` shows the text statically; absent or `true` queues it for scrolling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<bool>,
}

impl TextCommand {
    pub fn is_static(&self) -> bool {
        self.scroll == Some(false)
    }
}

/// Display-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Milliseconds per scrolled column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u32>,
    /// Hex digits without `#`, e.g. `"ff8000"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DisplayCommand {
    pub fn rgb(&self) -> Option<Rgb> {
        self.color.as_deref().map(|c| Rgb::from_u32(lenient_hex(c)))
    }
}

/// Published whenever the marquee finishes or resumes a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyState {
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_command_parse() {
        let cmd: LightCommand = serde_json::from_str(
            r#"{"state":"ON","brightness":80,"color":{"r":255,"g":0,"b":16}}"#,
        )
        .unwrap();
        assert_eq!(cmd.enabled(), Some(true));
        assert_eq!(cmd.brightness, Some(80));
        assert_eq!(cmd.color, Some(Rgb::new(255, 0, 16)));

        let off: LightCommand = serde_json::from_str(r#"{"state":"off"}"#).unwrap();
        assert_eq!(off.enabled(), Some(false));
        assert_eq!(LightCommand::default().enabled(), None);
    }

    #[test]
    fn test_text_command_scroll_flag() {
        let cmd: TextCommand = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert!(!cmd.is_static());
        let cmd: TextCommand = serde_json::from_str(r#"{"text":"hi","scroll":false}"#).unwrap();
        assert!(cmd.is_static());
    }

    #[test]
    fn test_display_command_color() {
        let cmd: DisplayCommand = serde_json::from_str(r#"{"color":"00ff80","speed":25}"#).unwrap();
        assert_eq!(cmd.rgb(), Some(Rgb::new(0, 0xff, 0x80)));
        assert_eq!(cmd.speed, Some(25));
        assert_eq!(cmd.enabled, None);
    }

    #[test]
    fn test_ready_state_json() {
        assert_eq!(
            serde_json::to_string(&ReadyState { ready: true }).unwrap(),
            r#"{"ready":true}"#
        );
    }
}
