//! macOS backend driving System Events through `osascript`.

use anyhow::Result;

use super::command::{query, run_detached};
use super::{AppearancePort, CompletionCallback};

const OSASCRIPT: &str = "/usr/bin/osascript";
const DEFAULTS: &str = "/usr/bin/defaults";

/// Reads `AppleInterfaceStyle` and flips dark mode via AppleScript.
///
/// The first script sent to System Events triggers the automation permission
/// dialog; until it is granted, change requests fail and are logged, and the
/// next scheduled tick simply tries again.
pub struct OsascriptPort;

impl OsascriptPort {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OsascriptPort {
    fn default() -> Self {
        Self::new()
    }
}

/// The AppleScript that sets dark mode on or off.
pub(crate) fn set_dark_mode_script(dark: bool) -> String {
    format!(
        "tell application \"System Events\"\n\
         \ttell appearance preferences\n\
         \t\tset dark mode to {dark}\n\
         \tend tell\n\
         end tell"
    )
}

const PERMISSION_SCRIPT: &str = "tell application \"System Events\"\n\treturn name\nend tell";

/// Interpret `defaults read -g AppleInterfaceStyle` output.
///
/// The key only exists while dark mode is on, so a failed read means light.
pub(crate) fn parse_interface_style(success: bool, stdout: &str) -> bool {
    success && stdout.trim().eq_ignore_ascii_case("dark")
}

impl AppearancePort for OsascriptPort {
    fn name(&self) -> &'static str {
        "macOS"
    }

    fn read(&self) -> Result<bool> {
        let output = query(DEFAULTS, &["read", "-g", "AppleInterfaceStyle"])?;
        Ok(parse_interface_style(
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
        ))
    }

    fn request_change(&self, target_dark: bool, on_complete: CompletionCallback) {
        run_detached(
            OSASCRIPT,
            vec!["-e".to_string(), set_dark_mode_script(target_dark)],
            Some(on_complete),
        );
    }

    fn warm_up(&self) {
        run_detached(
            OSASCRIPT,
            vec!["-e".to_string(), PERMISSION_SCRIPT.to_string()],
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_dark_mode_script() {
        let script = set_dark_mode_script(true);
        assert!(script.contains("tell appearance preferences"));
        assert!(script.contains("set dark mode to true"));
        assert!(set_dark_mode_script(false).contains("set dark mode to false"));
    }

    #[test]
    fn test_parse_interface_style() {
        assert!(parse_interface_style(true, "Dark\n"));
        assert!(!parse_interface_style(true, "Light"));
        // Key missing: defaults exits non-zero
        assert!(!parse_interface_style(false, ""));
    }
}
