//! Linux desktop backend: XDG desktop portal for reads, `gsettings` for writes.

use anyhow::{Context, Result};
use zbus::blocking::Connection;
use zbus::zvariant::OwnedValue;

use super::command::{query, run_detached};
use super::{AppearancePort, CompletionCallback};

const GSETTINGS: &str = "gsettings";
const GNOME_INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";
const COLOR_SCHEME_KEY: &str = "color-scheme";

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const PORTAL_SETTINGS_INTERFACE: &str = "org.freedesktop.portal.Settings";
const APPEARANCE_NAMESPACE: &str = "org.freedesktop.appearance";

/// Portal `color-scheme` value meaning "prefer dark".
const PORTAL_PREFER_DARK: u32 = 1;

/// Reads the portal color scheme and flips it with `gsettings`.
///
/// The portal is the desktop-neutral source of truth for the current
/// preference. When no session bus or portal is reachable, the GNOME key is
/// read directly instead.
pub struct FreedesktopPort {
    connection: Option<Connection>,
}

impl FreedesktopPort {
    pub fn new() -> Self {
        let connection = match Connection::session() {
            Ok(connection) => Some(connection),
            Err(e) => {
                log_pipe!();
                log_warning!("Session bus unavailable, reading color scheme through gsettings: {e}");
                None
            }
        };
        Self { connection }
    }

    fn read_portal(&self) -> Result<bool> {
        let connection = self
            .connection
            .as_ref()
            .context("No session bus connection")?;

        let reply = connection
            .call_method(
                Some(PORTAL_DESTINATION),
                PORTAL_PATH,
                Some(PORTAL_SETTINGS_INTERFACE),
                "ReadOne",
                &(APPEARANCE_NAMESPACE, COLOR_SCHEME_KEY),
            )
            .context("Portal ReadOne call failed")?;

        let body = reply.body();
        let value: OwnedValue = body
            .deserialize()
            .context("Unexpected portal reply")?;
        let scheme = u32::try_from(value).context("color-scheme is not an integer")?;
        Ok(scheme == PORTAL_PREFER_DARK)
    }

    fn read_gsettings(&self) -> Result<bool> {
        let output = query(GSETTINGS, &["get", GNOME_INTERFACE_SCHEMA, COLOR_SCHEME_KEY])?;
        if !output.status.success() {
            anyhow::bail!(
                "gsettings get exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(parse_gsettings_scheme(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for FreedesktopPort {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret `gsettings get ... color-scheme` output such as `'prefer-dark'`.
pub(crate) fn parse_gsettings_scheme(stdout: &str) -> bool {
    stdout.trim().trim_matches('\'') == "prefer-dark"
}

/// `gsettings set` value for a target mode.
pub(crate) fn gsettings_scheme(dark: bool) -> &'static str {
    if dark { "prefer-dark" } else { "default" }
}

impl AppearancePort for FreedesktopPort {
    fn name(&self) -> &'static str {
        "freedesktop"
    }

    fn read(&self) -> Result<bool> {
        match self.read_portal() {
            Ok(dark) => Ok(dark),
            Err(_) => self.read_gsettings(),
        }
    }

    fn request_change(&self, target_dark: bool, on_complete: CompletionCallback) {
        run_detached(
            GSETTINGS,
            vec![
                "set".to_string(),
                GNOME_INTERFACE_SCHEMA.to_string(),
                COLOR_SCHEME_KEY.to_string(),
                gsettings_scheme(target_dark).to_string(),
            ],
            Some(on_complete),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gsettings_scheme() {
        assert!(parse_gsettings_scheme("'prefer-dark'\n"));
        assert!(!parse_gsettings_scheme("'default'\n"));
        assert!(!parse_gsettings_scheme("'prefer-light'"));
    }

    #[test]
    fn test_gsettings_scheme_values() {
        assert_eq!(gsettings_scheme(true), "prefer-dark");
        assert_eq!(gsettings_scheme(false), "default");
    }
}
