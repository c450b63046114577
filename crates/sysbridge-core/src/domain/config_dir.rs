//! Where the connector and launcher look for their configuration files.
//!
//! - Windows:  `%APPDATA%\SystemBridge\<file>`
//! - Linux:    `$XDG_CONFIG_HOME/systembridge/<file>`, else `~/.config/systembridge/<file>`
//! - macOS:    `~/Library/Application Support/SystemBridge/<file>`
//!
//! Only environment variables are read; nothing touches the file system.

use std::path::PathBuf;

/// Path of `file_name` inside the platform config directory, or `None` when
/// the directory cannot be determined from the environment.
pub fn config_file(file_name: &str) -> Option<PathBuf> {
    platform_config_dir().map(|dir| dir.join(file_name))
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SystemBridge"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("systembridge"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SystemBridge")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
