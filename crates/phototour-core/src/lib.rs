// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod apt_dat;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod export;
pub mod extender;
pub mod geo;
pub mod remote;
pub mod source;
pub mod tour;

pub use config::TourConfig;
pub use engine::{AttemptFailure, CancelToken, Discovery, SearchError, TourSearchEngine};
pub use source::{AnchorResolver, PhotoSource, SourceError};
pub use tour::{Tour, Waypoint, WaypointKind};

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-user configuration directory, falling back to the working directory.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "x-adox", "PhotoTour")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Looks for an X-Plane installation through the `x-plane_install_*.txt` files
/// the simulator's installer leaves in the user's preferences.
pub fn find_xplane_root() -> Option<PathBuf> {
    let mut pref_dirs = Vec::new();

    #[cfg(target_os = "linux")]
    {
        if let Ok(home) = env::var("HOME") {
            pref_dirs.push(PathBuf::from(home).join(".x-plane"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = env::var("HOME") {
            pref_dirs.push(PathBuf::from(&home).join("Library/Preferences"));
            pref_dirs.push(PathBuf::from(&home).join(".x-plane"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(local_appdata) = env::var("LOCALAPPDATA") {
            pref_dirs.push(PathBuf::from(local_appdata));
        }
    }

    pref_dirs.iter().find_map(|dir| root_from_install_files(dir))
}

/// First listed install under `dir` that still has a `Resources` folder.
pub fn root_from_install_files(dir: &Path) -> Option<PathBuf> {
    ["x-plane_install_12.txt", "x-plane_install_11.txt"]
        .iter()
        .filter_map(|name| fs::read_to_string(dir.join(name)).ok())
        .flat_map(|content| {
            content
                .lines()
                .map(|l| PathBuf::from(l.trim()))
                .collect::<Vec<_>>()
        })
        .find(|path| !path.as_os_str().is_empty() && path.join("Resources").exists())
}
