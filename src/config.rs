use dirs::home_dir;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the ccs config directory under the user's home
const CCS_DIR_NAME: &str = ".ccs";

/// Resolved file locations used by every component.
///
/// Built once at startup and passed down explicitly; tests build one
/// rooted in a temporary directory with [`Paths::with_root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// `profiles.json`, the profile store
    pub profiles_file: PathBuf,
    /// Snapshots of the Claude settings file taken before each apply
    pub backup_dir: PathBuf,
    /// Claude Code's `settings.json`
    pub claude_settings: PathBuf,
    /// `~/.claude.json`, holds the onboarding flag
    pub claude_json: PathBuf,
    /// Log file used while the TUI owns the terminal
    pub log_file: PathBuf,
}

impl Paths {
    /// Resolve paths from the environment.
    ///
    /// `CCS_CONFIG_DIR`, `CLAUDE_SETTINGS_PATH` and `CLAUDE_JSON_PATH`
    /// override the defaults under the home directory.
    pub fn from_env() -> Self {
        let home = home_dir().unwrap_or_else(|| PathBuf::from("./"));

        let ccs_dir = env::var_os("CCS_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(CCS_DIR_NAME));
        let claude_settings = env::var_os("CLAUDE_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".claude").join("settings.json"));
        let claude_json = env::var_os("CLAUDE_JSON_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".claude.json"));

        Self::layout(&ccs_dir, claude_settings, claude_json)
    }

    /// Every file under one root, mirroring the layout of a home directory
    pub fn with_root(root: &Path) -> Self {
        Self::layout(
            &root.join(CCS_DIR_NAME),
            root.join(".claude").join("settings.json"),
            root.join(".claude.json"),
        )
    }

    fn layout(ccs_dir: &Path, claude_settings: PathBuf, claude_json: PathBuf) -> Self {
        Self {
            profiles_file: ccs_dir.join("profiles.json"),
            backup_dir: ccs_dir.join("backups"),
            claude_settings,
            claude_json,
            log_file: ccs_dir.join("ccs.log"),
        }
    }
}
