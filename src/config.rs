use std::path::PathBuf;

use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;

/// Key in the remotes map that names (not defines) the default remote.
pub const DEFAULT_REMOTE_KEY: &str = "default";

/// User settings, loaded once and passed explicitly into every component.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Remote name -> base URI. The `"default"` entry holds the name of
    /// the default remote rather than a URI.
    pub remotes: IndexMap<String, String>,

    /// Alias name -> directory path.
    pub aliases: IndexMap<String, String>,

    /// Always download MSI installers on Windows, even where 7z archives
    /// are published.
    pub force_msi: bool,

    /// Prefer .tar.xz archives on POSIX platforms where published.
    pub use_xz: bool,

    /// GitHub API endpoint used by releases-backed remotes.
    pub github_api_base: String,

    /// Root directory holding installed versions, settings, and logs.
    #[serde(skip)]
    pub home: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let mut remotes = IndexMap::new();
        remotes.insert(DEFAULT_REMOTE_KEY.to_string(), "node".to_string());
        remotes.insert("node".to_string(), "https://nodejs.org/dist".to_string());
        Self {
            remotes,
            aliases: IndexMap::new(),
            force_msi: false,
            use_xz: false,
            github_api_base: "https://api.github.com".to_string(),
            home: PathBuf::new(),
        }
    }
}

impl Settings {
    /// Load settings.json from the nvx home directory, falling back to
    /// defaults when the file doesn't exist. Environment toggles are
    /// folded into the struct here so nothing downstream reads env vars.
    pub fn load() -> anyhow::Result<Self> {
        let home = nvx_home_with_env(std::env::var("NVX_HOME").ok(), dirs::home_dir());
        let path = home.join("settings.json");
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(body) => serde_json::from_str(&body)
                .with_context(|| format!("parsing {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        if std::env::var_os("NVX_USE_XZ").is_some() {
            settings.use_xz = true;
        }
        if std::env::var_os("NVX_FORCE_MSI").is_some() {
            settings.force_msi = true;
        }
        settings.home = home;
        Ok(settings)
    }

    /// Name of the configured default remote, or None when the `"default"`
    /// indirection is missing or dangling.
    pub fn default_remote(&self) -> Option<&str> {
        let name = self.remotes.get(DEFAULT_REMOTE_KEY)?;
        if name != DEFAULT_REMOTE_KEY && self.remotes.contains_key(name) {
            Some(name)
        } else {
            None
        }
    }

    /// Whether `name` is a configured remote. The `"default"` indirection
    /// key is not itself a remote.
    pub fn known_remote(&self, name: &str) -> bool {
        name != DEFAULT_REMOTE_KEY && self.remotes.contains_key(name)
    }

    /// Base URI for a remote, following the `"default"` indirection.
    pub fn remote_uri(&self, name: &str) -> Option<&str> {
        let name = if name == DEFAULT_REMOTE_KEY {
            self.default_remote()?
        } else {
            name
        };
        if !self.known_remote(name) {
            return None;
        }
        self.remotes.get(name).map(String::as_str)
    }

    pub fn log_path(&self) -> PathBuf {
        self.home.join("nvx.log")
    }
}

/// Resolve the nvx home directory: $NVX_HOME, then ~/.nvx, then ./.nvx.
fn nvx_home_with_env(nvx_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    nvx_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".nvx")))
        .unwrap_or_else(|| PathBuf::from(".nvx"))
}
