//! Per-archive settings resolved from the YAML config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

pub const CONFIG_ENV: &str = "BVAULT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Backend-specific object-store parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectStoreConfig {
    Fs { root: PathBuf },
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    archive: BTreeMap<String, ArchiveSection>,
}

#[derive(Debug, Deserialize)]
struct ArchiveSection {
    index: IndexSection,
    #[serde(default)]
    verifyreads: bool,
    #[serde(default)]
    mirrors: BTreeMap<String, PathBuf>,
    objectstore: ObjectStoreConfig,
}

#[derive(Debug, Deserialize)]
struct IndexSection {
    database: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ArchiveConfig {
    pub name: String,
    /// Catalog database file.
    pub database: PathBuf,
    /// Re-hash every chunk read back from the object store.
    pub verify_reads: bool,
    /// Local mirror directory for this host.
    pub mirror: PathBuf,
    pub object_store: ObjectStoreConfig,
    pub debug: bool,
}

impl ArchiveConfig {
    /// Locate the config file, read it, and resolve `name` for this host.
    pub fn load(path: Option<&Path>, name: &str, debug: bool) -> Result<Self> {
        let path = locate(path)?;
        let text = std::fs::read_to_string(&path).map_err(|e| {
            VaultError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(config = %path.display(), archive = name, "loading config");
        Self::from_yaml(&text, name, &current_hostname(), debug)
    }

    pub fn from_yaml(text: &str, name: &str, hostname: &str, debug: bool) -> Result<Self> {
        let mut file: ConfigFile = serde_yaml::from_str(text)?;
        let section = file
            .archive
            .remove(name)
            .ok_or_else(|| VaultError::Config(format!("no archive named '{name}' in config")))?;
        let mirror = section.mirrors.get(hostname).cloned().ok_or_else(|| {
            VaultError::Config(format!(
                "archive '{name}' has no mirror for host '{hostname}'"
            ))
        })?;
        Ok(Self {
            name: name.to_string(),
            database: section.index.database,
            verify_reads: section.verifyreads,
            mirror,
            object_store: section.objectstore,
            debug,
        })
    }
}

/// Search order: explicit path, `$BVAULT_CONFIG`, `./config.yaml`,
/// then the platform config dir.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(p));
    }
    let candidates = [
        Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
        dirs::config_dir().map(|d| d.join("bvault").join(DEFAULT_CONFIG_FILE)),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|p| p.is_file())
        .ok_or_else(|| VaultError::Config("no config file found".into()))
}

pub fn current_hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
archive:
  photos:
    index:
      database: /var/lib/bvault/photos.db
    verifyreads: true
    mirrors:
      alpha: /srv/photos
      beta: /home/me/photos
    objectstore:
      kind: fs
      root: /mnt/objects
"#;

    #[test]
    fn resolves_mirror_for_host() {
        let cfg = ArchiveConfig::from_yaml(SAMPLE, "photos", "beta", false).unwrap();
        assert_eq!(cfg.mirror, PathBuf::from("/home/me/photos"));
        assert_eq!(cfg.database, PathBuf::from("/var/lib/bvault/photos.db"));
        assert!(cfg.verify_reads);
        assert_eq!(
            cfg.object_store,
            ObjectStoreConfig::Fs {
                root: PathBuf::from("/mnt/objects")
            }
        );
    }

    #[test]
    fn unknown_host_is_config_error() {
        let err = ArchiveConfig::from_yaml(SAMPLE, "photos", "gamma", false).unwrap_err();
        assert!(matches!(err, VaultError::Config(_)), "{err}");
    }

    #[test]
    fn unknown_archive_is_config_error() {
        let err = ArchiveConfig::from_yaml(SAMPLE, "music", "alpha", false).unwrap_err();
        assert!(err.to_string().contains("music"));
    }

    #[test]
    fn verifyreads_defaults_off() {
        let text = r#"
archive:
  docs:
    index: { database: /tmp/docs.db }
    mirrors: { alpha: /srv/docs }
    objectstore: { kind: fs, root: /tmp/objects }
"#;
        let cfg = ArchiveConfig::from_yaml(text, "docs", "alpha", true).unwrap();
        assert!(!cfg.verify_reads);
        assert!(cfg.debug);
    }

    #[test]
    fn explicit_path_wins() {
        let p = Path::new("/etc/elsewhere.yaml");
        assert_eq!(locate(Some(p)).unwrap(), p);
    }
}
