//! Component discovery.
//!
//! Enumerates the configured roots and turns each immediate subdirectory
//! into a [`Component`]. Enumeration is best-effort: a root that is missing
//! or unreadable produces a warning and contributes nothing, but never
//! stops the other roots from being read.

use crate::config::{DiscoveryConfig, RootConfig, ValuesConfig};
use crate::error::DiscoveryError;
use crate::models::Component;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A root (or an entry under it) that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryWarning {
    pub root: PathBuf,
    pub message: String,
}

impl DiscoveryWarning {
    fn from_error(root: &RootConfig, err: &DiscoveryError) -> Self {
        Self {
            root: root.path.clone(),
            message: err.to_string(),
        }
    }
}

/// Number of distinct roots that produced at least one warning.
pub fn affected_roots(warnings: &[DiscoveryWarning]) -> usize {
    warnings
        .iter()
        .map(|w| &w.root)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Partial inventory plus everything that went wrong producing it.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub components: Vec<Component>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl Discovery {
    /// True when every root was read without problems.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Component discoverer over a fixed set of roots.
pub struct Discoverer<'a> {
    config: &'a DiscoveryConfig,
    values: &'a ValuesConfig,
}

impl<'a> Discoverer<'a> {
    pub fn new(config: &'a DiscoveryConfig, values: &'a ValuesConfig) -> Self {
        Self { config, values }
    }

    /// Enumerate all roots, in configuration order.
    pub fn discover(&self) -> Discovery {
        let mut discovery = Discovery::default();

        for root in &self.config.roots {
            let errors = self.scan_root(root, &mut discovery.components);
            for err in errors {
                warn!("Discovery: {}", err);
                discovery
                    .warnings
                    .push(DiscoveryWarning::from_error(root, &err));
            }
        }

        debug!(
            "Discovered {} components ({} warnings)",
            discovery.components.len(),
            discovery.warnings.len()
        );

        discovery
    }

    /// Push one component per subdirectory of `root`; return what failed.
    fn scan_root(&self, root: &RootConfig, components: &mut Vec<Component>) -> Vec<DiscoveryError> {
        if !root.path.exists() {
            return vec![DiscoveryError::Missing(root.path.clone())];
        }
        if !root.path.is_dir() {
            return vec![DiscoveryError::NotADirectory(root.path.clone())];
        }

        let mut errors = Vec::new();
        let walker = WalkDir::new(&root.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    errors.push(DiscoveryError::Unreadable {
                        path: e.path().unwrap_or(&root.path).to_path_buf(),
                        source: e,
                    });
                    continue;
                }
            };

            // Resolves symlinks; a dangling link is just not a directory.
            if !entry.path().is_dir() {
                debug!("Skipping non-directory {}", entry.path().display());
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if !self.config.include_hidden && name.starts_with('.') {
                continue;
            }

            components.push(Component {
                value: self.values.lookup(&name).to_string(),
                name,
                path: entry.into_path(),
                kind: root.kind,
                status: self.config.component_status.clone(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComponentKind;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn values(table: &[(&str, &str)]) -> ValuesConfig {
        ValuesConfig {
            total: "$1T".to_string(),
            default: "TBD".to_string(),
            table: table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn discovery_config(roots: Vec<RootConfig>) -> DiscoveryConfig {
        DiscoveryConfig {
            roots,
            include_hidden: false,
            component_status: "active".to_string(),
        }
    }

    #[test]
    fn test_applies_value_table_and_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("alpha")).unwrap();
        fs::create_dir(temp_dir.path().join("beta")).unwrap();

        let config = discovery_config(vec![RootConfig {
            path: temp_dir.path().to_path_buf(),
            kind: ComponentKind::Repository,
        }]);
        let values = values(&[("alpha", "$5B")]);

        let discovery = Discoverer::new(&config, &values).discover();
        assert!(discovery.is_complete());

        let pairs: Vec<(&str, &str)> = discovery
            .components
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("alpha", "$5B"), ("beta", "TBD")]);
        assert!(discovery
            .components
            .iter()
            .all(|c| c.kind == ComponentKind::Repository && c.status == "active"));
    }

    #[test]
    fn test_skips_files_and_hidden_dirs() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("service")).unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        fs::write(temp_dir.path().join("README.md"), "# readme").unwrap();

        let config = discovery_config(vec![RootConfig {
            path: temp_dir.path().to_path_buf(),
            kind: ComponentKind::IntegratedFolder,
        }]);
        let values = values(&[]);

        let discovery = Discoverer::new(&config, &values).discover();
        let names: Vec<&str> = discovery.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["service"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_resolve_and_dangling_links_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("alpha")).unwrap();
        std::os::unix::fs::symlink(target.path(), temp_dir.path().join("linked")).unwrap();
        std::os::unix::fs::symlink("/nonexistent/ecostatus/target", temp_dir.path().join("dangling"))
            .unwrap();

        let config = discovery_config(vec![RootConfig {
            path: temp_dir.path().to_path_buf(),
            kind: ComponentKind::Repository,
        }]);
        let values = values(&[]);

        let discovery = Discoverer::new(&config, &values).discover();
        assert!(discovery.is_complete(), "{:?}", discovery.warnings);
        let names: Vec<&str> = discovery.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "linked"]);
    }

    #[test]
    fn test_include_hidden() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".hidden")).unwrap();

        let mut config = discovery_config(vec![RootConfig {
            path: temp_dir.path().to_path_buf(),
            kind: ComponentKind::Repository,
        }]);
        config.include_hidden = true;
        let values = values(&[]);

        let discovery = Discoverer::new(&config, &values).discover();
        assert_eq!(discovery.components.len(), 1);
        assert_eq!(discovery.components[0].name, ".hidden");
    }

    #[test]
    fn test_missing_root_keeps_readable_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("gamma")).unwrap();

        let config = discovery_config(vec![
            RootConfig {
                path: PathBuf::from("/nonexistent/ecostatus/root"),
                kind: ComponentKind::Repository,
            },
            RootConfig {
                path: temp_dir.path().to_path_buf(),
                kind: ComponentKind::IntegratedFolder,
            },
        ]);
        let values = values(&[]);

        let discovery = Discoverer::new(&config, &values).discover();
        assert!(!discovery.is_complete());
        assert_eq!(discovery.warnings.len(), 1);
        assert_eq!(
            discovery.warnings[0].root,
            PathBuf::from("/nonexistent/ecostatus/root")
        );
        assert_eq!(discovery.components.len(), 1);
        assert_eq!(discovery.components[0].name, "gamma");
        assert_eq!(discovery.components[0].kind, ComponentKind::IntegratedFolder);
    }

    #[test]
    fn test_affected_roots_counts_each_root_once() {
        let warning = |root: &str, message: &str| DiscoveryWarning {
            root: PathBuf::from(root),
            message: message.to_string(),
        };
        let warnings = vec![
            warning("/srv/repos", "cannot read /srv/repos/a"),
            warning("/srv/repos", "cannot read /srv/repos/b"),
            warning("/srv/folders", "does not exist"),
        ];
        assert_eq!(affected_roots(&warnings), 2);
        assert_eq!(affected_roots(&[]), 0);
    }

    #[test]
    fn test_file_as_root_is_a_warning() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();

        let config = discovery_config(vec![RootConfig {
            path: file,
            kind: ComponentKind::Repository,
        }]);
        let values = values(&[]);

        let discovery = Discoverer::new(&config, &values).discover();
        assert!(discovery.components.is_empty());
        assert!(discovery.warnings[0].message.contains("not a directory"));
    }

    #[test]
    fn test_duplicate_names_across_roots_are_kept() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::create_dir(first.path().join("shared")).unwrap();
        fs::create_dir(second.path().join("shared")).unwrap();

        let config = discovery_config(vec![
            RootConfig {
                path: first.path().to_path_buf(),
                kind: ComponentKind::Repository,
            },
            RootConfig {
                path: second.path().to_path_buf(),
                kind: ComponentKind::IntegratedFolder,
            },
        ]);
        let values = values(&[]);

        let discovery = Discoverer::new(&config, &values).discover();
        assert_eq!(discovery.components.len(), 2);
        assert!(discovery.components.iter().all(|c| c.name == "shared"));
    }
}
