//! Loading and validation of `docmap.toml`.
//!
//! A config file is either named explicitly or found by walking up from the
//! working directory. Without one, a local `docs/` origin with a single
//! project is assumed. [`CliSettings`] are layered on top after the file is
//! read, before validation runs.
//!
//! String fields that carry hosts, URLs or secrets accept `${NAME}` and
//! `${NAME:-fallback}` references to the environment. An unset variable with
//! no fallback fails the load. Affected keys: `server.host`, `origin.token`,
//! `origin.api_url` and `origin.raw_url`.
mod category;
mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use category::{CategoryGroup, CategoryItem, CategorySpec};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docmap.toml";

/// Default project id when none is configured.
pub const DEFAULT_PROJECT_ID: &str = "docs";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Serve from a local directory instead of the configured origin.
    pub source_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content origin.
    pub origin: OriginConfig,
    /// Documentation projects, in declaration order.
    pub projects: Vec<ProjectConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::rooted_at(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
        }
    }
}

/// Where documents come from.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OriginConfig {
    /// Local directory tree.
    Local(LocalOrigin),
    /// Remote versioned tree.
    Remote(RemoteOrigin),
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self::Local(LocalOrigin::default())
    }
}

/// Local directory origin.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocalOrigin {
    /// Root directory; relative paths resolve against the config file.
    pub source_dir: PathBuf,
}

impl Default for LocalOrigin {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("docs"),
        }
    }
}

/// Remote versioned-tree origin.
#[derive(Debug, Deserialize)]
pub struct RemoteOrigin {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch, tag or commit.
    #[serde(default = "default_revision")]
    pub revision: String,
    /// Directory inside the repository holding the documents.
    #[serde(default)]
    pub base_path: String,
    /// Bearer token for the origin.
    #[serde(default)]
    pub token: Option<String>,
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Raw content base URL.
    #[serde(default = "default_raw_url")]
    pub raw_url: String,
    /// Global request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_revision() -> String {
    "main".to_owned()
}

fn default_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_raw_url() -> String {
    "https://raw.githubusercontent.com".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

impl RemoteOrigin {
    /// Check the repository coordinates and endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_present("origin.owner", &self.owner)?;
        check_present("origin.repo", &self.repo)?;
        check_present("origin.revision", &self.revision)?;
        check_url("origin.api_url", &self.api_url)?;
        check_url("origin.raw_url", &self.raw_url)?;
        if self.timeout_secs == 0 {
            return Err(invalid("origin.timeout_secs must be non-zero"));
        }
        Ok(())
    }
}

/// One documentation project.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project identifier used in URLs.
    pub id: String,
    /// Whether this is the default project.
    #[serde(default)]
    pub default: bool,
    /// Directory inside the origin holding this project's documents.
    #[serde(default)]
    pub root: String,
    /// Top-level folder whose documents are reachable only through aliases.
    #[serde(default)]
    pub hidden_root: Option<String>,
    /// Navigation shape declared inline.
    #[serde(default)]
    pub categories: CategorySpec,
    /// Navigation shape loaded from a TOML or YAML file.
    #[serde(default)]
    pub categories_file: Option<PathBuf>,
}

impl ProjectConfig {
    /// Project with an empty navigation spec.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            default: false,
            root: String::new(),
            hidden_root: None,
            categories: CategorySpec::default(),
            categories_file: None,
        }
    }
}

/// Why a configuration could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Explicitly named file does not exist.
    #[error("no config file at {}", .0.display())]
    NotFound(PathBuf),
    /// Reading a config or categories file failed.
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed TOML.
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    /// Malformed YAML categories file.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Values parsed but do not make sense together.
    #[error("invalid config: {0}")]
    Validation(String),
    /// A `${NAME}` reference could not be expanded.
    #[error("cannot expand {field}: {message}")]
    EnvVar {
        /// Dotted key of the offending field.
        field: String,
        /// What went wrong.
        message: String,
    },
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}

fn check_present(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        Err(invalid(format!("{field} is empty")))
    } else {
        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    match value.split_once("://") {
        Some(("http" | "https", rest)) if !rest.is_empty() => Ok(()),
        _ => Err(invalid(format!("{field} is not an http(s) URL: '{value}'"))),
    }
}

/// Nearest `docmap.toml` in `start` or one of its ancestors.
fn find_upwards(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

impl CliSettings {
    fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.source_dir {
            config.origin = OriginConfig::Local(LocalOrigin {
                source_dir: dir.clone(),
            });
        }
    }
}

impl Config {
    /// Read the configuration and layer `overrides` on top.
    ///
    /// With `explicit` unset the working directory and its ancestors are
    /// searched for `docmap.toml`; if none exists, defaults rooted at the
    /// working directory are used.
    ///
    /// # Errors
    ///
    /// Fails if `explicit` names a missing file, the file is malformed, or the
    /// final configuration does not validate.
    pub fn load(
        explicit: Option<&Path>,
        overrides: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => find_upwards(&std::env::current_dir()?),
        };

        let mut config = match file {
            Some(path) => Self::read_file(path)?,
            None => Self::rooted_at(&std::env::current_dir()?),
        };
        if let Some(overrides) = overrides {
            overrides.apply_to(&mut config);
        }
        config.finish()
    }

    /// Parse a TOML document whose relative paths are anchored at `base`.
    ///
    /// # Errors
    ///
    /// Fails on malformed input, unexpandable variables, unreadable
    /// categories files or invalid values.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        Self::parse(content, base)?.finish()
    }

    /// The default project. Present on every loaded config.
    #[must_use]
    pub fn default_project(&self) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.default)
    }

    /// Project with the given id.
    #[must_use]
    pub fn project(&self, id: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Check that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_present("server.host", &self.server.host)?;
        if self.server.port == 0 {
            return Err(invalid("server.port must be non-zero"));
        }
        if let OriginConfig::Remote(remote) = &self.origin {
            remote.validate()?;
        }

        let mut ids = HashSet::new();
        for project in &self.projects {
            check_present("projects.id", &project.id)?;
            if project.id.contains('/') {
                return Err(invalid(format!("project id '{}' contains '/'", project.id)));
            }
            if !ids.insert(project.id.as_str()) {
                return Err(invalid(format!("duplicate project id '{}'", project.id)));
            }
        }
        if self.projects.iter().filter(|p| p.default).count() > 1 {
            return Err(invalid("more than one project is marked default"));
        }
        Ok(())
    }

    fn rooted_at(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            origin: OriginConfig::Local(LocalOrigin {
                source_dir: base.join("docs"),
            }),
            projects: Vec::new(),
            config_path: None,
        }
    }

    fn read_file(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        let base = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut config = Self::parse(&content, &base)?;
        config.config_path = Some(path);
        Ok(config)
    }

    fn parse(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;

        config.server.host = expand::expand_env(&config.server.host, "server.host")?;
        match &mut config.origin {
            OriginConfig::Remote(remote) => {
                expand::expand_opt(&mut remote.token, "origin.token")?;
                remote.api_url = expand::expand_env(&remote.api_url, "origin.api_url")?;
                remote.raw_url = expand::expand_env(&remote.raw_url, "origin.raw_url")?;
            }
            OriginConfig::Local(local) => local.source_dir = base.join(&local.source_dir),
        }

        for project in &mut config.projects {
            project.attach_categories_file(base)?;
        }
        Ok(config)
    }

    /// Fill in the implicit project and default flag, then validate.
    fn finish(mut self) -> Result<Self, ConfigError> {
        if self.projects.is_empty() {
            self.projects.push(ProjectConfig::new(DEFAULT_PROJECT_ID));
        }
        if !self.projects.iter().any(|p| p.default) {
            self.projects[0].default = true;
        }
        self.validate()?;
        Ok(self)
    }
}

impl ProjectConfig {
    /// Replace `categories` with the contents of `categories_file`, if set.
    fn attach_categories_file(&mut self, base: &Path) -> Result<(), ConfigError> {
        let Some(file) = self.categories_file.take() else {
            return Ok(());
        };
        if !self.categories.is_empty() {
            return Err(invalid(format!(
                "project '{}' sets both categories and categories_file",
                self.id
            )));
        }
        let file = base.join(file);
        self.categories = CategorySpec::load(&file)?;
        self.categories_file = Some(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        Config::from_toml(toml, Path::new("/site"))
    }

    #[test]
    fn test_default_config() {
        let config = Config::rooted_at(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
        assert!(matches!(
            &config.origin,
            OriginConfig::Local(local) if local.source_dir == Path::new("/test/docs")
        ));
    }

    #[test]
    fn test_parse_minimal_config_creates_default_project() {
        let config = parse("").unwrap();

        assert_eq!(config.projects.len(), 1);
        assert_eq!(config.projects[0].id, "docs");
        assert!(config.projects[0].default);
        assert!(matches!(
            &config.origin,
            OriginConfig::Local(local) if local.source_dir == Path::new("/site/docs")
        ));
    }

    #[test]
    fn test_parse_server_config() {
        let config = parse("[server]\nhost = \"0.0.0.0\"\nport = 9000\n").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_parse_remote_origin_with_defaults() {
        let toml = r#"
[origin]
kind = "remote"
owner = "acme"
repo = "handbook"
base_path = "docs"
"#;
        let config = parse(toml).unwrap();

        let OriginConfig::Remote(remote) = &config.origin else {
            panic!("expected remote origin");
        };
        assert_eq!(remote.revision, "main");
        assert_eq!(remote.api_url, "https://api.github.com");
        assert_eq!(remote.timeout_secs, 30);
        assert!(remote.token.is_none());
    }

    #[test]
    fn test_remote_origin_requires_owner() {
        let toml = "[origin]\nkind = \"remote\"\nowner = \"\"\nrepo = \"r\"\n";

        let err = parse(toml).unwrap_err();

        assert!(err.to_string().contains("origin.owner"));
    }

    #[test]
    fn test_remote_origin_rejects_non_http_url() {
        let toml = "[origin]\nkind = \"remote\"\nowner = \"o\"\nrepo = \"r\"\napi_url = \"ftp://x\"\n";

        let err = parse(toml).unwrap_err();

        assert!(err.to_string().contains("origin.api_url"));
    }

    #[test]
    fn test_remote_token_expanded() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("DOCMAP_CONFIG_TEST_TOKEN", "abc");
        }
        let toml = r#"
[origin]
kind = "remote"
owner = "o"
repo = "r"
token = "${DOCMAP_CONFIG_TEST_TOKEN}"
"#;
        let config = parse(toml).unwrap();
        unsafe {
            std::env::remove_var("DOCMAP_CONFIG_TEST_TOKEN");
        }

        let OriginConfig::Remote(remote) = &config.origin else {
            panic!("expected remote origin");
        };
        assert_eq!(remote.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_first_project_becomes_default() {
        let toml = "[[projects]]\nid = \"api\"\n\n[[projects]]\nid = \"guide\"\n";

        let config = parse(toml).unwrap();

        assert_eq!(config.default_project().unwrap().id, "api");
        assert!(!config.project("guide").unwrap().default);
    }

    #[test]
    fn test_explicit_default_project_kept() {
        let toml = "[[projects]]\nid = \"api\"\n\n[[projects]]\nid = \"guide\"\ndefault = true\n";

        let config = parse(toml).unwrap();

        assert_eq!(config.default_project().unwrap().id, "guide");
    }

    #[test]
    fn test_two_default_projects_rejected() {
        let toml = "[[projects]]\nid = \"a\"\ndefault = true\n\n[[projects]]\nid = \"b\"\ndefault = true\n";

        assert!(matches!(parse(toml), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_duplicate_project_ids_rejected() {
        let toml = "[[projects]]\nid = \"a\"\n\n[[projects]]\nid = \"a\"\n";

        let err = parse(toml).unwrap_err();

        assert!(err.to_string().contains("duplicate project id"));
    }

    #[test]
    fn test_inline_categories() {
        let toml = r#"
[[projects]]
id = "docs"
hidden_root = "reference"

[[projects.categories]]
title = "Guide"
items = ["guide/intro.md", { title = "Setup", path = "guide/setup.md" }]
"#;
        let config = parse(toml).unwrap();

        let project = config.default_project().unwrap();
        assert_eq!(project.hidden_root.as_deref(), Some("reference"));
        assert_eq!(project.categories.groups[0].title, "Guide");
        assert_eq!(project.categories.groups[0].items.len(), 2);
    }

    #[test]
    fn test_categories_file_loaded_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("nav.yaml"),
            "categories:\n  - title: Guide\n    items: [a.md]\n",
        )
        .unwrap();
        let toml = "[[projects]]\nid = \"docs\"\ncategories_file = \"nav.yaml\"\n";

        let config = Config::from_toml(toml, dir.path()).unwrap();

        assert_eq!(config.projects[0].categories.groups[0].title, "Guide");
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(matches!(
            parse("[server]\nport = 0\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_find_upwards_picks_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(dir.path().join("a").join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(find_upwards(&nested), Some(dir.path().join("a").join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/docmap.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_file_with_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docmap.toml");
        std::fs::write(
            &path,
            "[origin]\nkind = \"remote\"\nowner = \"o\"\nrepo = \"r\"\n",
        )
        .unwrap();
        let settings = CliSettings {
            port: Some(9999),
            source_dir: Some(PathBuf::from("/tmp/local")),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert!(matches!(
            &config.origin,
            OriginConfig::Local(local) if local.source_dir == Path::new("/tmp/local")
        ));
    }
}
