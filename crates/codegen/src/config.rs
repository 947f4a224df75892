use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how wiring modules are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Directory the generated tree is rooted in.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Subpath shared by generated files and their import paths.
    #[serde(default = "default_gen_dir")]
    pub gen_dir: String,
    /// Remote repository prefix stripped from package paths.
    #[serde(default = "default_remote_prefix")]
    pub remote_prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_gen_dir() -> String {
    "gen/inject".to_string()
}

fn default_remote_prefix() -> String {
    "github.com/".to_string()
}

fn default_extension() -> String {
    "go".to_string()
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            gen_dir: default_gen_dir(),
            remote_prefix: default_remote_prefix(),
            extension: default_extension(),
        }
    }
}

impl GenerateConfig {
    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Package path with the remote prefix removed.
    #[must_use]
    pub fn repo_path<'a>(&self, package_path: &'a str) -> &'a str {
        if self.remote_prefix.is_empty() {
            return package_path;
        }
        package_path
            .strip_prefix(self.remote_prefix.as_str())
            .unwrap_or(package_path)
    }

    /// Import path of the generated package for `package_path`.
    #[must_use]
    pub fn import_path(&self, module: &str, package_path: &str) -> String {
        let gen_dir = self.gen_dir.trim_matches('/');
        format!("{module}/{gen_dir}/{}", self.repo_path(package_path))
    }

    /// Output file for `function` declared in `package_path`.
    #[must_use]
    pub fn file_path(&self, package_path: &str, function: &str) -> PathBuf {
        let mut path = self.output_root.clone();
        path.extend(self.gen_dir.split('/').filter(|s| !s.is_empty()));
        path.extend(self.repo_path(package_path).split('/').filter(|s| !s.is_empty()));
        path.push(format!(
            "{}_module.{}",
            function.to_lowercase(),
            self.extension
        ));
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn strips_remote_prefix() {
        let cfg = GenerateConfig::default();
        assert_eq!(cfg.repo_path("github.com/acme/shop/store"), "acme/shop/store");
        assert_eq!(cfg.repo_path("example.com/shop"), "example.com/shop");
    }

    #[test]
    fn import_path_appends_gen_dir() {
        let cfg = GenerateConfig::default();
        assert_eq!(
            cfg.import_path("github.com/acme/shop", "github.com/acme/shop/store"),
            "github.com/acme/shop/gen/inject/acme/shop/store"
        );
    }

    #[test]
    fn file_path_uses_lowercase_function() {
        let cfg = GenerateConfig::default().with_output_root("/out");
        assert_eq!(
            cfg.file_path("github.com/acme/shop/store", "NewRepository"),
            Path::new("/out/gen/inject/acme/shop/store/newrepository_module.go")
        );
    }
}
