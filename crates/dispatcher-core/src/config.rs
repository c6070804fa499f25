//! Converter settings
//!
//! Every field has a default, so a settings file only needs to name what it
//! changes. Files are read with [`ConfigStore`] and may be TOML, JSON or YAML.

use crate::{Error, Result};
use dispatcher_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

/// Directives allowed in converted virtual host files, lower-cased.
/// Block directives are written with angle brackets.
pub const DEFAULT_WHITELIST: &[&str] = &[
    "<directory>",
    "<files>",
    "<filesmatch>",
    "<if>",
    "<ifdefine>",
    "<ifmodule>",
    "<location>",
    "<locationmatch>",
    "<proxy>",
    "<requireall>",
    "<requireany>",
    "<virtualhost>",
    "addcharset",
    "addencoding",
    "addhandler",
    "addoutputfilter",
    "addoutputfilterbytype",
    "addtype",
    "alias",
    "allow",
    "allowencodedslashes",
    "allowmethods",
    "allowoverride",
    "authbasicprovider",
    "authgroupfile",
    "authname",
    "authtype",
    "authuserfile",
    "browsermatch",
    "browsermatchnocase",
    "define",
    "deflatecompressionlevel",
    "deflatefilternote",
    "deflatememlevel",
    "deflatewindowsize",
    "deny",
    "directoryslash",
    "dispatcherdeclineroot",
    "dispatcherpasserror",
    "dispatcheruseprocessedurl",
    "documentroot",
    "errordocument",
    "fileetag",
    "filterchain",
    "filterdeclare",
    "filterprovider",
    "forcetype",
    "header",
    "include",
    "includeoptional",
    "keepalive",
    "limitrequestfieldsize",
    "modmimeusepathinfo",
    "options",
    "order",
    "passenv",
    "redirect",
    "redirectmatch",
    "remoteipheader",
    "remoteiptrustedproxylist",
    "requestheader",
    "requestreadtimeout",
    "require",
    "rewritecond",
    "rewriteengine",
    "rewritemap",
    "rewriteoptions",
    "rewriterule",
    "satisfy",
    "scriptalias",
    "secrequestbodyaccess",
    "secruleengine",
    "serveralias",
    "servername",
    "serversignature",
    "setenvif",
    "setenvifnocase",
    "sethandler",
    "setoutputfilter",
    "substitute",
    "traceenable",
    "undefine",
    "userdir",
];

/// A variable that changed its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRename {
    pub from: String,
    pub to: String,
}

impl VariableRename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    ["author", "unhealthy", "health", "lc", "flush"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_whitelist() -> Vec<String> {
    DEFAULT_WHITELIST.iter().map(|d| d.to_string()).collect()
}

fn default_renames() -> Vec<VariableRename> {
    vec![VariableRename::new("PUBLISH_DOCROOT", "DOCROOT")]
}

fn default_removed_variables() -> Vec<String> {
    ["DISP_ID", "PUBLISH_FORCE_SSL", "PUBLISH_WHITELIST_ENABLED"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_root_marker() -> String {
    "src".to_string()
}

fn default_comment_marker() -> String {
    "#".to_string()
}

/// Settings that drive the conversion rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Name fragments marking author, health check and flush hosts/farms
    #[serde(default = "default_keywords")]
    pub non_publish_keywords: Vec<String>,

    /// Directives kept in virtual host files
    #[serde(default = "default_whitelist")]
    pub whitelisted_directives: Vec<String>,

    /// Variables renamed in virtual host files
    #[serde(default = "default_renames")]
    pub vhost_variable_renames: Vec<VariableRename>,

    /// Variables whose usages are removed from virtual host files
    #[serde(default = "default_removed_variables")]
    pub removed_variables: Vec<String>,

    /// Variables renamed in farm files
    #[serde(default = "default_renames")]
    pub farm_variable_renames: Vec<VariableRename>,

    /// Path component provenance comments start from
    #[serde(default = "default_root_marker")]
    pub root_marker: String,

    /// Prefix used to comment a line out
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            non_publish_keywords: default_keywords(),
            whitelisted_directives: default_whitelist(),
            vhost_variable_renames: default_renames(),
            removed_variables: default_removed_variables(),
            farm_variable_renames: default_renames(),
            root_marker: default_root_marker(),
            comment_marker: default_comment_marker(),
        }
    }
}

impl ConverterConfig {
    /// Parse settings from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use dispatcher_core::ConverterConfig;
    ///
    /// let config = ConverterConfig::parse(r#"
    /// non_publish_keywords = ["author"]
    /// "#).unwrap();
    ///
    /// assert_eq!(config.non_publish_keywords, vec!["author"]);
    /// assert_eq!(config.comment_marker, "#");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: ConverterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a TOML, JSON or YAML file
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let config: ConverterConfig = ConfigStore::new().load(path)?;
        config.validate()?;
        tracing::debug!(path = %path, "Loaded converter configuration");
        Ok(config)
    }

    /// Reject settings the rules cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.comment_marker.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "comment_marker must not be empty".into(),
            });
        }
        if self.root_marker.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "root_marker must not be empty".into(),
            });
        }
        if let Some(rename) = self
            .vhost_variable_renames
            .iter()
            .chain(&self.farm_variable_renames)
            .find(|rename| rename.from.is_empty())
        {
            return Err(Error::InvalidConfig {
                message: format!("variable rename to '{}' has an empty source name", rename.to),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.non_publish_keywords.len(), 5);
        assert_eq!(config.whitelisted_directives.len(), DEFAULT_WHITELIST.len());
        assert!(config.whitelisted_directives.contains(&"<ifmodule>".to_string()));
        assert_eq!(
            config.vhost_variable_renames,
            vec![VariableRename::new("PUBLISH_DOCROOT", "DOCROOT")]
        );
        assert_eq!(config.root_marker, "src");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ConverterConfig::parse("").unwrap(), ConverterConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ConverterConfig::parse(
            r#"
removed_variables = ["DISP_ID"]

[[farm_variable_renames]]
from = "PUBLISH_DOCROOT"
to = "FARM_DOCROOT"
"#,
        )
        .unwrap();
        assert_eq!(config.removed_variables, vec!["DISP_ID"]);
        assert_eq!(config.farm_variable_renames[0].to, "FARM_DOCROOT");
        assert_eq!(config.vhost_variable_renames[0].to, "DOCROOT");
    }

    #[test]
    fn test_empty_comment_marker_rejected() {
        let err = ConverterConfig::parse("comment_marker = \"\"").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
