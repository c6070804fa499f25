//! Well-known folders of a dispatcher configuration tree.

use std::path::Path;

/// Standard folders of an Apache/dispatcher configuration source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherPath {
    /// `conf` (legacy httpd main config, removed by the conversion)
    Conf,
    /// `conf.d` (Apache fragments: vhosts, rewrites, variables)
    ConfD,
    /// `conf.modules.d` (module loading, removed by the conversion)
    ConfModulesD,
    /// `conf.dispatcher.d` (dispatcher farms and their rule folders)
    ConfDispatcherD,
    /// `enabled_vhosts` (links to enabled virtual hosts)
    EnabledVhosts,
    /// `available_vhosts`
    AvailableVhosts,
    /// `enabled_farms` (links to enabled farms)
    EnabledFarms,
    /// `available_farms`
    AvailableFarms,
}

impl DispatcherPath {
    /// Get the folder name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conf => "conf",
            Self::ConfD => "conf.d",
            Self::ConfModulesD => "conf.modules.d",
            Self::ConfDispatcherD => "conf.dispatcher.d",
            Self::EnabledVhosts => "enabled_vhosts",
            Self::AvailableVhosts => "available_vhosts",
            Self::EnabledFarms => "enabled_farms",
            Self::AvailableFarms => "available_farms",
        }
    }
}

impl AsRef<Path> for DispatcherPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for DispatcherPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for DispatcherPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
