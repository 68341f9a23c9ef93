//! Version information for the dotkeep CLI

/// Version information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Semantic version
    pub version: String,

    /// Git commit SHA (short)
    pub commit: Option<String>,
}

impl VersionInfo {
    /// Create version info for current build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
        }
    }

    /// Version string exposed to config templates, e.g. `0.4.0+abc1234`
    pub fn template_version(&self) -> String {
        match &self.commit {
            Some(commit) => format!("{}+{}", self.version, commit),
            None => self.version.clone(),
        }
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dotkeep {}", self.version)?;
        if let Some(commit) = &self.commit {
            write!(f, " ({})", commit)?;
        }
        Ok(())
    }
}
