//! Version and build information
//!
//! Values are stamped by `build.rs` at compile time.

use std::fmt;

/// Build information embedded at compile time
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Short git hash, with a `-dirty` suffix for uncommitted builds
    pub revision: &'static str,
    pub built_at: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            revision: env!("CARDFORGE_GIT_REVISION"),
            built_at: env!("CARDFORGE_BUILT_AT"),
            target: env!("CARDFORGE_TARGET"),
            profile: env!("CARDFORGE_PROFILE"),
        }
    }

    /// Version plus revision, e.g. "0.1.0+abc12345"
    pub fn full_version(&self) -> String {
        format!("{}+{}", self.version, self.revision)
    }

    /// User agent sent with every model request
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.name, self.full_version())
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        writeln!(f, "  Revision: {}", self.revision)?;
        writeln!(f, "  Built:    {}", self.built_at)?;
        writeln!(f, "  Target:   {}", self.target)?;
        writeln!(f, "  Profile:  {}", self.profile)
    }
}

/// Print version information to stdout
pub fn print_version() {
    print!("{}", BuildInfo::current());
}
