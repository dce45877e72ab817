//! Default configuration values

/// Application display name used in artifact file names
pub const DEFAULT_APP_NAME: &str = "StepUp";

/// Flutter executable
pub const DEFAULT_TOOLCHAIN: &str = "flutter";

/// Project manifest carrying the authoritative version
pub const MANIFEST_FILE: &str = "pubspec.yaml";

/// Release configuration file at the project root
pub const CONFIG_FILE: &str = "release.toml";

/// Root of the version-stamped output directories
pub const RELEASES_DIR: &str = "releases";

/// Per-candidate fetch timeout for mirror resolution (in seconds)
pub const FETCH_TIMEOUT_SECS: u64 = 60;

/// Connect timeout for mirror resolution (in seconds)
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Inno Setup compiler location
pub const INSTALLER_COMPILER: &str = r"C:\Program Files (x86)\Inno Setup 6\ISCC.exe";

/// Inno Setup script, relative to the project root
pub const INSTALLER_SCRIPT: &str = "installer/setup.iss";

/// Website script carrying `APP_VERSION`, relative to the project root
pub const WEBSITE_SCRIPT: &str = "../website/script.js";

/// Pub dependency cache directory name under the home directory
pub const PUB_CACHE_DIR: &str = ".pub-cache";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
