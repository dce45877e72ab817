//! Upstream and mirror URLs

/// Upstream host prefix for release assets (GitHub)
pub const GITHUB_UPSTREAM: &str = "https://github.com/";

/// GitHub release-asset mirrors, tried in order after the upstream
pub const GITHUB_MIRRORS: &[&str] = &[
    "https://ghproxy.net/https://github.com/",
    "https://gh-proxy.com/https://github.com/",
];

/// Flutter engine storage mirror
pub const FLUTTER_STORAGE_MIRROR: &str = "https://storage.flutter-io.cn";

/// Pub package host mirror
pub const PUB_HOSTED_MIRROR: &str = "https://pub.flutter-io.cn";

/// Native libraries prefetched into the dependency cache.
///
/// Each entry is `(url, destination relative to the cache directory)`.
pub const NATIVE_ARTIFACTS: &[(&str, &str)] = &[(
    "https://github.com/simolus3/sqlite3.dart/releases/download/sqlite3-2.4.6/sqlite3.wasm",
    "native/sqlite3.wasm",
)];
