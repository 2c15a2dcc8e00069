//! System-wide constants and default paths.

/// Marker file whose presence means the system runs inside a container
/// that already presents its filesystems.
pub const DOCKER_MARKER: &str = "/.dockerinit";

/// Permission mode for provisioned mount points: no read, write, or
/// execute bits until something is mounted over them.
pub const DEFAULT_DIR_MODE: u32 = 0o000;

/// Name of the per-user init executable inside a home directory.
pub const INIT_FILE_NAME: &str = "init";

/// Environment variable that overrides the container marker path.
pub const MARKER_ENV: &str = "BOOTMOUNT_MARKER";

/// Application name used in CLI output.
pub const APP_NAME: &str = "bootmount";
