//! Log filter defaults shared by the binaries.

/// Workspace crate targets that should receive log output.
pub const CRATE_TARGETS: &[&str] = &["complendar", "complendar_core", "complendar_server"];

/// `EnvFilter` directives for a `-v` count.
///
/// Mapping:
/// - 0 (none) -> warn
/// - 1 (-v)   -> info
/// - 2 (-vv)  -> debug
/// - 3+ (-vvv)-> trace
pub fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
