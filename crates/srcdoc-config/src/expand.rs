//! Home directory and environment variable expansion for configuration strings.
//!
//! A leading `~` expands to the home directory. `$VAR` and `${VAR}` expand to
//! the variable's value and fail when it is unset; `${VAR:-default}` falls
//! back to `default`.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `value` against the process environment.
///
/// `field` names the configuration entry in error messages.
pub(crate) fn expand(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, home_dir, |var| std::env::var(var).ok())
}

fn expand_with(
    value: &str,
    field: &str,
    home: impl FnOnce() -> Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    shellexpand::full_with_context(value, home, |var| lookup(var).map(Some).ok_or(Unset))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// An unset variable without a default.
struct Unset;

fn home_dir() -> Option<String> {
    std::env::home_dir().and_then(|path| path.into_os_string().into_string().ok())
}
