//! Command implementations.

pub mod inspect;
pub mod lookup;
pub mod submit;

use std::path::{Path, PathBuf};

use member_signup_core::ReferrerDirectory;
use member_signup_web::config::{ConfigError, load_referrers};

/// Load the representative directory used by `resolve` and `submit`.
///
/// An explicit file wins over `SIGNUP_REFERRERS_FILE`; without either the
/// built-in list is used.
fn referrer_directory(file: Option<&Path>) -> Result<ReferrerDirectory, ConfigError> {
    dotenvy::dotenv().ok();

    let from_env = std::env::var_os("SIGNUP_REFERRERS_FILE").map(PathBuf::from);
    match file.map(Path::to_path_buf).or(from_env) {
        Some(path) => load_referrers(&path),
        None => Ok(ReferrerDirectory::builtin()),
    }
}
