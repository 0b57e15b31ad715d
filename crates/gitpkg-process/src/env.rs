//! Sanitized environment for spawned `git` processes.
//!
//! Child processes get exactly the map built here; the inherited
//! environment is cleared first. Unrelated `GIT_*` configuration from the
//! parent (e.g. `GIT_DIR`, `GIT_WORK_TREE`) would otherwise redirect the
//! child at the wrong repository.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use uuid::Uuid;

/// Prefix of git's private configuration variables.
pub const GIT_PREFIX: &str = "GIT_";

/// `GIT_*` variables that are passed through from the parent process.
pub const ALLOWED_GIT_VARS: [&str; 7] = [
    "GIT_ASKPASS",
    "GIT_EXEC_PATH",
    "GIT_PROXY_COMMAND",
    "GIT_SSH",
    "GIT_SSH_COMMAND",
    "GIT_SSL_CAINFO",
    "GIT_SSL_NO_VERIFY",
];

static GIT_ENV: OnceLock<HashMap<String, String>> = OnceLock::new();

/// The process-wide environment for `git`, built on first use.
pub fn git_env() -> &'static HashMap<String, String> {
    GIT_ENV.get_or_init(|| {
        let ambient = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        build_env(ambient, template_dir())
    })
}

/// A fresh, unique template directory path under the system temp dir.
///
/// The directory is never created; git tolerates a missing template
/// directory and simply copies no hooks or info files into new repos.
pub fn template_dir() -> PathBuf {
    std::env::temp_dir()
        .join("gitpkg-git-template")
        .join(format!("git-clone-{}", Uuid::now_v7().simple()))
}

/// Build the environment from an ambient variable set.
///
/// Credential prompts are disabled and the template directory is redirected.
/// Every ambient variable outside the `GIT_` prefix is forwarded, as are the
/// allow-listed `GIT_*` variables. An ambient `GIT_ASKPASS` replaces the
/// default no-op helper.
pub fn build_env<I>(ambient: I, template_dir: PathBuf) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env = HashMap::new();
    env.insert("GIT_ASKPASS".to_string(), "echo".to_string());
    env.insert("GIT_TERMINAL_PROMPT".to_string(), "0".to_string());
    env.insert(
        "GIT_TEMPLATE_DIR".to_string(),
        template_dir.to_string_lossy().into_owned(),
    );

    for (key, value) in ambient {
        if is_forwarded(&key) {
            env.insert(key, value);
        }
    }
    env
}

/// Whether an ambient variable reaches the child process.
pub fn is_forwarded(key: &str) -> bool {
    !key.starts_with(GIT_PREFIX) || ALLOWED_GIT_VARS.contains(&key)
}
