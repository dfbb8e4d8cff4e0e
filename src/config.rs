//! Boot configuration.
//!
//! Configuration is parsed once from `--name=value` style arguments and then
//! threaded explicitly into whatever needs it — the dispatcher takes the work
//! directory at construction. There is no process-global configuration state,
//! so a concurrent request can never observe a half-updated value.
//!
//! Recognised arguments:
//!
//! | Argument | Meaning | Default |
//! |---|---|---|
//! | `--env=production` | Deployment environment | `development` |
//! | `--workDir=/srv/app/` | Root the `Public` directory lives under | `./` |
//! | `--port=3000` | Port the server binds | `8080` |

use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Deployment environment, as named on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        })
    }
}

/// Boot configuration for a plinth application.
#[derive(Clone, Debug)]
pub struct Config {
    pub env: Environment,
    /// Always ends with a path separator.
    pub work_dir: String,
    pub port: u16,
}

impl Config {
    /// Parses `--name=value` arguments, ignoring anything unrecognised.
    ///
    /// Malformed values fall back to the default for that field, with a
    /// warning — a typo in `--port` should be visible in the logs, not
    /// silently become port 0.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            let Some(rest) = arg.strip_prefix("--") else { continue };
            let Some((name, value)) = rest.split_once('=') else { continue };
            match name {
                "env" => match value.parse() {
                    Ok(env) => config.env = env,
                    Err(()) => warn!(value, "unknown environment, keeping {}", config.env),
                },
                "workDir" => config.work_dir = normalize_dir(value),
                "port" => match value.parse() {
                    Ok(port) => config.port = port,
                    Err(_) => warn!(value, "invalid port, keeping {}", config.port),
                },
                _ => {}
            }
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            work_dir: "./".to_owned(),
            port: 8080,
        }
    }
}

/// Guarantees the trailing separator so `work_dir + "Public"` concatenation
/// can never glue two names together.
fn normalize_dir(dir: &str) -> String {
    if dir.ends_with('/') || dir.ends_with(std::path::MAIN_SEPARATOR) {
        dir.to_owned()
    } else {
        format!("{dir}/")
    }
}
