use crate::foundation::error::{DrawPoolError, DrawPoolResult};

pub const ENV_MULTI_THREAD: &str = "DRAWPOOL_MULTI_THREAD";
pub const ENV_THREADS: &str = "DRAWPOOL_THREADS";

/// Startup configuration for [`DrawPoolManager`](crate::DrawPoolManager).
///
/// The multithread flag is read once when the manager is built.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawPoolSettings {
    /// Populate linked pools on worker threads.
    pub multi_thread: bool,
    /// Worker count; `None` lets rayon pick.
    pub threads: Option<usize>,
}

impl DrawPoolSettings {
    pub fn from_json_str(json: &str) -> DrawPoolResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| DrawPoolError::config(format!("invalid settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_env_overrides(self) -> DrawPoolResult<Self> {
        self.with_overrides(
            std::env::var(ENV_MULTI_THREAD).ok().as_deref(),
            std::env::var(ENV_THREADS).ok().as_deref(),
        )
    }

    pub(crate) fn with_overrides(
        mut self,
        multi_thread: Option<&str>,
        threads: Option<&str>,
    ) -> DrawPoolResult<Self> {
        if let Some(raw) = multi_thread {
            self.multi_thread = parse_flag(raw).ok_or_else(|| {
                DrawPoolError::config(format!("{ENV_MULTI_THREAD} must be a boolean, got '{raw}'"))
            })?;
        }
        if let Some(raw) = threads {
            let n = raw.trim().parse::<usize>().map_err(|_| {
                DrawPoolError::config(format!("{ENV_THREADS} must be an integer, got '{raw}'"))
            })?;
            self.threads = Some(n);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> DrawPoolResult<()> {
        if self.threads == Some(0) {
            return Err(DrawPoolError::validation(
                "draw pool 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/settings.rs"]
mod tests;
