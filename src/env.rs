use std::sync::Mutex;

use log::{debug, warn};

use crate::errors::Result;

/// Options applied by every [Env] unless overridden.
pub const DEFAULT_OPTIONS: &[(&str, &str)] = &[
    ("CHECK_WITH_INVERT_PROJ", "YES"),
    ("GTIFF_IMPLICIT_JPEG_OVR", "NO"),
];

/// Engine configuration options are process-global; setup and teardown
/// are serialized behind this lock.
static CONFIG_LOCK: Mutex<()> = Mutex::new(());

/// Scoped engine configuration.
///
/// The engine is stateful: a driver registry, an error stack and dozens
/// of configuration options. `Env` makes a configuration scope explicit:
/// constructing one records the prior value of every option it touches
/// and applies the new values; dropping it restores (or clears) them.
/// Open and create calls take `&Env` so the scope is visible in
/// signatures rather than ambient.
///
/// Nested scopes restore correctly as long as they drop in LIFO order,
/// which ownership gives for free.
#[derive(Debug)]
pub struct Env {
    restore: Vec<(String, Option<String>)>,
}

impl Env {
    /// Scope with only the [default options](DEFAULT_OPTIONS).
    pub fn new() -> Result<Self> {
        Self::with_options(std::iter::empty::<(&str, &str)>())
    }

    /// Scope with the default options plus `options`; later entries win.
    pub fn with_options<K, V>(options: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let _guard = lock();
        let mut restore = Vec::new();
        for (key, value) in DEFAULT_OPTIONS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .chain(
                options
                    .into_iter()
                    .map(|(key, value)| (key.as_ref().to_string(), value.as_ref().to_string())),
            )
        {
            let prior = gdal::config::get_config_option(&key, "")?;
            let prior = (!prior.is_empty()).then_some(prior);
            debug!("config {key}={value} (was {prior:?})");
            gdal::config::set_config_option(&key, &value)?;
            restore.push((key, prior));
        }
        Ok(Env { restore })
    }

    /// Current value of an engine option, `default` if unset.
    pub fn get_option(&self, key: &str, default: &str) -> Result<String> {
        Ok(gdal::config::get_config_option(key, default)?)
    }
}

impl Drop for Env {
    fn drop(&mut self) {
        let _guard = lock();
        for (key, prior) in self.restore.drain(..).rev() {
            let restored = match prior {
                Some(value) => gdal::config::set_config_option(&key, &value),
                None => gdal::config::clear_config_option(&key),
            };
            if let Err(error) = restored {
                warn!("failed to restore config option {key}: {error}");
            }
        }
    }
}

fn lock() -> std::sync::MutexGuard<'static, ()> {
    CONFIG_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_apply_within_the_scope_and_restore_after() {
        let env = Env::with_options([("GDAL_RASTIO_PROBE", "inner")]).unwrap();
        assert_eq!(
            env.get_option("GDAL_RASTIO_PROBE", "unset").unwrap(),
            "inner"
        );
        assert_eq!(
            env.get_option("CHECK_WITH_INVERT_PROJ", "unset").unwrap(),
            "YES"
        );
        drop(env);
        assert_eq!(
            gdal::config::get_config_option("GDAL_RASTIO_PROBE", "unset").unwrap(),
            "unset"
        );
    }

    #[test]
    fn nested_scopes_restore_in_lifo_order() {
        let outer = Env::with_options([("GDAL_RASTIO_NESTED", "outer")]).unwrap();
        {
            let inner = Env::with_options([("GDAL_RASTIO_NESTED", "inner")]).unwrap();
            assert_eq!(
                inner.get_option("GDAL_RASTIO_NESTED", "").unwrap(),
                "inner"
            );
        }
        assert_eq!(
            outer.get_option("GDAL_RASTIO_NESTED", "").unwrap(),
            "outer"
        );
    }
}
