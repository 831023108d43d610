//! Process-wide tunables whose value can be overridden through environment variables.
//!
//! An [`EnvParam`] couples the name of an environment variable with the textual form of its
//! default value. The value is parsed lazily, on first access, and is then frozen for the rest
//! of the process. This is meant for knobs that are too specialized to deserve a place in a
//! public API but are still useful when tuning or debugging the solver.
//!
//! ```
//! use env_param::EnvParam;
//! static WIDTH: EnvParam<u32> = EnvParam::new("DOC_WIDTH", "64");
//!
//! // the variable is not set, the default applies
//! assert_eq!(WIDTH.get(), 64);
//! ```
//!
//! The environment is only consulted once. A value can also be forced programmatically before
//! the first read:
//!
//! ```
//! use env_param::EnvParam;
//! static VERBOSE: EnvParam<bool> = EnvParam::new("DOC_VERBOSE", "false");
//!
//! assert!(VERBOSE.try_set(true).is_ok());
//! assert!(VERBOSE.get());
//! // already initialized: the new value is handed back
//! assert_eq!(VERBOSE.try_set(false), Err(false));
//! ```

use once_cell::sync::OnceCell;
use std::env::VarError;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

/// Origin of the value held by an initialized parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Parsed from the textual default.
    Default,
    /// Parsed from the environment variable.
    Environment,
    /// Forced through [`EnvParam::set`] or [`EnvParam::try_set`].
    Explicit,
}

pub struct EnvParam<T> {
    cell: OnceCell<(T, Source)>,
    env: &'static str,
    default: &'static str,
}

impl<T> EnvParam<T> {
    /// Declares a parameter read from the environment variable `env`, falling back to `default`.
    pub const fn new(env: &'static str, default: &'static str) -> EnvParam<T> {
        EnvParam {
            cell: OnceCell::new(),
            env,
            default,
        }
    }

    /// Name of the environment variable backing this parameter.
    pub fn name(&self) -> &'static str {
        self.env
    }

    /// Textual default of the parameter.
    pub fn default_text(&self) -> &'static str {
        self.default
    }

    /// Returns true if the value was already read or forced.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Where the current value came from, `None` if the parameter was never accessed.
    pub fn source(&self) -> Option<Source> {
        self.cell.get().map(|(_, src)| *src)
    }

    /// Forces the value of the parameter.
    /// Returns the value back if the parameter was already initialized.
    pub fn try_set(&self, value: T) -> Result<(), T> {
        self.cell.set((value, Source::Explicit)).map_err(|(v, _)| v)
    }

    /// Forces the value of the parameter.
    ///
    /// # Panics
    /// If the parameter was already initialized, typically because it was read before.
    pub fn set(&self, value: T) {
        if self.try_set(value).is_err() {
            panic!("[env_param] {} is already initialized and cannot be overridden", self.env);
        }
    }
}

impl<T: FromStr> EnvParam<T> {
    fn parse_default(&self) -> T {
        match T::from_str(self.default) {
            Ok(v) => v,
            Err(_) => panic!("[env_param] {}: default value {:?} cannot be parsed", self.env, self.default),
        }
    }

    fn initial(&self) -> (T, Source) {
        match std::env::var(self.env) {
            Ok(text) => match T::from_str(text.trim()) {
                Ok(v) => (v, Source::Environment),
                Err(_) => {
                    tracing::warn!(
                        "[env_param] {}: ignoring unparsable value {:?}, using default {:?}",
                        self.env,
                        text,
                        self.default
                    );
                    (self.parse_default(), Source::Default)
                }
            },
            Err(VarError::NotPresent) => (self.parse_default(), Source::Default),
            Err(err @ VarError::NotUnicode(_)) => {
                tracing::warn!("[env_param] {}: {}, using default {:?}", self.env, err, self.default);
                (self.parse_default(), Source::Default)
            }
        }
    }

    /// Returns a reference to the value, reading the environment on the first call.
    ///
    /// # Panics
    /// If the variable is unset (or invalid) and the default value cannot be parsed.
    pub fn get_ref(&self) -> &T {
        &self.cell.get_or_init(|| self.initial()).0
    }

    /// Returns a copy of the value, reading the environment on the first call.
    pub fn get(&self) -> T
    where
        T: Copy,
    {
        *self.get_ref()
    }
}

impl<T: Debug> Debug for EnvParam<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some((v, src)) => write!(f, "{}={:?} ({:?})", self.env, v, src),
            None => write!(f, "{}=<unread, default {:?}>", self.env, self.default),
        }
    }
}
