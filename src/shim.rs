use log::{error, info};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::error::ShimError;

/// Symbols some scene helpers import but older graphics builds do not export.
pub const DEFAULT_REQUIRED_SYMBOLS: &[&str] = &["BatchedMesh"];

/// The graphics library's exported namespace.
pub trait GraphicsNamespace {
    fn has_symbol(&self, name: &str) -> bool;

    /// Registers an inert placeholder under `name`.
    fn register_placeholder(&self, name: &str) -> Result<(), ShimError>;
}

/// Outcome of a shim installation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ShimReport {
    /// Symbols that were missing and now have placeholders.
    pub patched: Vec<String>,
    /// Symbols that were already exported.
    pub present: Vec<String>,
    pub failures: Vec<String>,
}

impl ShimReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Installs placeholders for missing graphics symbols.
#[derive(Debug, Clone)]
pub struct CompatibilityShims {
    required: Vec<String>,
}

impl Default for CompatibilityShims {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_SYMBOLS.iter().copied())
    }
}

impl CompatibilityShims {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Patches `namespace` now, without the process-wide once guard.
    pub fn apply(&self, namespace: &dyn GraphicsNamespace) -> ShimReport {
        let mut report = ShimReport::default();
        for symbol in &self.required {
            if !is_identifier(symbol) {
                let err = ShimError::Registration {
                    symbol: symbol.clone(),
                    message: "not a valid identifier".into(),
                };
                error!("{err}");
                report.failures.push(err.to_string());
                continue;
            }
            if namespace.has_symbol(symbol) {
                report.present.push(symbol.clone());
                continue;
            }
            match namespace.register_placeholder(symbol) {
                Ok(()) => {
                    info!("installed placeholder for missing graphics symbol {symbol}");
                    report.patched.push(symbol.clone());
                }
                Err(err) => {
                    error!("{err}");
                    report.failures.push(err.to_string());
                }
            }
        }
        report
    }

    /// Runs [`apply`](Self::apply) the first time it is called in this
    /// process. Later calls return the first report and leave `namespace`
    /// untouched.
    pub fn install(&self, namespace: &dyn GraphicsNamespace) -> &'static ShimReport {
        static INSTALLED: OnceCell<ShimReport> = OnceCell::new();
        self.install_into(&INSTALLED, namespace)
    }

    fn install_into<'a>(
        &self,
        cell: &'a OnceCell<ShimReport>,
        namespace: &dyn GraphicsNamespace,
    ) -> &'a ShimReport {
        cell.get_or_init(|| self.apply(namespace))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
