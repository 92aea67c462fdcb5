// src/registry/mod.rs

//! Registration of auxiliary sub-descriptors with the package manager
//!
//! Some libraries are not in the package manager's default index; their
//! descriptors live next to the application descriptor and must be exported
//! into the local cache before resolution. Registration is lazy and
//! idempotent:
//! - Probe whether `name/version` is already known
//! - A failed probe counts as "not known" and triggers an export
//! - An export that reports "already exists" is a success
//! - Any other export failure is logged and left for the next run

mod command;
mod local;

pub use command::CommandRegistry;
pub use local::LocalRegistry;

use crate::error::Result;
use crate::recipe::requirements::condition_holds;
use crate::recipe::{AuxiliaryRecipe, Descriptor, OptionValues};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of a successful export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Exported,
    AlreadyExists,
}

/// Access to the package manager's recipe cache
///
/// This keeps registration decoupled from the concrete package manager.
pub trait RecipeRegistry {
    /// Check whether `name/version` is already registered
    fn is_known(&self, name: &str, version: &str) -> Result<bool>;

    /// Register the descriptor in `recipe_dir` as `name/version`
    fn export(&self, recipe_dir: &Path, name: &str, version: &str) -> Result<ExportStatus>;
}

/// Result of registering one auxiliary descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The probe found it; nothing was exported
    AlreadyKnown,
    /// Exported during this run
    Exported,
    /// Export failed; the next run will try again
    Retryable(String),
}

impl Registration {
    /// Check if the descriptor is usable for this run
    pub fn is_registered(&self) -> bool {
        !matches!(self, Registration::Retryable(_))
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::AlreadyKnown => f.write_str("already registered"),
            Registration::Exported => f.write_str("exported"),
            Registration::Retryable(reason) => write!(f, "not registered ({})", reason),
        }
    }
}

/// Register one auxiliary descriptor; never fails
pub fn ensure_registered(
    registry: &dyn RecipeRegistry,
    aux: &AuxiliaryRecipe,
    base_dir: &Path,
) -> Registration {
    let reference = format!("{}/{}", aux.name, aux.version);

    match registry.is_known(&aux.name, &aux.version) {
        Ok(true) => {
            debug!("{} already registered", reference);
            return Registration::AlreadyKnown;
        }
        Ok(false) => {}
        Err(e) => {
            debug!("Probe for {} failed, treating as unregistered: {}", reference, e);
        }
    }

    let recipe_dir = base_dir.join(&aux.path);
    info!("Registering {} from {}", reference, recipe_dir.display());

    match registry.export(&recipe_dir, &aux.name, &aux.version) {
        Ok(ExportStatus::Exported) => Registration::Exported,
        Ok(ExportStatus::AlreadyExists) => {
            debug!("{} already exists", reference);
            Registration::AlreadyKnown
        }
        Err(e) => {
            warn!("Failed to register {}, will retry next run: {}", reference, e);
            Registration::Retryable(e.to_string())
        }
    }
}

/// Register the auxiliary descriptors of `descriptor` that `options` enable
///
/// `base_dir` is the directory containing the descriptor file. An entry
/// whose condition cannot be evaluated is registered anyway.
pub fn register_auxiliaries(
    registry: &dyn RecipeRegistry,
    descriptor: &Descriptor,
    options: &OptionValues,
    base_dir: &Path,
) -> Vec<(String, Registration)> {
    descriptor
        .auxiliary
        .iter()
        .filter(|aux| match condition_holds(aux.when.as_deref(), options) {
            Ok(enabled) => {
                if !enabled {
                    debug!("{}/{} disabled by options, not registering", aux.name, aux.version);
                }
                enabled
            }
            Err(e) => {
                warn!("Cannot evaluate condition of {}/{}: {}", aux.name, aux.version, e);
                true
            }
        })
        .map(|aux| {
            (
                format!("{}/{}", aux.name, aux.version),
                ensure_registered(registry, aux, base_dir),
            )
        })
        .collect()
}
