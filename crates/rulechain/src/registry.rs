//! Procedure registry.
//!
//! Filters and validators live in separate namespaces, so the same name may
//! be both a filter and a validator. Within a namespace the last
//! registration for a name wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;
use crate::procedure::{Filter, Procedure, ProcedureBundle, Validator};
use crate::syntax::Syntax;

/// Which side of the registry a name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Value-transforming procedures.
    Filter,
    /// Value-checking procedures.
    Validator,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Filter => "filter",
            Self::Validator => "validator",
        })
    }
}

/// Named filters and validators.
///
/// All methods take `&self`; the maps sit behind read/write locks so one
/// registry can be shared through an `Arc` by every engine in the process.
/// Lookups hand out `Arc` clones, so no lock is held while a procedure runs.
///
/// ```
/// use nebula_rulechain::procedure::filter_fn;
/// use nebula_rulechain::ProcedureRegistry;
///
/// let registry = ProcedureRegistry::new();
/// registry.add_filter("identity", filter_fn(|v, _| Ok(v))).unwrap();
///
/// assert!(registry.has_filter("identity"));
/// assert!(!registry.has_validator("identity"));
/// ```
pub struct ProcedureRegistry {
    syntax: Syntax,
    filters: RwLock<HashMap<String, Arc<dyn Filter>>>,
    validators: RwLock<HashMap<String, Arc<dyn Validator>>>,
}

impl ProcedureRegistry {
    /// Creates an empty registry that rejects names clashing with the
    /// default [`Syntax`].
    pub fn new() -> Self {
        Self::with_syntax(Syntax::default())
    }

    /// Creates an empty registry that rejects names clashing with `syntax`.
    pub fn with_syntax(syntax: Syntax) -> Self {
        Self {
            syntax,
            filters: RwLock::new(HashMap::new()),
            validators: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry preloaded with the builtin filters and validators.
    #[cfg(feature = "builtins")]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_bundle(&crate::builtins::StringFilters);
        registry.register_bundle(&crate::builtins::CoreValidators);
        registry
    }

    /// The syntax names are checked against.
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Stores `procedure` under `name` in its namespace.
    ///
    /// An existing entry with the same name is replaced. Names that no rule
    /// string could reference are rejected: the error is logged as a warning,
    /// returned, and the registry is left untouched.
    pub fn register(
        &self,
        name: impl Into<String>,
        procedure: Procedure,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        let namespace = procedure.namespace();

        if let Err(error) = self.check_name(&name) {
            tracing::warn!(%namespace, name = %name, %error, "procedure registration skipped");
            return Err(error);
        }

        let replaced = match procedure {
            Procedure::Filter(filter) => {
                self.filters.write().insert(name.clone(), filter).is_some()
            }
            Procedure::Validator(validator) => self
                .validators
                .write()
                .insert(name.clone(), validator)
                .is_some(),
        };

        if replaced {
            tracing::debug!(%namespace, name = %name, "procedure replaced");
        } else {
            tracing::trace!(%namespace, name = %name, "procedure registered");
        }
        Ok(())
    }

    /// Registers a filter.
    pub fn add_filter(
        &self,
        name: impl Into<String>,
        filter: impl Filter + 'static,
    ) -> Result<(), RegistrationError> {
        self.register(name, Procedure::filter(filter))
    }

    /// Registers a validator.
    pub fn add_validator(
        &self,
        name: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> Result<(), RegistrationError> {
        self.register(name, Procedure::validator(validator))
    }

    /// Registers every procedure of `bundle` under its own name.
    ///
    /// Entries with rejected names are skipped (each logs a warning).
    /// Returns how many entries were stored.
    pub fn register_bundle(&self, bundle: &dyn ProcedureBundle) -> usize {
        let mut stored = 0;
        for (name, procedure) in bundle.procedures() {
            if self.register(name, procedure).is_ok() {
                stored += 1;
            }
        }
        stored
    }

    /// Whether `name` exists in `namespace`.
    pub fn has(&self, namespace: Namespace, name: &str) -> bool {
        match namespace {
            Namespace::Filter => self.filters.read().contains_key(name),
            Namespace::Validator => self.validators.read().contains_key(name),
        }
    }

    /// Whether a filter named `name` exists.
    pub fn has_filter(&self, name: &str) -> bool {
        self.has(Namespace::Filter, name)
    }

    /// Whether a validator named `name` exists.
    pub fn has_validator(&self, name: &str) -> bool {
        self.has(Namespace::Validator, name)
    }

    /// Looks `name` up in `namespace`.
    pub fn resolve(&self, namespace: Namespace, name: &str) -> Option<Procedure> {
        match namespace {
            Namespace::Filter => self.filter(name).map(Procedure::Filter),
            Namespace::Validator => self.validator(name).map(Procedure::Validator),
        }
    }

    /// Looks up a filter.
    pub fn filter(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.filters.read().get(name).cloned()
    }

    /// Looks up a validator.
    pub fn validator(&self, name: &str) -> Option<Arc<dyn Validator>> {
        self.validators.read().get(name).cloned()
    }

    /// Removes `name` from `namespace`. Returns whether it was present.
    pub fn remove(&self, namespace: Namespace, name: &str) -> bool {
        match namespace {
            Namespace::Filter => self.filters.write().remove(name).is_some(),
            Namespace::Validator => self.validators.write().remove(name).is_some(),
        }
    }

    /// Registered names in `namespace`, sorted.
    pub fn names(&self, namespace: Namespace) -> Vec<String> {
        let mut names: Vec<String> = match namespace {
            Namespace::Filter => self.filters.read().keys().cloned().collect(),
            Namespace::Validator => self.validators.read().keys().cloned().collect(),
        };
        names.sort_unstable();
        names
    }

    /// Total number of procedures across both namespaces.
    pub fn len(&self) -> usize {
        self.filters.read().len() + self.validators.read().len()
    }

    /// Whether no procedure is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_name(&self, name: &str) -> Result<(), RegistrationError> {
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if let Some(token) = self.syntax.reserved_token_in(name) {
            return Err(RegistrationError::ReservedToken {
                name: name.to_owned(),
                token: token.to_owned(),
            });
        }
        if let Some(token) = self.syntax.token_spliced_after(name) {
            return Err(RegistrationError::SplicedToken {
                name: name.to_owned(),
                token: token.to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for ProcedureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("filters", &self.names(Namespace::Filter))
            .field("validators", &self.names(Namespace::Validator))
            .finish()
    }
}
