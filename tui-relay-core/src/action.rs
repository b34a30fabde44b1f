//! Typed action keys
//!
//! An [`ActionKey<T>`] names one logical action that a control can trigger,
//! with `T` the payload type the action expects. The payload type exists only
//! at compile time; two keys are the same action exactly when their
//! identifiers are equal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ANONYMOUS: AtomicU64 = AtomicU64::new(1);

/// Identifiers starting with this are reserved for [`ActionKey::create`].
pub const ANONYMOUS_PREFIX: &str = "\0anon/";

/// Untyped identifier of a logical action.
///
/// This is what the dispatcher keys its state by and what the engine
/// receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Create an identifier from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Typed identifier for an action whose payload is `T`.
///
/// Equality and hashing look at the identifier only; the debug symbol is
/// carried for diagnostics.
///
/// # Example
///
/// ```
/// use tui_relay_core::ActionKey;
///
/// let save: ActionKey<()> = ActionKey::in_scope("toolbar", "save");
/// let same: ActionKey<()> = ActionKey::named("toolbar/save").with_debug_symbol("Save");
/// assert_eq!(save, same);
/// assert_eq!(save.id().as_str(), "toolbar/save");
/// ```
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct ActionKey<T> {
    id: ActionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    debug_symbol: Option<String>,
    #[serde(skip)]
    _payload: PhantomData<fn() -> T>,
}

impl<T> ActionKey<T> {
    /// Create a key with a fresh identifier, unique within this process.
    ///
    /// The identifier lives under [`ANONYMOUS_PREFIX`], which names and
    /// scopes typed by hand do not produce.
    pub fn create() -> Self {
        let n = NEXT_ANONYMOUS.fetch_add(1, Ordering::Relaxed);
        Self::named(format!("{ANONYMOUS_PREFIX}{n}"))
    }

    /// Whether this key came from [`ActionKey::create`].
    pub fn is_anonymous(&self) -> bool {
        self.id.as_str().starts_with(ANONYMOUS_PREFIX)
    }

    /// Create a key with an explicit identifier.
    pub fn named(id: impl Into<ActionId>) -> Self {
        Self {
            id: id.into(),
            debug_symbol: None,
            _payload: PhantomData,
        }
    }

    /// Create a key whose identifier is `scope/name`.
    pub fn in_scope(scope: &str, name: &str) -> Self {
        if scope.is_empty() {
            return Self::named(name);
        }
        Self::named(format!("{scope}/{name}"))
    }

    /// Attach a human-readable symbol for logs.
    pub fn with_debug_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.debug_symbol = Some(symbol.into());
        self
    }

    /// The identifier shared by every key for this action.
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// The debug symbol, if one was attached.
    pub fn debug_symbol(&self) -> Option<&str> {
        self.debug_symbol.as_deref()
    }

    /// Debug symbol if present, identifier otherwise.
    pub fn display_name(&self) -> &str {
        self.debug_symbol.as_deref().unwrap_or(self.id.as_str())
    }
}

impl<T> Clone for ActionKey<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            debug_symbol: self.debug_symbol.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ActionKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionKey")
            .field("id", &self.id)
            .field("debug_symbol", &self.debug_symbol)
            .field("payload", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> PartialEq for ActionKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ActionKey<T> {}

impl<T> Hash for ActionKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A group of action keys created together under one scope.
///
/// Use `#[derive(ActionKeys)]` from `tui-relay-macros` to implement this for
/// a struct whose fields are all `ActionKey<_>`.
pub trait ActionKeySet: Sized {
    /// Scope used by [`create`](Self::create).
    const DEFAULT_SCOPE: &'static str;

    /// Build every key under `scope`.
    fn in_scope(scope: &str) -> Self;

    /// Build every key under the default scope.
    fn create() -> Self {
        Self::in_scope(Self::DEFAULT_SCOPE)
    }

    /// Identifiers of every key in the set, in field order.
    fn ids(&self) -> Vec<&ActionId>;
}
