use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use wte_common::RunMode;

use crate::errors::{BoxError, ProviderError, ProviderResult};
use crate::factory::{ErasedFactory, Factory};
use crate::key::ProviderKey;

/// Reports whether configuration changed since the cached instances were built.
///
/// Evaluated on every `get`, so it must be cheap and free of side effects.
pub type UpdateCheck = Arc<dyn Fn() -> bool + Send + Sync>;

pub fn no_updates() -> bool {
    false
}

struct Entry<P> {
    factory: Box<dyn ErasedFactory<P>>,
    has_updates: Option<UpdateCheck>,
}

struct State<P> {
    configured: bool,
    params: P,
    has_updates: UpdateCheck,
    factories: HashMap<&'static str, Entry<P>>,
}

/// Named provider factories sharing one parameter bundle `P`.
///
/// Every operation holds the same lock for its whole duration, including while
/// a registration function runs. Registration functions receive the params
/// directly and must not call back into the registry.
pub struct ProviderRegistry<P> {
    mode: RunMode,
    state: Mutex<State<P>>,
}

impl<P> ProviderRegistry<P>
where
    P: Default + Send + 'static,
{
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            state: Mutex::new(State {
                configured: false,
                params: P::default(),
                has_updates: Arc::new(no_updates),
                factories: HashMap::new(),
            }),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Sets the params handed to registration functions and the default
    /// change predicate.
    ///
    /// Only the first call takes effect, unless the registry runs in test mode
    /// where every call overwrites. Returns whether this call was applied.
    pub fn configure<F>(&self, params: P, has_updates: F) -> bool
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        let mut state = self.lock();
        if state.configured && !self.mode.is_tests() {
            debug!(event = "provider_configure_ignored", mode = %self.mode);
            return false;
        }
        state.params = params;
        state.has_updates = Arc::new(has_updates);
        state.configured = true;
        info!(event = "provider_configured", mode = %self.mode);
        true
    }

    /// Registers `key` and builds its instance right away, so a broken
    /// registration surfaces at startup instead of first use.
    pub fn register<T, F>(&self, key: ProviderKey<T>, registration: F) -> ProviderResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&P) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.insert(key, Factory::new(registration), None)
    }

    /// Like [`register`](Self::register), with a change predicate that
    /// overrides the registry-wide one for this provider.
    pub fn register_with_updates<T, F, U>(
        &self,
        key: ProviderKey<T>,
        registration: F,
        has_updates: U,
    ) -> ProviderResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&P) -> Result<T, BoxError> + Send + Sync + 'static,
        U: Fn() -> bool + Send + Sync + 'static,
    {
        self.insert(key, Factory::new(registration), Some(Arc::new(has_updates)))
    }

    fn insert<T>(
        &self,
        key: ProviderKey<T>,
        mut factory: Factory<P, T>,
        has_updates: Option<UpdateCheck>,
    ) -> ProviderResult<()>
    where
        T: Send + Sync + 'static,
    {
        let mut state = self.lock();
        if state.factories.contains_key(key.name()) {
            return Err(ProviderError::AlreadyRegistered(key.name().to_string()));
        }

        factory.register(&state.params).map_err(|source| {
            warn!(event = "provider_register_failed", provider = %key, error = %source);
            ProviderError::RegistrationFailed {
                name: key.name().to_string(),
                source,
            }
        })?;

        state.factories.insert(
            key.name(),
            Entry {
                factory: Box::new(factory),
                has_updates,
            },
        );
        info!(event = "provider_registered", provider = %key);
        Ok(())
    }

    /// Returns the cached instance for `key`, rebuilding it first when the
    /// effective change predicate reports stale configuration.
    ///
    /// A failed rebuild is returned as is; the stale instance is not used.
    pub fn get<T>(&self, key: ProviderKey<T>) -> ProviderResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let mut guard = self.lock();
        let State {
            params,
            has_updates,
            factories,
            ..
        } = &mut *guard;

        let entry = factories
            .get_mut(key.name())
            .ok_or_else(|| ProviderError::NotFound(key.name().to_string()))?;
        // A name registered under another instance type is not this key.
        if entry.factory.as_any().downcast_ref::<Factory<P, T>>().is_none() {
            return Err(ProviderError::NotFound(key.name().to_string()));
        }

        let check = entry.has_updates.as_ref().unwrap_or(&*has_updates);
        if check() {
            debug!(event = "provider_refresh", provider = %key);
            entry
                .factory
                .register(&*params)
                .map_err(|source| {
                    warn!(event = "provider_refresh_failed", provider = %key, error = %source);
                    ProviderError::RegistrationFailed {
                        name: key.name().to_string(),
                        source,
                    }
                })?;
        }

        match entry.factory.as_any().downcast_ref::<Factory<P, T>>() {
            Some(factory) => factory.load(),
            None => Err(ProviderError::NotFound(key.name().to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // State is only written after a registration succeeds, so a panic inside
    // one leaves it consistent.
    fn lock(&self) -> MutexGuard<'_, State<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> Default for ProviderRegistry<P>
where
    P: Default + Send + 'static,
{
    fn default() -> Self {
        Self::new(RunMode::default())
    }
}
