use std::fmt;
use std::marker::PhantomData;

/// Name of a provider together with the type of instance it yields.
///
/// Lookups go through the key, so a caller always receives `Arc<T>` and never
/// has to cast an opaque instance.
pub struct ProviderKey<T> {
    name: &'static str,
    _instance: PhantomData<fn() -> T>,
}

impl<T> ProviderKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _instance: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ProviderKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ProviderKey<T> {}

impl<T> fmt::Debug for ProviderKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProviderKey").field(&self.name).finish()
    }
}

impl<T> fmt::Display for ProviderKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
