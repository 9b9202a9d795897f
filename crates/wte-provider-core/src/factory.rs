use std::any::Any;
use std::sync::Arc;

use crate::errors::{BoxError, ProviderError, ProviderResult};

/// Function called to build a provider instance from the shared parameters.
pub type Registration<P, T> = Box<dyn Fn(&P) -> Result<T, BoxError> + Send + Sync>;

/// Holds one registration function and the last instance it produced.
///
/// `register` is the only path that runs the registration function; `load`
/// just hands out the cached instance. Callers serialize access through `&mut`.
pub struct Factory<P, T> {
    registration: Registration<P, T>,
    provider: Option<Arc<T>>,
}

impl<P, T> Factory<P, T> {
    pub fn new<F>(registration: F) -> Self
    where
        F: Fn(&P) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            registration: Box::new(registration),
            provider: None,
        }
    }

    /// Runs the registration function once. A failure leaves any previously
    /// cached instance in place.
    pub fn register(&mut self, params: &P) -> Result<(), BoxError> {
        let provider = (self.registration)(params)?;
        self.provider = Some(Arc::new(provider));
        Ok(())
    }

    pub fn load(&self) -> ProviderResult<Arc<T>> {
        self.provider.clone().ok_or(ProviderError::NotRegistered)
    }
}

/// Type-erased view the registry stores so factories of different instance
/// types can share one map.
pub(crate) trait ErasedFactory<P>: Send {
    fn register(&mut self, params: &P) -> Result<(), BoxError>;
    fn as_any(&self) -> &dyn Any;
}

impl<P, T> ErasedFactory<P> for Factory<P, T>
where
    P: 'static,
    T: Send + Sync + 'static,
{
    fn register(&mut self, params: &P) -> Result<(), BoxError> {
        Factory::register(self, params)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn load_before_register_is_not_registered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let factory: Factory<(), u32> = Factory::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        });

        assert!(matches!(factory.load(), Err(ProviderError::NotRegistered)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_register_keeps_previous_instance() {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let toggle = fail.clone();
        let mut factory: Factory<(), String> = Factory::new(move |_| {
            if toggle.load(Ordering::SeqCst) {
                Err("client unavailable".into())
            } else {
                Ok("first".to_string())
            }
        });

        factory.register(&()).unwrap();
        fail.store(true, Ordering::SeqCst);
        let err = factory.register(&()).unwrap_err();

        assert_eq!(err.to_string(), "client unavailable");
        assert_eq!(factory.load().unwrap().as_str(), "first");
    }

    #[test]
    fn register_passes_params_through() {
        let mut factory: Factory<u32, u32> = Factory::new(|base| Ok(base * 2));
        factory.register(&21).unwrap();
        assert_eq!(*factory.load().unwrap(), 42);
    }
}
