use std::sync::Arc;

use wte_domain::{Locator, LocatorOptions};
use wte_gateway::{GoogleGateway, MapsClient};
use wte_provider_core::{ProviderKey, ProviderRegistry, ProviderResult};

pub const GOOGLE_GATEWAY: ProviderKey<GoogleGateway> = ProviderKey::new("gateways/google");

/// Shared parameters handed to every provider registration.
#[derive(Debug, Clone, Default)]
pub struct Params {
    client: Option<Arc<MapsClient>>,
}

impl Params {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn client(&self) -> Option<&Arc<MapsClient>> {
        self.client.as_ref()
    }
}

pub type Providers = ProviderRegistry<Params>;

/// Registers the Google gateway, built from the configured maps client.
/// Fails if the registry was not configured with one.
pub fn register_gateway_providers(registry: &Providers) -> ProviderResult<()> {
    registry.register(GOOGLE_GATEWAY, |params: &Params| {
        let client = params
            .client()
            .cloned()
            .ok_or("maps client is not configured")?;
        Ok(GoogleGateway::new(client))
    })
}

pub fn locator(registry: &Providers) -> ProviderResult<Locator> {
    locator_with_options(registry, LocatorOptions::default())
}

pub fn locator_with_options(
    registry: &Providers,
    options: LocatorOptions,
) -> ProviderResult<Locator> {
    let gateway = registry.get(GOOGLE_GATEWAY)?;
    Ok(Locator::with_options(gateway, options))
}

#[cfg(test)]
mod tests {
    use wte_gateway::MapsClientConfig;
    use wte_provider_core::{ProviderError, RunMode, no_updates};

    use super::*;

    fn maps_client() -> Arc<MapsClient> {
        Arc::new(MapsClient::new(MapsClientConfig::new("test-key")).unwrap())
    }

    #[test]
    fn unconfigured_registry_fails_fast() {
        let registry = Providers::new(RunMode::Tests);
        let err = register_gateway_providers(&registry).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RegistrationFailed { ref name, .. } if name == "gateways/google"
        ));
        assert!(matches!(locator(&registry), Err(ProviderError::NotFound(_))));
    }

    #[test]
    fn gateway_wraps_configured_client() {
        let registry = Providers::new(RunMode::Tests);
        let client = maps_client();
        registry.configure(Params::new(client.clone()), no_updates);
        register_gateway_providers(&registry).unwrap();

        let gateway = registry.get(GOOGLE_GATEWAY).unwrap();
        assert!(Arc::ptr_eq(gateway.client(), &client));
        assert!(locator(&registry).is_ok());
    }

    #[test]
    fn gateway_registers_once() {
        let registry = Providers::new(RunMode::Tests);
        registry.configure(Params::new(maps_client()), no_updates);
        register_gateway_providers(&registry).unwrap();
        let err = register_gateway_providers(&registry).unwrap_err();
        assert!(matches!(err, ProviderError::AlreadyRegistered(_)));
    }
}
