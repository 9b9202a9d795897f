pub mod api;
pub mod error;
pub mod providers;

pub use api::{AppState, router};
pub use error::{ApiError, ResultEnvelope, ResultError};
pub use providers::{
    GOOGLE_GATEWAY, Params, Providers, locator, locator_with_options, register_gateway_providers,
};
