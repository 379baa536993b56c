mod component;
mod translator;

pub use component::{FederationState, HlaGateway};
pub use translator::ParameterTranslator;
