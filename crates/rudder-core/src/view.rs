//! View locator normalization
//!
//! Hosts map view-model types to view types by key. A proxy must map to
//! the same view as the screen type it decorates, so the host's view
//! locator is handed a normalizer strategy instead of a global hook.

use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::types::TypeKey;

/// Strategy turning a screen descriptor into a view-lookup key.
pub trait ViewModelKeyNormalizer: Send + Sync {
    /// The key the host's view locator should look up
    fn normalize(&self, descriptor: &ScreenDescriptor) -> TypeKey;
}

/// Normalizer that sees through proxies to the base screen type.
#[derive(Debug, Default)]
pub struct ProxyAwareNormalizer;

impl ProxyAwareNormalizer {
    /// A fresh normalizer
    pub fn new() -> Self {
        Self
    }
}

impl ViewModelKeyNormalizer for ProxyAwareNormalizer {
    fn normalize(&self, descriptor: &ScreenDescriptor) -> TypeKey {
        descriptor.proxy_of().unwrap_or_else(|| descriptor.type_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ShellScreen;

    #[test]
    fn plain_descriptor_keeps_its_key() {
        let descriptor = ScreenDescriptor::for_type::<ShellScreen>().build();
        let key = ProxyAwareNormalizer::new().normalize(&descriptor);
        assert_eq!(key, TypeKey::of::<ShellScreen>());
    }

    #[test]
    fn proxy_descriptor_normalizes_to_base_key() {
        let descriptor = ScreenDescriptor::for_type::<ShellScreen>().build();
        let proxy = descriptor.derive_proxy(vec![], vec![]);
        let key = ProxyAwareNormalizer::new().normalize(&proxy);
        assert_eq!(key, TypeKey::of::<ShellScreen>());
    }
}
