use std::collections::BTreeSet;
use std::sync::Arc;

use courier_common::protocol::error::{Result, RpcError};
use courier_common::protocol::make_service_key;

use crate::load_balance::LoadBalance;

/// Discovery collaborator: the candidate addresses currently serving a key.
pub trait ServiceRegistry: Send + Sync {
    fn discovery(&self, service_key: &str) -> BTreeSet<String>;
}

/// Picks the address one call is sent to.
///
/// A static address wins outright. Otherwise discovery supplies the
/// candidates, and the load-balance policy only breaks ties between two or
/// more of them.
pub struct AddressResolver {
    static_address: Option<String>,
    service_registry: Option<Arc<dyn ServiceRegistry>>,
    load_balance: Arc<dyn LoadBalance>,
}

impl AddressResolver {
    pub fn new(
        static_address: Option<String>,
        service_registry: Option<Arc<dyn ServiceRegistry>>,
        load_balance: Arc<dyn LoadBalance>,
    ) -> Self {
        let static_address = static_address.filter(|address| !address.trim().is_empty());
        Self {
            static_address,
            service_registry,
            load_balance,
        }
    }

    pub fn static_address(&self) -> Option<&str> {
        self.static_address.as_deref()
    }

    pub fn has_service_registry(&self) -> bool {
        self.service_registry.is_some()
    }

    /// Resolve the address for `type_name` at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::AddressEmpty`] when neither the static address
    /// nor discovery yields a non-blank address.
    pub fn resolve(&self, type_name: &str, version: Option<&str>) -> Result<String> {
        if let Some(address) = &self.static_address {
            return Ok(address.clone());
        }

        let routed = self.service_registry.as_ref().and_then(|registry| {
            let service_key = make_service_key(type_name, version);
            let candidates = registry.discovery(&service_key);

            match candidates.len() {
                0 => {
                    tracing::debug!(service_key = %service_key, "Discovery returned no candidates");
                    None
                }
                1 => candidates.into_iter().next(),
                _ => self.load_balance.route(&service_key, &candidates),
            }
        });

        match routed {
            Some(address) if !address.trim().is_empty() => Ok(address),
            _ => Err(RpcError::AddressEmpty {
                type_name: type_name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balance::RoundRobin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRegistry {
        addresses: Vec<String>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn with(addresses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                addresses: addresses.iter().map(|a| a.to_string()).collect(),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    impl ServiceRegistry for FakeRegistry {
        fn discovery(&self, service_key: &str) -> BTreeSet<String> {
            self.queries.lock().unwrap().push(service_key.to_string());
            self.addresses.iter().cloned().collect()
        }
    }

    #[derive(Default)]
    struct CountingPolicy {
        calls: AtomicUsize,
    }

    impl LoadBalance for CountingPolicy {
        fn route(&self, _service_key: &str, addresses: &BTreeSet<String>) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            addresses.iter().last().cloned()
        }
    }

    #[test]
    fn test_static_address_skips_discovery() {
        let registry = FakeRegistry::with(&["10.0.0.2:7080"]);
        let resolver = AddressResolver::new(
            Some("10.0.0.1:7080".to_string()),
            Some(registry.clone()),
            Arc::new(RoundRobin::new()),
        );

        assert_eq!(resolver.resolve("Foo", None).unwrap(), "10.0.0.1:7080");
        assert!(registry.queries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_blank_static_address_is_ignored() {
        let registry = FakeRegistry::with(&["10.0.0.2:7080"]);
        let resolver = AddressResolver::new(
            Some("   ".to_string()),
            Some(registry.clone()),
            Arc::new(RoundRobin::new()),
        );

        assert_eq!(resolver.static_address(), None);
        assert_eq!(resolver.resolve("Foo", Some("v1")).unwrap(), "10.0.0.2:7080");
        assert_eq!(*registry.queries.lock().unwrap(), vec!["Foo#v1".to_string()]);
    }

    #[test]
    fn test_single_candidate_skips_policy() {
        let policy = Arc::new(CountingPolicy::default());
        let resolver = AddressResolver::new(
            None,
            Some(FakeRegistry::with(&["only:1"])),
            policy.clone(),
        );

        assert_eq!(resolver.resolve("Foo", None).unwrap(), "only:1");
        assert_eq!(policy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_many_candidates_use_policy() {
        let policy = Arc::new(CountingPolicy::default());
        let resolver = AddressResolver::new(
            None,
            Some(FakeRegistry::with(&["a:1", "b:1", "c:1"])),
            policy.clone(),
        );

        assert_eq!(resolver.resolve("Foo", None).unwrap(), "c:1");
        assert_eq!(policy.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_candidates_is_address_empty() {
        let resolver = AddressResolver::new(
            None,
            Some(FakeRegistry::with(&[])),
            Arc::new(RoundRobin::new()),
        );

        match resolver.resolve("com.acme.Foo", None) {
            Err(RpcError::AddressEmpty { type_name }) => assert_eq!(type_name, "com.acme.Foo"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_no_registry_and_no_static_address() {
        let resolver = AddressResolver::new(None, None, Arc::new(RoundRobin::new()));
        assert!(!resolver.has_service_registry());
        assert!(matches!(
            resolver.resolve("Foo", None),
            Err(RpcError::AddressEmpty { .. })
        ));
    }

    #[test]
    fn test_blank_routed_address_is_address_empty() {
        struct BlankPolicy;
        impl LoadBalance for BlankPolicy {
            fn route(&self, _: &str, _: &BTreeSet<String>) -> Option<String> {
                Some(" ".to_string())
            }
        }

        let resolver = AddressResolver::new(
            None,
            Some(FakeRegistry::with(&["a:1", "b:1"])),
            Arc::new(BlankPolicy),
        );
        assert!(matches!(
            resolver.resolve("Foo", None),
            Err(RpcError::AddressEmpty { .. })
        ));
    }
}
