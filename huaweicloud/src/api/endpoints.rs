//! Service endpoint resolution
//!
//! Most HuaweiCloud services are regional and follow the
//! `https://{service}.{region}.myhuaweicloud.com` pattern. A handful are
//! served from a fixed location regardless of the configured region. Both
//! can be overridden per service through the provider `endpoints` map.

use std::collections::HashMap;

const DEFAULT_DOMAIN: &str = "myhuaweicloud.com";

/// Services that do not follow the regional pattern.
const GLOBAL_SERVICES: &[(&str, &str)] = &[("sms", "sms.ap-southeast-1")];

#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    overrides: HashMap<String, String>,
}

impl EndpointResolver {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Resolve the base URL for `service` in `region`, without a trailing
    /// slash.
    pub fn resolve(&self, service: &str, region: &str) -> String {
        if let Some(endpoint) = self.overrides.get(service) {
            return endpoint.trim_end_matches('/').to_string();
        }
        if let Some((_, host)) = GLOBAL_SERVICES.iter().find(|(name, _)| *name == service) {
            return format!("https://{}.{}", host, DEFAULT_DOMAIN);
        }
        format!("https://{}.{}.{}", service, region, DEFAULT_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_services_follow_the_template() {
        let resolver = EndpointResolver::default();
        assert_eq!(
            resolver.resolve("cbh", "cn-north-4"),
            "https://cbh.cn-north-4.myhuaweicloud.com"
        );
        assert_eq!(
            resolver.resolve("sdrs", "ap-southeast-1"),
            "https://sdrs.ap-southeast-1.myhuaweicloud.com"
        );
    }

    #[test]
    fn sms_is_region_independent() {
        let resolver = EndpointResolver::default();
        assert_eq!(
            resolver.resolve("sms", "cn-north-4"),
            "https://sms.ap-southeast-1.myhuaweicloud.com"
        );
    }

    #[test]
    fn overrides_win_and_lose_trailing_slash() {
        let mut overrides = HashMap::new();
        overrides.insert("cbh".to_string(), "http://127.0.0.1:8080/".to_string());
        let resolver = EndpointResolver::new(overrides);
        assert_eq!(resolver.resolve("cbh", "cn-north-4"), "http://127.0.0.1:8080");
        assert_eq!(
            resolver.resolve("cts", "cn-north-4"),
            "https://cts.cn-north-4.myhuaweicloud.com"
        );
    }
}
