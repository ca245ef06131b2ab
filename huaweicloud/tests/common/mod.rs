//! Shared helpers for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use huaweicloud::api::{Client, ClientConfig};
use huaweicloud::provider_data::{ProviderData, SharedProviderData};

pub const TEST_REGION: &str = "cn-north-4";
pub const TEST_PROJECT_ID: &str = "pid";

/// Provider data wired so that the listed services resolve to a mock
/// server instead of the real endpoints.
pub fn shared_data(endpoints: &[(&str, &str)]) -> SharedProviderData {
    let endpoints: HashMap<String, String> = endpoints
        .iter()
        .map(|(service, url)| (service.to_string(), url.to_string()))
        .collect();

    let client = Client::new(ClientConfig {
        access_key: "test-ak".to_string(),
        secret_key: "test-sk".to_string(),
        security_token: None,
        region: TEST_REGION.to_string(),
        project_id: TEST_PROJECT_ID.to_string(),
        endpoints,
        insecure: false,
        max_retries: 0,
    })
    .expect("client config is valid");

    let data: SharedProviderData = Arc::new(OnceLock::new());
    let _ = data.set(ProviderData::new(client));
    data
}

/// Provider data that was never configured.
pub fn unconfigured_data() -> SharedProviderData {
    Arc::new(OnceLock::new())
}
