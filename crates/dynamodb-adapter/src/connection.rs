//! DynamoDB client construction.

use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::Client;
use tracing::debug;

/// Connection settings for a DynamoDB endpoint.
///
/// Unset credentials and endpoint fall back to the default AWS provider chain.
#[derive(Clone, Debug)]
pub struct DynamoDbConnection {
    pub region: String,
    /// Endpoint override, e.g. `http://127.0.0.1:8000` for DynamoDB Local.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl DynamoDbConnection {
    pub fn local(endpoint: impl Into<String>) -> Self {
        Self {
            region: "us-west-2".to_string(),
            endpoint: Some(endpoint.into()),
            access_key_id: Some("local".to_string()),
            secret_access_key: Some("local".to_string()),
        }
    }

    /// Build an SDK client from these settings.
    pub async fn client(&self) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()));

        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&self.access_key_id, &self.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "db43",
            ));
        }

        let sdk_config = loader.load().await;
        debug!(
            "Built DynamoDB client for region {} (endpoint: {})",
            self.region,
            self.endpoint.as_deref().unwrap_or("default")
        );
        Client::new(&sdk_config)
    }
}
