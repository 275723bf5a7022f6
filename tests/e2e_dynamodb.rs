//! End-to-end reset against DynamoDB Local.
//!
//! Set `DYNAMODB_TEST_ENDPOINT` (e.g. `http://127.0.0.1:8000`) and run with
//! `--ignored`. Every table at that endpoint is truncated.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use db43::{DynamoDbAdapter, DynamoDbConnection, Session};
use dynamodb_types::item_to_record;
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/kv")
}

async fn ensure_table(
    client: &Client,
    table: &str,
    partition_key: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let existing = client.list_tables().send().await?;
    if existing.table_names().iter().any(|name| name == table) {
        return Ok(());
    }

    client
        .create_table()
        .table_name(table)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(partition_key)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(partition_key)
                .key_type(KeyType::Hash)
                .build()?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires DynamoDB Local at DYNAMODB_TEST_ENDPOINT"]
async fn test_dynamodb_reset_e2e() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("db43=debug,db43_dynamodb=debug,fixture_core=debug")
        .try_init()
        .ok();

    let endpoint = std::env::var("DYNAMODB_TEST_ENDPOINT")?;
    let connection = DynamoDbConnection::local(endpoint);
    let client = connection.client().await;

    ensure_table(&client, "posts", "pk").await?;
    ensure_table(&client, "users", "id").await?;

    // More stale items than fit in one delete window.
    for i in 0..30 {
        client
            .put_item()
            .table_name("posts")
            .item("pk", AttributeValue::S(format!("stale#{i}")))
            .item("title", AttributeValue::S("stale".to_string()))
            .send()
            .await?;
    }

    let mut session = Session::with_adapters(vec![Box::new(
        DynamoDbAdapter::connect(&connection).await,
    )]);

    session.truncate().await?;
    let posts = client.scan().table_name("posts").send().await?;
    assert!(posts.items().is_empty());

    session.load(fixtures()).await?;

    let posts = client.scan().table_name("posts").send().await?;
    assert_eq!(posts.items().len(), 1);
    let post = item_to_record(&posts.items()[0])?;
    assert_eq!(
        serde_json::Value::Object(post),
        serde_json::json!({ "pk": "post#1", "title": "hi" })
    );

    // The native dump shadows raw.users.json and keeps its attribute types.
    let users = client.scan().table_name("users").send().await?;
    assert_eq!(users.items().len(), 2);
    let ada = users
        .items()
        .iter()
        .find(|item| item.get("id") == Some(&AttributeValue::S("u1".to_string())))
        .ok_or("u1 missing")?;
    assert_eq!(ada.get("logins"), Some(&AttributeValue::N("42".to_string())));
    assert!(matches!(ada.get("roles"), Some(AttributeValue::Ss(_))));

    // Truncating twice leaves every table empty.
    session.truncate().await?;
    session.truncate().await?;
    for table in ["posts", "users"] {
        let scan = client.scan().table_name(table).send().await?;
        assert!(scan.items().is_empty(), "{table} not empty");
    }

    session.release().await?;
    Ok(())
}
