//! Provider persistence tests

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use crate::common::{ProviderFactory, TestDatabase};
    use apertus_gateway::{GatewayError, RequestType};

    #[tokio::test]
    async fn test_upsert_and_find_provider() {
        let db = TestDatabase::new().await;
        let mut config = ProviderFactory::custom("https://apertus.example.ch", "swiss-apertus");
        if let Some(custom) = config.custom_provider_config.as_mut() {
            custom
                .request_path_overrides
                .insert(RequestType::ChatCompletion, "/api/chat".to_string());
        }

        assert_ok!(db.db().upsert_provider("swiss-apertus", &config).await);
        let found = assert_ok!(db.db().find_provider_by_name("swiss-apertus").await);
        assert_eq!(found, Some(config));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let db = TestDatabase::new().await;
        assert_ok!(
            db.db()
                .upsert_provider("apertus", &ProviderFactory::with_base_url("https://a.example"))
                .await
        );

        let mut updated = ProviderFactory::with_base_url("https://b.example");
        updated.send_back_raw_response = true;
        assert_ok!(db.db().upsert_provider("apertus", &updated).await);

        let found = assert_ok!(db.db().find_provider_by_name("apertus").await).unwrap();
        assert_eq!(found.network_config.base_url, "https://b.example");
        assert!(found.send_back_raw_response);
    }

    #[tokio::test]
    async fn test_custom_provider_requires_base_type() {
        let db = TestDatabase::new().await;
        let mut config = ProviderFactory::custom("", "broken");
        if let Some(custom) = config.custom_provider_config.as_mut() {
            custom.base_provider_type.clear();
        }

        let result = db.db().upsert_provider("broken", &config).await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert!(assert_ok!(db.db().find_provider_by_name("broken").await).is_none());
    }
}
