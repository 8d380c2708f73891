//! Key persistence tests
//!
//! Exercises the flat-row codec through the real database.

#[cfg(test)]
mod tests {
    use crate::common::{KeyFactory, ProviderFactory, TestDatabase};
    use crate::{assert_err, assert_ok};
    use apertus_gateway::storage::database::entities::{self, config_key};
    use apertus_gateway::{ApertusKeyConfig, GatewayError};
    use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

    async fn db_with_apertus() -> TestDatabase {
        let db = TestDatabase::new().await;
        assert_ok!(
            db.db()
                .upsert_provider("apertus", &ProviderFactory::with_base_url(""))
                .await
        );
        db
    }

    #[tokio::test]
    async fn test_create_and_find_key_with_override() {
        let db = db_with_apertus().await;
        let key = KeyFactory::create()
            .with_models(["gpt-4o", "apertus-70b"])
            .with_apertus_config(ApertusKeyConfig::new(
                "https://custom.example.com",
                Some([("gpt-4o".to_string(), "prod-deploy-1".to_string())].into()),
            ));

        assert_ok!(db.db().create_key(&key).await);
        let found = assert_ok!(db.db().find_key_by_key_id(&key.id).await);
        assert_eq!(found, Some(key));
    }

    #[tokio::test]
    async fn test_all_null_override_columns_decode_absent() {
        let db = db_with_apertus().await;
        let key = KeyFactory::create().with_apertus_config(ApertusKeyConfig::default());
        assert_ok!(db.db().create_key(&key).await);

        let row = entities::ConfigKey::find()
            .filter(config_key::Column::KeyId.eq(key.id.as_str()))
            .one(db.db().connection())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.apertus_endpoint, None);
        assert_eq!(row.apertus_model_name_mappings_json, None);
        assert_eq!(row.models_json, "[]");

        let found = assert_ok!(db.db().find_key_by_key_id(&key.id).await).unwrap();
        assert_eq!(found.apertus_key_config, None);
    }

    #[tokio::test]
    async fn test_malformed_mappings_fail_the_read() {
        let db = db_with_apertus().await;
        let key = KeyFactory::with_endpoint("https://a.example");
        assert_ok!(db.db().create_key(&key).await);

        let row = entities::ConfigKey::find()
            .filter(config_key::Column::KeyId.eq(key.id.as_str()))
            .one(db.db().connection())
            .await
            .unwrap()
            .unwrap();
        let mut active: config_key::ActiveModel = row.into();
        active.apertus_model_name_mappings_json = Set(Some("{\"gpt-4o\":".to_string()));
        active.update(db.db().connection()).await.unwrap();

        let err = assert_err!(db.db().find_key_by_key_id(&key.id).await);
        assert!(matches!(err, GatewayError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_override() {
        let db = db_with_apertus().await;
        let mut key = KeyFactory::with_endpoint("https://old.example");
        assert_ok!(db.db().create_key(&key).await);

        key.apertus_key_config = Some(ApertusKeyConfig::with_mappings([("a", "b")]));
        key.weight = 0.5;
        assert_ok!(db.db().update_key(&key).await);

        let found = assert_ok!(db.db().find_key_by_key_id(&key.id).await).unwrap();
        assert_eq!(found.apertus_key_config.as_ref().unwrap().endpoint(), "");
        assert_eq!(found.apertus_key_config.unwrap().mapped_model("a"), Some("b"));
        assert_eq!(found.weight, 0.5);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let db = db_with_apertus().await;
        let first = KeyFactory::named("first", "apertus");
        let second = KeyFactory::named("second", "apertus");
        assert_ok!(db.db().create_key(&first).await);
        assert_ok!(db.db().create_key(&second).await);

        let keys = assert_ok!(db.db().list_keys_by_provider("apertus").await);
        let ids: Vec<&str> = keys.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

        assert_ok!(db.db().delete_key(&first.id).await);
        assert!(assert_ok!(db.db().find_key_by_key_id(&first.id).await).is_none());

        let err = assert_err!(db.db().delete_key(&first.id).await);
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_key_conflicts() {
        let db = db_with_apertus().await;
        let key = KeyFactory::create();
        assert_ok!(db.db().create_key(&key).await);

        let err = assert_err!(db.db().create_key(&key).await);
        assert!(matches!(err, GatewayError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_override_must_match_provider() {
        let db = TestDatabase::new().await;
        assert_ok!(
            db.db()
                .upsert_provider("azure", &ProviderFactory::with_base_url(""))
                .await
        );

        let key = KeyFactory::named("misplaced", "azure")
            .with_apertus_config(ApertusKeyConfig::with_endpoint("https://a.example"));
        let err = assert_err!(db.db().create_key(&key).await);
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_custom_provider_keys_validate_against_base_type() {
        let db = TestDatabase::new().await;
        assert_ok!(
            db.db()
                .upsert_provider("swiss-apertus", &ProviderFactory::custom("", "swiss-apertus"))
                .await
        );

        let key = KeyFactory::named("custom", "swiss-apertus")
            .with_apertus_config(ApertusKeyConfig::with_endpoint("https://a.example"));
        assert_ok!(db.db().create_key(&key).await);
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let db = TestDatabase::new().await;
        let err = assert_err!(db.db().create_key(&KeyFactory::create()).await);
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_repeated_migration_keeps_mappings() {
        let db = db_with_apertus().await;
        assert_ok!(db.db().migrate().await);

        let key = KeyFactory::with_mapping("gpt-4o", "prod-deploy-1");
        assert_ok!(db.db().create_key(&key).await);
        let found = assert_ok!(db.db().find_key_by_key_id(&key.id).await);
        assert_eq!(found, Some(key));
    }
}
