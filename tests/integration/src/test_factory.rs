//! Client factory integration tests.

#[cfg(test)]
mod tests {
    use ruststack_client_core::{ClientFactory, ClientSettingsRegistry, ErrorKind, ops};
    use ruststack_client_s3::S3ClientBuilder;

    use crate::{cleanup_bucket, create_test_bucket, local_settings, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_share_objects_between_independent_clients() {
        let first = s3_client();
        let second = s3_client();
        let bucket = create_test_bucket(&first, "shared").await;

        let put = ops::put_object(&first, &bucket, "k", "v", None, None).await;
        assert!(put.is_success());

        let stat = ops::stat_object(&second, &bucket, "k", None, None).await;
        assert_eq!(stat.value().map(|s| s.size), Some(1));

        cleanup_bucket(&first, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_resolve_clients_from_json_settings() {
        let settings = local_settings();
        let json = format!(
            r#"{{"archive": {{"Endpoint": "{}", "AccessKey": "test", "SecretKey": "test", "SSL": {}}}}}"#,
            settings.endpoint.as_deref().unwrap_or_default(),
            settings.ssl,
        );
        let factory = ClientFactory::new(
            ClientSettingsRegistry::from_json_str(&json).expect("valid settings"),
        );
        let client = factory
            .create_client::<S3ClientBuilder>("archive")
            .expect("client");

        let bucket = create_test_bucket(&client, "json").await;
        let stat = ops::stat_object(&client, &bucket, "missing", None, None).await;
        assert_eq!(stat.error_kind(), ErrorKind::ObjectNotFound);

        cleanup_bucket(&client, &bucket).await;
    }
}
