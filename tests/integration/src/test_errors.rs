//! Error classification integration tests.

#[cfg(test)]
mod tests {
    use ruststack_client_core::{ClientBuilder, ErrorKind, ops};
    use ruststack_client_s3::S3ClientBuilder;
    use tokio_util::sync::CancellationToken;

    use crate::{
        LOCAL_CLIENT, cleanup_bucket, create_test_bucket, factory, s3_client, test_bucket_name,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_classify_missing_bucket_on_stat() {
        let client = s3_client();
        let bucket = test_bucket_name("ghost");

        let result = ops::stat_object(&client, &bucket, "obj", None, None).await;
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), ErrorKind::BucketNotFound);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_classify_missing_key_on_get() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "nokey").await;

        let result = ops::download_to_memory(&client, &bucket, "nonexistent.txt", None, None).await;
        assert_eq!(result.error_kind(), ErrorKind::ObjectNotFound);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_classify_missing_bucket_on_put() {
        let client = s3_client();
        let bucket = test_bucket_name("noput");

        let result = ops::put_object(&client, &bucket, "file.txt", "data", None, None).await;
        assert_eq!(result.error_kind(), ErrorKind::BucketNotFound);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_classify_unreachable_endpoint_as_connection() {
        let client = factory()
            .create_client_with::<S3ClientBuilder, _>(LOCAL_CLIENT, |builder| {
                builder.set_endpoint("http://127.0.0.1:1");
            })
            .expect("client");

        let result = ops::stat_object(&client, "any-bucket", "obj", None, None).await;
        assert!(matches!(
            result.error_kind(),
            ErrorKind::Connection | ErrorKind::Timeout
        ));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_cancelled_operation() {
        let client = s3_client();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = ops::stat_object(&client, "any-bucket", "obj", None, Some(&cancel)).await;
        assert_eq!(result.error_kind(), ErrorKind::UnexpectedError);
    }
}
