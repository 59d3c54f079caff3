//! Wrapped object operation integration tests.

#[cfg(test)]
mod tests {
    use ruststack_client_core::{DefaultMimeTypeMap, ErrorKind, PutObjectArgs, ops};

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_and_download_to_memory() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "mem").await;

        let put = ops::put_object(&client, &bucket, "hello.txt", "hello world", None, None).await;
        assert!(put.is_success(), "{:?}", put.error_message());

        let result = ops::download_to_memory(&client, &bucket, "hello.txt", None, None).await;
        assert_eq!(result.error_kind(), ErrorKind::None);
        assert_eq!(result.value().map(|b| &b[..]), Some(&b"hello world"[..]));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_upload_stream_with_generated_name() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "stream").await;

        let map = DefaultMimeTypeMap;
        let result = ops::put_stream(
            &client,
            &bucket,
            &b"\x00\x01\x02"[..],
            "application/octet-stream",
            None,
            Some(&map),
            None,
            None,
        )
        .await;
        let output = result.into_value().expect("upload succeeded");
        assert!(output.object.ends_with(".bin"));

        let stat = ops::stat_object(&client, &bucket, &output.object, None, None)
            .await
            .into_value()
            .expect("stat succeeded");
        assert_eq!(stat.size, 3);
        assert_eq!(stat.content_type.as_deref(), Some("application/octet-stream"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_download_range_and_metadata() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "range").await;

        let put = ops::put_object(
            &client,
            &bucket,
            "digits",
            "0123456789",
            Some(Box::new(|args: PutObjectArgs| {
                args.with_content_type("text/plain").with_metadata("owner", "ops")
            })),
            None,
        )
        .await;
        assert!(put.is_success());

        let mut dest = Vec::new();
        let result =
            ops::download_range(&client, &bucket, "digits", 2, 5, &mut dest, None, None).await;
        assert!(result.is_success(), "{:?}", result.error_message());
        assert_eq!(dest, b"23456");

        let mut full = Vec::new();
        let stat = ops::download(&client, &bucket, "digits", &mut full, None, None)
            .await
            .into_value()
            .expect("download succeeded");
        assert_eq!(full, b"0123456789");
        assert_eq!(stat.metadata.get("owner").map(String::as_str), Some("ops"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_remove_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "rm").await;

        ops::put_object(&client, &bucket, "doomed", "x", None, None)
            .await
            .into_result()
            .expect("put");
        let removed = ops::remove_object(&client, &bucket, "doomed", None, None).await;
        assert!(removed.is_success());

        let stat = ops::stat_object(&client, &bucket, "doomed", None, None).await;
        assert_eq!(stat.error_kind(), ErrorKind::ObjectNotFound);

        cleanup_bucket(&client, &bucket).await;
    }
}
