use aws_sdk_s3::Client as S3Client;
use printqueue::{
    object_store::{Headers, S3ObjectStore},
    types::Environment,
};
use uuid::Uuid;

use super::setup_test_env;

/// Fresh bucket on `LocalStack` with an `S3ObjectStore` pointed at it
pub struct LocalStackSetup {
    pub s3_client: S3Client,
    pub bucket_name: String,
    pub store: S3ObjectStore,
}

impl LocalStackSetup {
    pub async fn new(list_page_size: Option<i32>) -> Self {
        setup_test_env();

        let s3_config = Environment::Development.s3_client_config(None).await;
        let s3_client = S3Client::from_conf(s3_config);

        let bucket_name = format!("printqueue-test-{}", Uuid::new_v4());
        s3_client
            .create_bucket()
            .bucket(&bucket_name)
            .send()
            .await
            .expect("Failed to create test bucket");

        let mut store = S3ObjectStore::new(s3_client.clone(), bucket_name.clone());
        if let Some(page_size) = list_page_size {
            store = store.with_list_page_size(page_size);
        }

        Self {
            s3_client,
            bucket_name,
            store,
        }
    }

    /// A second store on the same bucket, for handing to a router
    pub fn store_handle(&self) -> S3ObjectStore {
        S3ObjectStore::new(self.s3_client.clone(), self.bucket_name.clone())
    }
}

/// Performs the client side of an upload: PUT `data` with exactly the issued headers
pub async fn upload_with_headers(
    presigned_url: &str,
    headers: &Headers,
    data: &'static [u8],
) -> reqwest::Response {
    let mut request = reqwest::Client::new().put(presigned_url).body(data);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }

    request.send().await.expect("Failed to upload to presigned URL")
}
