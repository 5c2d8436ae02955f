use std::collections::BTreeMap;

use crate::{config::OssConfig, post_policy::PostPolicy, signer};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] ErrorKind);

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorKind {
    #[error("bucket name must be specified")]
    BucketNotFound,
    #[error("endpoint url: {0}")]
    EndpointUrl(#[source] url::ParseError),
    #[error("expiration time must be specified")]
    ExpirationNotFound,
    #[error("object key must be specified")]
    KeyNotFound,
}

/// The URL and HTML form fields of a POST object request.
///
/// The form data does not include the `file` field, so you need to add the
/// `file` field to upload a file.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct PresignedPost {
    url: url::Url,
    form_data: BTreeMap<String, String>,
}

impl PresignedPost {
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    pub fn form_data(&self) -> &BTreeMap<String, String> {
        &self.form_data
    }

    /// Converts `self` into a `Vec<(String, String)>`.
    /// The first element of each tuple is the field name, and the second
    /// element is the field value.
    pub fn into_vec(self) -> Vec<(String, String)> {
        self.form_data.into_iter().collect()
    }
}

/// Returns the URL and form data to upload an object with `policy`.
///
/// `policy` must have an expiration, a key and a bucket. The `policy`,
/// `OSSAccessKeyId` and `signature` fields are added to its form data.
///
/// # Example
///
/// ```rust
/// # fn example_for_presigned_post_policy() -> anyhow::Result<()> {
/// use oss_post_policy::{presigned_post_policy, OssConfig, PostPolicy};
/// let config = OssConfig::new(
///     "https://oss-cn-hangzhou.aliyuncs.com",
///     "access_key_id1",
///     "access_key_secret1",
/// );
/// let mut policy = PostPolicy::new();
/// policy.set_expiration(std::time::SystemTime::now() + std::time::Duration::from_secs(60 * 60))?;
/// policy.set_bucket("example-bucket")?;
/// policy.set_key("example-object")?;
/// let presigned_post = presigned_post_policy(&config, &policy)?;
/// assert_eq!(
///     presigned_post.url().as_str(),
///     "https://oss-cn-hangzhou.aliyuncs.com/example-bucket"
/// );
/// assert_eq!(
///     presigned_post.into_vec().into_iter().map(|(n, _)| n).collect::<Vec<String>>(),
///     ["OSSAccessKeyId", "bucket", "key", "policy", "signature"]
/// );
/// #     Ok(())
/// # }
/// ```
pub fn presigned_post_policy(
    config: &OssConfig,
    policy: &PostPolicy,
) -> Result<PresignedPost, Error> {
    if policy.expiration().is_none() {
        return Err(Error::from(ErrorKind::ExpirationNotFound));
    }
    let form_data = policy.form_data();
    if !form_data.contains_key("key") {
        return Err(Error::from(ErrorKind::KeyNotFound));
    }
    let bucket_name = form_data.get("bucket").ok_or(ErrorKind::BucketNotFound)?;

    let mut url = config.endpoint_url().map_err(ErrorKind::EndpointUrl)?;
    if !config.is_cname() {
        url.set_path(&format!("/{}", bucket_name));
    }

    let policy_base64 = policy.to_base64();
    let signature = signer::sign(&policy_base64, config.access_key_secret());
    let mut form_data = form_data.clone();
    form_data.insert("policy".to_string(), policy_base64);
    form_data.insert(
        "OSSAccessKeyId".to_string(),
        config.access_key_id().to_string(),
    );
    form_data.insert("signature".to_string(), signature);
    log::debug!(
        "presigned post policy: url = {}, bucket = {}, key = {}",
        url,
        bucket_name,
        form_data["key"]
    );
    Ok(PresignedPost { url, form_data })
}

#[cfg(test)]
mod tests {
    use crate::private::utils::UnixTimestamp;

    use super::*;

    fn config() -> OssConfig {
        OssConfig::new(
            "https://oss-cn-hangzhou.aliyuncs.com",
            "access_key_id1",
            "secret",
        )
    }

    fn policy() -> anyhow::Result<PostPolicy> {
        let mut policy = PostPolicy::new();
        policy.set_expiration(UnixTimestamp::from_rfc3339("2017-01-23T04:05:06Z")?.to_system_time())?;
        policy.set_content_length_range(100, 1000)?;
        policy.set_bucket("test-bucket")?;
        policy.set_key(r#""test-object-name""#)?;
        Ok(policy)
    }

    #[test]
    fn test_presigned_post_policy() -> anyhow::Result<()> {
        let policy = policy()?;
        let presigned_post = presigned_post_policy(&config(), &policy)?;
        assert_eq!(
            presigned_post.url().as_str(),
            "https://oss-cn-hangzhou.aliyuncs.com/test-bucket"
        );
        assert_eq!(
            presigned_post.into_vec(),
            [
                ("OSSAccessKeyId", "access_key_id1"),
                ("bucket", "test-bucket"),
                ("key", r#""test-object-name""#),
                ("policy", "eyJleHBpcmF0aW9uIjoiMjAxNy0wMS0yM1QwNDowNTowNi4wMDBaIiwiY29uZGl0aW9ucyI6W1siY29udGVudC1sZW5ndGgtcmFuZ2UiLDEwMCwxMDAwXSxbImVxIiwiJGJ1Y2tldCIsInRlc3QtYnVja2V0Il0sWyJlcSIsIiRrZXkiLCJcInRlc3Qtb2JqZWN0LW5hbWVcIiJdXX0="),
                ("signature", "5HWInik5HvzSWOPdB9V0JFHxn+A="),
            ]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect::<Vec<(String, String)>>()
        );
        // the caller's policy is not modified
        assert_eq!(policy.form_data().len(), 2);
        Ok(())
    }

    #[test]
    fn test_cname() -> anyhow::Result<()> {
        let config = OssConfig::new("https://static.example.com/uploads", "id", "secret")
            .with_cname(true);
        let presigned_post = presigned_post_policy(&config, &policy()?)?;
        assert_eq!(
            presigned_post.url().as_str(),
            "https://static.example.com/uploads"
        );
        Ok(())
    }

    #[test]
    fn test_scheme_less_endpoint() -> anyhow::Result<()> {
        let config = OssConfig::new("oss-cn-hangzhou.aliyuncs.com", "id", "secret");
        let presigned_post = presigned_post_policy(&config, &policy()?)?;
        assert_eq!(
            presigned_post.url().as_str(),
            "https://oss-cn-hangzhou.aliyuncs.com/test-bucket"
        );
        Ok(())
    }

    #[test]
    fn test_optional_fields() -> anyhow::Result<()> {
        let mut policy = policy()?;
        policy.set_content_type("image/png")?;
        policy.set_success_status_action("201")?;
        let presigned_post = presigned_post_policy(&config(), &policy)?;
        assert_eq!(
            presigned_post.form_data().keys().collect::<Vec<&String>>(),
            [
                "Content-Type",
                "OSSAccessKeyId",
                "bucket",
                "key",
                "policy",
                "signature",
                "success_action_status"
            ]
        );
        assert_eq!(
            presigned_post.form_data()["signature"],
            signer::sign(&presigned_post.form_data()["policy"], "secret")
        );
        Ok(())
    }

    #[test]
    fn test_expiration_not_found() -> anyhow::Result<()> {
        let mut policy = PostPolicy::new();
        policy.set_bucket("test-bucket")?;
        policy.set_key("test-object-name")?;
        assert_eq!(
            presigned_post_policy(&config(), &policy)
                .unwrap_err()
                .to_string(),
            "expiration time must be specified"
        );
        Ok(())
    }

    #[test]
    fn test_key_not_found() -> anyhow::Result<()> {
        let mut policy = PostPolicy::new();
        policy.set_expiration(std::time::SystemTime::now())?;
        policy.set_bucket("test-bucket")?;
        assert_eq!(
            presigned_post_policy(&config(), &policy)
                .unwrap_err()
                .to_string(),
            "object key must be specified"
        );
        Ok(())
    }

    #[test]
    fn test_key_starts_with_satisfies_key() -> anyhow::Result<()> {
        let mut policy = PostPolicy::new();
        policy.set_expiration(std::time::SystemTime::now())?;
        policy.set_bucket("test-bucket")?;
        policy.set_key_starts_with("user/eric/")?;
        let presigned_post = presigned_post_policy(&config(), &policy)?;
        assert_eq!(presigned_post.form_data()["key"], "user/eric/");
        Ok(())
    }

    #[test]
    fn test_bucket_not_found() -> anyhow::Result<()> {
        let mut policy = PostPolicy::new();
        policy.set_expiration(std::time::SystemTime::now())?;
        policy.set_key("test-object-name")?;
        assert_eq!(
            presigned_post_policy(&config(), &policy)
                .unwrap_err()
                .to_string(),
            "bucket name must be specified"
        );
        Ok(())
    }

    #[test]
    fn test_invalid_endpoint() -> anyhow::Result<()> {
        let config = OssConfig::new("http://", "id", "secret");
        assert_eq!(
            presigned_post_policy(&config, &policy()?)
                .unwrap_err()
                .to_string(),
            "endpoint url: empty host"
        );
        let config = OssConfig::new("https://oss cn.aliyuncs.com", "id", "secret");
        assert!(presigned_post_policy(&config, &policy()?).is_err());
        Ok(())
    }

    #[test]
    fn test_serialize() -> anyhow::Result<()> {
        let presigned_post = presigned_post_policy(&config(), &policy()?)?;
        let value = serde_json::to_value(&presigned_post)?;
        assert_eq!(
            value["url"],
            "https://oss-cn-hangzhou.aliyuncs.com/test-bucket"
        );
        assert_eq!(value["form_data"]["signature"], "5HWInik5HvzSWOPdB9V0JFHxn+A=");
        Ok(())
    }
}
