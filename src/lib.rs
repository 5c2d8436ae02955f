//! An Aliyun OSS POST policy and signature utils
//!
//! # POST Policy
//!
//! [`PostPolicy`] is a struct that represents the policy of a POST request
//! (HTML form upload) to upload an object to Aliyun OSS.
//! [`presigned_post_policy`] signs it and returns the URL and the form data
//! to submit.
//!
//! <https://help.aliyun.com/document_detail/31988.html>
//!
//! ```rust
//! # fn test_readme_presigned_post_policy_example() -> anyhow::Result<()> {
//! use oss_post_policy::{presigned_post_policy, OssConfig, PostPolicy};
//! let config = OssConfig::new(
//!     "https://oss-cn-hangzhou.aliyuncs.com",
//!     "access_key_id1",
//!     "access_key_secret1",
//! );
//! let mut policy = PostPolicy::new();
//! policy.set_expiration(std::time::SystemTime::now() + std::time::Duration::from_secs(60))?;
//! policy.set_bucket("example-bucket")?;
//! policy.set_key("example-object")?;
//! policy.set_content_length_range(1, 1024 * 1024)?;
//! let presigned_post = presigned_post_policy(&config, &policy)?;
//! assert_eq!(
//!     presigned_post.url().as_str(),
//!     "https://oss-cn-hangzhou.aliyuncs.com/example-bucket"
//! );
//! #     Ok(())
//! # }
//! ```
//!
//! This form data does not include the `file` field, so you need to add the `file` field to upload a file.
//!
pub mod config;
pub mod post_policy;
pub mod presigned_post;
mod private;
pub mod signer;

pub use self::config::OssConfig;
pub use self::post_policy::{ContentLengthRange, MatchType, PolicyCondition, PostPolicy};
pub use self::presigned_post::{presigned_post_policy, PresignedPost};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] ErrorKind);

#[derive(Debug, thiserror::Error)]
enum ErrorKind {
    #[error(transparent)]
    Config(crate::config::Error),
    #[error(transparent)]
    PostPolicy(crate::post_policy::Error),
    #[error(transparent)]
    PresignedPost(crate::presigned_post::Error),
}

impl From<crate::config::Error> for Error {
    fn from(e: crate::config::Error) -> Self {
        Self(ErrorKind::Config(e))
    }
}

impl From<crate::post_policy::Error> for Error {
    fn from(e: crate::post_policy::Error) -> Self {
        Self(ErrorKind::PostPolicy(e))
    }
}

impl From<crate::presigned_post::Error> for Error {
    fn from(e: crate::presigned_post::Error) -> Self {
        Self(ErrorKind::PresignedPost(e))
    }
}
