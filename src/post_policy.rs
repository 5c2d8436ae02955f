use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::private::{json, utils::UnixTimestamp};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] ErrorKind);

impl Error {
    /// Returns `true` if a setter rejected its argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidArgument(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorKind {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

// rendered when no expiration has been set
const UNSET_EXPIRATION: &str = "0001-01-01T00:00:00.000Z";

/// Match type of a [`PolicyCondition`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatchType {
    /// `eq`
    Eq,
    /// `starts-with`
    StartsWith,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Eq => "eq",
            MatchType::StartsWith => "starts-with",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `["<match type>","<condition>","<value>"]` clause of the policy.
///
/// <https://help.aliyun.com/document_detail/31988.html>
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PolicyCondition {
    match_type: MatchType,
    condition: String,
    value: String,
}

impl PolicyCondition {
    fn new(match_type: MatchType, condition: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            match_type,
            condition: condition.into(),
            value: value.into(),
        }
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// The field reference, e.g. `$key`.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Minimum and maximum allowable size of the uploaded content.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ContentLengthRange {
    pub min: i64,
    pub max: i64,
}

impl ContentLengthRange {
    // (0, 0) is the unset state, so an explicit (0, 0) range is never emitted.
    fn is_set(&self) -> bool {
        self.min != 0 || self.max != 0
    }
}

/// Aliyun OSS POST policy.
///
/// <https://help.aliyun.com/document_detail/31988.html>
///
/// # Example
///
/// ```rust
/// # fn example_for_post_policy() -> anyhow::Result<()> {
/// use oss_post_policy::PostPolicy;
/// let mut policy = PostPolicy::new();
/// policy.set_expiration(std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_485_144_306))?;
/// policy.set_content_length_range(100, 1000)?;
/// policy.set_bucket("test-bucket")?;
/// policy.set_key("test-object-name")?;
/// assert_eq!(
///     policy.to_string(),
///     r#"{"expiration":"2017-01-23T04:05:06.000Z","conditions":[["content-length-range",100,1000],["eq","$bucket","test-bucket"],["eq","$key","test-object-name"]]}"#
/// );
/// #     Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct PostPolicy {
    expiration: Option<UnixTimestamp>,
    conditions: Vec<PolicyCondition>,
    content_length_range: ContentLengthRange,
    // fields the HTML form must include alongside the policy
    form_data: BTreeMap<String, String>,
}

impl PostPolicy {
    /// Returns a new empty `PostPolicy`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expiration of the policy, overwriting any previous value.
    ///
    /// `SystemTime::UNIX_EPOCH` is the unset instant and is rejected, as is
    /// any instant outside the years 0000 to 9999.
    pub fn set_expiration(&mut self, expiration: impl Into<SystemTime>) -> Result<(), Error> {
        let expiration = expiration.into();
        if expiration == SystemTime::UNIX_EPOCH {
            return Err(Error::from(ErrorKind::InvalidArgument(
                "no expiry time set",
            )));
        }
        let expiration = UnixTimestamp::from_system_time(expiration)
            .map_err(|_| ErrorKind::InvalidArgument("expiry time out of range"))?;
        self.expiration = Some(expiration);
        Ok(())
    }

    /// Sets an object name for the policy based upload.
    pub fn set_key(&mut self, key: impl Into<String>) -> Result<(), Error> {
        self.set_form_condition(MatchType::Eq, "key", key.into(), "object name is empty")
    }

    /// Sets an object name prefix that the policy based upload must start
    /// with. The `key` form field is set to the prefix.
    pub fn set_key_starts_with(&mut self, key_starts_with: impl Into<String>) -> Result<(), Error> {
        self.set_form_condition(
            MatchType::StartsWith,
            "key",
            key_starts_with.into(),
            "object prefix is empty",
        )
    }

    /// Sets the bucket at which objects will be uploaded to.
    pub fn set_bucket(&mut self, bucket_name: impl Into<String>) -> Result<(), Error> {
        self.set_form_condition(
            MatchType::Eq,
            "bucket",
            bucket_name.into(),
            "bucket name is empty",
        )
    }

    /// Sets the `Content-Type` of the uploaded object.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> Result<(), Error> {
        self.set_form_condition(
            MatchType::Eq,
            "Content-Type",
            content_type.into(),
            "no content type specified",
        )
    }

    /// Sets the minimum and maximum content length, overwriting any previous
    /// range.
    pub fn set_content_length_range(&mut self, min: i64, max: i64) -> Result<(), Error> {
        if min > max {
            return Err(Error::from(ErrorKind::InvalidArgument(
                "minimum limit is larger than maximum limit",
            )));
        }
        if min < 0 {
            return Err(Error::from(ErrorKind::InvalidArgument(
                "minimum limit cannot be negative",
            )));
        }
        if max < 0 {
            return Err(Error::from(ErrorKind::InvalidArgument(
                "maximum limit cannot be negative",
            )));
        }
        self.content_length_range = ContentLengthRange { min, max };
        Ok(())
    }

    /// Sets the `success_action_status` returned by the storage service.
    pub fn set_success_status_action(&mut self, status: impl Into<String>) -> Result<(), Error> {
        self.set_form_condition(
            MatchType::Eq,
            "success_action_status",
            status.into(),
            "status is empty",
        )
    }

    pub fn expiration(&self) -> Option<SystemTime> {
        self.expiration.map(UnixTimestamp::to_system_time)
    }

    /// Conditions in the order they were added. The content-length-range is
    /// not included.
    pub fn conditions(&self) -> &[PolicyCondition] {
        &self.conditions
    }

    pub fn content_length_range(&self) -> ContentLengthRange {
        self.content_length_range
    }

    /// Form fields recorded by the setters.
    pub fn form_data(&self) -> &BTreeMap<String, String> {
        &self.form_data
    }

    /// Returns the policy document as JSON.
    ///
    /// The output is byte-exact: the signature is computed over it.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1024);

        buf.extend_from_slice(br#"{"expiration":""#);
        match self.expiration {
            Some(expiration) => buf.extend_from_slice(expiration.to_policy_expiration().as_bytes()),
            None => buf.extend_from_slice(UNSET_EXPIRATION.as_bytes()),
        }
        buf.extend_from_slice(br#"","conditions":["#);

        let mut insert_comma = false;
        // content-length-range is always the first condition
        if self.content_length_range.is_set() {
            buf.extend_from_slice(br#"["content-length-range","#);
            buf.extend_from_slice(self.content_length_range.min.to_string().as_bytes());
            buf.push(b',');
            buf.extend_from_slice(self.content_length_range.max.to_string().as_bytes());
            buf.push(b']');
            insert_comma = true;
        }
        for condition in &self.conditions {
            if insert_comma {
                buf.push(b',');
            }
            buf.extend_from_slice(br#"[""#);
            buf.extend_from_slice(condition.match_type.as_str().as_bytes());
            buf.extend_from_slice(br#"",""#);
            json::append_escaped(&mut buf, condition.condition.as_bytes());
            buf.extend_from_slice(br#"",""#);
            json::append_escaped(&mut buf, condition.value.as_bytes());
            buf.extend_from_slice(br#""]"#);
            insert_comma = true;
        }
        buf.extend_from_slice(b"]}");
        buf
    }

    /// Returns the base64 (standard, padded) of [`PostPolicy::serialize`].
    pub fn to_base64(&self) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, self.serialize())
    }

    fn set_form_condition(
        &mut self,
        match_type: MatchType,
        field: &str,
        value: String,
        empty_message: &'static str,
    ) -> Result<(), Error> {
        if value.trim().is_empty() {
            return Err(Error::from(ErrorKind::InvalidArgument(empty_message)));
        }
        self.add_condition(PolicyCondition::new(
            match_type,
            format!("${}", field),
            value.clone(),
        ))?;
        self.form_data.insert(field.to_string(), value);
        Ok(())
    }

    fn add_condition(&mut self, condition: PolicyCondition) -> Result<(), Error> {
        // `match_type` is never empty
        if condition.condition.is_empty() || condition.value.is_empty() {
            return Err(Error::from(ErrorKind::InvalidArgument(
                "policy fields are empty",
            )));
        }
        self.conditions.push(condition);
        Ok(())
    }
}

impl std::fmt::Display for PostPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.serialize()))
    }
}
