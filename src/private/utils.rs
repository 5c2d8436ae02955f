use std::time::SystemTime;

use chrono::{DateTime, Datelike as _, SecondsFormat, Utc};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[cfg(test)]
    #[error("invalid rfc3339 : {0}")]
    InvalidRfc3339(#[source] chrono::ParseError),
    #[error("out of range")]
    OutOfRange,
}

/// An instant between 0000-01-01T00:00:00Z and 9999-12-31T23:59:59.999999999Z.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) struct UnixTimestamp(DateTime<Utc>);

impl UnixTimestamp {
    #[cfg(test)]
    pub(crate) fn from_rfc3339(s: &str) -> Result<Self, Error> {
        let date_time = DateTime::parse_from_rfc3339(s).map_err(Error::InvalidRfc3339)?;
        Self::from_date_time(date_time.with_timezone(&Utc))
    }

    pub(crate) fn from_system_time(system_time: SystemTime) -> Result<Self, Error> {
        let (secs, nanos) = match system_time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => (
                i64::try_from(duration.as_secs()).map_err(|_| Error::OutOfRange)?,
                duration.subsec_nanos(),
            ),
            Err(e) => {
                let duration = e.duration();
                let secs = i64::try_from(duration.as_secs()).map_err(|_| Error::OutOfRange)?;
                match duration.subsec_nanos() {
                    0 => (-secs, 0),
                    nanos => (-secs - 1, 1_000_000_000 - nanos),
                }
            }
        };
        let date_time = DateTime::from_timestamp(secs, nanos).ok_or(Error::OutOfRange)?;
        Self::from_date_time(date_time)
    }

    pub(crate) fn to_system_time(self) -> SystemTime {
        SystemTime::from(self.0)
    }

    /// Returns `YYYY-MM-DDTHH:mm:ss.sssZ`. Sub-millisecond digits are truncated.
    pub(crate) fn to_policy_expiration(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn from_date_time(date_time: DateTime<Utc>) -> Result<Self, Error> {
        if !(0..=9999).contains(&date_time.year()) {
            return Err(Error::OutOfRange);
        }
        Ok(Self(date_time))
    }
}
