use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single structured log record exchanged between generator and processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLog {
    pub status_code: i32,
    pub api: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
}

impl StructuredLog {
    pub fn new(
        status_code: i32,
        api: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            api: api.into(),
            message: message.into(),
            timestamp,
            ip_address: ip_address.into(),
        }
    }
}

/// Wire form: `status,api,message,timestamp,ip`. Commas inside fields are not escaped.
impl fmt::Display for StructuredLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.status_code,
            self.api,
            self.message,
            self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.ip_address
        )
    }
}
