use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Completion record for one module in the status ledger
///
/// All fields are `None` until the module first runs. Timestamps are UTC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleStatus {
    #[serde(with = "ledger_time")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(with = "ledger_time")]
    pub completion_time: Option<NaiveDateTime>,
    pub duration: Option<f64>,
}

impl ModuleStatus {
    /// Build a finished record from start/completion times
    pub fn finished(start_time: NaiveDateTime, completion_time: NaiveDateTime) -> Self {
        let elapsed = completion_time - start_time;
        let duration = elapsed
            .num_microseconds()
            .map(|us| us as f64 / 1_000_000.0)
            .unwrap_or_else(|| elapsed.num_seconds() as f64);
        Self {
            start_time: Some(start_time),
            completion_time: Some(completion_time),
            duration: Some(duration),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completion_time.is_some()
    }
}

/// Ledger timestamps are written as `YYYY-MM-DD HH:MM:SS.ffffff`, the form
/// already present in ledgers produced by the pipeline. The fraction is
/// omitted when it is zero, as Python's `str(datetime)` does. ISO 8601 (`T`
/// separator) is accepted on read.
mod ledger_time {
    use chrono::{NaiveDateTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
    const WHOLE_SECOND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const READ_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => {
                let format = if dt.nanosecond() / 1_000 == 0 { WHOLE_SECOND_FORMAT } else { FORMAT };
                serializer.serialize_str(&dt.format(format).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => READ_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid ledger timestamp '{}'", s))),
        }
    }
}
