use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
}

/// Simple health service shared by the HTTP surface and the CLI
///
/// This service provides a standardised way to check that the registry process is alive. It does
/// not touch the patient store.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` with status `"ok"`, stamped with the current time.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "ok".into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_reports_ok_with_current_time() {
        let before = Utc::now();
        let res = HealthService::check_health();

        assert_eq!(res.status, "ok");
        assert!(res.timestamp >= before);
    }

    #[test]
    fn health_serializes_status_and_timestamp() {
        let json = serde_json::to_value(HealthService::check_health()).unwrap();

        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
    }
}
