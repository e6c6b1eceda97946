//! Report generation.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use super::sales::DateRangeQuery;
use super::{non_blank, ApiQuery};
use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::state::AppState;
use medicare_core::{DateRange, RangePreset, ReportKind, ReportTable, ValidationError};
use medicare_db::repository::report::today;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `daily`, `weekly` or `monthly`; wins over explicit dates
    pub range: Option<String>,
}

impl ReportQuery {
    pub fn resolve(self) -> Result<(ReportKind, DateRange), ValidationError> {
        let kind: ReportKind = non_blank(self.kind)
            .ok_or_else(|| ValidationError::Required {
                field: "type".to_string(),
            })?
            .parse()?;

        let range = match non_blank(self.range) {
            Some(preset) => preset.parse::<RangePreset>()?.resolve(today()),
            None => DateRangeQuery {
                start_date: self.start_date,
                end_date: self.end_date,
            }
            .resolve()?,
        };

        Ok((kind, range))
    }
}

/// `GET /api/reports?type=sales&startDate=..&endDate=..` or `?type=sales&range=weekly`
pub async fn generate(
    State(state): State<AppState>,
    _auth: AuthSession,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Json<ReportTable>> {
    let (kind, range) = query.resolve()?;
    debug!(kind = %kind, start = ?range.start, end = ?range.end, "Report requested");

    let table = state
        .db
        .reports()
        .generate(kind, range, &state.config.currency_prefix)
        .await?;
    Ok(Json(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(kind: Option<&str>, range: Option<&str>) -> ReportQuery {
        ReportQuery {
            kind: kind.map(str::to_string),
            range: range.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_type_required() {
        assert!(matches!(
            query(None, None).resolve(),
            Err(ValidationError::Required { .. })
        ));
        assert!(query(Some("profit"), None).resolve().is_err());
    }

    #[test]
    fn test_preset_range() {
        let (kind, range) = query(Some("employeeCollection"), Some("daily"))
            .resolve()
            .unwrap();

        assert_eq!(kind, ReportKind::EmployeeCollection);
        assert_eq!(range.start, Some(today()));
        assert_eq!(range.end, Some(today()));
    }

    #[test]
    fn test_unknown_preset_rejected() {
        assert!(query(Some("sales"), Some("yearly")).resolve().is_err());
    }
}
