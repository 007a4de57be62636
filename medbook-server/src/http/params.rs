//! Query-string parameters and their conversion into repository requests
//!
//! Everything arrives as an optional string so that a malformed number or
//! flag becomes a `ValidationError` naming the parameter instead of a
//! generic deserialization failure.

use serde::{Deserialize, Serialize};

use medbook_core::{DeleteMode, DeleteQuery, FieldValueQuery, ListQuery, ValidationError};

/// `GET /v1/<entity>`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Column to search
    pub search: Option<String>,
    /// Prefix to match in `search`
    pub value: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
    /// Include soft-deleted rows
    pub deleted: Option<String>,
}

impl TryFrom<ListParams> for ListQuery {
    type Error = ValidationError;

    fn try_from(p: ListParams) -> Result<Self, Self::Error> {
        Ok(ListQuery {
            field: p.search.unwrap_or_default(),
            value: p.value.unwrap_or_default(),
            page: parse_count("page", p.page)?,
            limit: parse_count("limit", p.limit)?,
            order_by: p.order_by.unwrap_or_default(),
            include_soft_deleted: parse_flag("deleted", p.deleted)?,
        })
    }
}

/// `GET /v1/<entity>/get`: `id`, or `field` + `value`
#[derive(Debug, Default, Deserialize)]
pub struct GetParams {
    pub id: Option<String>,
    pub field: Option<String>,
    pub value: Option<String>,
    pub deleted: Option<String>,
}

impl TryFrom<GetParams> for FieldValueQuery {
    type Error = ValidationError;

    fn try_from(p: GetParams) -> Result<Self, Self::Error> {
        let (field, value) = target(p.id, p.field, p.value);
        Ok(FieldValueQuery {
            field,
            value,
            include_soft_deleted: parse_flag("deleted", p.deleted)?,
        })
    }
}

/// `DELETE /v1/<entity>`: `id` or `field` + `value`, and `mode`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
    pub field: Option<String>,
    pub value: Option<String>,
    /// `soft` (default) or `hard`
    pub mode: Option<String>,
}

impl TryFrom<DeleteParams> for DeleteQuery {
    type Error = ValidationError;

    fn try_from(p: DeleteParams) -> Result<Self, Self::Error> {
        let mode = match p.mode.as_deref().map(str::trim) {
            None | Some("") => DeleteMode::default(),
            Some(raw) => raw.parse()?,
        };
        let (field, value) = target(p.id, p.field, p.value);
        Ok(DeleteQuery::new(field, value, mode))
    }
}

/// Body of `DELETE /v1/<entity>`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

fn target(id: Option<String>, field: Option<String>, value: Option<String>) -> (String, String) {
    match id.filter(|id| !id.trim().is_empty()) {
        Some(id) => (medbook_core::entity::ID.to_owned(), id),
        None => (field.unwrap_or_default(), value.unwrap_or_default()),
    }
}

/// Absent or empty means 0, which disables pagination.
fn parse_count(param: &'static str, raw: Option<String>) -> Result<u64, ValidationError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(0),
        Some(s) => s.parse().map_err(|_| ValidationError::InvalidPagination {
            param,
            value: s.to_owned(),
        }),
    }
}

fn parse_flag(param: &'static str, raw: Option<String>) -> Result<bool, ValidationError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(s) => Err(ValidationError::InvalidValue {
            field: param.to_owned(),
            value: s.to_owned(),
            expected: "boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_convert() {
        let params = ListParams {
            search: Some("phone_number".into()),
            value: Some("+99895".into()),
            page: Some("2".into()),
            limit: Some(" 10 ".into()),
            order_by: Some("created_at".into()),
            deleted: None,
        };
        let query = ListQuery::try_from(params).unwrap();
        assert_eq!(
            query,
            ListQuery::page(2, 10)
                .search("phone_number", "+99895")
                .ordered_by("created_at")
        );
    }

    #[test]
    fn missing_paging_means_unpaginated() {
        let query = ListQuery::try_from(ListParams::default()).unwrap();
        assert_eq!(query.pagination(), None);
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        let params = ListParams {
            page: Some("abc".into()),
            ..ListParams::default()
        };
        assert_eq!(
            ListQuery::try_from(params).unwrap_err(),
            ValidationError::InvalidPagination {
                param: "page",
                value: "abc".into()
            }
        );

        let params = ListParams {
            limit: Some("-1".into()),
            ..ListParams::default()
        };
        assert!(ListQuery::try_from(params).is_err());
    }

    #[test]
    fn deleted_flag_parsing() {
        assert_eq!(parse_flag("deleted", Some("true".into())), Ok(true));
        assert_eq!(parse_flag("deleted", Some("0".into())), Ok(false));
        assert!(parse_flag("deleted", Some("yes please".into())).is_err());
    }

    #[test]
    fn id_takes_precedence_over_field() {
        let params = GetParams {
            id: Some("550e8400-e29b-41d4-a716-446655440000".into()),
            field: Some("name".into()),
            value: Some("Cardiology".into()),
            deleted: Some("true".into()),
        };
        let lookup = FieldValueQuery::try_from(params).unwrap();
        assert_eq!(lookup.field, "id");
        assert!(lookup.include_soft_deleted);

        let params = GetParams {
            field: Some("name".into()),
            value: Some("Cardiology".into()),
            ..GetParams::default()
        };
        assert_eq!(
            FieldValueQuery::try_from(params).unwrap(),
            FieldValueQuery::new("name", "Cardiology")
        );
    }

    #[test]
    fn delete_mode_defaults_to_soft() {
        let params = DeleteParams {
            id: Some("1".into()),
            ..DeleteParams::default()
        };
        assert_eq!(DeleteQuery::try_from(params).unwrap().mode, DeleteMode::Soft);

        let params = DeleteParams {
            id: Some("1".into()),
            mode: Some("hard".into()),
            ..DeleteParams::default()
        };
        assert_eq!(DeleteQuery::try_from(params).unwrap().mode, DeleteMode::Hard);

        let params = DeleteParams {
            id: Some("1".into()),
            mode: Some("false".into()),
            ..DeleteParams::default()
        };
        assert!(matches!(
            DeleteQuery::try_from(params),
            Err(ValidationError::InvalidDeleteMode(_))
        ));
    }
}
