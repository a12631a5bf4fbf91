//! # Query Builder
//!
//! Turns untrusted string parameters into a validated [`ListQuery`]. This is
//! the only way to construct one, so anything that reaches a store has
//! already been through pagination, sort and filter validation.
//!
//! Two quirks are carried over deliberately from the original API contract:
//! an unknown `sort_by` value silently falls back to the date column while an
//! unknown `sort_order` is rejected, and unknown filter keys are ignored
//! rather than rejected.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::auth::CallerIdentity;
use crate::error::{Result, SupervisorError};
use crate::models::DATE_FORMAT;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 40;

/// Raw list parameters as they arrive from the transport layer. Everything is
/// a string; unknown keys collect into `filters` and are allow-listed during
/// [`ListQuery::build`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(flatten)]
    pub filters: HashMap<String, String>,
}

/// Column a list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    WorkerName,
}

impl SortField {
    /// Column name in the `tasks` table.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::WorkerName => "worker_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub by: SortField,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

/// Allow-listed filters, conjoined by the store. `worker_name` is an exact
/// match; `before` and `after` are open-ended ranges on the date column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilters {
    pub worker_name: Option<String>,
    pub before: Option<NaiveDateTime>,
    pub after: Option<NaiveDateTime>,
}

/// Validated, normalized description of one list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: TaskFilters,
    pub sort: Sort,
    pub pagination: Pagination,
}

impl ListQuery {
    /// Validate raw parameters into a query, applying the caller's privilege
    /// level to the filter allow-list.
    ///
    /// The `worker_name` filter is only honored for managers. Workers are
    /// scoped to their own records by [`crate::policy::list_scope`], applied
    /// on top of whatever they pass here.
    pub fn build(params: &ListParams, caller: &CallerIdentity) -> Result<Self> {
        let pagination = parse_pagination(
            params.page.as_deref().unwrap_or(""),
            params.page_size.as_deref().unwrap_or(""),
        )?;
        let sort = parse_sorting(
            params.sort_by.as_deref().unwrap_or(""),
            params.sort_order.as_deref().unwrap_or(""),
        )?;
        let filters = parse_filters(&params.filters, caller)?;

        Ok(Self {
            filters,
            sort,
            pagination,
        })
    }

    /// Row window for the store fetch. The limit is `page_size + 1`: the
    /// look-ahead row signals that further pages exist and is trimmed before
    /// any response is built.
    pub fn offset_limit(&self) -> (i64, i64) {
        let offset = i64::from(self.pagination.page - 1) * i64::from(self.pagination.page_size);
        let limit = i64::from(self.pagination.page_size) + 1;
        (offset, limit)
    }
}

fn parse_pagination(page_param: &str, page_size_param: &str) -> Result<Pagination> {
    let mut page = DEFAULT_PAGE;
    let mut page_size = DEFAULT_PAGE_SIZE;

    if !page_param.is_empty() {
        page = page_param
            .parse::<u32>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| {
                SupervisorError::Validation("page must be bigger than 0".to_string())
            })?;
    }

    if !page_size_param.is_empty() {
        page_size = page_size_param
            .parse::<u32>()
            .ok()
            .filter(|ps| *ps >= 1)
            .ok_or_else(|| {
                SupervisorError::Validation("page_size must be bigger than 0".to_string())
            })?;
    }

    if page_size > MAX_PAGE_SIZE {
        return Err(SupervisorError::Validation(format!(
            "page_size must be less or equal than {MAX_PAGE_SIZE}"
        )));
    }

    Ok(Pagination { page, page_size })
}

fn parse_sorting(sort_by: &str, order: &str) -> Result<Sort> {
    let order = match order {
        "asc" => SortOrder::Asc,
        "" | "desc" => SortOrder::Desc,
        _ => {
            return Err(SupervisorError::Validation(
                "order must be desc or asc".to_string(),
            ))
        }
    };

    // Unrecognized sort fields fall back to the date column. Permissive on
    // purpose; see module docs.
    let by = match sort_by {
        "name" => SortField::WorkerName,
        _ => SortField::Date,
    };

    Ok(Sort { by, order })
}

fn parse_filters(params: &HashMap<String, String>, caller: &CallerIdentity) -> Result<TaskFilters> {
    let mut filters = TaskFilters::default();

    for (key, value) in params {
        if value.is_empty() {
            continue;
        }

        match key.as_str() {
            "worker_name" if caller.is_manager() => {
                filters.worker_name = Some(value.clone());
            }
            "before" => filters.before = Some(parse_filter_date(value)?),
            "after" => filters.after = Some(parse_filter_date(value)?),
            // Unknown keys (and worker_name from non-managers) are ignored.
            _ => {}
        }
    }

    Ok(filters)
}

fn parse_filter_date(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        SupervisorError::Validation("invalid date format, use yyyy-mm-dd hh:mm:ssPM".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn manager() -> CallerIdentity {
        CallerIdentity::new("auth0|1", "manager_nick", Role::Manager)
    }

    fn worker() -> CallerIdentity {
        CallerIdentity::new("auth0|2", "worker_nick", Role::Worker)
    }

    #[test]
    fn test_default_query() {
        let query = ListQuery::build(&ListParams::default(), &manager()).unwrap();

        assert_eq!(query.filters, TaskFilters::default());
        assert_eq!(query.pagination.page, 1);
        assert_eq!(query.pagination.page_size, 20);
        assert_eq!(query.sort.by, SortField::Date);
        assert_eq!(query.sort.order, SortOrder::Desc);
    }

    #[test]
    fn test_pagination_error_handling() {
        let cases = [
            (Some("0"), None, "page must be bigger than 0"),
            (Some("-3"), None, "page must be bigger than 0"),
            (Some("abc"), None, "page must be bigger than 0"),
            (None, Some("0"), "page_size must be bigger than 0"),
            (None, Some("x"), "page_size must be bigger than 0"),
            (None, Some("41"), "page_size must be less or equal than 40"),
        ];

        for (page, page_size, expected) in cases {
            let params = ListParams {
                page: page.map(String::from),
                page_size: page_size.map(String::from),
                ..ListParams::default()
            };
            let err = ListQuery::build(&params, &manager()).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_max_page_size_is_accepted() {
        let params = ListParams {
            page_size: Some("40".to_string()),
            ..ListParams::default()
        };
        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.pagination.page_size, 40);
    }

    #[test]
    fn test_sorting_options() {
        let params = ListParams {
            sort_by: Some("name".to_string()),
            sort_order: Some("asc".to_string()),
            ..ListParams::default()
        };
        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.sort.by, SortField::WorkerName);
        assert_eq!(query.sort.order, SortOrder::Asc);
    }

    #[test]
    fn test_unknown_sort_field_falls_back_to_date() {
        let params = ListParams {
            sort_by: Some("salary".to_string()),
            ..ListParams::default()
        };
        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.sort.by, SortField::Date);
    }

    #[test]
    fn test_invalid_sort_order_is_rejected() {
        let params = ListParams {
            sort_order: Some("upwards".to_string()),
            ..ListParams::default()
        };
        let err = ListQuery::build(&params, &manager()).unwrap_err();
        assert_eq!(err.to_string(), "order must be desc or asc");
    }

    #[test]
    fn test_offset_limit_includes_look_ahead_row() {
        let params = ListParams {
            page: Some("1".to_string()),
            page_size: Some("20".to_string()),
            ..ListParams::default()
        };
        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.offset_limit(), (0, 21));

        let params = ListParams {
            page: Some("3".to_string()),
            page_size: Some("10".to_string()),
            ..ListParams::default()
        };
        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.offset_limit(), (20, 11));
    }

    #[test]
    fn test_worker_name_filter_is_manager_only() {
        let mut filters = HashMap::new();
        filters.insert("worker_name".to_string(), "ana".to_string());
        let params = ListParams {
            filters,
            ..ListParams::default()
        };

        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.filters.worker_name.as_deref(), Some("ana"));

        let query = ListQuery::build(&params, &worker()).unwrap();
        assert_eq!(query.filters.worker_name, None);
    }

    #[test]
    fn test_interval_filters_for_any_caller() {
        let mut filters = HashMap::new();
        filters.insert("before".to_string(), "2022-05-23 03:33:01PM".to_string());
        filters.insert("after".to_string(), "2022-01-01 09:00:00AM".to_string());
        let params = ListParams {
            filters,
            ..ListParams::default()
        };

        let query = ListQuery::build(&params, &worker()).unwrap();
        assert!(query.filters.before.is_some());
        assert!(query.filters.after.is_some());
    }

    #[test]
    fn test_unparseable_interval_filter_is_rejected() {
        let mut filters = HashMap::new();
        filters.insert("before".to_string(), "yesterday".to_string());
        let params = ListParams {
            filters,
            ..ListParams::default()
        };

        let err = ListQuery::build(&params, &worker()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid date format, use yyyy-mm-dd hh:mm:ssPM"
        );
    }

    #[test]
    fn test_unknown_filter_keys_are_ignored() {
        let mut filters = HashMap::new();
        filters.insert("favourite_colour".to_string(), "green".to_string());
        filters.insert("role".to_string(), "manager".to_string());
        let params = ListParams {
            filters,
            ..ListParams::default()
        };

        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.filters, TaskFilters::default());
    }

    #[test]
    fn test_empty_filter_values_are_skipped() {
        let mut filters = HashMap::new();
        filters.insert("worker_name".to_string(), String::new());
        let params = ListParams {
            filters,
            ..ListParams::default()
        };

        let query = ListQuery::build(&params, &manager()).unwrap();
        assert_eq!(query.filters.worker_name, None);
    }
}
