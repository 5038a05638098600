use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use faultline_core::pagination::LimitOffsetPagination;
use faultline_core::{Entry, Sentinel};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct Hello {
    message: &'static str,
}

pub(crate) async fn hello() -> Json<Hello> {
    Json(Hello { message: "hello" })
}

/// One page of the sentinel catalog
#[derive(Debug, Serialize)]
pub(crate) struct CatalogPage {
    items: Vec<Entry>,
    page: u64,
    page_size: u64,
    total: u64,
    total_pages: u64,
    next_page: u64,
}

/// `GET {prefix}/errors?page=&page_size=`
pub(crate) async fn list_errors(
    State(state): State<AppState>,
    query: Result<Query<LimitOffsetPagination>, QueryRejection>,
) -> Result<Json<CatalogPage>, ApiError> {
    let Query(paging) = query.map_err(|rejection| {
        Sentinel::IllegalArgument
            .standard_error()
            .with_reason("invalid paging parameters")
            .with_message(rejection.body_text())
    })?;

    let total = u64::try_from(state.catalog.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(paging.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(paging.page_size()).unwrap_or(usize::MAX);

    let items = state
        .catalog
        .iter()
        .skip(offset)
        .take(take)
        .map(|(entry, _)| *entry)
        .collect();

    Ok(Json(CatalogPage {
        items,
        page: paging.page(),
        page_size: paging.page_size(),
        total,
        total_pages: paging.total_pages(total),
        next_page: paging.next_page(total),
    }))
}

/// `GET {prefix}/errors/{code}`
pub(crate) async fn get_error(
    State(state): State<AppState>,
    code: Result<Path<i32>, PathRejection>,
) -> Result<Json<Entry>, ApiError> {
    let Path(code) = code.map_err(|rejection| {
        Sentinel::IllegalArgument
            .standard_error()
            .with_reason("error code must be an integer")
            .with_message(rejection.body_text())
    })?;

    let (entry, _) = state.catalog.by_code(code).ok_or_else(|| {
        state
            .catalog
            .get(Sentinel::ResourceNotFound)
            .with_message_fmt(format_args!("no catalog entry with code {code}"))
    })?;

    Ok(Json(*entry))
}
