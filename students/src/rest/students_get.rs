// Roster
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to list students one page at a time.

use crate::driver::Driver;
use crate::model::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, PageRequest};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use roster_core::rest::{EmptyBody, RestResult};
use serde::Deserialize;

/// Query parameters accepted by this API.
#[derive(Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
pub(crate) struct ListQuery {
    /// The 1-based number of the page to return.
    page: Option<u32>,

    /// The maximum number of students to return.
    size: Option<u32>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    query: Result<Query<ListQuery>, QueryRejection>,
    _: EmptyBody,
) -> RestResult<impl IntoResponse> {
    let Query(query) = query?;
    let request = PageRequest::new(
        query.page.unwrap_or(DEFAULT_PAGE),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    let page = driver.list_students(request).await?;

    Ok(Json(page))
}
