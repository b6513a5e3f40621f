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

//! API to replace the contents of a single student.

use crate::driver::Driver;
use crate::model::{StudentId, StudentRequest};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use roster_core::rest::RestResult;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    student_id: Result<Path<StudentId>, PathRejection>,
    request: Result<Json<StudentRequest>, JsonRejection>,
) -> RestResult<impl IntoResponse> {
    let Path(student_id) = student_id?;
    let Json(request) = request?;
    let new = request.validate()?;

    let student = driver.update_student(student_id, new).await?;

    Ok(Json(student))
}
