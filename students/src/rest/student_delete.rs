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

//! API to delete a single student.

use crate::driver::Driver;
use crate::model::StudentId;
use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use roster_core::rest::{EmptyBody, RestResult};

/// API handler.
///
/// Returns the contents of the student as they were right before deletion.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    student_id: Result<Path<StudentId>, PathRejection>,
    _: EmptyBody,
) -> RestResult<impl IntoResponse> {
    let Path(student_id) = student_id?;

    let student = driver.delete_student(student_id).await?;

    Ok(Json(student))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use roster_core::rest::testutils::*;

    fn route(student_id: &str) -> (http::Method, String) {
        (http::Method::DELETE, format!("/students/{}", student_id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let other = context.create_student("John", "Smith", 30, "john@example.com").await;
        let student = context.create_student("Jane", "Doe", 20, "jane@example.com").await;

        let response = OneShotBuilder::new(context.app(), route(&student.student_id().to_string()))
            .send_empty()
            .await
            .expect_json::<Student>()
            .await;
        assert_eq!(student, response);

        assert_eq!(None, context.get_student(*student.student_id()).await);
        assert_eq!(Some(other.clone()), context.get_student(*other.student_id()).await);
    }

    #[tokio::test]
    async fn test_twice() {
        let context = TestContext::setup().await;
        let student = context.create_student("Jane", "Doe", 20, "jane@example.com").await;
        let id = student.student_id().to_string();

        OneShotBuilder::new(context.app(), route(&id))
            .send_empty()
            .await
            .expect_json::<Student>()
            .await;

        OneShotBuilder::new(context.app(), route(&id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Student Not Found!$")
            .await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;
        context.create_student("Jane", "Doe", 20, "jane@example.com").await;

        OneShotBuilder::new(context.app(), route(&StudentId::generate().to_string()))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Student Not Found!$")
            .await;

        assert_eq!(1, context.count_students().await);
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route("12345"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid URL")
            .await;
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route(&StudentId::generate().to_string())
    );
}
