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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use roster_core::db::Db;
use roster_core::model::EmailAddress;
use std::sync::Arc;

/// Builds a request body from raw values, without validating them.
pub(crate) fn student_request(
    first_name: &str,
    last_name: &str,
    age: i64,
    email: &str,
) -> StudentRequest {
    StudentRequest {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        age,
        email: email.to_owned(),
    }
}

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the app, for direct access.
    db: Arc<dyn Db + Send + Sync>,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app using an in-memory database.
    pub(crate) async fn setup() -> Self {
        let db = Arc::new(roster_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let db: Arc<dyn Db + Send + Sync> = db;
        let driver = Driver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    /// Gets a copy of the app router to issue a request against it.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns its app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Inserts a student directly into the database.
    pub(crate) async fn create_student(
        &self,
        first_name: &str,
        last_name: &str,
        age: i64,
        email: &str,
    ) -> Student {
        let new = NewStudent::new(
            PersonName::from(first_name),
            PersonName::from(last_name),
            Age::new(age).unwrap(),
            EmailAddress::new(email).unwrap(),
        );
        db::create_student(&mut self.db.ex().await.unwrap(), StudentId::generate(), new)
            .await
            .unwrap()
    }

    /// Gets a student directly from the database.
    pub(crate) async fn get_student(&self, student_id: StudentId) -> Option<Student> {
        db::get_student(&mut self.db.ex().await.unwrap(), student_id).await.unwrap()
    }

    /// Counts the students directly in the database.
    pub(crate) async fn count_students(&self) -> u64 {
        db::count_students(&mut self.db.ex().await.unwrap()).await.unwrap()
    }
}
