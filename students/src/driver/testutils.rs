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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use roster_core::db::{Db, Executor};
use roster_core::model::EmailAddress;
use std::sync::Arc;

/// Builds valid student contents from raw values.
pub(crate) fn new_student(first_name: &str, last_name: &str, age: i64, email: &str) -> NewStudent {
    NewStudent::new(
        PersonName::from(first_name),
        PersonName::from(last_name),
        Age::new(age).unwrap(),
        EmailAddress::new(email).unwrap(),
    )
}

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver, for direct access.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database.
    pub(crate) async fn setup() -> Self {
        let db = Arc::new(roster_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let db: Arc<dyn Db + Send + Sync> = db;
        let driver = Driver::new(db.clone());
        Self { db, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Inserts a student directly into the database, bypassing the driver.
    pub(crate) async fn create_student(&self, new: NewStudent) -> Student {
        db::create_student(&mut self.ex().await, StudentId::generate(), new).await.unwrap()
    }

    /// Gets a student directly from the database, bypassing the driver.
    pub(crate) async fn get_student(&self, student_id: StudentId) -> Option<Student> {
        db::get_student(&mut self.ex().await, student_id).await.unwrap()
    }

    /// Counts the students directly in the database.
    pub(crate) async fn count_students(&self) -> u64 {
        db::count_students(&mut self.ex().await).await.unwrap()
    }
}
