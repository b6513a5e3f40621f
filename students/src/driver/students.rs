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

//! Operations on the collection of students.

use crate::db;
use crate::driver::{Driver, map_db_error};
use crate::model::*;
use log::info;
use roster_core::driver::DriverResult;

impl Driver {
    /// Creates a new student with the `new` contents and a freshly-generated identifier.
    pub(crate) async fn create_student(self, new: NewStudent) -> DriverResult<Student> {
        let student_id = StudentId::generate();
        info!("Creating student {}", student_id);

        let mut tx = self.db.begin().await?;
        let student =
            db::create_student(tx.ex(), student_id, new).await.map_err(map_db_error)?;
        tx.commit().await?;

        info!("Created student {}", student_id);
        Ok(student)
    }

    /// Gets one page of students, as described by `request`, ordered by identifier.
    pub(crate) async fn list_students(self, request: PageRequest) -> DriverResult<Page<Student>> {
        info!("Listing students page {} of size {}", request.page(), request.size());

        let mut tx = self.db.begin().await?;
        let total = db::count_students(tx.ex()).await?;
        let items = db::list_students(tx.ex(), request).await?;
        tx.commit().await?;

        Ok(Page::new(items, total, request))
    }
}
