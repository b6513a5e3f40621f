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

//! Operations on one student.

use crate::db;
use crate::driver::{Driver, map_db_error};
use crate::model::*;
use log::{info, warn};
use roster_core::db::DbError;
use roster_core::driver::{DriverError, DriverResult};

/// Builds the error returned when `student_id` does not exist.
fn not_found(student_id: StudentId) -> DriverError {
    warn!("Student {} not found", student_id);
    DriverError::NotFound(ErrorMessage::StudentNotFound.as_str().to_owned())
}

impl Driver {
    /// Deletes the existing student `student_id` and returns its last contents.
    pub(crate) async fn delete_student(self, student_id: StudentId) -> DriverResult<Student> {
        info!("Deleting student {}", student_id);

        let mut tx = self.db.begin().await?;
        let student = match db::get_student(tx.ex(), student_id).await? {
            Some(student) => student,
            None => return Err(not_found(student_id)),
        };
        db::delete_student(tx.ex(), student_id).await.map_err(map_db_error)?;
        tx.commit().await?;

        info!("Deleted student {}", student_id);
        Ok(student)
    }

    /// Gets the student `student_id`.
    pub(crate) async fn get_student(self, student_id: StudentId) -> DriverResult<Student> {
        info!("Fetching student {}", student_id);

        let mut tx = self.db.begin().await?;
        let student = db::get_student(tx.ex(), student_id).await?;
        tx.commit().await?;

        student.ok_or_else(|| not_found(student_id))
    }

    /// Replaces all fields of the existing student `student_id` with `new`.
    pub(crate) async fn update_student(
        self,
        student_id: StudentId,
        new: NewStudent,
    ) -> DriverResult<Student> {
        info!("Updating student {}", student_id);

        let mut tx = self.db.begin().await?;
        let student = match db::update_student(tx.ex(), student_id, new).await {
            Ok(student) => student,
            Err(DbError::NotFound) => return Err(not_found(student_id)),
            Err(e) => return Err(map_db_error(e)),
        };
        tx.commit().await?;

        info!("Updated student {}", student_id);
        Ok(student)
    }
}
