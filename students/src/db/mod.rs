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

//! Database abstraction in terms of the operations needed by the server.

use crate::model::{Age, NewStudent, PageRequest, PersonName, Student, StudentId};
use roster_core::db::postgres;
use roster_core::db::sqlite;
use roster_core::db::{DbError, DbResult, Executor};
use roster_core::model::EmailAddress;
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;


/// Initializes the database schema.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

impl TryFrom<PgRow> for Student {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let student_id: Uuid = row.try_get("student_id").map_err(postgres::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(postgres::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(postgres::map_sqlx_error)?;
        let age: i32 = row.try_get("age").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;

        let new = NewStudent::new(
            PersonName::new(first_name)?,
            PersonName::new(last_name)?,
            Age::new(i64::from(age))?,
            EmailAddress::new(email)?,
        );
        Ok(Student::from_new(StudentId::from(student_id), new))
    }
}

impl TryFrom<SqliteRow> for Student {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let student_id: String = row.try_get("student_id").map_err(sqlite::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(sqlite::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(sqlite::map_sqlx_error)?;
        let age: i32 = row.try_get("age").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;

        let new = NewStudent::new(
            PersonName::new(first_name)?,
            PersonName::new(last_name)?,
            Age::new(i64::from(age))?,
            EmailAddress::new(email)?,
        );
        Ok(Student::from_new(StudentId::parse(&student_id)?, new))
    }
}

/// Converts an unsigned quantity to the signed type the databases use for counts and offsets.
fn to_sql_i64(value: u64) -> DbResult<i64> {
    i64::try_from(value)
        .map_err(|e| DbError::BackendError(format!("Value {} out of range: {}", value, e)))
}

/// Counts all existing students.
pub(crate) async fn count_students(ex: &mut Executor) -> DbResult<u64> {
    let count: i64 = match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM students";
            let row = sqlx::query(query_str)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM students";
            let row = sqlx::query(query_str)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }
    };

    u64::try_from(count)
        .map_err(|e| DbError::DataIntegrityError(format!("Invalid row count {}: {}", count, e)))
}

/// Gets the students that fall within the page described by `request`, ordered by identifier.
pub(crate) async fn list_students(
    ex: &mut Executor,
    request: PageRequest,
) -> DbResult<Vec<Student>> {
    let limit = i64::from(*request.size());
    let offset = to_sql_i64(request.offset())?;

    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT student_id, first_name, last_name, age, email
                FROM students
                ORDER BY student_id
                LIMIT $1 OFFSET $2";
            let rows = sqlx::query(query_str)
                .bind(limit)
                .bind(offset)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Student::try_from).collect()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT student_id, first_name, last_name, age, email
                FROM students
                ORDER BY student_id
                LIMIT ? OFFSET ?";
            let rows = sqlx::query(query_str)
                .bind(limit)
                .bind(offset)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Student::try_from).collect()
        }
    }
}

/// Gets the student identified by `student_id`, or `None` if it does not exist.
pub(crate) async fn get_student(
    ex: &mut Executor,
    student_id: StudentId,
) -> DbResult<Option<Student>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT student_id, first_name, last_name, age, email
                FROM students
                WHERE student_id = $1";
            let maybe_row = sqlx::query(query_str)
                .bind(*student_id.as_uuid())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            maybe_row.map(Student::try_from).transpose()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT student_id, first_name, last_name, age, email
                FROM students
                WHERE student_id = ?";
            let maybe_row = sqlx::query(query_str)
                .bind(student_id.to_string())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            maybe_row.map(Student::try_from).transpose()
        }
    }
}

/// Checks that an insertion affected exactly one row.
fn check_inserted(rows_affected: u64) -> DbResult<()> {
    match rows_affected {
        1 => Ok(()),
        n => Err(DbError::BackendError(format!("Insertion affected {} rows instead of one", n))),
    }
}

/// Creates a new student identified by `student_id` with the `new` contents.
pub(crate) async fn create_student(
    ex: &mut Executor,
    student_id: StudentId,
    new: NewStudent,
) -> DbResult<Student> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO students (student_id, first_name, last_name, age, email)
                VALUES ($1, $2, $3, $4, $5)";
            let done = sqlx::query(query_str)
                .bind(*student_id.as_uuid())
                .bind(new.first_name().as_str())
                .bind(new.last_name().as_str())
                .bind(new.age().as_i32())
                .bind(new.email().as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO students (student_id, first_name, last_name, age, email)
                VALUES (?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(student_id.to_string())
                .bind(new.first_name().as_str())
                .bind(new.last_name().as_str())
                .bind(new.age().as_i32())
                .bind(new.email().as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    check_inserted(rows_affected)?;
    Ok(Student::from_new(student_id, new))
}

/// Replaces all fields of the existing student `student_id` with the `new` contents.
pub(crate) async fn update_student(
    ex: &mut Executor,
    student_id: StudentId,
    new: NewStudent,
) -> DbResult<Student> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE students
                SET first_name = $1, last_name = $2, age = $3, email = $4
                WHERE student_id = $5";
            let done = sqlx::query(query_str)
                .bind(new.first_name().as_str())
                .bind(new.last_name().as_str())
                .bind(new.age().as_i32())
                .bind(new.email().as_str())
                .bind(*student_id.as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE students
                SET first_name = ?, last_name = ?, age = ?, email = ?
                WHERE student_id = ?";
            let done = sqlx::query(query_str)
                .bind(new.first_name().as_str())
                .bind(new.last_name().as_str())
                .bind(new.age().as_i32())
                .bind(new.email().as_str())
                .bind(student_id.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(Student::from_new(student_id, new)),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the existing student `student_id`.
pub(crate) async fn delete_student(ex: &mut Executor, student_id: StudentId) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM students WHERE student_id = $1";
            let done = sqlx::query(query_str)
                .bind(*student_id.as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM students WHERE student_id = ?";
            let done = sqlx::query(query_str)
                .bind(student_id.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}
