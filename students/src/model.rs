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

//! High-level data types for the service.

use derive_getters::Getters;
use roster_core::model::{EmailAddress, ModelError, ModelResult, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum number of characters in a first or last name.
const MAX_NAME_LENGTH: usize = 50;

/// Minimum age accepted for a student, inclusive.
const MIN_AGE: i64 = 18;

/// Maximum age accepted for a student, inclusive.
const MAX_AGE: i64 = 35;

/// Page number used when the client does not request one.
pub(crate) const DEFAULT_PAGE: u32 = 1;

/// Page size used when the client does not request one.
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size a client may request.
const MAX_PAGE_SIZE: u32 = 100;

/// Catalog of user-facing messages returned by the service.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ErrorMessage {
    /// A create or update collided with another record's email address.
    EmailAlreadyRegistered,

    /// The requested student does not exist.
    StudentNotFound,
}

impl ErrorMessage {
    /// Returns the text of the message.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ErrorMessage::EmailAlreadyRegistered => "Email already registered",
            ErrorMessage::StudentNotFound => "Student Not Found!",
        }
    }
}

/// Unique identifier of a student, assigned by the server at creation time.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct StudentId(Uuid);

impl StudentId {
    /// Generates a new random identifier.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier from its textual representation, as stored in the database.
    pub(crate) fn parse(s: &str) -> ModelResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ModelError(format!("Invalid student identifier '{}': {}", s, e)))
    }

    /// Returns the identifier as a UUID.
    pub(crate) fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for StudentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

/// A first or last name.
///
/// Names have between 1 and `MAX_NAME_LENGTH` characters and are made only of ASCII letters,
/// spaces and hyphens.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct PersonName(String);

impl PersonName {
    /// Creates a new name from an untrusted string `s`, making sure it is valid.
    ///
    /// Only the first violated rule is reported.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        let length = s.chars().count();
        if length == 0 || length > MAX_NAME_LENGTH {
            return Err(ModelError(format!(
                "Name must be between 1 and {} characters",
                MAX_NAME_LENGTH
            )));
        }

        if s.chars().any(char::is_numeric) {
            return Err(ModelError("Name must not contain numbers".to_owned()));
        }

        if !s.chars().all(|ch| ch.is_ascii_alphabetic() || ch == ' ' || ch == '-') {
            return Err(ModelError(
                "Name must only contain letters, spaces, or hyphens".to_owned(),
            ));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the name.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = ModelError;

    fn try_from(value: String) -> ModelResult<Self> {
        Self::new(value)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

#[cfg(test)]
impl From<&str> for PersonName {
    fn from(raw: &str) -> Self {
        Self::new(raw).expect("Hardcoded names for testing must be valid")
    }
}

/// The age of a student, in years.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "i64", into = "i64")]
pub(crate) struct Age(u8);

impl Age {
    /// Creates a new age from an untrusted integer, making sure it is within range.
    pub(crate) fn new(age: i64) -> ModelResult<Self> {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(ModelError(format!("Age must be between {} and {}", MIN_AGE, MAX_AGE)));
        }
        let age = u8::try_from(age).map_err(|e| ModelError(e.to_string()))?;
        Ok(Self(age))
    }

    /// Returns the age as an `i32`, which is how it is stored in the database.
    pub(crate) fn as_i32(self) -> i32 {
        i32::from(self.0)
    }
}

impl TryFrom<i64> for Age {
    type Error = ModelError;

    fn try_from(value: i64) -> ModelResult<Self> {
        Self::new(value)
    }
}

impl From<Age> for i64 {
    fn from(value: Age) -> Self {
        i64::from(value.0)
    }
}

/// The contents of a student record, without its identifier.
///
/// This is what clients supply, after validation, when creating or replacing a record.
#[derive(Clone, Debug, Getters, PartialEq)]
pub(crate) struct NewStudent {
    /// The student's first name.
    first_name: PersonName,

    /// The student's last name.
    last_name: PersonName,

    /// The student's age.
    age: Age,

    /// The student's email address, unique across all records.
    email: EmailAddress,
}

impl NewStudent {
    /// Creates a new set of student contents from already-validated fields.
    pub(crate) fn new(
        first_name: PersonName,
        last_name: PersonName,
        age: Age,
        email: EmailAddress,
    ) -> Self {
        Self { first_name, last_name, age, email }
    }
}

/// A stored student record.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub(crate) struct Student {
    /// The student's identifier.
    student_id: StudentId,

    /// The student's first name.
    first_name: PersonName,

    /// The student's last name.
    last_name: PersonName,

    /// The student's age.
    age: Age,

    /// The student's email address.
    email: EmailAddress,
}

impl Student {
    /// Creates a record by attaching the identifier `student_id` to the `new` contents.
    pub(crate) fn from_new(student_id: StudentId, new: NewStudent) -> Self {
        Self {
            student_id,
            first_name: new.first_name,
            last_name: new.last_name,
            age: new.age,
            email: new.email,
        }
    }
}

/// Raw, unvalidated contents of a student as received from a client.
#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(Clone, Serialize))]
pub(crate) struct StudentRequest {
    /// Requested first name.
    pub(crate) first_name: String,

    /// Requested last name.
    pub(crate) last_name: String,

    /// Requested age.
    pub(crate) age: i64,

    /// Requested email address.
    pub(crate) email: String,
}

impl StudentRequest {
    /// Validates every field and returns the typed contents, or all the violations found.
    pub(crate) fn validate(self) -> Result<NewStudent, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let first_name = errors.check("first_name", PersonName::new(self.first_name));
        let last_name = errors.check("last_name", PersonName::new(self.last_name));
        let age = errors.check("age", Age::new(self.age));
        let email = errors.check("email", EmailAddress::new(self.email));

        match (first_name, last_name, age, email) {
            (Some(first_name), Some(last_name), Some(age), Some(email)) => {
                Ok(NewStudent::new(first_name, last_name, age, email))
            }
            _ => Err(errors),
        }
    }
}

/// A validated request for one page of results.
#[derive(Clone, Copy, Debug, Getters, PartialEq)]
pub(crate) struct PageRequest {
    /// The 1-based number of the page to return.
    page: u32,

    /// The maximum number of items in the page.
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, size: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    /// Creates a new page request, making sure the numbers are in range.
    pub(crate) fn new(page: u32, size: u32) -> ModelResult<Self> {
        if page < 1 {
            return Err(ModelError("Page number must be at least 1".to_owned()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(ModelError(format!("Page size must be between 1 and {}", MAX_PAGE_SIZE)));
        }
        Ok(Self { page, size })
    }

    /// Returns the number of items to skip before the first item of this page.
    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

/// One page of results out of a larger collection.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct Page<T> {
    /// Items in this page, in collection order.
    pub(crate) items: Vec<T>,

    /// Number of items in the whole collection.
    pub(crate) total: u64,

    /// The 1-based number of this page.
    pub(crate) page: u32,

    /// The requested page size.
    pub(crate) size: u32,

    /// Number of pages needed to cover the whole collection.
    pub(crate) pages: u64,
}

impl<T> Page<T> {
    /// Builds the page described by `request` given its `items` and the collection's `total`.
    pub(crate) fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let pages = total.div_ceil(u64::from(request.size));
        Self { items, total, page: request.page, size: request.size, pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::model::FieldError;
    use serde_test::{Token, assert_de_tokens_error, assert_tokens};

    /// Returns a request that passes validation.
    fn valid_request() -> StudentRequest {
        StudentRequest {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            age: 20,
            email: "jane@example.com".to_owned(),
        }
    }

    #[test]
    fn test_error_message_catalog() {
        assert_eq!("Student Not Found!", ErrorMessage::StudentNotFound.as_str());
        assert_eq!("Email already registered", ErrorMessage::EmailAlreadyRegistered.as_str());
    }

    #[test]
    fn test_student_id_generate_is_v4_and_unique() {
        let id1 = StudentId::generate();
        let id2 = StudentId::generate();
        assert_ne!(id1, id2);
        assert_eq!(Some(uuid::Version::Random), id1.as_uuid().get_version());
    }

    #[test]
    fn test_student_id_display_and_parse() {
        let id = StudentId::parse("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        assert_eq!("67e55044-10b1-426f-9247-bb680e5fe0c8", id.to_string());
        assert_eq!(id, StudentId::parse(&id.to_string()).unwrap());
    }

    #[test]
    fn test_student_id_parse_error() {
        let err = StudentId::parse("not-a-uuid").unwrap_err();
        assert!(err.0.starts_with("Invalid student identifier 'not-a-uuid'"));
    }

    #[test]
    fn test_person_name_ok() {
        let longest = "a".repeat(MAX_NAME_LENGTH);
        for name in ["Jane", "Mary-Anne", "Van der Berg", "X", longest.as_str()] {
            assert_eq!(name, PersonName::new(name).unwrap().as_str());
        }
    }

    #[test]
    fn test_person_name_errors() {
        let too_long = "a".repeat(MAX_NAME_LENGTH + 1);
        for (name, exp_error) in [
            ("", "Name must be between 1 and 50 characters"),
            (too_long.as_str(), "Name must be between 1 and 50 characters"),
            ("Jane2", "Name must not contain numbers"),
            ("2_", "Name must not contain numbers"),
            ("Jane_", "Name must only contain letters, spaces, or hyphens"),
            ("O'Brien", "Name must only contain letters, spaces, or hyphens"),
            ("José", "Name must only contain letters, spaces, or hyphens"),
        ] {
            assert_eq!(ModelError(exp_error.to_owned()), PersonName::new(name).unwrap_err());
        }
    }

    #[test]
    fn test_person_name_length_counts_characters() {
        let name = "ñ".repeat(MAX_NAME_LENGTH);
        assert_eq!(
            ModelError("Name must only contain letters, spaces, or hyphens".to_owned()),
            PersonName::new(name).unwrap_err()
        );
    }

    #[test]
    fn test_person_name_ser_de() {
        assert_tokens(&PersonName::from("Mary-Anne"), &[Token::String("Mary-Anne")]);
        assert_de_tokens_error::<PersonName>(
            &[Token::String("R2D2")],
            "Name must not contain numbers",
        );
    }

    #[test]
    fn test_age_boundaries() {
        assert!(Age::new(17).is_err());
        assert_eq!(18, Age::new(18).unwrap().as_i32());
        assert_eq!(35, Age::new(35).unwrap().as_i32());
        assert!(Age::new(36).is_err());
        assert!(Age::new(-1).is_err());
        assert!(Age::new(i64::MAX).is_err());
        assert_eq!(
            ModelError("Age must be between 18 and 35".to_owned()),
            Age::new(0).unwrap_err()
        );
    }

    #[test]
    fn test_age_ser_de() {
        assert_tokens(&Age::new(21).unwrap(), &[Token::I64(21)]);
        assert_de_tokens_error::<Age>(&[Token::I64(40)], "Age must be between 18 and 35");
    }

    #[test]
    fn test_student_request_validate_ok() {
        let new = valid_request().validate().unwrap();
        assert_eq!(
            NewStudent::new(
                PersonName::from("Jane"),
                PersonName::from("Doe"),
                Age::new(20).unwrap(),
                EmailAddress::new("jane@example.com").unwrap(),
            ),
            new
        );
    }

    #[test]
    fn test_student_request_validate_collects_all_errors() {
        let request = StudentRequest {
            first_name: "Jane2".to_owned(),
            last_name: "Doe_".to_owned(),
            age: 17,
            email: "not-an-email".to_owned(),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(
            &[
                FieldError::new("first_name", "Name must not contain numbers"),
                FieldError::new("last_name", "Name must only contain letters, spaces, or hyphens"),
                FieldError::new("age", "Age must be between 18 and 35"),
                FieldError::new("email", "Email does not look like a valid address 'not-an-email'"),
            ],
            errors.errors()
        );
    }

    #[test]
    fn test_student_request_validate_one_error() {
        let mut request = valid_request();
        request.age = 36;
        let errors = request.validate().unwrap_err();
        assert_eq!(&[FieldError::new("age", "Age must be between 18 and 35")], errors.errors());
    }

    #[test]
    fn test_student_from_new() {
        let id = StudentId::generate();
        let new = valid_request().validate().unwrap();
        let student = Student::from_new(id, new.clone());
        assert_eq!(&id, student.student_id());
        assert_eq!(new.first_name(), student.first_name());
        assert_eq!(new.last_name(), student.last_name());
        assert_eq!(new.age(), student.age());
        assert_eq!(new.email(), student.email());
    }

    #[test]
    fn test_student_json_shape() {
        let id = StudentId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let student = Student::from_new(id, valid_request().validate().unwrap());
        assert_eq!(
            serde_json::json!({
                "student_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "first_name": "Jane",
                "last_name": "Doe",
                "age": 20,
                "email": "jane@example.com",
            }),
            serde_json::to_value(&student).unwrap()
        );
    }

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(1, *request.page());
        assert_eq!(50, *request.size());
        assert_eq!(0, request.offset());
    }

    #[test]
    fn test_page_request_ranges() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, 101).is_err());
        assert_eq!(20, PageRequest::new(3, 10).unwrap().offset());
        assert_eq!(99 * 100, PageRequest::new(100, 100).unwrap().offset());
    }

    #[test]
    fn test_page_counts() {
        for (total, size, exp_pages) in
            [(0, 10, 0), (1, 10, 1), (10, 10, 1), (11, 10, 2), (7, 3, 3)]
        {
            let page = Page::<()>::new(vec![], total, PageRequest::new(1, size).unwrap());
            assert_eq!(exp_pages, page.pages, "total={} size={}", total, size);
            assert_eq!(total, page.total);
            assert_eq!(size, page.size);
            assert_eq!(1, page.page);
        }
    }
}
