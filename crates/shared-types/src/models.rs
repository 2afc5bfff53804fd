use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use crate::validation::FieldErrors;
#[cfg(feature = "validation")]
use crate::AppError;
#[cfg(feature = "validation")]
use validator::Validate;

/// Portal role controlling which dashboard a user lands on.
///
/// - `Admin`: manages people, classes and enrollments.
/// - `Teacher`: runs classes, assignments, grades and attendance.
/// - `Student`: views coursework and submits assignments.
/// - `Parent`: follows linked children, fees and messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl UserRole {
    /// Parse a role string as stored by the login flow. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "teacher" => Some(UserRole::Teacher),
            "student" => Some(UserRole::Student),
            "parent" => Some(UserRole::Parent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Teacher => "teacher",
            UserRole::Student => "student",
            UserRole::Parent => "parent",
        }
    }

    /// Landing page for the role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Admin => "/html/admin.html",
            UserRole::Teacher => "/html/teacher.html",
            UserRole::Student => "/html/student.html",
            UserRole::Parent => "/html/parent.html",
        }
    }
}

/// A portal account as returned by `/auth/me` and the admin people endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn user_role(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }

    /// Avatar initials, e.g. "Ada Lovelace" -> "AL".
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Response of `POST /auth/token`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenResponse {
    /// Role as reported by the backend under either field name.
    pub fn role(&self) -> Option<UserRole> {
        self.user_role
            .as_deref()
            .or(self.role.as_deref())
            .and_then(UserRole::parse)
    }
}

/// Login form input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct Credentials {
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Please enter a valid email address"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Password is required"))
    )]
    pub password: String,
}

#[cfg(feature = "validation")]
impl Credentials {
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::from_result(self.validate());
        errors.require("email", &self.email, "Email is required");
        errors.into_result()
    }
}

/// People collections managed from the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonKind {
    Student,
    Teacher,
    Parent,
}

impl PersonKind {
    /// Path segment under `/admin`.
    pub fn segment(&self) -> &'static str {
        match self {
            PersonKind::Student => "students",
            PersonKind::Teacher => "teachers",
            PersonKind::Parent => "parents",
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            PersonKind::Student => UserRole::Student,
            PersonKind::Teacher => UserRole::Teacher,
            PersonKind::Parent => UserRole::Parent,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonKind::Student => "Student",
            PersonKind::Teacher => "Teacher",
            PersonKind::Parent => "Parent",
        }
    }
}

/// Request DTO for creating a student, teacher or parent account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct NewPerson {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Full name is required"))
    )]
    pub full_name: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Invalid email format"))
    )]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub contact: Option<String>,
    pub grade: Option<String>,
    pub section: Option<String>,
    pub subject: Option<String>,
    pub qualification: Option<String>,
}

impl NewPerson {
    /// Stamp the role and turn blank optional strings into nulls.
    pub fn normalized(mut self, kind: PersonKind) -> Self {
        self.role = Some(kind.role().as_str().to_string());
        for field in [
            &mut self.contact,
            &mut self.grade,
            &mut self.section,
            &mut self.subject,
            &mut self.qualification,
            &mut self.password,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }
}

#[cfg(feature = "validation")]
impl NewPerson {
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::from_result(self.validate());
        errors.require("full_name", &self.full_name, "Full name is required");
        errors.phone("contact", self.contact.as_deref());
        errors.into_result()
    }
}

/// Partial update of a person; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(feature = "validation")]
impl PersonUpdate {
    pub fn check(&self) -> Result<(), AppError> {
        use validator::ValidateEmail;

        let mut errors = FieldErrors::default();
        if let Some(name) = &self.full_name {
            errors.require("full_name", name, "Full name cannot be empty");
        }
        if let Some(email) = &self.email {
            if !email.validate_email() {
                errors.add("email", "Invalid email format");
            }
        }
        errors.phone("contact", self.contact.as_deref());
        errors.into_result()
    }
}

/// Filters for the admin people listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeopleQuery {
    pub search: Option<String>,
    pub grade: Option<String>,
    pub section: Option<String>,
}

impl PeopleQuery {
    pub fn pairs(&self) -> Vec<(String, String)> {
        [
            ("search", &self.search),
            ("grade", &self.grade),
            ("section", &self.section),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key.to_string(), v.trim().to_string()))
        })
        .collect()
    }
}

/// Move every student of one grade/section to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPromotion {
    pub from_grade: String,
    pub from_section: String,
    pub to_grade: String,
    pub to_section: String,
}

#[cfg(feature = "validation")]
impl StudentPromotion {
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.require("from_grade", &self.from_grade, "Source grade is required");
        errors.require("from_section", &self.from_section, "Source section is required");
        errors.require("to_grade", &self.to_grade, "Target grade is required");
        errors.require("to_section", &self.to_section, "Target section is required");
        if errors.is_empty()
            && self.from_grade == self.to_grade
            && self.from_section == self.to_section
        {
            errors.add("to_grade", "Target must differ from the source");
        }
        errors.into_result()
    }
}
