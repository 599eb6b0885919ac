use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Teacher,
    Student,
}

impl UserRole {
    /// Admins and teachers manage content and see every learner's data.
    pub(crate) fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Teacher)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "quizmode", rename_all = "lowercase")]
pub(crate) enum QuizMode {
    Retry,
    Straight,
}

impl QuizMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::Straight => "straight",
        }
    }
}

impl Default for QuizMode {
    fn default() -> Self {
        Self::Retry
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "awardmethod", rename_all = "snake_case")]
pub(crate) enum AwardMethod {
    AutoOnBookComplete,
    Manual,
}

impl Default for AwardMethod {
    fn default() -> Self {
        Self::AutoOnBookComplete
    }
}
