//! Call-for-speakers review rules.
//!
//! Submission statuses, the allowed review targets, rating validation, the
//! "should the speaker be notified" predicate, and CFS label rules. Used by
//! the `db` layer inside the submission and event update transactions.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Highest star count a reviewer can give.
pub const MAX_RATING_STARS: i16 = 5;

/// Star value meaning "clear my rating".
pub const CLEAR_RATING_STARS: i16 = 0;

/// Maximum length of a CFS label name.
pub const MAX_LABEL_NAME_LENGTH: usize = 80;

/* --------------------------------------------------------------------------
Submission status
-------------------------------------------------------------------------- */

/// Status of a CFS submission. Values match the `cfs_submission_statuses` seed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    NotReviewed,
    InformationRequested,
    Approved,
    Rejected,
    Withdrawn,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotReviewed => "not-reviewed",
            Self::InformationRequested => "information-requested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-reviewed" => Ok(Self::NotReviewed),
            "information-requested" => Ok(Self::InformationRequested),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "withdrawn" => Ok(Self::Withdrawn),
            other => Err(CoreError::Validation(format!(
                "unknown submission status '{other}'"
            ))),
        }
    }
}

/// Check that a reviewer may move a submission to `target`.
///
/// `withdrawn` is owned by the speaker and is never a review outcome. A
/// submission already promoted to a session must stay `approved`.
pub fn validate_review_target(
    target: SubmissionStatus,
    has_linked_session: bool,
) -> Result<(), CoreError> {
    if target == SubmissionStatus::Withdrawn {
        return Err(CoreError::InvalidTransition(
            "invalid submission status".to_string(),
        ));
    }
    if has_linked_session && target != SubmissionStatus::Approved {
        return Err(CoreError::InvalidTransition(
            "linked submissions must remain approved".to_string(),
        ));
    }
    Ok(())
}

/// Blank messages are stored as NULL.
pub fn normalize_message(message: Option<&str>) -> Option<String> {
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Whether a review changed what the speaker sees (status or message).
///
/// Label and rating changes are internal to the review team and never
/// trigger a notification.
pub fn requires_notification(
    previous_status: SubmissionStatus,
    previous_message: Option<&str>,
    new_status: SubmissionStatus,
    new_message: Option<&str>,
) -> bool {
    previous_status != new_status || previous_message != new_message
}

/* --------------------------------------------------------------------------
Ratings
-------------------------------------------------------------------------- */

/// What to do with the acting reviewer's rating row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingChange {
    Upsert { stars: i16, comment: Option<String> },
    Clear,
}

impl RatingChange {
    /// Build a rating change from the submitted star count.
    ///
    /// `0` clears the reviewer's rating, `1..=5` upserts it.
    pub fn from_stars(stars: i16, comment: Option<&str>) -> Result<Self, CoreError> {
        match stars {
            CLEAR_RATING_STARS => Ok(Self::Clear),
            1..=MAX_RATING_STARS => Ok(Self::Upsert {
                stars,
                comment: normalize_message(comment),
            }),
            _ => Err(CoreError::Validation("invalid rating stars".to_string())),
        }
    }
}

/* --------------------------------------------------------------------------
Labels
-------------------------------------------------------------------------- */

/// Validate a label name and return it trimmed.
pub fn validate_label_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "CFS label name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_LABEL_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "CFS label name exceeds {MAX_LABEL_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Reject label sets that repeat a name.
pub fn ensure_unique_label_names<'a, I>(names: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CoreError::Validation(format!(
                "duplicate CFS label name '{name}'"
            )));
        }
    }
    Ok(())
}
