use crate::api::errors::ApiError;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let valid = (3..=64).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid username format".to_string()))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub(crate) fn validate_scores(score_correct: i32, score_total: i32) -> Result<(), ApiError> {
    if score_total <= 0 {
        return Err(ApiError::BadRequest("score_total must be positive".to_string()));
    }
    if !(0..=score_total).contains(&score_correct) {
        return Err(ApiError::BadRequest(
            "score_correct must be between 0 and score_total".to_string(),
        ));
    }
    Ok(())
}

/// Missing durations count as zero; out-of-range ones are clamped.
pub(crate) fn clamp_duration(duration_sec: Option<i64>, max_seconds: i32) -> i32 {
    duration_sec.unwrap_or(0).clamp(0, i64::from(max_seconds.max(0))) as i32
}
