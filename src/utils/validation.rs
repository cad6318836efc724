use crate::utils::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 100;

/// Runs every rule on `value`; on failure all violations are reported under
/// `message`.
pub fn validate_request<T: Validate>(value: &T, message: &str) -> ApiResult<()> {
    value
        .validate()
        .map_err(|errors| ApiError::validation_error(message).with_errors(collect_messages(&errors)))
}

/// Flattens field errors into messages, ordered by field name.
pub fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect()
}

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Password policy failures, numbered, or `None` when the password passes.
pub fn password_policy_failures(password: &str) -> Option<String> {
    let length = password.chars().count();
    let mut failures = Vec::new();

    if length < PASSWORD_MIN {
        failures.push(format!("The password should have a minimum length of {} characters", PASSWORD_MIN));
    }
    if length > PASSWORD_MAX {
        failures.push(format!("The password should have a maximum length of {} characters", PASSWORD_MAX));
    }
    if !password.chars().any(char::is_uppercase) {
        failures.push("The password should have a minimum of 1 uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        failures.push("The password should have a minimum of 1 lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failures.push("The password should have a minimum of 1 digit".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        failures.push("The password should have a minimum of 1 symbol".to_string());
    }
    if password.chars().any(char::is_whitespace) {
        failures.push("The password should not have spaces".to_string());
    }

    if failures.is_empty() {
        return None;
    }

    let numbered = failures
        .iter()
        .enumerate()
        .map(|(i, failure)| format!("{}. {}", i + 1, failure))
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!("Password validation failed:\n\n{}", numbered))
}

pub fn password_policy(password: &str) -> Result<(), ValidationError> {
    match password_policy_failures(password) {
        Some(message) => Err(invalid("password_policy", message)),
        None => Ok(()),
    }
}

/// Accepts RFC 3339, naive ISO date-times, or a bare date (midnight).
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    parse_date(value).and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

pub fn datetime_format(value: &str) -> Result<(), ValidationError> {
    parse_datetime(value)
        .map(|_| ())
        .ok_or_else(|| invalid("datetime", format!("'{}' is not a valid date-time", value)))
}

pub fn date_format(value: &str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| invalid("date", format!("'{}' is not a valid date (YYYY-MM-DD)", value)))
}

pub fn time_format(value: &str) -> Result<(), ValidationError> {
    parse_time(value)
        .map(|_| ())
        .ok_or_else(|| invalid("time", format!("'{}' is not a valid time (HH:MM)", value)))
}
