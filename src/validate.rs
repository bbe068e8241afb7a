use std::sync::LazyLock;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use thiserror::Error;
use crate::app::state::ProfileForm;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Vui lòng nhập đầy đủ dữ liệu của bạn")]
    Incomplete,
    #[error("Ngày tháng năm sinh không được lớn hơn ngày hiện tại")]
    BirthdateNotInPast,
    #[error("Số Điện Thoại Phải là 10 Số")]
    PhoneFormat,
}

pub fn is_phone_number_valid(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Accepts the date shapes the backend and the date picker produce:
/// `2000-01-01`, `2000/01/01`, RFC 3339 and naive ISO timestamps, and epoch
/// milliseconds (negative before 1970). Bare dates are taken as local midnight.
pub fn parse_birthdate(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.chars().all(|c| c.is_ascii_digit()) && digits.len() > 8 {
        let millis: i64 = raw.parse().ok()?;
        return Local.timestamp_millis_opt(millis).single();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest();
        }
    }
    None
}

/// An absent or unparseable birthdate is never "before now".
pub fn is_birthdate_valid(birthdate: Option<&str>, now: DateTime<Local>) -> bool {
    birthdate
        .and_then(parse_birthdate)
        .is_some_and(|date| date < now)
}

/// Reformats a birthdate for the update request (`yyyy/MM/dd`).
pub fn format_birthdate(raw: &str) -> Option<String> {
    parse_birthdate(raw).map(|d| d.format("%Y/%m/%d").to_string())
}

fn is_blank(field: &Option<String>) -> bool {
    // only an explicit empty string counts; a field that never loaded passes
    field.as_deref() == Some("")
}

pub fn validate_profile(form: &ProfileForm, now: DateTime<Local>) -> Result<(), ValidationError> {
    let required = [
        &form.fullname,
        &form.gender,
        &form.birthdate,
        &form.phone,
        &form.city,
        &form.wards,
        &form.class_id,
    ];
    if required.into_iter().any(is_blank) {
        return Err(ValidationError::Incomplete);
    }
    if !is_birthdate_valid(form.birthdate.as_deref(), now) {
        return Err(ValidationError::BirthdateNotInPast);
    }
    // a missing phone is tested as the text "undefined" would be: it fails
    if !is_phone_number_valid(form.phone.as_deref().unwrap_or_default()) {
        return Err(ValidationError::PhoneFormat);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TutorProfile;
    use chrono::Duration;

    fn valid_form() -> ProfileForm {
        ProfileForm {
            fullname: Some("A".into()),
            gender: Some("M".into()),
            birthdate: Some("2000-01-01".into()),
            phone: Some("0123456789".into()),
            city: Some("1".into()),
            wards: Some("1".into()),
            class_id: Some("5".into()),
            ..ProfileForm::default()
        }
    }

    #[test]
    fn ten_digit_phone_passes() {
        for phone in ["0123456789", "9999999999", "0000000000"] {
            assert!(is_phone_number_valid(phone), "{phone}");
        }
    }

    #[test]
    fn other_phones_fail() {
        for phone in ["", "12345", "01234567890", "012345678a", "+123456789", "012 345 678", "０１２３４５６７８９"] {
            assert!(!is_phone_number_valid(phone), "{phone}");
        }
    }

    #[test]
    fn birthdate_before_now_passes() {
        let now = Local::now();
        let yesterday = (now - Duration::days(1)).format("%Y-%m-%d").to_string();
        assert!(is_birthdate_valid(Some(&yesterday), now));
        assert!(is_birthdate_valid(Some("1990/05/17"), now));
        assert!(is_birthdate_valid(Some("1990-05-17T00:00:00.000+00:00"), now));
    }

    #[test]
    fn birthdate_at_or_after_now_fails() {
        let now = Local::now();
        let exact = now.to_rfc3339();
        let tomorrow = (now + Duration::days(1)).format("%Y-%m-%d").to_string();
        assert!(!is_birthdate_valid(Some(&exact), now));
        assert!(!is_birthdate_valid(Some(&tomorrow), now));
        assert!(!is_birthdate_valid(Some("not a date"), now));
        assert!(!is_birthdate_valid(None, now));
    }

    #[test]
    fn epoch_millis_birthdate() {
        let now = Local::now();
        assert!(is_birthdate_valid(Some("946684800000"), now));
    }

    #[test]
    fn negative_epoch_millis_birthdate() {
        let now = Local::now();
        // 1965-01-01T00:00:00Z
        assert!(is_birthdate_valid(Some("-157766400000"), now));
        // local timezone decides between 1964/12/31 and 1965/01/01
        let formatted = format_birthdate("-157766400000").unwrap();
        assert!(formatted == "1965/01/01" || formatted == "1964/12/31", "{formatted}");
    }

    #[test]
    fn numeric_birthdate_from_profile_validates_and_formats() {
        let profile: TutorProfile = serde_json::from_value(serde_json::json!({
            "fullname": "A",
            "gender": "Nam",
            "birthdate": -157766400000i64,
            "phone": "0123456789",
            "city": 1,
            "wards": 3,
            "classId": 5
        }))
        .unwrap();
        assert_eq!(profile.birthdate.as_deref(), Some("-157766400000"));

        let mut form = ProfileForm::default();
        form.apply_profile(profile);
        assert_eq!(validate_profile(&form, Local::now()), Ok(()));

        let update = form.to_update("7", None);
        let expected = parse_birthdate("-157766400000").unwrap().format("%Y/%m/%d").to_string();
        assert_eq!(update.birthdate, expected);
        assert!(update.birthdate.starts_with("196"));
        assert_eq!(update.birthdate.len(), "yyyy/MM/dd".len());
    }

    #[test]
    fn formats_for_update_request() {
        assert_eq!(format_birthdate("2000-01-31").as_deref(), Some("2000/01/31"));
        assert_eq!(format_birthdate("2000/01/31").as_deref(), Some("2000/01/31"));
        assert_eq!(format_birthdate("garbage"), None);
    }

    #[test]
    fn complete_valid_form_passes() {
        assert_eq!(validate_profile(&valid_form(), Local::now()), Ok(()));
    }

    #[test]
    fn short_phone_reports_phone_message() {
        let form = ProfileForm { phone: Some("12345".into()), ..valid_form() };
        let err = validate_profile(&form, Local::now()).unwrap_err();
        assert_eq!(err, ValidationError::PhoneFormat);
        assert_eq!(err.to_string(), "Số Điện Thoại Phải là 10 Số");
    }

    #[test]
    fn future_birthdate_reports_birthdate_message() {
        let form = ProfileForm { birthdate: Some("2999-01-01".into()), ..valid_form() };
        let err = validate_profile(&form, Local::now()).unwrap_err();
        assert_eq!(err, ValidationError::BirthdateNotInPast);
        assert_eq!(err.to_string(), "Ngày tháng năm sinh không được lớn hơn ngày hiện tại");
    }

    #[test]
    fn any_empty_required_field_is_incomplete() {
        let blanks: [fn(&mut ProfileForm); 7] = [
            |f| f.fullname = Some(String::new()),
            |f| f.gender = Some(String::new()),
            |f| f.birthdate = Some(String::new()),
            |f| f.phone = Some(String::new()),
            |f| f.city = Some(String::new()),
            |f| f.wards = Some(String::new()),
            |f| f.class_id = Some(String::new()),
        ];
        for blank in blanks {
            // also break phone so completeness must win
            let mut form = ProfileForm { phone: Some("1".into()), ..valid_form() };
            blank(&mut form);
            assert_eq!(validate_profile(&form, Local::now()), Err(ValidationError::Incomplete));
        }
    }

    #[test]
    fn absent_fields_are_not_incomplete() {
        let form = ProfileForm { class_id: None, city: None, ..valid_form() };
        assert_eq!(validate_profile(&form, Local::now()), Ok(()));

        let form = ProfileForm { phone: None, ..valid_form() };
        assert_eq!(validate_profile(&form, Local::now()), Err(ValidationError::PhoneFormat));
    }
}
