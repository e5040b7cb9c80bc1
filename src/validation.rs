use crate::errors::AppError;
use crate::models::{parse_date, NewEntry, SettingsPatch, DATE_FORMAT};

pub fn validate_new_entry(entry: NewEntry) -> Result<NewEntry, AppError> {
    if !entry.amount.is_finite() {
        return Err(AppError::bad_request("amount must be a finite number"));
    }

    let date = entry.date.trim();
    let Some(parsed) = parse_date(date) else {
        return Err(AppError::bad_request("date must be formatted as YYYY-MM-DD"));
    };

    let note = entry
        .note
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty());

    Ok(NewEntry {
        amount: entry.amount,
        date: parsed.format(DATE_FORMAT).to_string(),
        note,
    })
}

pub fn validate_settings_patch(patch: SettingsPatch) -> Result<SettingsPatch, AppError> {
    if let Some(target) = patch.target_revenue {
        if !target.is_finite() || target < 0.0 {
            return Err(AppError::bad_request(
                "targetRevenue must be a non-negative number",
            ));
        }
    }

    let demo_day = match patch.demo_day {
        None => None,
        Some(value) if value.trim().is_empty() => Some(String::new()),
        Some(value) => match parse_date(&value) {
            Some(date) => Some(date.format(DATE_FORMAT).to_string()),
            None => {
                return Err(AppError::bad_request(
                    "demoDay must be empty or formatted as YYYY-MM-DD",
                ));
            }
        },
    };

    Ok(SettingsPatch {
        target_revenue: patch.target_revenue,
        demo_day,
    })
}
