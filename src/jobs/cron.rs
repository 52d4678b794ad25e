//! Cron-expression generation from a weekly schedule.

use super::JobError;

/// Weekday names in cron index order (0 = Sunday).
const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Renders `minute hour * * days` from a time-of-day and weekday names.
///
/// Unknown day names are dropped; a list that yields no valid day is an
/// error, as are out-of-range minute/hour values.
pub fn cron_expression(minute: u32, hour: u32, days: &[String]) -> Result<String, JobError> {
    if minute > 59 {
        return Err(JobError::CronSyntax(format!(
            "invalid minute: {minute}. Must be between 0 and 59."
        )));
    }
    if hour > 23 {
        return Err(JobError::CronSyntax(format!(
            "invalid hour: {hour}. Must be between 0 and 23."
        )));
    }

    let indexes = day_indexes(days);
    if indexes.is_empty() {
        return Err(JobError::CronSyntax(format!(
            "invalid or empty days list: {days:?}. Must contain valid day names."
        )));
    }

    let days_field = indexes
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("{minute} {hour} * * {days_field}"))
}

/// Maps weekday names to cron indexes, dropping unknown names.
fn day_indexes(days: &[String]) -> Vec<u8> {
    days.iter()
        .filter_map(|day| {
            let lowered = day.to_lowercase();
            DAY_NAMES
                .iter()
                .position(|name| *name == lowered)
                .map(|index| index as u8)
        })
        .collect()
}
