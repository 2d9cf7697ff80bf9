//! Selection and reshaping of employee records.
//!
//! A record is kept when it is salaried and its date of birth falls in
//! June through September. Both checks run for every record, so a bad date
//! of birth is reported even for employees who would be dropped anyway.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::employee::{CleanEmployee, RawEmployee};
use crate::error::{DobError, DobFormatError};

/// Role label marking a salaried employee. Compared exactly.
pub const SALARIED_ROLE: &str = "salaried";

/// Months counted as summer, 1-based.
pub const SUMMER_MONTHS: [u32; 4] = [6, 7, 8, 9];

/// Combined first-segment and last-name length above which the first name
/// is shortened to an initial.
pub const ABBREVIATION_THRESHOLD: usize = 9;

pub fn is_salaried(employee: &RawEmployee) -> bool {
    employee.roles.iter().any(|role| role == SALARIED_ROLE)
}

/// Whether the RFC3339 date of birth falls in a summer month.
///
/// The month is taken in the timestamp's own offset.
pub fn born_in_summer(employee: &RawEmployee) -> Result<bool, DobError> {
    let dob = parse_dob(&employee.dob).map_err(|cause| DobError {
        username: employee.username.clone(),
        cause,
    })?;
    Ok(SUMMER_MONTHS.contains(&dob.month()))
}

/// Strict RFC3339: an uppercase `T` separator, an uppercase `Z` for UTC,
/// and no leap second.
fn parse_dob(dob: &str) -> Result<DateTime<FixedOffset>, DobFormatError> {
    let parsed = DateTime::parse_from_rfc3339(dob)?;

    if dob.as_bytes().get(10) != Some(&b'T') {
        return Err(DobFormatError::Separator);
    }
    if dob.ends_with('z') {
        return Err(DobFormatError::LowercaseZulu);
    }
    // chrono carries a leap second as an extra second of nanoseconds
    if parsed.nanosecond() >= 1_000_000_000 {
        return Err(DobFormatError::LeapSecond);
    }
    Ok(parsed)
}

/// Build the display name.
///
/// `"John"` / `"Doe"` stays `"John Doe"`; `"John"` / `"VeryLongLastName"`
/// becomes `"J. VeryLongLastName"`. Lengths are byte lengths.
pub fn full_name(first: &str, last: &str) -> String {
    let first_segment = first.split(' ').next().unwrap_or_default();

    if first_segment.len() + last.len() > ABBREVIATION_THRESHOLD {
        if let Some(initial) = first_segment.chars().next() {
            return format!("{}. {}", initial, last);
        }
    }
    format!("{} {}", first, last)
}

pub fn clean(employee: &RawEmployee) -> CleanEmployee {
    CleanEmployee {
        full_name: full_name(&employee.name.first, &employee.name.last),
        department: employee.department.clone(),
        email: employee.email.clone(),
    }
}

/// Keep salaried summer birthdays, in input order.
///
/// Unparseable dates of birth exclude the record and are reported to `sink`.
pub fn filter_employees(
    employees: &[RawEmployee],
    sink: &mut dyn DiagnosticSink,
) -> Vec<CleanEmployee> {
    let mut kept = Vec::new();

    for employee in employees {
        let salaried = is_salaried(employee);
        let summer = match born_in_summer(employee) {
            Ok(summer) => summer,
            Err(err) => {
                sink.report(Diagnostic::Record(err));
                false
            }
        };

        if salaried && summer {
            kept.push(clean(employee));
        }
    }

    kept
}
