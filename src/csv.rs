//! CSV output, one file per archive entry.
//!
//! Values are written as-is: no quoting and no escaping. A comma or newline
//! inside a field will break the row.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::employee::CleanEmployee;
use crate::error::EntryError;

pub const HEADER: &str = "full_name,department,email";

/// Output file name for the entry at `index`.
pub fn file_name(index: usize) -> String {
    format!("employees_{}.csv", index)
}

/// Render the header plus one row per employee, each line ending in `\n`.
pub fn render(employees: &[CleanEmployee]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + employees.len() * 48);
    out.push_str(HEADER);
    out.push('\n');
    for employee in employees {
        out.push_str(&employee.full_name);
        out.push(',');
        out.push_str(&employee.department);
        out.push(',');
        out.push_str(&employee.email);
        out.push('\n');
    }
    out
}

/// Write `employees_<index>.csv` into `dir`, replacing any existing file.
pub async fn write(
    dir: &Path,
    index: usize,
    employees: &[CleanEmployee],
) -> Result<PathBuf, EntryError> {
    let path = dir.join(file_name(index));
    match fs::write(&path, render(employees)).await {
        Ok(()) => Ok(path),
        Err(cause) => Err(EntryError::Write { path, cause }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(full_name: &str, department: &str, email: &str) -> CleanEmployee {
        CleanEmployee {
            full_name: full_name.to_string(),
            department: department.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn no_employees_is_just_the_header() {
        assert_eq!(render(&[]), "full_name,department,email\n");
    }

    #[test]
    fn rows_follow_input_order() {
        let csv = render(&[
            row("Jane Doe", "HR", "test@test.com"),
            row("J. VeryLongLastName", "IT", "test@test.com"),
        ]);
        assert_eq!(
            csv,
            "full_name,department,email\n\
             Jane Doe,HR,test@test.com\n\
             J. VeryLongLastName,IT,test@test.com\n"
        );
    }

    #[test]
    fn values_are_not_quoted() {
        let csv = render(&[row("Lee, Ann", "R\"D", "a@b.c")]);
        assert_eq!(csv.lines().nth(1), Some("Lee, Ann,R\"D,a@b.c"));
    }

    #[test]
    fn file_names_use_the_entry_index() {
        assert_eq!(file_name(0), "employees_0.csv");
        assert_eq!(file_name(12), "employees_12.csv");
    }

    #[tokio::test]
    async fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("employees_2.csv"), "stale contents that are longer").unwrap();

        let path = write(dir.path(), 2, &[row("Al Bo", "Ops", "a@b.c")])
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("employees_2.csv"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "full_name,department,email\nAl Bo,Ops,a@b.c\n"
        );
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails_with_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = write(&missing, 0, &[]).await.unwrap_err();
        assert!(matches!(&err, EntryError::Write { path, .. } if *path == missing.join("employees_0.csv")));
        assert!(err.to_string().starts_with("Error writing to file: "));
    }
}
