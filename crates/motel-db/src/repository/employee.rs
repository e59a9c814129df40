//! # Employee Repository
//!
//! Staff reference data: employees and their scheduled shifts.
//! Create and list only.

use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use motel_core::validation::{validate_employee_name, validate_shift_window};
use motel_core::{CoreError, Employee, NewEmployee, NewShift, Shift};

const EMPLOYEE_COLUMNS: &str = "id, name, position, date_hired";
const SHIFT_COLUMNS: &str = "id, employee_id, start_time, end_time, role";

pub async fn fetch(exec: impl SqliteExecutor<'_>, id: i64) -> DbResult<Option<Employee>> {
    let sql = format!("SELECT {} FROM employees WHERE id = ?1", EMPLOYEE_COLUMNS);
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(employee)
}

/// Repository for employees and shifts.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let sql = format!("SELECT {} FROM employees ORDER BY id", EMPLOYEE_COLUMNS);
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Employee>> {
        fetch(&self.pool, id).await
    }

    pub async fn create(&self, new_employee: &NewEmployee) -> DbResult<Employee> {
        validate_employee_name(&new_employee.name)?;

        let date_hired = new_employee.date_hired.unwrap_or_else(Utc::now);
        debug!(name = %new_employee.name, position = ?new_employee.position, "Creating employee");

        let sql = format!(
            "INSERT INTO employees (name, position, date_hired) VALUES (?1, ?2, ?3) RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(new_employee.name.trim())
            .bind(new_employee.position)
            .bind(date_hired)
            .fetch_one(&self.pool)
            .await?;
        Ok(employee)
    }

    /// Shifts, most recent start first.
    pub async fn list_shifts(&self) -> DbResult<Vec<Shift>> {
        let sql = format!(
            "SELECT {} FROM shifts ORDER BY start_time DESC, id DESC",
            SHIFT_COLUMNS
        );
        let shifts = sqlx::query_as::<_, Shift>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(shifts)
    }

    pub async fn create_shift(&self, new_shift: &NewShift) -> DbResult<Shift> {
        validate_shift_window(new_shift.start_time, new_shift.end_time)?;

        if self.get(new_shift.employee_id).await?.is_none() {
            return Err(DbError::Domain(CoreError::EmployeeNotFound(
                new_shift.employee_id,
            )));
        }

        let sql = format!(
            "INSERT INTO shifts (employee_id, start_time, end_time, role) VALUES (?1, ?2, ?3, ?4) \
             RETURNING {}",
            SHIFT_COLUMNS
        );
        let shift = sqlx::query_as::<_, Shift>(&sql)
            .bind(new_shift.employee_id)
            .bind(new_shift.start_time)
            .bind(new_shift.end_time)
            .bind(new_shift.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use motel_core::Position;

    #[tokio::test]
    async fn test_create_and_list_employees() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let hired = Utc.with_ymd_and_hms(2023, 1, 15, 0, 0, 0).unwrap();
        let created = db
            .employees()
            .create(&NewEmployee {
                name: "  Luis  ".to_string(),
                position: Position::Cleaning,
                date_hired: Some(hired),
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Luis");
        assert_eq!(created.date_hired, hired);

        let all = db.employees().list().await.unwrap();
        assert_eq!(all, vec![created]);

        let blank = db
            .employees()
            .create(&NewEmployee {
                name: " ".to_string(),
                position: Position::Laundry,
                date_hired: None,
            })
            .await;
        assert!(blank.is_err());
    }

    #[tokio::test]
    async fn test_create_shift() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee = db
            .employees()
            .create(&NewEmployee {
                name: "Marta".to_string(),
                position: Position::Laundry,
                date_hired: None,
            })
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2024, 8, 1, 6, 0, 0).unwrap();
        let shift = db
            .employees()
            .create_shift(&NewShift {
                employee_id: employee.id,
                start_time: start,
                end_time: start + Duration::hours(8),
                role: Position::Laundry,
            })
            .await
            .unwrap();
        assert_eq!(shift.employee_id, employee.id);
        assert_eq!(db.employees().list_shifts().await.unwrap().len(), 1);

        let inverted = db
            .employees()
            .create_shift(&NewShift {
                employee_id: employee.id,
                start_time: start,
                end_time: start - Duration::hours(1),
                role: Position::Laundry,
            })
            .await;
        assert!(inverted.is_err());

        let unknown = db
            .employees()
            .create_shift(&NewShift {
                employee_id: 77,
                start_time: start,
                end_time: start + Duration::hours(1),
                role: Position::Cleaning,
            })
            .await;
        assert!(matches!(
            unknown,
            Err(DbError::Domain(CoreError::EmployeeNotFound(77)))
        ));
    }
}
