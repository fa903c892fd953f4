use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::models::attendance::AttendanceRecord;
use crate::domain::models::employee::Employee;
use crate::domain::models::import::{ImportBatch, RowError};
use crate::domain::models::user::{User, UserRole};
use crate::domain::ports::{AttendanceRepository, EmployeeRepository, UserRepository};
use crate::domain::services::auth_service::hash_password;
use crate::domain::services::validation::ValidatedRow;
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Recoverable; reported against the row and the batch moves on.
    #[error(transparent)]
    Row(#[from] RowError),
    /// A persistence read failed; the whole import aborts.
    #[error(transparent)]
    Store(#[from] AppError),
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOutcome {
    pub created: bool,
}

#[derive(Debug, Clone, Copy)]
enum RecordSlot {
    Created(usize),
    Updated(usize),
}

/// Collects everything an import pass wants to write, while answering reads
/// against staged state first and the store second. Rows later in the file
/// see the employees, users and records staged by earlier rows exactly as if
/// they had already been flushed. Nothing touches the store until the staged
/// batch is applied in one transaction.
pub struct UnitOfWork {
    employee_repo: Arc<dyn EmployeeRepository>,
    user_repo: Arc<dyn UserRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
    employees: HashMap<(String, String), Option<Employee>>,
    usernames: HashMap<String, bool>,
    records: HashMap<(String, NaiveDate), RecordSlot>,
    batch: ImportBatch,
}

impl UnitOfWork {
    pub fn new(
        employee_repo: Arc<dyn EmployeeRepository>,
        user_repo: Arc<dyn UserRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
    ) -> Self {
        Self {
            employee_repo,
            user_repo,
            attendance_repo,
            employees: HashMap::new(),
            usernames: HashMap::new(),
            records: HashMap::new(),
            batch: ImportBatch::default(),
        }
    }

    pub fn into_batch(self) -> ImportBatch {
        self.batch
    }

    async fn employee(&mut self, company_id: &str, ep_number: &str) -> Result<Option<Employee>, AppError> {
        let key = (company_id.to_string(), ep_number.to_string());
        if let Some(cached) = self.employees.get(&key) {
            return Ok(cached.clone());
        }
        let loaded = self.employee_repo.find_by_key(company_id, ep_number).await?;
        self.employees.insert(key, loaded.clone());
        Ok(loaded)
    }

    async fn username_taken(&mut self, username: &str) -> Result<bool, AppError> {
        if let Some(known) = self.usernames.get(username) {
            return Ok(*known);
        }
        let taken = self.user_repo.find_by_username(username).await?.is_some();
        self.usernames.insert(username.to_string(), taken);
        Ok(taken)
    }

    fn stage_new_employee(&mut self, employee: Employee, user: User) {
        self.usernames.insert(user.username.clone(), true);
        self.employees.insert(
            (employee.company_id.clone(), employee.ep_number.clone()),
            Some(employee.clone()),
        );
        self.batch.new_users.push(user);
        self.batch.new_employees.push(employee);
    }

    /// The staged or stored record for `(employee_id, date)`, if any. A
    /// stored record is pulled into the update set on first access so later
    /// rows keep merging into the same instance.
    async fn record_mut(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<&mut AttendanceRecord>, AppError> {
        let key = (employee_id.to_string(), date);
        if !self.records.contains_key(&key) {
            match self.attendance_repo.find_by_key(employee_id, date).await? {
                Some(record) => {
                    let idx = self.batch.updated_records.len();
                    self.batch.updated_records.push(record);
                    self.records.insert(key.clone(), RecordSlot::Updated(idx));
                }
                None => return Ok(None),
            }
        }
        let slot = self.records[&key];
        Ok(Some(match slot {
            RecordSlot::Created(idx) => &mut self.batch.created_records[idx],
            RecordSlot::Updated(idx) => &mut self.batch.updated_records[idx],
        }))
    }

    fn stage_created(&mut self, record: AttendanceRecord) {
        let key = (record.employee_id.clone(), record.date);
        let idx = self.batch.created_records.len();
        self.batch.created_records.push(record);
        self.records.insert(key, RecordSlot::Created(idx));
    }
}

fn merge_punch(stored: &mut Option<chrono::NaiveTime>, incoming: Option<chrono::NaiveTime>, is_new: bool) {
    // A blank punch on an existing record never erases a stored one.
    if is_new || incoming.is_some() {
        *stored = incoming;
    }
}

/// Non-punch fields follow last-import-wins; punch times follow the
/// asymmetric merge above.
fn apply_row(record: &mut AttendanceRecord, row: &ValidatedRow, is_new: bool) {
    merge_punch(&mut record.in1, row.in1, is_new);
    merge_punch(&mut record.out1, row.out1, is_new);
    merge_punch(&mut record.in2, row.in2, is_new);
    merge_punch(&mut record.out2, row.out2, is_new);
    merge_punch(&mut record.in3, row.in3, is_new);
    merge_punch(&mut record.out3, row.out3, is_new);
    record.hours_worked = row.hours_worked;
    record.overtime = row.overtime;
    record.status = row.status;
    record.plant = row.plant.clone();
    record.department = row.department.clone();
    record.trade = row.trade.clone();
    record.skill = row.skill.clone();
}

/// Resolves or stages the Employee/User chain for one validated row, then
/// upserts its attendance record into the unit of work. Runs identically in
/// both import modes; whether the staged batch is ever flushed is the
/// orchestrator's decision.
pub async fn reconcile_row(
    uow: &mut UnitOfWork,
    row: &ValidatedRow,
) -> Result<ReconcileOutcome, ReconcileError> {
    let employee = match uow.employee(&row.company_id, &row.ep_number).await? {
        Some(existing) => existing,
        None => {
            // An unrelated account already holding this username must not be
            // silently relinked or overwritten; the row fails instead.
            if uow.username_taken(&row.ep_number).await? {
                return Err(RowError::ConflictingUser(row.ep_number.clone()).into());
            }

            let mut user = User::new(
                row.ep_number.clone(),
                hash_password(&row.ep_number)?,
                UserRole::Employee,
                Some(row.company_id.clone()),
            );
            user.ep_number = Some(row.ep_number.clone());

            let mut employee = Employee::new(
                row.company_id.clone(),
                row.ep_number.clone(),
                row.name.clone(),
                row.plant.clone(),
                row.department.clone(),
                row.trade.clone(),
                row.skill.clone(),
            );
            employee.user_id = Some(user.id.clone());

            uow.stage_new_employee(employee.clone(), user);
            employee
        }
    };

    if let Some(record) = uow.record_mut(&employee.id, row.date).await? {
        apply_row(record, row, false);
        return Ok(ReconcileOutcome { created: false });
    }

    let mut record = AttendanceRecord::new(
        employee.id.clone(),
        row.company_id.clone(),
        row.date,
        row.status,
    );
    apply_row(&mut record, row, true);
    uow.stage_created(record);
    Ok(ReconcileOutcome { created: true })
}
