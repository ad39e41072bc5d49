use chrono::{Days, NaiveDate, Utc};
use rusqlite::Connection;
use staffbook_core::db::open_db_in_memory;
use staffbook_core::service::seed::{seed_departments, STOCK_DEPARTMENTS};
use staffbook_core::{
    CreateDepartment, CreateEmployee, Department, DepartmentFilter, DepartmentPagedQuery,
    DepartmentService, EmployeeFilter, EmployeePagedQuery, EmployeeService, EntityId,
    Repository, ServiceError, SqliteDepartmentRepository, SqliteEmployeeRepository,
    UpdateDepartment, UpdateEmployee,
};
use uuid::Uuid;

type Departments<'conn> = DepartmentService<SqliteDepartmentRepository<'conn>>;
type Employees<'conn> =
    EmployeeService<SqliteEmployeeRepository<'conn>, SqliteDepartmentRepository<'conn>>;

fn department_service(conn: &Connection) -> Departments<'_> {
    DepartmentService::new(SqliteDepartmentRepository::try_new(conn).unwrap())
}

fn employee_service(conn: &Connection) -> Employees<'_> {
    EmployeeService::new(
        SqliteEmployeeRepository::try_new(conn).unwrap(),
        SqliteDepartmentRepository::try_new(conn).unwrap(),
    )
}

fn new_department(service: &mut Departments<'_>, name: &str) -> Department {
    service
        .create(&CreateDepartment {
            name: name.to_string(),
        })
        .unwrap()
}

fn hire(first: &str, last: &str, department_id: EntityId) -> CreateEmployee {
    CreateEmployee {
        first_name: first.to_string(),
        last_name: last.to_string(),
        hire_date: NaiveDate::from_ymd_opt(2022, 3, 14).unwrap(),
        phone: None,
        address: None,
        department_id,
    }
}

#[test]
fn department_crud_flow() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);

    let created = new_department(&mut departments, "Engineering");
    assert_eq!(
        departments.get_by_id(created.meta.id()).unwrap().name,
        "Engineering"
    );

    let renamed = departments
        .update(
            created.meta.id(),
            &UpdateDepartment {
                name: "Platform".to_string(),
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Platform");
    assert!(renamed.meta.updated_at().is_some());

    departments.delete(created.meta.id()).unwrap();
    assert!(departments.get_all().unwrap().is_empty());

    let err = departments.delete(created.meta.id()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn department_validation_reports_every_failure() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);

    let err = departments
        .create(&CreateDepartment {
            name: "  ".to_string(),
        })
        .unwrap_err();
    match err {
        ServiceError::Validation(errors) => {
            assert!(errors.has_field("name"));
            assert_eq!(errors.errors()[0].message, "Name is required");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(departments.get_all().unwrap().is_empty());
}

#[test]
fn updating_missing_department_is_not_found_before_validation() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let missing = Uuid::new_v4();

    let err = departments
        .update(
            missing,
            &UpdateDepartment {
                name: String::new(),
            },
        )
        .unwrap_err();
    match err {
        ServiceError::NotFound { entity, id } => {
            assert_eq!(entity, "Department");
            assert_eq!(id, missing);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn department_paging_filters_by_name() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    for name in ["Finance", "Facilities", "Field Ops", "IT"] {
        new_department(&mut departments, name);
    }

    let query = DepartmentPagedQuery::new(1, 2).with_filter(DepartmentFilter {
        name: Some("f".to_string()),
    });
    let page = departments.get_paged(query).unwrap();
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
}

#[test]
fn employee_create_resolves_department_name() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let mut employees = employee_service(&conn);
    let engineering = new_department(&mut departments, "Engineering");

    let view = employees
        .create(&hire("Ada", "Lovelace", engineering.meta.id()))
        .unwrap();
    assert_eq!(view.department_name, "Engineering");

    let loaded = employees.get_by_id(view.id).unwrap();
    assert_eq!(loaded, view);
}

#[test]
fn employee_create_requires_live_department() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let mut employees = employee_service(&conn);
    let closed = new_department(&mut departments, "Closed");
    departments.delete(closed.meta.id()).unwrap();

    let err = employees
        .create(&hire("Alan", "Turing", closed.meta.id()))
        .unwrap_err();
    match err {
        ServiceError::NotFound { entity, id } => {
            assert_eq!(entity, "Department");
            assert_eq!(id, closed.meta.id());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(employees.get_all().unwrap().is_empty());
}

#[test]
fn employee_validation_rejects_future_hire_date() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let mut employees = employee_service(&conn);
    let department = new_department(&mut departments, "HR");

    let mut input = hire("Future", "Hire", department.meta.id());
    input.hire_date = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(2))
        .unwrap();

    let err = employees.create(&input).unwrap_err();
    match err {
        ServiceError::Validation(errors) => assert!(errors.has_field("hireDate")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn employee_update_moves_department() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let mut employees = employee_service(&conn);
    let hr = new_department(&mut departments, "HR");
    let it = new_department(&mut departments, "IT");
    let created = employees.create(&hire("Linus", "T", hr.meta.id())).unwrap();

    let updated = employees
        .update(
            created.id,
            &UpdateEmployee {
                id: created.id,
                first_name: "Linus".to_string(),
                last_name: "Torvalds".to_string(),
                hire_date: created.hire_date,
                phone: Some("555-0100".to_string()),
                address: Some("Portland".to_string()),
                department_id: it.meta.id(),
            },
        )
        .unwrap();
    assert_eq!(updated.last_name, "Torvalds");
    assert_eq!(updated.department_name, "IT");
    assert_eq!(employees.get_by_id(created.id).unwrap().phone.as_deref(), Some("555-0100"));
}

#[test]
fn employee_view_has_empty_department_name_after_department_delete() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let mut employees = employee_service(&conn);
    let finance = new_department(&mut departments, "Finance");
    let view = employees
        .create(&hire("Grace", "Hopper", finance.meta.id()))
        .unwrap();

    departments.delete(finance.meta.id()).unwrap();

    assert_eq!(employees.get_by_id(view.id).unwrap().department_name, "");
}

#[test]
fn employee_paging_filters_on_full_name_and_department() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let mut employees = employee_service(&conn);
    let hr = new_department(&mut departments, "HR");
    let it = new_department(&mut departments, "IT");

    employees.create(&hire("Ada", "Lovelace", it.meta.id())).unwrap();
    employees.create(&hire("Ada", "Byron", hr.meta.id())).unwrap();
    employees.create(&hire("Alan", "Turing", it.meta.id())).unwrap();
    let gone = employees.create(&hire("Ada", "Gone", it.meta.id())).unwrap();
    employees.delete(gone.id).unwrap();

    let by_full_name = employees
        .get_paged(EmployeePagedQuery::default().with_filter(EmployeeFilter {
            name: Some("ADA LOVE".to_string()),
            department_id: None,
        }))
        .unwrap();
    assert_eq!(by_full_name.total_items, 1);
    assert_eq!(by_full_name.items[0].last_name, "Lovelace");
    assert_eq!(by_full_name.items[0].department_name, "IT");

    let by_department = employees
        .get_paged(EmployeePagedQuery::default().with_filter(EmployeeFilter {
            name: Some("ada".to_string()),
            department_id: Some(it.meta.id()),
        }))
        .unwrap();
    assert_eq!(by_department.total_items, 1);
    assert_eq!(by_department.items[0].first_name, "Ada");

    let unfiltered = employees.get_paged(EmployeePagedQuery::new(0, 0)).unwrap();
    assert_eq!(unfiltered.total_items, 3);
    assert_eq!(unfiltered.page, 1);
    assert_eq!(unfiltered.page_size, 10);
}

#[test]
fn missing_employee_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut employees = employee_service(&conn);

    assert!(employees.get_by_id(Uuid::new_v4()).unwrap_err().is_not_found());
    assert!(employees.delete(Uuid::new_v4()).unwrap_err().is_not_found());
}

fn reject_inserts_named(conn: &Connection, table: &str, column: &str, value: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_{table} BEFORE INSERT ON {table}
         WHEN NEW.{column} = '{value}'
         BEGIN SELECT RAISE(ABORT, 'insert rejected'); END;"
    ))
    .unwrap();
}

#[test]
fn failed_department_create_does_not_poison_later_writes() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let kept = new_department(&mut departments, "Kept");
    reject_inserts_named(&conn, "departments", "name", "Broken");

    let err = departments
        .create(&CreateDepartment {
            name: "Broken".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert_eq!(departments.repository().staged_len(), 0);

    let sales = new_department(&mut departments, "Sales");
    departments
        .update(
            kept.meta.id(),
            &UpdateDepartment {
                name: "Kept (renamed)".to_string(),
            },
        )
        .unwrap();
    departments.delete(sales.meta.id()).unwrap();

    let names: Vec<String> = departments
        .get_all()
        .unwrap()
        .into_iter()
        .map(|department| department.name)
        .collect();
    assert_eq!(names, vec!["Kept (renamed)"]);
}

#[test]
fn failed_employee_create_does_not_poison_later_writes() {
    let conn = open_db_in_memory().unwrap();
    let mut departments = department_service(&conn);
    let mut employees = employee_service(&conn);
    let it = new_department(&mut departments, "IT");
    reject_inserts_named(&conn, "employees", "first_name", "Broken");

    assert!(employees
        .create(&hire("Broken", "Record", it.meta.id()))
        .is_err());

    let view = employees
        .create(&hire("Barbara", "Liskov", it.meta.id()))
        .unwrap();
    employees.delete(view.id).unwrap();
    assert!(employees.get_all().unwrap().is_empty());
}

#[test]
fn failed_seeding_leaves_nothing_staged() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::try_new(&conn).unwrap();
    reject_inserts_named(&conn, "departments", "name", "Finance");

    assert!(seed_departments(&mut repo).is_err());
    assert_eq!(repo.staged_len(), 0);
    assert_eq!(repo.get_all().count().unwrap(), 0);

    conn.execute_batch("DROP TRIGGER reject_departments;").unwrap();
    assert_eq!(seed_departments(&mut repo).unwrap(), STOCK_DEPARTMENTS.len());
}

#[test]
fn seeding_only_fills_an_empty_store() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDepartmentRepository::try_new(&conn).unwrap();

    assert_eq!(seed_departments(&mut repo).unwrap(), STOCK_DEPARTMENTS.len());
    assert_eq!(seed_departments(&mut repo).unwrap(), 0);

    let names: Vec<String> = repo
        .get_all()
        .fetch()
        .unwrap()
        .into_iter()
        .map(|department| department.name)
        .collect();
    assert_eq!(names, vec!["HR", "IT", "Finance"]);
}
