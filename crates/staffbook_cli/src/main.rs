//! Command-line probe over the staffbook core.
//!
//! # Responsibility
//! - Verify core linkage and inspect a record store from a shell.
//! - Keep output line-oriented and deterministic.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use staffbook_core::{
    bootstrap, core_version, ping, CoreConfig, CreateDepartment, DepartmentService,
    EmployeeFilter, EmployeePagedQuery, EmployeeService, SqliteDepartmentRepository,
    SqliteEmployeeRepository,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "staffbook")]
#[command(about = "Inspect and edit a staffbook record store")]
#[command(version)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core linkage and version
    Ping,
    /// List live departments
    Departments,
    /// List one page of live employees
    Employees {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = 10)]
        page_size: i64,
        /// Substring of the employee's full name
        #[arg(long)]
        name: Option<String>,
        /// Department id to filter by
        #[arg(long)]
        department: Option<Uuid>,
    },
    /// Create a department
    AddDepartment { name: String },
    /// Soft-delete a department
    DeleteDepartment { id: Uuid },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Ping = cli.command {
        println!("staffbook_core ping={}", ping());
        println!("staffbook_core version={}", core_version());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    let conn = bootstrap(&config).context("failed to open record store")?;
    info!("event=cli_start module=cli status=ok");

    match cli.command {
        Commands::Ping => {}
        Commands::Departments => {
            let service = DepartmentService::new(SqliteDepartmentRepository::try_new(&conn)?);
            for department in service.get_all()? {
                println!("{}\t{}", department.meta.id(), department.name);
            }
        }
        Commands::Employees {
            page,
            page_size,
            name,
            department,
        } => {
            let service = EmployeeService::new(
                SqliteEmployeeRepository::try_new(&conn)?,
                SqliteDepartmentRepository::try_new(&conn)?,
            );
            let query = EmployeePagedQuery::new(page, page_size).with_filter(EmployeeFilter {
                name,
                department_id: department,
            });
            let result = service.get_paged(query)?;
            println!(
                "page={} page_size={} total_items={} total_pages={}",
                result.page, result.page_size, result.total_items, result.total_pages
            );
            for employee in result.items {
                println!(
                    "{}\t{} {}\t{}\t{}",
                    employee.id,
                    employee.first_name,
                    employee.last_name,
                    employee.hire_date,
                    employee.department_name
                );
            }
        }
        Commands::AddDepartment { name } => {
            let mut service =
                DepartmentService::new(SqliteDepartmentRepository::try_new(&conn)?);
            let department = service.create(&CreateDepartment { name })?;
            println!("{}", department.meta.id());
        }
        Commands::DeleteDepartment { id } => {
            let mut service =
                DepartmentService::new(SqliteDepartmentRepository::try_new(&conn)?);
            service.delete(id)?;
            println!("deleted {id}");
        }
    }

    Ok(())
}
