#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use payroll_api::auth::{Actor, Role};
use payroll_api::config::PayrollConfig;
use payroll_api::entities::employee;
use payroll_api::events;
use payroll_api::handlers::AppServices;
use payroll_api::migrator::Migrator;

/// Shared test application: an in-memory database with migrations applied
/// and the full service stack wired up.
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
}

pub async fn setup() -> TestApp {
    // A single connection keeps every query on the same in-memory database.
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");

    let db = Arc::new(db);
    let (event_sender, event_receiver) = events::channel(64);
    tokio::spawn(events::process_events(event_receiver));

    let services = AppServices::new(db.clone(), PayrollConfig::default(), Arc::new(event_sender));

    TestApp { db, services }
}

pub fn finance_actor() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: Role::Finance,
    }
}

pub fn admin_actor() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: Role::Admin,
    }
}

pub fn hr_admin_actor() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: Role::HrAdmin,
    }
}

pub fn staff_actor() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: Role::Staff,
    }
}

/// Inserts an employee row. Staff IDs starting with `CA` are casual under
/// the default configuration.
pub async fn seed_employee(
    db: &DatabaseConnection,
    staff_id: &str,
    monthly_salary: Decimal,
    is_active: bool,
) -> employee::Model {
    let model = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        staff_id: Set(staff_id.to_string()),
        name: Set(format!("Employee {}", staff_id)),
        department: Set(Some("Operations".to_string())),
        unit: Set(Some("Dispatch".to_string())),
        grade: Set(None),
        level: Set(None),
        monthly_salary: Set(monthly_salary),
        bank_name: Set(Some("GCB Bank".to_string())),
        bank_branch: Set(Some("Accra Main".to_string())),
        ssnit_number: Set(Some(format!("P{}", staff_id))),
        ghana_card: Set(Some(format!("GHA-{}", staff_id))),
        date_of_birth: Set(None),
        is_active: Set(is_active),
        created_at: Set(Utc::now()),
    };
    model.insert(db).await.expect("failed to seed employee")
}
