#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_employees_table::Migration),
            Box::new(m20260101_000002_create_payslips_table::Migration),
            Box::new(m20260101_000003_create_payslip_line_items_table::Migration),
            Box::new(m20260101_000004_create_payslip_audits_table::Migration),
        ]
    }
}

// Migration implementations

mod m20260101_000001_create_employees_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_employees_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Employees::StaffId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Employees::Name).string().not_null())
                        .col(ColumnDef::new(Employees::Department).string().null())
                        .col(ColumnDef::new(Employees::Unit).string().null())
                        .col(ColumnDef::new(Employees::Grade).string().null())
                        .col(ColumnDef::new(Employees::Level).string().null())
                        .col(
                            ColumnDef::new(Employees::MonthlySalary)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Employees::BankName).string().null())
                        .col(ColumnDef::new(Employees::BankBranch).string().null())
                        .col(ColumnDef::new(Employees::SsnitNumber).string().null())
                        .col(ColumnDef::new(Employees::GhanaCard).string().null())
                        .col(ColumnDef::new(Employees::DateOfBirth).date().null())
                        .col(
                            ColumnDef::new(Employees::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Employees::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employees_is_active")
                        .table(Employees::Table)
                        .col(Employees::IsActive)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Employees {
        Table,
        Id,
        StaffId,
        Name,
        Department,
        Unit,
        Grade,
        Level,
        MonthlySalary,
        BankName,
        BankBranch,
        SsnitNumber,
        GhanaCard,
        DateOfBirth,
        IsActive,
        CreatedAt,
    }
}

mod m20260101_000002_create_payslips_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_payslips_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Payslips::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payslips::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payslips::EmployeeId).uuid().not_null())
                        .col(ColumnDef::new(Payslips::MonthYear).string().not_null())
                        .col(ColumnDef::new(Payslips::Agency).string().not_null())
                        .col(ColumnDef::new(Payslips::District).string().not_null())
                        .col(ColumnDef::new(Payslips::Department).string().null())
                        .col(ColumnDef::new(Payslips::Unit).string().null())
                        .col(ColumnDef::new(Payslips::Grade).string().null())
                        .col(ColumnDef::new(Payslips::Level).string().null())
                        .col(
                            ColumnDef::new(Payslips::BasicSalary)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payslips::Allowances)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Payslips::GrossSalary)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payslips::SsnitDeduction)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payslips::Tier2Deduction)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payslips::IncomeTax)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payslips::OtherDeductions)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Payslips::NetSalary)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payslips::PaymentMode)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Payslips::Status)
                                .string()
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Payslips::ApprovedBy).uuid().null())
                        .col(ColumnDef::new(Payslips::ApprovedAt).timestamp().null())
                        .col(ColumnDef::new(Payslips::GeneratedBy).uuid().not_null())
                        .col(ColumnDef::new(Payslips::GeneratedAt).timestamp().not_null())
                        .col(ColumnDef::new(Payslips::LastModifiedBy).uuid().null())
                        .col(
                            ColumnDef::new(Payslips::LastModifiedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payslips_employee_id")
                                .from(Payslips::Table, Payslips::EmployeeId)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Closes the race between two concurrent generation requests
            // for the same employee and period: the loser fails on insert.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_payslips_employee_period")
                        .table(Payslips::Table)
                        .col(Payslips::EmployeeId)
                        .col(Payslips::MonthYear)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payslips_status")
                        .table(Payslips::Table)
                        .col(Payslips::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payslips_month_year")
                        .table(Payslips::Table)
                        .col(Payslips::MonthYear)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Payslips::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Payslips {
        Table,
        Id,
        EmployeeId,
        MonthYear,
        Agency,
        District,
        Department,
        Unit,
        Grade,
        Level,
        BasicSalary,
        Allowances,
        GrossSalary,
        SsnitDeduction,
        Tier2Deduction,
        IncomeTax,
        OtherDeductions,
        NetSalary,
        PaymentMode,
        Status,
        ApprovedBy,
        ApprovedAt,
        GeneratedBy,
        GeneratedAt,
        LastModifiedBy,
        LastModifiedAt,
    }

    #[derive(Iden)]
    enum Employees {
        Table,
        Id,
    }
}

mod m20260101_000003_create_payslip_line_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_payslip_line_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PayslipLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PayslipLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PayslipLineItems::PayslipId).uuid().not_null())
                        .col(ColumnDef::new(PayslipLineItems::ItemType).string().not_null())
                        .col(ColumnDef::new(PayslipLineItems::Category).string().null())
                        .col(ColumnDef::new(PayslipLineItems::Nature).string().not_null())
                        .col(
                            ColumnDef::new(PayslipLineItems::HoursOrAmount)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PayslipLineItems::RatePercent)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PayslipLineItems::Balance)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PayslipLineItems::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PayslipLineItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payslip_line_items_payslip_id")
                                .from(PayslipLineItems::Table, PayslipLineItems::PayslipId)
                                .to(Payslips::Table, Payslips::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payslip_line_items_payslip_id")
                        .table(PayslipLineItems::Table)
                        .col(PayslipLineItems::PayslipId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PayslipLineItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PayslipLineItems {
        Table,
        Id,
        PayslipId,
        ItemType,
        Category,
        Nature,
        HoursOrAmount,
        RatePercent,
        Balance,
        SortOrder,
        CreatedAt,
    }

    #[derive(Iden)]
    enum Payslips {
        Table,
        Id,
    }
}

mod m20260101_000004_create_payslip_audits_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_payslip_audits_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PayslipAudits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PayslipAudits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PayslipAudits::PayslipId).uuid().not_null())
                        .col(ColumnDef::new(PayslipAudits::Action).string().not_null())
                        .col(ColumnDef::new(PayslipAudits::OldStatus).string().not_null())
                        .col(ColumnDef::new(PayslipAudits::NewStatus).string().not_null())
                        .col(ColumnDef::new(PayslipAudits::Reason).text().not_null())
                        .col(ColumnDef::new(PayslipAudits::PerformedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(PayslipAudits::PerformedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payslip_audits_payslip_id")
                                .from(PayslipAudits::Table, PayslipAudits::PayslipId)
                                .to(Payslips::Table, Payslips::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payslip_audits_payslip_id")
                        .table(PayslipAudits::Table)
                        .col(PayslipAudits::PayslipId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PayslipAudits::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PayslipAudits {
        Table,
        Id,
        PayslipId,
        Action,
        OldStatus,
        NewStatus,
        Reason,
        PerformedBy,
        PerformedAt,
    }

    #[derive(Iden)]
    enum Payslips {
        Table,
        Id,
    }
}
