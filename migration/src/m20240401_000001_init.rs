use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::util::{default_table_statement, foreign_key};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager
            .create_type(
                schema.create_enum_from_active_enum::<RoleType>()
            ).await?;

        manager
            .create_type(
                schema.create_enum_from_active_enum::<AttendanceStatus>()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Entreprise::Table)
                .col(ColumnDef::new(Entreprise::Name)
                    .text()
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(User::Email)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Role)
                    .custom(RoleType::name())
                    .not_null())
                .col(ColumnDef::new(User::EntrepriseId)
                    .integer())
                .take()
            ).await?;

        manager.create_foreign_key(foreign_key(User::Table, User::EntrepriseId, Entreprise::Table)
            .on_delete(ForeignKeyAction::SetNull)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::EntrepriseId)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Employee::FullName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::ContractType)
                    .text()
                    .not_null()) // FIXED, DAILY or HONORARIUM, checked by the payroll engine
                .col(ColumnDef::new(Employee::BaseSalary)
                    .big_integer())
                .col(ColumnDef::new(Employee::DailyRate)
                    .big_integer())
                .take()
            ).await?;

        manager.create_foreign_key(foreign_key(Employee::Table, Employee::EntrepriseId, Entreprise::Table)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(AttendanceRecord::Table)
                .col(ColumnDef::new(AttendanceRecord::EmployeeId)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(AttendanceRecord::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(AttendanceRecord::Status)
                    .custom(AttendanceStatus::name())
                    .not_null())
                .col(ColumnDef::new(AttendanceRecord::ArrivalTime)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(AttendanceRecord::DepartureTime)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(AttendanceRecord::IsValidated)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(AttendanceRecord::ValidatedBy)
                    .integer())
                .col(ColumnDef::new(AttendanceRecord::ValidatedAt)
                    .timestamp_with_time_zone())
                .take()
            ).await?;

        manager.create_foreign_key(foreign_key(AttendanceRecord::Table, AttendanceRecord::EmployeeId, Employee::Table)
            .on_delete(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager.create_foreign_key(foreign_key(AttendanceRecord::Table, AttendanceRecord::ValidatedBy, User::Table)
            .on_delete(ForeignKeyAction::SetNull)
            .take()
        ).await?;

        manager.create_index(IndexCreateStatement::new()
            .name("idx_attendance_record_employee_date")
            .table(AttendanceRecord::Table)
            .col(AttendanceRecord::EmployeeId)
            .col(AttendanceRecord::Date)
            .take()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(TableDropStatement::new().table(AttendanceRecord::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(Employee::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(User::Table).take()).await?;
        manager.drop_table(TableDropStatement::new().table(Entreprise::Table).take()).await?;

        for name in [AttendanceStatus::name(), RoleType::name()] {
            manager
                .drop_type(
                    TypeDropStatement::new()
                        .name(name)
                        .to_owned()
                ).await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Entreprise {
    Table,
    Name,
}

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Name,
    Email,
    Role,
    EntrepriseId,
}

#[derive(DeriveIden)]
pub(crate) enum Employee {
    Table,
    EntrepriseId,
    FullName,
    ContractType,
    BaseSalary,
    DailyRate,
}

#[derive(DeriveIden)]
enum AttendanceRecord {
    Table,
    EmployeeId,
    Date,
    Status,
    ArrivalTime,
    DepartureTime,
    IsValidated,
    ValidatedBy,
    ValidatedAt,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "caissier")]
    Caissier,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "absent")]
    Absent,
}
