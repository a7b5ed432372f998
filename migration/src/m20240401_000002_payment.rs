use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::{
    m20240401_000001_init::{Employee, Entreprise, User},
    util::{default_table_statement, foreign_key},
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager
            .create_type(
                schema.create_enum_from_active_enum::<PaymentStatus>()
            ).await?;

        manager
            .create_type(
                schema.create_enum_from_active_enum::<PaymentMethod>()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Payment::Table)
                .col(ColumnDef::new(Payment::EmployeeId)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payment::EntrepriseId)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payment::Period)
                    .char_len(7)
                    .not_null()) // YYYY-MM
                .col(ColumnDef::new(Payment::AmountDue)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payment::AmountPaid)
                    .big_integer()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Payment::ContractType)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Payment::CalculationBreakdown)
                    .json_binary()
                    .not_null())
                .col(ColumnDef::new(Payment::Status)
                    .custom(PaymentStatus::name())
                    .not_null())
                .col(ColumnDef::new(Payment::PaymentMethod)
                    .custom(PaymentMethod::name()))
                .col(ColumnDef::new(Payment::PaidAt)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(Payment::CalculatedBy)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payment::PaidBy)
                    .integer())
                .col(ColumnDef::new(Payment::Notes)
                    .text())
                .check(Expr::col(Payment::AmountPaid).gte(0))
                .take()
            ).await?;

        // One payment per employee per period, this is what settles concurrent creations
        manager.create_index(IndexCreateStatement::new()
            .name("uq_payment_employee_period")
            .table(Payment::Table)
            .col(Payment::EmployeeId)
            .col(Payment::Period)
            .unique()
            .take()
        ).await?;

        manager.create_index(IndexCreateStatement::new()
            .name("idx_payment_entreprise_period")
            .table(Payment::Table)
            .col(Payment::EntrepriseId)
            .col(Payment::Period)
            .take()
        ).await?;

        manager.create_foreign_key(foreign_key(Payment::Table, Payment::EmployeeId, Employee::Table)
            .on_delete(ForeignKeyAction::Restrict)
            .take()
        ).await?;

        manager.create_foreign_key(foreign_key(Payment::Table, Payment::EntrepriseId, Entreprise::Table)
            .on_delete(ForeignKeyAction::Restrict)
            .take()
        ).await?;

        manager.create_foreign_key(foreign_key(Payment::Table, Payment::CalculatedBy, User::Table)
            .on_delete(ForeignKeyAction::Restrict)
            .take()
        ).await?;

        manager.create_foreign_key(foreign_key(Payment::Table, Payment::PaidBy, User::Table)
            .on_delete(ForeignKeyAction::SetNull)
            .take()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(
            TableDropStatement::new()
                .table(Payment::Table)
                .take()
        ).await?;

        for name in [PaymentMethod::name(), PaymentStatus::name()] {
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
enum Payment {
    Table,
    EmployeeId,
    EntrepriseId,
    Period,
    AmountDue,
    AmountPaid,
    ContractType,
    CalculationBreakdown,
    Status,
    PaymentMethod,
    PaidAt,
    CalculatedBy,
    PaidBy,
    Notes,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
enum PaymentStatus {
    #[sea_orm(string_value = "calculated")]
    Calculated,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
enum PaymentMethod {
    #[sea_orm(string_value = "especes")]
    Especes,
    #[sea_orm(string_value = "virement")]
    Virement,
    #[sea_orm(string_value = "orange_money")]
    OrangeMoney,
    #[sea_orm(string_value = "wave")]
    Wave,
    #[sea_orm(string_value = "cheque")]
    Cheque,
}
