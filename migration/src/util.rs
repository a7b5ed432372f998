use sea_orm_migration::prelude::*;

pub(crate) fn default_table_statement() -> TableCreateStatement {
    TableCreateStatement::new()
        .if_not_exists()
        .col(ColumnDef::new(DefaultColumn::Id)
            .integer()
            .auto_increment()
            .primary_key()
            .take())
        .col(ColumnDef::new(DefaultColumn::CreatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .default(Expr::current_timestamp())
            .take())
        .col(ColumnDef::new(DefaultColumn::UpdatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .default(Expr::current_timestamp())
            .take())
        .take()
}

#[derive(DeriveIden)]
pub(crate) enum DefaultColumn {
    Id,
    CreatedAt,
    UpdatedAt,
}

/// Foreign key from `from` to the `id` of `to_table`
///
/// # Example
///
/// ```rs
/// manager.create_foreign_key(
///     foreign_key(Employee::Table, Employee::EntrepriseId, Entreprise::Table)
///         .on_delete(ForeignKeyAction::Cascade)
///         .take()
/// ).await?;
/// ```
pub(crate) fn foreign_key<T, C, R>(table: T, from: C, to_table: R) -> ForeignKeyCreateStatement
where
    T: IntoTableRef,
    C: IntoIden,
    R: IntoTableRef,
{
    ForeignKeyCreateStatement::new()
        .from(table, from)
        .to(to_table, DefaultColumn::Id)
        .on_update(ForeignKeyAction::Cascade)
        .take()
}
