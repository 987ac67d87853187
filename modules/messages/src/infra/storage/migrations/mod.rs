use sea_orm_migration::prelude::*;

mod m20250901_000005_create_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250901_000005_create_messages::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_messages").into_iden()
    }
}
