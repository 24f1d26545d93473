// connexion BD

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::config::AppConfig;
use crate::models::{
    equipment, equipment_allocation, equipment_job, investor, investor_deposit, investor_transaction,
    product, product_allocation, product_variant, profit_distribution, users, withdrawal_request,
};

pub async fn establish_connection(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging_level(log::LevelFilter::Debug);

    Database::connect(options).await
}

/// Crée les tables manquantes à partir des entités (ordre des clés étrangères)
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, users::Entity).await?;
    create_table(db, &schema, investor::Entity).await?;
    create_table(db, &schema, product::Entity).await?;
    create_table(db, &schema, product_variant::Entity).await?;
    create_table(db, &schema, equipment::Entity).await?;
    create_table(db, &schema, product_allocation::Entity).await?;
    create_table(db, &schema, equipment_allocation::Entity).await?;
    create_table(db, &schema, equipment_job::Entity).await?;
    create_table(db, &schema, profit_distribution::Entity).await?;
    create_table(db, &schema, investor_transaction::Entity).await?;
    create_table(db, &schema, investor_deposit::Entity).await?;
    create_table(db, &schema, withdrawal_request::Entity).await?;

    log::info!("Database schema synchronized");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr> {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(db.get_database_backend().build(&statement)).await?;
    Ok(())
}
