use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Catalog: sensor_types
        manager
            .create_table(
                Table::create()
                    .table(SensorTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SensorTypes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SensorTypes::Name).string().not_null())
                    .col(ColumnDef::new(SensorTypes::Manufacturer).string())
                    .col(ColumnDef::new(SensorTypes::Model).string())
                    .col(
                        ColumnDef::new(SensorTypes::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SensorTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Catalog: measurement_types
        manager
            .create_table(
                Table::create()
                    .table(MeasurementTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeasurementTypes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeasurementTypes::SensorTypeId).uuid().not_null())
                    .col(ColumnDef::new(MeasurementTypes::Name).string().not_null())
                    .col(ColumnDef::new(MeasurementTypes::MinValue).double())
                    .col(ColumnDef::new(MeasurementTypes::MaxValue).double())
                    .col(
                        ColumnDef::new(MeasurementTypes::SchemaVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(MeasurementTypes::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(MeasurementTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_measurement_type_sensor_type")
                            .from(MeasurementTypes::Table, MeasurementTypes::SensorTypeId)
                            .to(SensorTypes::Table, SensorTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Catalog: measurement_fields
        manager
            .create_table(
                Table::create()
                    .table(MeasurementFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeasurementFields::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MeasurementFields::MeasurementTypeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MeasurementFields::Name).string().not_null())
                    .col(ColumnDef::new(MeasurementFields::Label).string().not_null())
                    .col(
                        ColumnDef::new(MeasurementFields::DataType)
                            .string()
                            .not_null()
                            .default("numeric"),
                    )
                    .col(
                        ColumnDef::new(MeasurementFields::Required)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(MeasurementFields::Unit).string())
                    .col(ColumnDef::new(MeasurementFields::MinValue).double())
                    .col(ColumnDef::new(MeasurementFields::MaxValue).double())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_measurement_field_type")
                            .from(MeasurementFields::Table, MeasurementFields::MeasurementTypeId)
                            .to(MeasurementTypes::Table, MeasurementTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Registry: locations, assets, asset_sensors
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Locations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Locations::TenantId).uuid())
                    .col(ColumnDef::new(Locations::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Assets::TenantId).uuid())
                    .col(ColumnDef::new(Assets::Name).string().not_null())
                    .col(ColumnDef::new(Assets::LocationId).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_location")
                            .from(Assets::Table, Assets::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AssetSensors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AssetSensors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AssetSensors::AssetId).uuid().not_null())
                    .col(ColumnDef::new(AssetSensors::SensorTypeId).uuid().not_null())
                    .col(ColumnDef::new(AssetSensors::Name).string().not_null())
                    .col(ColumnDef::new(AssetSensors::MacAddress).string())
                    .col(
                        ColumnDef::new(AssetSensors::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(AssetSensors::LastValue).json_binary())
                    .col(ColumnDef::new(AssetSensors::LastReadingTime).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_sensor_asset")
                            .from(AssetSensors::Table, AssetSensors::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_sensor_sensor_type")
                            .from(AssetSensors::Table, AssetSensors::SensorTypeId)
                            .to(SensorTypes::Table, SensorTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Measurement facts: one row per (reading, field), no uniqueness on purpose
        manager
            .create_table(
                Table::create()
                    .table(MeasurementFacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeasurementFacts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeasurementFacts::TenantId).uuid())
                    .col(ColumnDef::new(MeasurementFacts::AssetSensorId).uuid().not_null())
                    .col(ColumnDef::new(MeasurementFacts::SensorTypeId).uuid().not_null())
                    .col(ColumnDef::new(MeasurementFacts::MacAddress).string())
                    .col(
                        ColumnDef::new(MeasurementFacts::MeasurementFieldName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MeasurementFacts::Label).string().not_null())
                    .col(
                        ColumnDef::new(MeasurementFacts::Unit)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(MeasurementFacts::NumericValue).double())
                    .col(ColumnDef::new(MeasurementFacts::TextValue).text())
                    .col(ColumnDef::new(MeasurementFacts::BooleanValue).boolean())
                    .col(
                        ColumnDef::new(MeasurementFacts::ReadingTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MeasurementFacts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_measurement_facts_sensor_time")
                    .table(MeasurementFacts::Table)
                    .col(MeasurementFacts::AssetSensorId)
                    .col(MeasurementFacts::ReadingTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_measurement_facts_type_time")
                    .table(MeasurementFacts::Table)
                    .col(MeasurementFacts::SensorTypeId)
                    .col(MeasurementFacts::ReadingTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_measurement_facts_mac_time")
                    .table(MeasurementFacts::Table)
                    .col(MeasurementFacts::MacAddress)
                    .col(MeasurementFacts::ReadingTime)
                    .to_owned(),
            )
            .await?;

        // Thresholds
        manager
            .create_table(
                Table::create()
                    .table(SensorThresholds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SensorThresholds::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SensorThresholds::TenantId).uuid())
                    .col(ColumnDef::new(SensorThresholds::AssetSensorId).uuid().not_null())
                    .col(ColumnDef::new(SensorThresholds::SensorTypeId).uuid().not_null())
                    .col(
                        ColumnDef::new(SensorThresholds::MeasurementField)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SensorThresholds::MinValue).double())
                    .col(ColumnDef::new(SensorThresholds::MaxValue).double())
                    .col(
                        ColumnDef::new(SensorThresholds::Severity)
                            .string()
                            .not_null()
                            .default("warning"),
                    )
                    .col(ColumnDef::new(SensorThresholds::AlertMessage).text())
                    .col(
                        ColumnDef::new(SensorThresholds::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SensorThresholds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SensorThresholds::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_threshold_asset_sensor")
                            .from(SensorThresholds::Table, SensorThresholds::AssetSensorId)
                            .to(AssetSensors::Table, AssetSensors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Alerts keep a snapshot of their threshold, so no foreign key to it
        manager
            .create_table(
                Table::create()
                    .table(AssetAlerts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AssetAlerts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AssetAlerts::TenantId).uuid())
                    .col(ColumnDef::new(AssetAlerts::AssetId).uuid().not_null())
                    .col(ColumnDef::new(AssetAlerts::AssetSensorId).uuid().not_null())
                    .col(ColumnDef::new(AssetAlerts::SensorTypeId).uuid().not_null())
                    .col(ColumnDef::new(AssetAlerts::MacAddress).string())
                    .col(ColumnDef::new(AssetAlerts::ThresholdId).uuid().not_null())
                    .col(ColumnDef::new(AssetAlerts::MeasurementField).string().not_null())
                    .col(
                        ColumnDef::new(AssetAlerts::AlertTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssetAlerts::ResolvedTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(AssetAlerts::Severity).string().not_null())
                    .col(ColumnDef::new(AssetAlerts::TriggerValue).double().not_null())
                    .col(ColumnDef::new(AssetAlerts::AlertType).string().not_null())
                    .col(ColumnDef::new(AssetAlerts::Message).text().not_null())
                    .col(
                        ColumnDef::new(AssetAlerts::IsResolved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_asset_alerts_sensor_time")
                    .table(AssetAlerts::Table)
                    .col(AssetAlerts::AssetSensorId)
                    .col(AssetAlerts::AlertTime)
                    .to_owned(),
            )
            .await?;

        // Domain event log
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::EventType).string().not_null())
                    .col(ColumnDef::new(Events::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(Events::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Constraints sea-query cannot express: partial unique indexes and checks
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_asset_alerts_open_pair \
             ON asset_alerts (asset_sensor_id, threshold_id) WHERE resolved_time IS NULL",
        )
        .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_sensor_thresholds_active_field \
             ON sensor_thresholds (asset_sensor_id, measurement_field) WHERE is_active",
        )
        .await?;
        db.execute_unprepared(
            "ALTER TABLE sensor_thresholds ADD CONSTRAINT ck_sensor_thresholds_range \
             CHECK (min_value IS NULL OR max_value IS NULL OR min_value < max_value)",
        )
        .await?;
        db.execute_unprepared(
            "ALTER TABLE measurement_fields ADD CONSTRAINT ck_measurement_fields_range \
             CHECK (min_value IS NULL OR max_value IS NULL OR min_value < max_value)",
        )
        .await?;
        db.execute_unprepared(
            "ALTER TABLE measurement_facts ADD CONSTRAINT ck_measurement_facts_single_slot \
             CHECK ((numeric_value IS NOT NULL)::int + (text_value IS NOT NULL)::int \
             + (boolean_value IS NOT NULL)::int <= 1)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssetAlerts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SensorThresholds::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MeasurementFacts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssetSensors::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MeasurementFields::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MeasurementTypes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SensorTypes::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum SensorTypes {
    Table,
    Id,
    Name,
    Manufacturer,
    Model,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MeasurementTypes {
    Table,
    Id,
    SensorTypeId,
    Name,
    MinValue,
    MaxValue,
    SchemaVersion,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MeasurementFields {
    Table,
    Id,
    MeasurementTypeId,
    Name,
    Label,
    DataType,
    Required,
    Unit,
    MinValue,
    MaxValue,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    TenantId,
    Name,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    TenantId,
    Name,
    LocationId,
}

#[derive(DeriveIden)]
enum AssetSensors {
    Table,
    Id,
    AssetId,
    SensorTypeId,
    Name,
    MacAddress,
    Status,
    LastValue,
    LastReadingTime,
}

#[derive(DeriveIden)]
enum MeasurementFacts {
    Table,
    Id,
    TenantId,
    AssetSensorId,
    SensorTypeId,
    MacAddress,
    MeasurementFieldName,
    Label,
    Unit,
    NumericValue,
    TextValue,
    BooleanValue,
    ReadingTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SensorThresholds {
    Table,
    Id,
    TenantId,
    AssetSensorId,
    SensorTypeId,
    MeasurementField,
    MinValue,
    MaxValue,
    Severity,
    AlertMessage,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AssetAlerts {
    Table,
    Id,
    TenantId,
    AssetId,
    AssetSensorId,
    SensorTypeId,
    MacAddress,
    ThresholdId,
    MeasurementField,
    AlertTime,
    ResolvedTime,
    Severity,
    TriggerValue,
    AlertType,
    Message,
    IsResolved,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    EventType,
    Payload,
    OccurredAt,
}
