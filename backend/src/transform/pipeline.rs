//! High-level migration API.
//!
//! Combines loading and projection: fetch the legacy tables of an
//! entity's source family, build the working table, run the projector.
//!
//! # Example
//!
//! ```rust,ignore
//! use stanhope::{migrate, CodeBook, Entity, MdbExport};
//!
//! let export = MdbExport::new("mdb-export", "/data/StanhopeFramers.mdb");
//! let orders = migrate(Entity::Orders, &export, None, &CodeBook::default())?;
//! println!("{} orders", orders.len());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{MigrationResult, ProjectionResult};
use crate::loader::{load, Source};
use crate::logs::{log_info, log_success, log_success_indent};
use crate::models::Table;
use crate::normalize::CodeBook;
use crate::source::ExportSource;

use super::entities;

/// Target entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Accounts,
    Contacts,
    Orders,
    Treatments,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Accounts,
        Entity::Contacts,
        Entity::Orders,
        Entity::Treatments,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Accounts => "Accounts",
            Entity::Contacts => "Contacts",
            Entity::Orders => "Orders",
            Entity::Treatments => "Treatments",
        }
    }

    /// Legacy table family this entity is projected from.
    pub fn source(&self) -> Source {
        match self {
            Entity::Accounts | Entity::Contacts => Source::Customers,
            Entity::Orders | Entity::Treatments => Source::FrameOrders,
        }
    }

    /// Run this entity's projector over a working table.
    pub fn project(&self, working: &Table, codes: &CodeBook) -> ProjectionResult<Table> {
        match self {
            Entity::Accounts => entities::accounts(working, codes),
            Entity::Contacts => entities::contacts(working, codes),
            Entity::Orders => entities::orders(working, codes),
            Entity::Treatments => entities::treatments(working, codes),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Entity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown entity '{}' (expected one of: accounts, contacts, orders, treatments)",
                    s
                )
            })
    }
}

/// Load and project one entity.
///
/// `tables` of `None` loads the source family's default table.
pub fn migrate(
    entity: Entity,
    export: &dyn ExportSource,
    tables: Option<&[String]>,
    codes: &CodeBook,
) -> MigrationResult<Table> {
    let working = load(entity.source(), export, tables)?;
    project_logged(entity, &working, codes)
}

/// Project every entity, loading each source family once.
///
/// Outputs come back in [`Entity::ALL`] order.
pub fn migrate_all(
    export: &dyn ExportSource,
    codes: &CodeBook,
) -> MigrationResult<Vec<(Entity, Table)>> {
    let mut outputs = Vec::with_capacity(Entity::ALL.len());

    for source in Source::ALL {
        let working = load(source, export, None)?;
        for entity in Entity::ALL.into_iter().filter(|e| e.source() == source) {
            let table = project_logged(entity, &working, codes)?;
            outputs.push((entity, table));
        }
    }

    outputs.sort_by_key(|(entity, _)| Entity::ALL.iter().position(|e| e == entity));
    log_success(format!("Migrated {} entities", outputs.len()));
    Ok(outputs)
}

fn project_logged(entity: Entity, working: &Table, codes: &CodeBook) -> MigrationResult<Table> {
    log_info(format!("Projecting {}", entity));
    let output = entity.project(working, codes)?;
    log_success_indent(
        format!("{} rows, {} columns", output.len(), output.columns().len()),
        1,
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, MigrationError, ProjectionError};
    use crate::models::Cell;
    use crate::source::MemorySource;

    const CUSTOMERS: &str = "Customer Number,Name,Address,City,State,Zip,Telephone,Email,\
        Category,Source,Comment,Credit,Tax Exempt,Deceased,Date,Last Order,Last Update\n\
        c100,,1 Main St,Princeton,NJ,08540,,,R,WI,,Y,N,N,,,\n";

    const FRAME_ORDERS: &str = "OrderNo,FrameNo,CustomerNo,OrderDate,DueDate,DateCompleted,\
        Status,Location,Delivery,SalesPers,Discount,Cust-Client,Artist,BinNo,Comments,\
        ProductionComments,Fitting,Frame Height,Frame Width,FrameMfg,Glazing,Joining,Mat,\
        MatColor,MatMfg,Matting,MattingSize,Qty,SalesCatgy,SalesType,TotalSale\n\
        o55,F1,c100,,,,O,S,,HS,,,,,,,,16.5,24.25,,,J,,,B,,,1,CF,F,125\n";

    fn export() -> MemorySource {
        MemorySource::new()
            .with_table("Customers", CUSTOMERS)
            .with_table("FrameOrders", FRAME_ORDERS)
    }

    #[test]
    fn test_entity_names_and_sources() {
        assert_eq!("orders".parse::<Entity>(), Ok(Entity::Orders));
        assert_eq!(" Treatments ".parse::<Entity>(), Ok(Entity::Treatments));
        assert!("invoices".parse::<Entity>().is_err());
        assert_eq!(Entity::Contacts.source(), Source::Customers);
        assert_eq!(Entity::Treatments.source(), Source::FrameOrders);
    }

    #[test]
    fn test_migrate_single_entity() {
        let out = migrate(Entity::Accounts, &export(), None, &CodeBook::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0, "Account"), Some(&Cell::from("C100")));
    }

    #[test]
    fn test_migrate_all_in_entity_order() {
        let outputs = migrate_all(&export(), &CodeBook::default()).unwrap();
        let order: Vec<Entity> = outputs.iter().map(|(e, _)| *e).collect();
        assert_eq!(order, Entity::ALL.to_vec());

        let (_, treatments) = &outputs[3];
        assert_eq!(treatments.get(0, "Order Link"), Some(&Cell::from("O55-F1")));
        let (_, orders) = &outputs[2];
        assert_eq!(orders.get(0, "Legacy Order ID"), Some(&Cell::from("O55-F1")));
    }

    #[test]
    fn test_first_error_aborts() {
        let export = MemorySource::new().with_table("Customers", CUSTOMERS);
        let err = migrate_all(&export, &CodeBook::default()).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::Load(LoadError::SourceUnavailable { ref table, .. }) if table == "FrameOrders"
        ));
    }

    #[test]
    fn test_projection_error_surfaces() {
        let bad = FRAME_ORDERS.replace(",CF,", ",ZZ,");
        let export = MemorySource::new().with_table("FrameOrders", bad);
        let err = migrate(Entity::Treatments, &export, None, &CodeBook::default()).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::Projection(ProjectionError::Projection { line: 2, .. })
        ));
    }
}
