//! Entity projectors: working table to target-schema output table.
//!
//! Accounts and Contacts come from the Customers family; Orders and
//! Treatments from FrameOrders. Cross-entity links (`Account Link`,
//! `Order Link`) are plain string columns for the importer to resolve.
//!
//! Downstream importers key off these exact column names.

use crate::error::ProjectionResult;
use crate::models::{Cell, Table};
use crate::normalize::{self, dimension, CodeBook, Lookup};

use super::projection::Projector;

/// Literal used when an order carries no discount code.
pub const NO_DISCOUNT: &str = "No Discount";

/// Literal used when an order has no client.
pub const NO_CLIENT: &str = "None";

// =============================================================================
// Accounts
// =============================================================================

pub mod accounts {
    pub const ENTITY: &str = "Accounts";
    pub const LEGACY_RECORD: &str = "Legacy Customer Record";
    pub const LEGACY_NUMBER: &str = "Legacy Customer Number";
    pub const ACCOUNT: &str = "Account";
    pub const CATEGORY: &str = "Category";
    pub const SOURCE: &str = "Source";

    pub const DROP: &[&str] = &[
        "Address",
        "City",
        "Date",
        "Deceased",
        "Email",
        "Last Order",
        "Last Update",
        "State",
        "Telephone",
        "Zip",
    ];

    pub const RENAME: &[(&str, &str)] = &[
        ("Customer Number", LEGACY_NUMBER),
        ("Name", ACCOUNT),
        ("Comment", "Comments"),
        ("Category", CATEGORY),
        ("Source", SOURCE),
        ("Credit", "Credit"),
        ("Tax Exempt", "Tax Exempt"),
    ];
}

/// Accounts from the Customers working table.
pub fn accounts(customers: &Table, codes: &CodeBook) -> ProjectionResult<Table> {
    use self::accounts::*;

    let mut p = Projector::new(ENTITY, customers, codes);

    p.derive(LEGACY_RECORD, |cols, row| {
        Cell::Text(normalize::legacy_record(cols, row))
    });
    p.drop(DROP)?;
    p.rename(RENAME)?;

    p.map(ACCOUNT, normalize::replace_newline_cell)?;
    p.fallback_to_column(ACCOUNT, LEGACY_NUMBER)?;
    p.lookup(CATEGORY, Lookup::AccountCategory)?;
    p.lookup(SOURCE, Lookup::Source)?;

    Ok(p.finish())
}

// =============================================================================
// Contacts
// =============================================================================

pub mod contacts {
    pub const ENTITY: &str = "Contacts";
    pub const LEGACY_RECORD: &str = "Legacy Contact Record";
    pub const ACCOUNT_LINK: &str = "Account Link";
    pub const CONTACT: &str = "Contact";

    pub const DROP: &[&str] = &[
        "Category",
        "Comment",
        "Credit",
        "Date",
        "Last Order",
        "Last Update",
        "Source",
        "Tax Exempt",
    ];

    pub const RENAME: &[(&str, &str)] = &[
        ("Customer Number", ACCOUNT_LINK),
        ("Name", CONTACT),
        ("Address", "Address"),
        ("City", "City"),
        ("State", "State"),
        ("Zip", "Zip"),
        ("Telephone", "Telephone"),
        ("Email", "Email"),
        ("Deceased", "Deceased"),
    ];

    /// Free-text columns flattened to one line.
    pub const SINGLE_LINE: &[&str] = &["Address", "City", "State", "Zip", "Telephone"];
}

/// Contacts from the Customers working table.
pub fn contacts(customers: &Table, codes: &CodeBook) -> ProjectionResult<Table> {
    use self::contacts::*;

    let mut p = Projector::new(ENTITY, customers, codes);

    p.derive(LEGACY_RECORD, |cols, row| {
        Cell::Text(normalize::legacy_record(cols, row))
    });
    p.drop(DROP)?;
    p.rename(RENAME)?;

    p.map(CONTACT, normalize::replace_newline_cell)?;
    p.fallback_to_column(CONTACT, ACCOUNT_LINK)?;
    for column in SINGLE_LINE {
        p.map(column, normalize::replace_newline_cell)?;
    }

    Ok(p.finish())
}

// =============================================================================
// Orders
// =============================================================================

pub mod orders {
    pub const ENTITY: &str = "Orders";
    pub const LEGACY_RECORD: &str = "Legacy Order Record";
    pub const LEGACY_ORDER_ID: &str = "Legacy Order ID";
    pub const ORDER_STATUS: &str = "Order Status";
    pub const ORDER_LOCATION: &str = "Order Location";
    pub const DELIVERY_LOCATION: &str = "Delivery Location";
    pub const SALESPERSON_LINK: &str = "Salesperson Link";
    pub const DISCOUNT: &str = "Discount";
    pub const CLIENT: &str = "Client";

    pub const DROP: &[&str] = &[
        "Artist",
        "BinNo",
        "Comments",
        "DateCompleted",
        "Fitting",
        "Frame Height",
        "Frame Width",
        "FrameMfg",
        "FrameNo",
        "Glazing",
        "Joining",
        "Mat",
        "MatColor",
        "MatMfg",
        "Matting",
        "MattingSize",
        "ProductionComments",
        "Qty",
        "SalesCatgy",
        "SalesType",
        "TotalSale",
    ];

    pub const RENAME: &[(&str, &str)] = &[
        ("OrderNo", "Order Number"),
        ("OrderDate", "Order Date"),
        ("DueDate", "Due Date"),
        ("CustomerNo", "Account Link"),
        ("Status", ORDER_STATUS),
        ("Location", ORDER_LOCATION),
        ("SalesPers", SALESPERSON_LINK),
        ("Delivery", DELIVERY_LOCATION),
        ("Cust-Client", CLIENT),
        ("Discount", DISCOUNT),
    ];
}

/// Orders from the FrameOrders working table.
///
/// Fails if two rows synthesize the same `Legacy Order ID`.
pub fn orders(frame_orders: &Table, codes: &CodeBook) -> ProjectionResult<Table> {
    use self::orders::*;

    let mut p = Projector::new(ENTITY, frame_orders, codes);

    p.derive(LEGACY_RECORD, |cols, row| {
        Cell::Text(normalize::legacy_record(cols, row))
    });
    p.derive(LEGACY_ORDER_ID, |cols, row| {
        Cell::from_text(normalize::legacy_order_id(cols, row))
    });
    p.drop(DROP)?;
    p.rename(RENAME)?;

    p.lookup(DELIVERY_LOCATION, Lookup::DeliveryLocation)?;
    p.lookup(DISCOUNT, Lookup::Discount)?;
    p.lookup(ORDER_LOCATION, Lookup::OrderLocation)?;
    p.lookup(ORDER_STATUS, Lookup::Status)?;
    p.lookup(SALESPERSON_LINK, Lookup::Salesperson)?;
    p.fallback_to_literal(DISCOUNT, NO_DISCOUNT)?;
    p.fallback_to_column(DELIVERY_LOCATION, ORDER_LOCATION)?;
    p.fallback_to_literal(CLIENT, NO_CLIENT)?;

    p.ensure_unique(LEGACY_ORDER_ID)?;

    Ok(p.finish())
}

// =============================================================================
// Treatments
// =============================================================================

pub mod treatments {
    pub const ENTITY: &str = "Treatments";
    pub const LEGACY_RECORD: &str = "Legacy Treatment Record";
    pub const ORDER_LINK: &str = "Order Link";
    pub const FRAME_JOIN: &str = "Frame Join";
    pub const MAT_MANUFACTURER: &str = "Mat Manufacturer";
    pub const TYPE: &str = "Type";
    pub const SALES_CATEGORY: &str = "Sales Category";
    pub const FRAME_WIDTH: &str = "Frame Width";
    pub const FRAME_HEIGHT: &str = "Frame Height";

    pub const DROP: &[&str] = &[
        "Artist",
        "Cust-Client",
        "DateCompleted",
        "Delivery",
        "Discount",
        "DueDate",
        "Fitting",
        "FrameMfg",
        "Glazing",
        "Location",
        "Mat",
        "Matting",
        "OrderDate",
        "OrderNo",
        "SalesPers",
        "Status",
    ];

    pub const RENAME: &[(&str, &str)] = &[
        ("BinNo", "Bin Number"),
        ("Comments", "Description"),
        ("CustomerNo", "Account Link"),
        ("FrameNo", "Frame Style"),
        ("Joining", FRAME_JOIN),
        ("MatColor", "Mat Color"),
        ("MatMfg", MAT_MANUFACTURER),
        ("MattingSize", "Mat Size"),
        ("ProductionComments", "Production Comments"),
        ("Qty", "Quantity"),
        ("SalesType", TYPE),
        ("TotalSale", "Price"),
        ("SalesCatgy", SALES_CATEGORY),
        ("Frame Width", FRAME_WIDTH),
        ("Frame Height", FRAME_HEIGHT),
    ];

    /// Source dimension and the (inches, fraction) columns it becomes.
    pub const DIMENSIONS: &[(&str, &str, &str)] = &[
        (FRAME_WIDTH, "Frame Width Inches", "Frame Width Fraction"),
        (FRAME_HEIGHT, "Frame Height Inches", "Frame Height Fraction"),
    ];
}

/// Treatments from the FrameOrders working table.
///
/// `Order Link` is computed exactly like the Orders `Legacy Order ID`.
pub fn treatments(frame_orders: &Table, codes: &CodeBook) -> ProjectionResult<Table> {
    use self::treatments::*;

    let mut p = Projector::new(ENTITY, frame_orders, codes);

    p.derive(LEGACY_RECORD, |cols, row| {
        Cell::Text(normalize::legacy_record(cols, row))
    });
    p.derive(ORDER_LINK, |cols, row| {
        Cell::from_text(normalize::legacy_order_id(cols, row))
    });
    p.drop(DROP)?;
    p.rename(RENAME)?;

    p.lookup(FRAME_JOIN, Lookup::Join)?;
    p.lookup(MAT_MANUFACTURER, Lookup::MatMfg)?;
    p.lookup(TYPE, Lookup::SalesType)?;
    p.lookup(SALES_CATEGORY, Lookup::SalesCategory)?;

    for (source, inches, fraction) in DIMENSIONS {
        p.derive_from(inches, source, dimension::inches)?;
        p.derive_from(fraction, source, dimension::fraction)?;
    }
    p.drop(&[FRAME_WIDTH, FRAME_HEIGHT])?;

    Ok(p.finish())
}
