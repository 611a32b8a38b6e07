//! Business logic services for the Retail POS Platform

pub mod adjustment;
pub mod costing;
pub mod credit;
pub mod inventory;
pub mod item;
pub mod purchase;
pub mod reporting;
pub mod sale;
pub mod shift;

pub use adjustment::StockAdjustmentService;
pub use costing::CostingService;
pub use credit::CreditService;
pub use inventory::InventoryService;
pub use item::ItemService;
pub use purchase::PurchaseService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use shift::ShiftService;
