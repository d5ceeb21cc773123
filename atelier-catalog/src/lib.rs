pub mod costing;
pub mod currency;
pub mod sheet;

pub use costing::{CostingBreakdown, CostingEngine, CostingError, CostingOverrides, CostingParameters};
pub use sheet::render_sheet;
