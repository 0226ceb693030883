pub mod costs;
pub mod report;
pub mod wacc;
