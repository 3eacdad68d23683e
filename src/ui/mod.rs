pub mod central;
pub mod charts;
pub mod load;
pub mod side;
pub mod statistics;
pub mod top;
