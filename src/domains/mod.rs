pub mod points;
pub mod redemptions;
