pub mod roaster;
pub mod spot_price;
