pub mod catalogue;
pub mod conversions;
pub mod finance;
pub mod health;
pub mod technology;
