pub mod ai;
pub mod factory;

pub use factory::create_provider;
