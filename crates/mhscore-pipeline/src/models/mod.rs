pub mod factory;
pub mod gbdt;
pub mod regressor_trait;

pub use regressor_trait::RegressorModel;
