pub mod compass;
pub mod observation;
pub mod preprocessing;
pub mod scaler;
