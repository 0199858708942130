pub mod model;
pub mod outcome;
pub mod validation;
