pub mod arithmetic;
pub mod histogram1d;
pub mod poisson;
pub mod statistics;
