pub mod clusterizer;
pub mod histogram2d;
pub mod statistics;
