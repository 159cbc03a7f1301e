#![warn(clippy::all, rust_2018_idioms)]

//! Aggregates weighted events from many physics processes into 1D and 2D
//! histograms and cutflow tables, normalizes them and renders figures.
//!
//! A [`job::Job`] describes processes, plot styles and figures. The
//! [`plot_maker::PlotMaker`] reads every process once, fills all figures that
//! use it and prints each figure for every requested [`plot_opt::PlotOpt`].

pub mod axis;
pub mod error;
pub mod event;
pub mod figure;
pub mod histoer;
pub mod job;
pub mod naming;
pub mod plot_maker;
pub mod plot_opt;
pub mod process;
pub mod render;
