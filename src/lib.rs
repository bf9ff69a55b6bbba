//! Core library for the folder-relocator command line application.
//!
//! A run reads candidate keys from a spreadsheet column, matches them against
//! the `<id>-<label>` directories of a source folder and moves each match into
//! a destination folder. Spreadsheet IO lives under [`relocator::io`], the
//! matching pipeline in [`relocator::normalize`], [`relocator::scan`] and
//! [`relocator::matcher`], filesystem moves in [`relocator::relocate`], and the
//! per-task orchestration under [`relocator::task`].

pub mod relocator;

pub use relocator::{
    Result, ToolError, config, error, io, logging, matcher, normalize, relocate, report, scan,
    task,
};
