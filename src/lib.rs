//! # STRATA
//!
//! Layered dependency structure for source trees.
//!
//! STRATA mirrors a directory tree as packages and modules, resolves the
//! imports between modules, and arranges the children of every package into
//! ordered rows so that dependencies point downward. Edges that cannot point
//! downward (cycles, layering violations) are kept and reported as feedback.
//!
//! ## Pipeline
//!
//! - **Tree builder**: directories become packages, recognised files modules
//! - **Resolver**: raw import targets become module-to-module edges
//! - **Levelizer**: rows per package, bottom-up
//!
//! ## Supported Languages
//!
//! JavaScript (line scanner), TypeScript (syntax tree), C/C++ includes with
//! optional header/implementation pairing

pub mod core;
pub mod formatters;
pub mod parsers;
