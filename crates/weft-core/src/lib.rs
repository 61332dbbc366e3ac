//! Weft Core Types
//!
//! This crate provides the value types shared by the Weft routing core and
//! its collaborators:
//!
//! - **Geometry**: points, sizes and bounds ([`geometry`] module)
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Identifiers**: interned block names ([`identifier::Id`])
//! - **Strokes**: wire line styles ([`stroke::LineStyle`])

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod stroke;
