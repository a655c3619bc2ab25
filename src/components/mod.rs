//! UI components.

pub mod flow_editor;
