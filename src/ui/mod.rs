/// UI building blocks
///
/// This module contains the view helpers used by the main window:
/// - The restoration option controls (controls.rs)
/// - The original / restored image panes (display.rs)

pub mod controls;
pub mod display;
