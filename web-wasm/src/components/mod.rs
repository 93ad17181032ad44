pub mod header;
pub mod language_select;
pub mod progress_bar;
pub mod result_panel;
pub mod upload_area;
