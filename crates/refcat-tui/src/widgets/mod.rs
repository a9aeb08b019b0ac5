pub mod sub_tabs;
pub mod text_field;
