pub mod section_layout;
