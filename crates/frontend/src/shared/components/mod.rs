pub mod multi_select;
pub mod table_checkbox;

pub use multi_select::MultiSelect;
pub use table_checkbox::TableCheckbox;
