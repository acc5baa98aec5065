mod dropdown;

pub use dropdown::{Dropdown, DropdownEvent};
