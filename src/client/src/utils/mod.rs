pub mod system_info;
