pub mod chat_area;
pub mod connect_form;
pub mod input_bar;
pub mod peer_list;
pub mod user_panel;
