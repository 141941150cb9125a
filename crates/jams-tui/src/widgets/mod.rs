pub mod pane_chrome;
pub mod status_bar;
pub mod url_input;
