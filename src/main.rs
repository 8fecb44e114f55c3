use editable_history::app::App;
use editable_history::config::EditorConfig;
use editable_history::logging;
use leptos::mount::mount_to_body;
use leptos::prelude::*;
use log::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();
    if logging::init(LevelFilter::Info).is_err() {
        web_sys::console::warn_1(&"logger already installed".into());
    }

    let config = EditorConfig::load();
    log::set_max_level(config.log_level);

    mount_to_body(move || view! { <App config=config /> });
}
