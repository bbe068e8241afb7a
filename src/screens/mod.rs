pub mod profile;
pub mod settings;
pub mod nav_menu;

pub use profile::profile_screen;
pub use settings::settings_screen;
pub use nav_menu::nav_menu;
