// Components module - UI building blocks of the panel
//
// - Title bar: app name, event, sync indicator
// - Friends table: roster sorted by cooldown
// - Detail panel: receive dates of the selected friend
// - Drops panel: totals per category
// - Logs panel: recent tracing output
// - Status bar: counts and key hints
// - Toast: transient notifications

pub mod detail_panel;
pub mod drops_panel;
pub mod formatters;
pub mod friends_table;
pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;
