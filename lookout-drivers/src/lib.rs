//! Driver layer connecting the perception engines to a live browser.
//!
//! - [`lookout_browser::driver::LookoutDriver`]: WebDriver client wrapper
//! - [`lookout_browser::page::LivePage`]: snapshot capture and replay of
//!   markers, removals and scroll restoration into the page
//! - [`lookout_browser::session::PageSession`]: the page operations the
//!   suppression loop needs, behind a trait
pub mod lookout_browser;

pub use lookout_browser::driver::LookoutDriver;
pub use lookout_browser::page::LivePage;
pub use lookout_browser::session::{replay_suppression, PageSession};
