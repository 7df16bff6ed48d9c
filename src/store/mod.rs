mod news;
mod session;
mod theme;

pub use news::NewsStore;
pub use session::{HydrationTicket, SessionStore};
pub use theme::{NullSink, Theme, ThemeSink, ThemeStore};
