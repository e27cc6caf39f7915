//! Built-in commands

mod help;
mod id;
mod ping;
mod re;

pub use help::HelpPlugin;
pub use id::IdPlugin;
pub use ping::PingPlugin;
pub use re::RePlugin;
