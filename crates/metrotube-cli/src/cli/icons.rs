//! Styled markers for console output.

use console::{style, StyledObject};
use metrotube::session::Channel;

/// Green check mark.
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Yellow exclamation mark.
pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Red cross.
pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

/// Dim arrow for secondary lines.
pub fn dim_arrow() -> StyledObject<&'static str> {
    style("→").dim()
}

/// Channel label, cyan for the authenticated channel.
pub fn channel(channel: Channel) -> StyledObject<&'static str> {
    match channel {
        Channel::Internal => style("internal").cyan(),
        Channel::Public => style("public").dim(),
    }
}
