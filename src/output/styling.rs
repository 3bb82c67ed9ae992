use std::fmt::Display;

use console::{style, StyledObject};

// Terminal colors used across the report output. Everything is rendered to
// stderr; the CSV is the only thing written as data.

type Styled = StyledObject<String>;

fn styled(text: impl Display) -> Styled {
    style(text.to_string())
}

pub fn bright(text: impl Display) -> Styled {
    styled(text).bright()
}

pub fn bright_yellow(text: impl Display) -> Styled {
    bright(text).yellow()
}

pub fn bright_green(text: impl Display) -> Styled {
    bright(text).green()
}

pub fn bright_red(text: impl Display) -> Styled {
    bright(text).red()
}

pub fn cyan(text: impl Display) -> Styled {
    styled(text).cyan()
}

pub fn dim(text: impl Display) -> Styled {
    styled(text).dim()
}

pub fn magenta_bold(text: impl Display) -> Styled {
    styled(text).magenta().bold()
}
