use clap::ValueEnum;
use is_terminal::IsTerminal;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Colour {
    #[default]
    Auto,
    Always,
    Never,
}

impl Colour {
    /// Resolves "auto" to either "always" or "never" depending on if stdout is a terminal, then
    /// tells the colored crate what we decided.
    pub(crate) fn detect(self) -> Self {
        let resolved = match self {
            Colour::Auto => {
                if std::io::stdout().is_terminal() {
                    Colour::Always
                } else {
                    Colour::Never
                }
            }
            other => other,
        };
        colored::control::set_override(resolved == Colour::Always);
        resolved
    }
}
