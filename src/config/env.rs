use clap::{Args, builder::FalseyValueParser};

/// The environment variables consulted while loading the configuration.
///
/// Empty variables count as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Args)]
pub struct Environment {
    /// Forced deployment target.
    #[arg(long, env = "NEXT_PRIVATE_TARGET", hide = true)]
    pub private_target: Option<String>,
    /// Running on a managed hosting platform.
    #[arg(long, env = "NOW_BUILDER", hide = true, value_parser = FalseyValueParser::new())]
    pub has_next_support: bool,
    /// Invoked by a third-party build orchestrator.
    #[arg(long, env = "VERCEL_BUILDER", hide = true, value_parser = FalseyValueParser::new())]
    pub vercel_builder: bool,
}

impl Environment {
    /// The target to force, if any.
    pub fn target_override(&self) -> Option<&str> {
        match (&self.private_target, self.has_next_support) {
            (Some(target), _) => Some(target),
            (None, true) => Some("server"),
            (None, false) => None,
        }
    }
}
