pub mod server;

use anyhow::Result;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
}

impl Action {
    // Single dispatch point; grow the match when more actions exist.
    /// Run the action to completion.
    /// # Errors
    /// Propagates whatever the underlying action returns.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
        }
    }
}
