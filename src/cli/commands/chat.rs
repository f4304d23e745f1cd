use anyhow::Result;

use super::load_resolved_config;
use crate::chat::ChatSession;
use crate::config::ResolveOptions;

pub async fn run_chat(options: ResolveOptions) -> Result<()> {
    let config = load_resolved_config(&options)?;
    let mut session = ChatSession::new(config)?;
    session.run().await
}
