use crate::cli::Cli;
use std::sync::Arc;
use taskboard_core::{AppConfig, TaskboardResult};
use taskboard_persistence::Identity;
use taskboard_sync::{HttpGateway, SyncClient, TaskGateway};

/// Settings resolved from flags, environment and the config file, in that
/// order of precedence.
pub struct CliContext {
    pub config: AppConfig,
    pub identity: Option<Identity>,
}

impl CliContext {
    pub fn resolve(cli: &Cli, mut config: AppConfig) -> Self {
        if let Some(server) = &cli.server {
            config.server_url = Some(server.clone());
        }
        let identity = cli
            .user
            .clone()
            .or_else(|| config.user.clone())
            .map(|subject| subject.trim().to_string())
            .filter(|subject| !subject.is_empty())
            .map(|subject| Identity::new(subject).with_profile(cli.name.clone(), cli.email.clone()));
        Self { config, identity }
    }

    pub fn user_label(&self) -> Option<String> {
        self.identity
            .as_ref()
            .map(|i| i.name.clone().unwrap_or_else(|| i.subject.clone()))
    }

    pub fn gateway(&self) -> TaskboardResult<Arc<dyn TaskGateway>> {
        let gateway = HttpGateway::new(
            self.config.effective_server_url(),
            self.identity.clone(),
            self.config.effective_timeout(),
        )?;
        Ok(Arc::new(gateway))
    }

    /// A sync client with the board already loaded.
    pub async fn connect(&self) -> TaskboardResult<SyncClient> {
        let mut client = SyncClient::new(self.gateway()?, self.identity.is_some());
        client.refresh().await?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["taskboard"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_flags_override_config() {
        let config = AppConfig {
            server_url: Some("http://from-file:1".into()),
            user: Some("file-user".into()),
            ..Default::default()
        };
        let cli = parse(&["--server", "http://flag:2", "--user", "alice", "task", "list"]);
        let ctx = CliContext::resolve(&cli, config);
        assert_eq!(ctx.config.effective_server_url(), "http://flag:2");
        assert_eq!(ctx.identity.map(|i| i.subject), Some("alice".to_string()));
    }

    #[test]
    fn test_config_user_is_fallback() {
        let config = AppConfig {
            user: Some("file-user".into()),
            ..Default::default()
        };
        let cli = parse(&["task", "list"]);
        let ctx = CliContext::resolve(&cli, config);
        assert_eq!(ctx.identity.map(|i| i.subject), Some("file-user".to_string()));
    }

    #[test]
    fn test_blank_user_is_unauthenticated() {
        let cli = parse(&["--user", "  ", "task", "list"]);
        let ctx = CliContext::resolve(&cli, AppConfig::default());
        assert!(ctx.identity.is_none());
        assert!(ctx.user_label().is_none());
    }
}
