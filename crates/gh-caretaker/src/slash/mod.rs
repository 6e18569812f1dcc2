//! Slash commands typed into pull request comments
//!
//! Every line of a comment body that starts with `/` is a command:
//!
//! ```text
//! /<name>[ <key>=<value>[,<key>=<value>]*]
//! ```
//!
//! Commands run in the order they appear. The comment gets an `EYES`
//! reaction before the first command runs and a `THUMBS_UP` once all of them
//! succeeded. The first unknown or failing command stops the run.

mod assign;
mod review;
mod status;

pub use assign::AssignCommand;
pub use review::ReviewCommand;
pub use status::StatusCommand;

use crate::error::{Error, Result};
use crate::status::StatusSynchronizer;
use async_trait::async_trait;
use gh_client::{IssueTracker, Reaction};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const HELP_COMMAND: &str = "/help";

const HELP_TEXT: &str = "- `/help` returns all available commands";

/// A handler for one slash command
#[async_trait]
pub trait SlashCommand: Send + Sync {
    /// Run the command for pull request `pull_number` on behalf of `actor`
    async fn execute(&self, pull_number: u64, actor: &str, args: &[&str]) -> Result<()>;

    /// One markdown list entry describing the command
    fn help(&self) -> String;
}

/// One command line of a comment body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub name: &'a str,
    pub args: Vec<&'a str>,
}

/// Extract the command lines of a comment body
///
/// The name runs up to the first space; whatever follows is split on `,`.
/// Trailing whitespace (including a `\r` left by CRLF bodies) is ignored.
pub fn parse_commands(body: &str) -> Vec<ParsedCommand<'_>> {
    body.lines()
        .map(str::trim_end)
        .filter(|line| line.starts_with('/'))
        .map(|line| match line.split_once(' ') {
            Some((name, rest)) if !rest.trim().is_empty() => ParsedCommand {
                name,
                args: rest.split(',').collect(),
            },
            Some((name, _)) => ParsedCommand { name, args: vec![] },
            None => ParsedCommand {
                name: line,
                args: vec![],
            },
        })
        .collect()
}

/// Turn `key=value` arguments into a map
///
/// Each argument needs exactly one `=`. Later duplicates of a key win, and
/// one pair of double quotes around a value is dropped.
pub fn convert_args(args: &[&str]) -> Result<BTreeMap<String, String>> {
    let mut result = BTreeMap::new();

    for arg in args {
        let trimmed = arg.trim();
        let mut parts = trimmed.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidArgument(arg.to_string()));
        };

        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        result.insert(key.to_string(), value.to_string());
    }

    Ok(result)
}

/// Routes comment commands to registered handlers
pub struct Dispatcher {
    tracker: Arc<dyn IssueTracker>,
    handlers: BTreeMap<String, Box<dyn SlashCommand>>,
}

impl Dispatcher {
    /// A dispatcher that only knows `/help`
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self {
            tracker,
            handlers: BTreeMap::new(),
        }
    }

    /// A dispatcher with `/assign`, `/status` and `/review` registered
    pub fn with_default_handlers(
        tracker: Arc<dyn IssueTracker>,
        synchronizer: StatusSynchronizer,
        review_status: impl Into<String>,
    ) -> Self {
        let mut dispatcher = Self::new(tracker.clone());
        dispatcher.register(
            assign::COMMAND,
            Box::new(AssignCommand::new(tracker.clone())),
        );
        dispatcher.register(
            status::COMMAND,
            Box::new(StatusCommand::new(tracker.clone(), synchronizer.clone())),
        );
        dispatcher.register(
            review::COMMAND,
            Box::new(ReviewCommand::new(tracker, synchronizer, review_status)),
        );
        dispatcher
    }

    /// Register `handler` under `name` (including the leading `/`)
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn SlashCommand>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Names of all known commands, sorted
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        if !self.handlers.contains_key(HELP_COMMAND) {
            names.push(HELP_COMMAND);
            names.sort_unstable();
        }
        names
    }

    /// Run every command found in `body`
    ///
    /// Returns how many commands ran.
    ///
    /// # Arguments
    ///
    /// * `comment_id` - Node ID of the comment, used for the reactions
    pub async fn run(
        &self,
        pull_number: u64,
        actor: &str,
        comment_id: &str,
        body: &str,
    ) -> Result<usize> {
        let commands = parse_commands(body);

        for (index, command) in commands.iter().enumerate() {
            if index == 0 {
                self.tracker.add_reaction(comment_id, Reaction::Eyes).await?;
            }

            debug!("Running {} with args {:?}", command.name, command.args);

            if let Some(handler) = self.handlers.get(command.name) {
                handler.execute(pull_number, actor, &command.args).await?;
            } else if command.name == HELP_COMMAND {
                self.post_help(pull_number, actor).await?;
            } else {
                return Err(Error::UnsupportedCommand(command.name.to_string()));
            }
        }

        // posted even when the body held no command at all
        self.tracker
            .add_reaction(comment_id, Reaction::ThumbsUp)
            .await?;

        info!(
            "Ran {} command(s) from comment {} on PR #{}",
            commands.len(),
            comment_id,
            pull_number
        );
        Ok(commands.len())
    }

    /// Help comment body listing every command
    pub fn help_comment(&self, actor: &str) -> String {
        let mut comment = format!("@{}: The following commands are available:\n", actor);

        for name in self.commands() {
            let help = match self.handlers.get(name) {
                Some(handler) => handler.help(),
                None => HELP_TEXT.to_string(),
            };
            comment.push_str(&help);
            comment.push('\n');
        }

        comment
    }

    async fn post_help(&self, pull_number: u64, actor: &str) -> Result<()> {
        let pr = self.tracker.pull_request(pull_number).await?;

        if let Err(e) = self
            .tracker
            .add_comment(&pr.id, &self.help_comment(actor))
            .await
        {
            warn!("Failed to post help on PR #{}: {}", pull_number, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pull_request, days_ago, Call, FakeTracker};
    use std::sync::Mutex;

    /// Records the invocations it receives
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<(String, Vec<String>)>>>,
        fail: bool,
    }

    #[async_trait]
    impl SlashCommand for Recorder {
        async fn execute(&self, _pull_number: u64, _actor: &str, args: &[&str]) -> Result<()> {
            self.log.lock().unwrap().push((
                self.name.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
            if self.fail {
                return Err(Error::MissingArgument("status".into()));
            }
            Ok(())
        }

        fn help(&self) -> String {
            format!("- `{}` records itself", self.name)
        }
    }

    fn dispatcher_with_recorders(
        fake: &Arc<FakeTracker>,
        failing: Option<&'static str>,
    ) -> (Dispatcher, Arc<Mutex<Vec<(String, Vec<String>)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(fake.clone());
        for name in ["/assign", "/status"] {
            dispatcher.register(
                name,
                Box::new(Recorder {
                    name,
                    log: log.clone(),
                    fail: failing == Some(name),
                }),
            );
        }
        (dispatcher, log)
    }

    fn reactions(fake: &FakeTracker) -> Vec<Reaction> {
        fake.writes()
            .into_iter()
            .filter_map(|c| match c {
                Call::Reaction { reaction, .. } => Some(reaction),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_commands() {
        let body = "Thanks!\n/assign\n\n  /not-a-command\n/status key=value\r\n/review status=Done,x=1";
        let commands = parse_commands(body);

        assert_eq!(
            commands,
            vec![
                ParsedCommand {
                    name: "/assign",
                    args: vec![]
                },
                ParsedCommand {
                    name: "/status",
                    args: vec!["key=value"]
                },
                ParsedCommand {
                    name: "/review",
                    args: vec!["status=Done", "x=1"]
                },
            ]
        );
    }

    #[test]
    fn test_parse_commands_trailing_space() {
        assert_eq!(
            parse_commands("/review "),
            vec![ParsedCommand {
                name: "/review",
                args: vec![]
            }]
        );
    }

    #[test]
    fn test_convert_args() {
        let args = convert_args(&["status=\"In Review\"", " owner=me", "status=Done"]).unwrap();
        assert_eq!(args.get("status").map(String::as_str), Some("Done"));
        assert_eq!(args.get("owner").map(String::as_str), Some("me"));

        let args = convert_args(&["status=\"In Review\""]).unwrap();
        assert_eq!(args.get("status").map(String::as_str), Some("In Review"));
    }

    #[test]
    fn test_convert_args_needs_exactly_one_equals() {
        assert!(matches!(
            convert_args(&["status"]),
            Err(Error::InvalidArgument(arg)) if arg == "status"
        ));
        assert!(matches!(
            convert_args(&["a=b=c"]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(convert_args(&[]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commands_run_in_order() {
        let fake = Arc::new(FakeTracker::default());
        let (dispatcher, log) = dispatcher_with_recorders(&fake, None);

        let ran = dispatcher
            .run(1, "octocat", "IC_1", "/assign\n/status key=value")
            .await
            .unwrap();

        assert_eq!(ran, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("/assign".to_string(), vec![]),
                ("/status".to_string(), vec!["key=value".to_string()]),
            ]
        );
        assert_eq!(reactions(&fake), vec![Reaction::Eyes, Reaction::ThumbsUp]);
    }

    #[tokio::test]
    async fn test_unknown_command_aborts() {
        let fake = Arc::new(FakeTracker::default());
        let (dispatcher, log) = dispatcher_with_recorders(&fake, None);

        let err = dispatcher
            .run(1, "octocat", "IC_1", "/assign\n/frobnicate\n/status key=value")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("/frobnicate"));
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(reactions(&fake), vec![Reaction::Eyes]);
    }

    #[tokio::test]
    async fn test_failing_handler_aborts() {
        let fake = Arc::new(FakeTracker::default());
        let (dispatcher, log) = dispatcher_with_recorders(&fake, Some("/assign"));

        let result = dispatcher
            .run(1, "octocat", "IC_1", "/assign\n/status key=value")
            .await;

        assert!(matches!(result, Err(Error::MissingArgument(_))));
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(reactions(&fake), vec![Reaction::Eyes]);
    }

    #[tokio::test]
    async fn test_body_without_commands_still_completes() {
        let fake = Arc::new(FakeTracker::default());
        let (dispatcher, _) = dispatcher_with_recorders(&fake, None);

        let ran = dispatcher
            .run(1, "octocat", "IC_1", "just a regular comment")
            .await
            .unwrap();

        assert_eq!(ran, 0);
        assert_eq!(reactions(&fake), vec![Reaction::ThumbsUp]);
    }

    #[tokio::test]
    async fn test_help_lists_every_command() {
        let fake = Arc::new(FakeTracker::default());
        fake.add_pull_request(pull_request(9, days_ago(0), vec![]));
        let (dispatcher, _) = dispatcher_with_recorders(&fake, None);

        dispatcher.run(9, "octocat", "IC_1", "/help").await.unwrap();

        let expected = "@octocat: The following commands are available:\n\
                        - `/assign` records itself\n\
                        - `/help` returns all available commands\n\
                        - `/status` records itself\n";
        assert!(fake.writes().contains(&Call::Comment {
            target: "PR_9".into(),
            body: expected.into()
        }));
        assert_eq!(dispatcher.commands(), vec!["/assign", "/help", "/status"]);
    }

    #[test]
    fn test_default_handlers_registered() {
        let fake = Arc::new(FakeTracker::default());
        let dispatcher = Dispatcher::with_default_handlers(
            fake.clone(),
            StatusSynchronizer::new(fake, false),
            "In Review",
        );
        assert_eq!(
            dispatcher.commands(),
            vec!["/assign", "/help", "/review", "/status"]
        );
    }
}
