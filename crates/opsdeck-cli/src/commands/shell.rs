//! Interactive dashboard shell.
//!
//! Each input line is parsed into a [`ShellCommand`]. Mutations become
//! [`StoreAction`]s dispatched through the [`SharedStore`]; everything else
//! reads snapshots, the deploy runner, or the activity log.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::{ColoredString, Colorize};
use opsdeck_application::{ActivityEvent, ActivityLog, DeployRunner, SharedStore, SimulatedProgress};
use opsdeck_core::agent::{AgentStatus, NewAgent};
use opsdeck_core::config::DeployConfig;
use opsdeck_core::notification::{NewNotification, NotificationKind};
use opsdeck_core::session::User;
use opsdeck_core::theme::ThemePatch;
use opsdeck_core::training::{NewTrainingFile, TrainingFileKind};
use opsdeck_core::{AppStore, OpsdeckError, StoreAction, StoreSnapshot};
use opsdeck_infrastructure::ConfigService;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;
use tracing::info;

const COMMANDS: &[&str] = &[
    "login",
    "logout",
    "notify",
    "notifications",
    "read",
    "clear",
    "agents",
    "add-agent",
    "toggle",
    "files",
    "add-file",
    "rm-file",
    "clear-files",
    "theme",
    "sidebar",
    "deploy",
    "status",
    "logs",
    "snapshot",
    "help",
    "quit",
];

const DEFAULT_LOG_LINES: usize = 20;

/// rustyline helper completing and hinting command names.
#[derive(Clone)]
struct ShellHelper;

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let word = line.split(' ').next().unwrap_or("");
        if !word.is_empty() && COMMANDS.contains(&word) {
            Owned(format!("{}{}", word.bright_cyan(), &line[word.len()..]))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ShellHelper {}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
enum ShellCommand {
    Store(StoreAction),
    Notifications,
    Agents,
    Files,
    Deploy,
    Status,
    Logs(usize),
    Snapshot,
    Help,
    Quit,
}

/// Splits on whitespace, keeping double-quoted runs together.
fn split_args(line: &str) -> opsdeck_core::Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err(OpsdeckError::invalid_input("unterminated quote"));
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

fn required<'a>(args: &'a [String], index: usize, usage: &str) -> opsdeck_core::Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| OpsdeckError::invalid_input(format!("usage: {}", usage)))
}

fn parse_command(line: &str) -> opsdeck_core::Result<Option<ShellCommand>> {
    let args = split_args(line)?;
    let Some((command, rest)) = args.split_first() else {
        return Ok(None);
    };

    let parsed = match command.as_str() {
        "login" => {
            let name = required(rest, 0, "login <name> [email]")?;
            let slug = name.to_lowercase().replace(' ', "-");
            let email = rest
                .get(1)
                .cloned()
                .unwrap_or_else(|| format!("{}@opsdeck.local", slug));
            ShellCommand::Store(StoreAction::SetUser {
                user: Some(User::new(format!("user-{}", slug), name, email)),
            })
        }
        "logout" => ShellCommand::Store(StoreAction::Logout),
        "notify" => {
            let usage = "notify <success|warning|error|info> <title> [message...]";
            let kind: NotificationKind = required(rest, 0, usage)?.parse()?;
            let title = required(rest, 1, usage)?;
            let message = rest.get(2..).map(|words| words.join(" ")).unwrap_or_default();
            ShellCommand::Store(StoreAction::AddNotification {
                notification: NewNotification::new(kind, title, message),
            })
        }
        "notifications" => ShellCommand::Notifications,
        "read" => ShellCommand::Store(StoreAction::MarkNotificationAsRead {
            id: required(rest, 0, "read <id>")?.to_string(),
        }),
        "clear" => ShellCommand::Store(StoreAction::ClearNotifications),
        "agents" => ShellCommand::Agents,
        "add-agent" => {
            let name = required(rest, 0, "add-agent <name> [role]")?;
            let mut agent = NewAgent::named(name);
            if let Some(role) = rest.get(1..).filter(|words| !words.is_empty()) {
                agent = agent.with_role(role.join(" "));
            }
            ShellCommand::Store(StoreAction::AddAgent { agent })
        }
        "toggle" => ShellCommand::Store(StoreAction::ToggleAgentStatus {
            id: required(rest, 0, "toggle <agent-id>")?.to_string(),
        }),
        "files" => ShellCommand::Files,
        "add-file" => {
            let usage = "add-file <pdf|url> <name> [size]";
            let kind: TrainingFileKind = required(rest, 0, usage)?.parse()?;
            let name = required(rest, 1, usage)?;
            let file = match kind {
                TrainingFileKind::Pdf => {
                    NewTrainingFile::pdf(name, rest.get(2).map(String::as_str).unwrap_or("-"))
                }
                TrainingFileKind::Url => NewTrainingFile::url(name),
            };
            ShellCommand::Store(StoreAction::AddTrainingFile { file })
        }
        "rm-file" => ShellCommand::Store(StoreAction::RemoveTrainingFile {
            id: required(rest, 0, "rm-file <id>")?.to_string(),
        }),
        "clear-files" => ShellCommand::Store(StoreAction::ClearTrainingFiles),
        "theme" => {
            let mut patch = ThemePatch::default();
            for pair in rest {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    OpsdeckError::invalid_input(format!("expected key=value, got '{}'", pair))
                })?;
                patch.set_field(key, value)?;
            }
            if patch.is_empty() {
                return Err(OpsdeckError::invalid_input("usage: theme <key>=<value>..."));
            }
            ShellCommand::Store(StoreAction::SetTheme { patch })
        }
        "sidebar" => match rest.first().map(String::as_str) {
            None => ShellCommand::Store(StoreAction::ToggleSidebar),
            Some("on") => ShellCommand::Store(StoreAction::SetSidebarCollapsed { collapsed: false }),
            Some("off") => ShellCommand::Store(StoreAction::SetSidebarCollapsed { collapsed: true }),
            Some(other) => {
                return Err(OpsdeckError::invalid_input(format!(
                    "sidebar takes on|off, got '{}'",
                    other
                )));
            }
        },
        "deploy" => ShellCommand::Deploy,
        "status" => ShellCommand::Status,
        "logs" => {
            let lines = match rest.first() {
                Some(n) => n
                    .parse()
                    .map_err(|_| OpsdeckError::invalid_input(format!("not a count: '{}'", n)))?,
                None => DEFAULT_LOG_LINES,
            };
            ShellCommand::Logs(lines)
        }
        "snapshot" => ShellCommand::Snapshot,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => {
            return Err(OpsdeckError::invalid_input(format!(
                "unknown command '{}', try 'help'",
                other
            )));
        }
    };
    Ok(Some(parsed))
}

struct Shell {
    store: SharedStore,
    runner: DeployRunner,
    deploy: DeployConfig,
    activity: ActivityLog,
    activity_rx: mpsc::UnboundedReceiver<ActivityEvent>,
}

impl Shell {
    /// Returns `false` when the shell should exit.
    async fn execute(&mut self, command: ShellCommand) -> Result<bool> {
        match command {
            ShellCommand::Store(action) => {
                let name = action.name();
                let outcome = self.store.dispatch(action).await;
                match (outcome.id, outcome.changed) {
                    (Some(id), _) => println!("{} {}", "created".green(), id),
                    (None, true) => println!("{}", "ok".green()),
                    (None, false) => println!("{}", format!("{}: no change", name).bright_black()),
                }
            }
            ShellCommand::Notifications => print_notifications(&self.store.snapshot().await),
            ShellCommand::Agents => print_agents(&self.store.snapshot().await),
            ShellCommand::Files => print_files(&self.store.snapshot().await),
            ShellCommand::Deploy => {
                let source = SimulatedProgress::from_config(&self.deploy);
                match self.runner.trigger(source) {
                    Some(_) => println!(
                        "{}",
                        "Deploy started. Use 'status' to follow progress.".cyan()
                    ),
                    None => println!("{}", "A deploy is already in progress.".yellow()),
                }
            }
            ShellCommand::Status => self.print_status().await,
            ShellCommand::Logs(lines) => {
                self.absorb_activity();
                if self.activity.is_empty() {
                    println!("{}", "No activity yet.".bright_black());
                }
                for event in self.activity.recent(lines) {
                    print_activity(event);
                }
            }
            ShellCommand::Snapshot => {
                println!("{}", serde_json::to_string_pretty(&self.store.snapshot().await)?);
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Moves queued activity into the bounded log so the channel never grows
    /// past one prompt's worth of events.
    fn absorb_activity(&mut self) -> usize {
        self.activity.drain_from(&mut self.activity_rx)
    }

    async fn print_status(&self) {
        let snapshot = self.store.snapshot().await;
        let user = match snapshot.session.user() {
            Some(user) => format!("{} <{}>", user.name, user.email),
            None => "not signed in".to_string(),
        };
        let deploy = self.runner.status();
        let theme = &snapshot.theme;

        println!("{:<14}{}", "user", user);
        println!(
            "{:<14}{} ({} unread)",
            "notifications",
            snapshot.notifications.len(),
            snapshot.unread_count
        );
        println!("{:<14}{}", "agents", snapshot.agents.len());
        println!("{:<14}{}", "files", snapshot.training_files.len());
        println!(
            "{:<14}{}",
            "sidebar",
            if snapshot.sidebar_collapsed { "collapsed" } else { "expanded" }
        );
        println!(
            "{:<14}primary {} accent {} background {}{}{}",
            "theme",
            theme.primary_color,
            theme.accent_color,
            theme.background_color,
            if theme.dark_mode { ", dark" } else { ", light" },
            if theme.compact_mode { ", compact" } else { "" },
        );
        println!("{:<14}{} {:.0}%", "deploy", deploy.phase, deploy.progress);
        println!("{:<14}{}", "revision", snapshot.revision);
    }
}

fn print_notifications(snapshot: &StoreSnapshot) {
    if snapshot.notifications.is_empty() {
        println!("{}", "No notifications.".bright_black());
        return;
    }
    for note in &snapshot.notifications {
        let marker = if note.read { " " } else { "*" };
        let kind = match note.kind {
            NotificationKind::Success => note.kind.as_str().green(),
            NotificationKind::Warning => note.kind.as_str().yellow(),
            NotificationKind::Error => note.kind.as_str().red(),
            NotificationKind::Info => note.kind.as_str().blue(),
        };
        println!(
            "{} {:<8} {} {}  {}",
            marker,
            kind,
            note.id.bright_black(),
            note.title.bold(),
            note.message
        );
    }
}

fn status_label(status: AgentStatus) -> ColoredString {
    match status {
        AgentStatus::Online => status.as_str().green(),
        AgentStatus::Offline => status.as_str().bright_black(),
        AgentStatus::Learning => status.as_str().yellow(),
        AgentStatus::Deploying => status.as_str().cyan(),
    }
}

fn print_agents(snapshot: &StoreSnapshot) {
    if snapshot.agents.is_empty() {
        println!("{}", "No agents.".bright_black());
        return;
    }
    for agent in &snapshot.agents {
        println!(
            "{:<38} {:<16} {:<10} {}",
            agent.id,
            agent.name.bold(),
            status_label(agent.status),
            agent.role
        );
    }
}

fn print_files(snapshot: &StoreSnapshot) {
    if snapshot.training_files.is_empty() {
        println!("{}", "No training files.".bright_black());
        return;
    }
    for file in &snapshot.training_files {
        println!("{:<38} {:<4} {:<8} {}", file.id, file.kind, file.size, file.name);
    }
}

fn print_activity(event: &ActivityEvent) {
    let level = match event.level.as_str() {
        "ERROR" => event.level.red(),
        "WARN" => event.level.yellow(),
        "INFO" => event.level.green(),
        _ => event.level.bright_black(),
    };
    let fields = event
        .fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{} {:<5} {} {}",
        event.timestamp.format("%H:%M:%S").to_string().bright_black(),
        level,
        event.message,
        fields.bright_black()
    );
}

fn print_help() {
    let rows = [
        ("login <name> [email]", "sign in"),
        ("logout", "sign out"),
        ("notify <kind> <title> [message]", "add a notification"),
        ("notifications", "list notifications (* = unread)"),
        ("read <id>", "mark a notification as read"),
        ("clear", "remove all notifications"),
        ("agents", "list agents"),
        ("add-agent <name> [role]", "add an agent"),
        ("toggle <id>", "toggle an agent online/offline"),
        ("files", "list training files"),
        ("add-file <pdf|url> <name> [size]", "add a training file"),
        ("rm-file <id>", "remove a training file"),
        ("clear-files", "remove all training files"),
        ("theme <key>=<value>...", "update theme settings"),
        ("sidebar [on|off]", "toggle, show or hide the sidebar"),
        ("deploy", "start a simulated deploy"),
        ("status", "dashboard summary"),
        ("logs [n]", "recent activity"),
        ("snapshot", "print the store as JSON"),
        ("quit", "exit"),
    ];
    for (usage, about) in rows {
        println!("  {:<34}{}", usage.bright_cyan(), about);
    }
}

pub async fn run(
    config: &ConfigService,
    activity_rx: mpsc::UnboundedReceiver<ActivityEvent>,
) -> Result<()> {
    let root = config.get_config();
    let store = SharedStore::new(AppStore::new(root.store));
    let runner = DeployRunner::new(&root.deploy).with_store(store.clone());
    let mut shell = Shell {
        store,
        runner,
        deploy: root.deploy,
        activity: ActivityLog::new(root.activity.capacity),
        activity_rx,
    };
    info!("shell started");

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ShellHelper));

    println!("{}", "=== OPSDECK ===".bright_magenta().bold());
    println!("{}", "Type 'help' for commands, 'quit' to exit.".bright_black());
    println!();

    loop {
        shell.absorb_activity();
        let unread = shell.store.latest().unread_count;
        let prompt = if unread > 0 {
            format!("opsdeck ({})> ", unread)
        } else {
            "opsdeck> ".to_string()
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match parse_command(trimmed) {
                    Ok(Some(command)) => {
                        if !shell.execute(command).await? {
                            println!("{}", "Goodbye!".bright_green());
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    shell.runner.cancel();
    info!("shell stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_action(line: &str) -> StoreAction {
        match parse_command(line).unwrap() {
            Some(ShellCommand::Store(action)) => action,
            other => panic!("expected a store action, got {:?}", other),
        }
    }

    #[test]
    fn test_split_args_respects_quotes() {
        assert_eq!(
            split_args(r#"notify info "Build done" all green"#).unwrap(),
            vec!["notify", "info", "Build done", "all", "green"]
        );
        assert_eq!(split_args(r#"x """#).unwrap(), vec!["x", ""]);
        assert!(split_args(r#"notify "open"#).is_err());
    }

    #[test]
    fn test_blank_line_is_no_command() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_login_fills_defaults() {
        let StoreAction::SetUser { user: Some(user) } = store_action("login Ada") else {
            panic!("expected set_user");
        };
        assert_eq!(user.name, "Ada");
        assert_eq!(user.id, "user-ada");
        assert_eq!(user.email, "ada@opsdeck.local");
    }

    #[test]
    fn test_notify_joins_message() {
        assert_eq!(
            store_action("notify warn Disk almost full"),
            StoreAction::AddNotification {
                notification: NewNotification::new(NotificationKind::Warning, "Disk", "almost full"),
            }
        );
        assert!(parse_command("notify loud x").is_err());
        assert!(parse_command("notify info").is_err());
    }

    #[test]
    fn test_add_agent_with_role() {
        assert_eq!(
            store_action("add-agent Charlie Lead analyst"),
            StoreAction::AddAgent {
                agent: NewAgent::named("Charlie").with_role("Lead analyst"),
            }
        );
        assert_eq!(
            store_action("add-agent Delta"),
            StoreAction::AddAgent {
                agent: NewAgent::named("Delta"),
            }
        );
    }

    #[test]
    fn test_add_file_kinds() {
        assert_eq!(
            store_action("add-file pdf guide.pdf 2.4MB"),
            StoreAction::AddTrainingFile {
                file: NewTrainingFile::pdf("guide.pdf", "2.4MB"),
            }
        );
        assert_eq!(
            store_action("add-file url https://example.com/docs"),
            StoreAction::AddTrainingFile {
                file: NewTrainingFile::url("https://example.com/docs"),
            }
        );
    }

    #[test]
    fn test_theme_patch() {
        let StoreAction::SetTheme { patch } = store_action("theme primary=#000000 dark=off") else {
            panic!("expected set_theme");
        };
        assert_eq!(patch.primary_color.as_deref(), Some("#000000"));
        assert_eq!(patch.dark_mode, Some(false));
        assert_eq!(patch.accent_color, None);

        assert!(parse_command("theme").is_err());
        assert!(parse_command("theme dark").is_err());
    }

    #[test]
    fn test_sidebar_variants() {
        assert_eq!(store_action("sidebar"), StoreAction::ToggleSidebar);
        assert_eq!(
            store_action("sidebar off"),
            StoreAction::SetSidebarCollapsed { collapsed: true }
        );
        assert!(parse_command("sidebar sideways").is_err());
    }

    #[test]
    fn test_non_store_commands() {
        assert_eq!(parse_command("logs").unwrap(), Some(ShellCommand::Logs(DEFAULT_LOG_LINES)));
        assert_eq!(parse_command("logs 5").unwrap(), Some(ShellCommand::Logs(5)));
        assert!(parse_command("logs many").is_err());
        assert_eq!(parse_command("exit").unwrap(), Some(ShellCommand::Quit));
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test]
    async fn test_execute_routes_to_store() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let store = SharedStore::new(AppStore::default());
        let mut shell = Shell {
            store: store.clone(),
            runner: DeployRunner::new(&DeployConfig::default()),
            deploy: DeployConfig::default(),
            activity: ActivityLog::new(10),
            activity_rx: rx,
        };

        for line in ["toggle 1", "add-agent Charlie", "notify info Hello"] {
            let command = parse_command(line).unwrap().unwrap();
            assert!(shell.execute(command).await.unwrap());
        }

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.agents.len(), 3);
        assert_eq!(snapshot.agents[0].name, "Charlie");
        assert_eq!(snapshot.agent("1").unwrap().status, AgentStatus::Offline);
        assert_eq!(snapshot.unread_count, 1);

        assert!(!shell.execute(ShellCommand::Quit).await.unwrap());
    }

    #[test]
    fn test_absorb_activity_keeps_log_bounded() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shell = Shell {
            store: SharedStore::default(),
            runner: DeployRunner::new(&DeployConfig::default()),
            deploy: DeployConfig::default(),
            activity: ActivityLog::new(2),
            activity_rx: rx,
        };

        for i in 0..5 {
            tx.send(ActivityEvent {
                target: "opsdeck_core::store".to_string(),
                level: "INFO".to_string(),
                message: format!("event {}", i),
                fields: Default::default(),
                timestamp: Default::default(),
            })
            .unwrap();
        }

        assert_eq!(shell.absorb_activity(), 5);
        assert_eq!(shell.absorb_activity(), 0);
        assert_eq!(shell.activity.len(), 2);
        let kept: Vec<_> = shell.activity.entries().map(|e| e.message.clone()).collect();
        assert_eq!(kept, vec!["event 3", "event 4"]);
    }
}
