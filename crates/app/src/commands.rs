//! Command execution.
//!
//! Each invocation builds a fresh [`Session`]. Record and search commands
//! start it first, which restores the active connection the way an
//! interactive client would on launch.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use keydesk_application::{ApplicationError, DEFAULT_PATTERN, Session};
use keydesk_domain::{
    ClientSettings, ConnectionProfile, ModelDraft, ModelProfile, Outcome, RecordDraft,
    SearchRequest,
};
use keydesk_infrastructure::{
    FileClientStateStore, FileExportSink, RestBackend, SettingsRepository, SystemClock,
};

use crate::cli::{Cli, Command, ConnectionsCommand, ModelsCommand, PutArgs, SearchArgs};
use crate::confirm::TerminalConfirmer;
use crate::error::CliError;
use crate::output;

type CliSession = Session<RestBackend, FileClientStateStore, SystemClock>;

/// Resolved inputs of one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective client settings.
    pub settings: ClientSettings,
    /// Where the last active connection is remembered.
    pub state_store: FileClientStateStore,
    /// Accept confirmations without prompting.
    pub assume_yes: bool,
}

impl Context {
    /// Loads settings from disk and the environment, then applies CLI flags.
    ///
    /// # Errors
    /// Fails if the settings file or an environment override is malformed.
    pub async fn resolve(cli: &Cli) -> Result<Self, CliError> {
        let mut settings = SettingsRepository::new().load_with_env().await?;
        if let Some(url) = &cli.api_url {
            settings.api_base_url.clone_from(url);
        }
        if let Some(dir) = &cli.export_dir {
            settings.export_dir = Some(dir.clone());
        }
        Ok(Self {
            settings,
            state_store: FileClientStateStore::default_location(),
            assume_yes: cli.yes,
        })
    }
}

/// Resolves the context for `cli` and runs its command.
///
/// # Errors
/// Returns the first error of settings resolution or the command.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let ctx = Context::resolve(&cli).await?;
    execute(cli.command, ctx, out).await
}

/// Runs one command against the configured backend.
///
/// # Errors
/// Returns the command's error; cancelled confirmations are not errors.
pub async fn execute(command: Command, ctx: Context, out: &mut impl Write) -> Result<(), CliError> {
    let backend = Arc::new(RestBackend::new(&ctx.settings)?);
    let mut session = Session::new(backend, ctx.state_store, SystemClock::new());
    let confirmer = TerminalConfirmer::new(ctx.assume_yes);

    if needs_active_connection(&command) {
        session.start().await?;
    }

    match command {
        Command::Connections { action } => connections(&mut session, action, &confirmer, out).await,
        Command::Models { action } => models(&mut session, action, &confirmer, out).await,
        Command::Keys { pattern } => {
            let keys = session.refresh_keys(pattern.as_deref()).await?;
            output::keys(out, keys)
        }
        Command::Get { key } => {
            let open = session.open_record(&key).await?;
            output::record(out, &open.record)
        }
        Command::Put(args) => {
            let draft = read_draft(args).await?;
            let kind = session.upsert(&draft).await?;
            writeln!(out, "{kind} {}", draft.key)?;
            Ok(())
        }
        Command::Rm { key } => {
            let outcome = session.delete_record(&key, &confirmer).await?;
            report(out, &outcome, &format!("deleted {key}"))
        }
        Command::Edit {
            key,
            field,
            rename,
            value,
        } => {
            session.open_record(&key).await?;
            let edit = session.begin_edit(&field)?;
            if let Some(name) = rename {
                edit.new_field = name;
            }
            if let Some(text) = value {
                edit.raw_value = text;
            }
            session.save_edit().await?;
            writeln!(out, "updated {key}")?;
            Ok(())
        }
        Command::Unset { key, field } => {
            session.open_record(&key).await?;
            let outcome = session.delete_key_value(&field, &confirmer).await?;
            report(out, &outcome, &format!("removed {field} from {key}"))
        }
        Command::AddField { key, value } => {
            session.open_record(&key).await?;
            let name = session.add_key_value()?;
            if let Some(edit) = session.pending_edit_mut() {
                edit.raw_value = value;
            }
            session.save_edit().await?;
            writeln!(out, "added {name} to {key}")?;
            Ok(())
        }
        Command::Export { pattern } => {
            let sink = FileExportSink::new(ctx.settings.export_dir_or_current());
            let location = session
                .export(pattern.as_deref().unwrap_or(DEFAULT_PATTERN), &sink)
                .await?;
            writeln!(out, "exported to {location}")?;
            Ok(())
        }
        Command::Search(args) => {
            let hits = session.run_search(search_request(args)).await?;
            output::hits(out, hits)
        }
    }
}

const fn needs_active_connection(command: &Command) -> bool {
    !matches!(command, Command::Connections { .. } | Command::Models { .. })
}

async fn connections(
    session: &mut CliSession,
    action: ConnectionsCommand,
    confirmer: &TerminalConfirmer,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match action {
        ConnectionsCommand::List => {
            session.start().await?;
            let registry = session.connections();
            output::connections(out, registry.profiles(), registry.active())
        }
        ConnectionsCommand::Save {
            name,
            host,
            port,
            password,
            db,
        } => {
            let mut profile = ConnectionProfile::new(name, host, port).with_db(db);
            if let Some(password) = password {
                profile = profile.with_password(password);
            }
            session.save_connection(&profile).await?;
            writeln!(out, "saved {}", profile.name)?;
            Ok(())
        }
        ConnectionsCommand::Use { name } => {
            session.load_connections().await?;
            let profile = session.select_connection(&name).await?;
            writeln!(out, "using {} ({})", profile.name, profile.address())?;
            Ok(())
        }
        ConnectionsCommand::Remove { name } => {
            session.start().await?;
            let outcome = session.delete_connection(&name, confirmer).await?;
            report(out, &outcome, &format!("removed {name}"))
        }
    }
}

async fn models(
    session: &mut CliSession,
    action: ModelsCommand,
    confirmer: &TerminalConfirmer,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let models = session.models_mut();
    match action {
        ModelsCommand::List => {
            models.load().await?;
            output::models(
                out,
                models.profiles(),
                models.current().map(|m| m.name.as_str()),
            )
        }
        ModelsCommand::Save {
            name,
            url,
            api_key,
            model_type,
            edit,
        } => {
            let draft = if edit {
                models.load().await?;
                let mut draft = models.view_for_edit(&name)?;
                if let Some(url) = url {
                    draft.profile.url = url;
                }
                if let Some(key) = api_key {
                    draft.profile.api_key = Some(key);
                }
                if let Some(kind) = model_type {
                    draft.profile.model_type = kind.into();
                }
                draft
            } else {
                let kind = model_type.map(Into::into).unwrap_or_default();
                let mut profile = ModelProfile::new(&name, url.unwrap_or_default(), kind);
                if let Some(key) = api_key {
                    profile = profile.with_api_key(key);
                }
                ModelDraft::create(profile)
            };
            models.save_profile(draft).await?;
            writeln!(out, "saved {name}")?;
            Ok(())
        }
        ModelsCommand::Show { name } => {
            models.load().await?;
            let draft = models.view_for_edit(&name)?;
            output::model(out, &draft.profile)
        }
        ModelsCommand::Use { name } => {
            models.load().await?;
            let current = models.select_current(&name).await?;
            writeln!(out, "current model: {}", current.name)?;
            Ok(())
        }
        ModelsCommand::Remove { name } => {
            models.load().await?;
            let outcome = models.delete_profile(&name, confirmer).await?;
            report(out, &outcome, &format!("removed {name}"))
        }
        ModelsCommand::Current => match models.load_current().await {
            Some(current) => output::model(out, current),
            None => {
                writeln!(out, "no current model")?;
                Ok(())
            }
        },
    }
}

fn search_request(args: SearchArgs) -> SearchRequest {
    let mut request = SearchRequest::new(args.collection, args.query);
    request.top_k = args.top_k;
    request.threshold = args.threshold;
    request.target = args.target.into();
    request
}

async fn read_draft(args: PutArgs) -> Result<RecordDraft, CliError> {
    let mut draft = match &args.import {
        Some(path) => RecordDraft::import(&args.key, read_text(path).await?),
        None => args
            .fields
            .into_iter()
            .fold(RecordDraft::manual(&args.key), |draft, (name, value)| {
                draft.with_field(name, value)
            }),
    };
    for path in &args.files {
        let contents = read_text(path).await?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        draft
            .attach_file(&name, &contents)
            .map_err(ApplicationError::from)?;
    }
    Ok(draft)
}

async fn read_text(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ReadFile {
            path: path.display().to_string(),
            source,
        })
}

fn report<T>(out: &mut impl Write, outcome: &Outcome<T>, done: &str) -> Result<(), CliError> {
    if outcome.is_cancelled() {
        writeln!(out, "cancelled")?;
    } else {
        writeln!(out, "{done}")?;
    }
    Ok(())
}
