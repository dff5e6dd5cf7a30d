use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crafting::{
    compile_catalog_path, minecraft_catalog, read_snapshot, resolve_defs_path,
    write_snapshot_atomic, ActionId, Catalog, CraftingState, StepOutcome,
};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_MAX_STEPS: u32 = 1_000;

/// Options shared by every subcommand. Unset fields fall back to the run script,
/// then to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub defs: Option<PathBuf>,
    pub max_steps: Option<u32>,
    pub load: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    List,
    Run { actions: Vec<String> },
    Script { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs {
    Help,
    Command {
        kind: CommandKind,
        config: SessionConfig,
    },
}

/// `{"max_steps": 10, "actions": ["collect_wood", "3"]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunScript {
    #[serde(default)]
    pub max_steps: Option<u32>,
    pub actions: Vec<String>,
}

pub fn parse_args(args: &[String]) -> Result<ParsedArgs, String> {
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        return Ok(ParsedArgs::Help);
    }

    let mut config = SessionConfig::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--defs" => {
                config.defs = Some(PathBuf::from(flag_value(args, index, "--defs")?));
                index += 2;
            }
            "--max-steps" => {
                let value = flag_value(args, index, "--max-steps")?;
                config.max_steps = Some(value.parse::<u32>().map_err(|_| {
                    format!("invalid --max-steps value '{value}' (expected u32)")
                })?);
                index += 2;
            }
            "--load" => {
                config.load = Some(PathBuf::from(flag_value(args, index, "--load")?));
                index += 2;
            }
            "--save" => {
                config.save = Some(PathBuf::from(flag_value(args, index, "--save")?));
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "list" => {
            if !command_args.is_empty() {
                return Err("list takes no arguments".to_string());
            }
            CommandKind::List
        }
        "run" => {
            if command_args.is_empty() {
                return Err("run requires at least one action".to_string());
            }
            CommandKind::Run {
                actions: command_args.to_vec(),
            }
        }
        "script" => match command_args {
            [path] => CommandKind::Script {
                path: PathBuf::from(path),
            },
            [] => return Err("script requires a file path".to_string()),
            _ => return Err("script takes exactly one file path".to_string()),
        },
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    Ok(ParsedArgs::Command { kind, config })
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

pub fn parse_run_script(raw: &str) -> Result<RunScript, String> {
    let deserializer = &mut serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(deserializer)
        .map_err(|error| format!("invalid run script at {}: {}", error.path(), error.inner()))
}

pub fn usage_text() -> String {
    [
        "crafting - step through crafting worlds",
        "",
        "Usage:",
        "  crafting [--defs <path>] list",
        "  crafting [--defs <path>] [--max-steps <u32>] [--load <file>] [--save <file>] run <action>...",
        "  crafting [--defs <path>] [--max-steps <u32>] [--load <file>] [--save <file>] script <file.json>",
        "",
        "Actions are catalog indices or transformation names.",
        "Without --defs, CRAFTING_DEFS is used; without either, the built-in Minecraft catalog.",
        "",
        "Defaults:",
        "  --max-steps 1000",
    ]
    .join("\n")
}

/// Loads the catalog named by `--defs`, `CRAFTING_DEFS`, or the Minecraft default.
pub fn load_catalog(config: &SessionConfig) -> Result<Catalog, String> {
    let defs = resolve_defs_path(config.defs.as_deref()).map_err(|error| error.to_string())?;
    match defs {
        Some(path) => compile_catalog_path(&path).map_err(|error| error.to_string()),
        None => minecraft_catalog().map_err(|error| error.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRecord {
    pub step: u32,
    pub action: ActionId,
    pub outcome: StepOutcome,
}

/// A state being driven through a catalog, stopping at a step limit.
pub struct Session<'a> {
    catalog: &'a Catalog,
    state: CraftingState,
    steps: u32,
    max_steps: u32,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a Catalog, state: CraftingState, max_steps: u32) -> Self {
        Self {
            catalog,
            state,
            steps: 0,
            max_steps,
        }
    }

    pub fn state(&self) -> &CraftingState {
        &self.state
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_truncated(&self) -> bool {
        self.steps >= self.max_steps
    }

    /// Index or transformation name.
    pub fn resolve(&self, action: &str) -> Result<ActionId, String> {
        if let Ok(index) = action.parse::<u32>() {
            let id = ActionId(index);
            return match self.catalog.get(id) {
                Some(_) => Ok(id),
                None => Err(format!(
                    "action index {index} is out of range (catalog has {} actions)",
                    self.catalog.len()
                )),
            };
        }
        self.catalog
            .find(action)
            .ok_or_else(|| format!("unknown action '{action}'"))
    }

    /// `None` once the step limit is reached; invalid actions still count as steps.
    pub fn step(&mut self, action: ActionId) -> Result<Option<StepRecord>, String> {
        if self.is_truncated() {
            return Ok(None);
        }
        let outcome = self
            .catalog
            .step(&mut self.state, action)
            .map_err(|error| error.to_string())?;
        self.steps += 1;
        Ok(Some(StepRecord {
            step: self.steps,
            action,
            outcome,
        }))
    }
}

pub fn run<W: Write>(kind: CommandKind, config: SessionConfig, out: &mut W) -> Result<(), String> {
    let catalog = load_catalog(&config)?;
    match kind {
        CommandKind::List => write_listing(&catalog, out),
        CommandKind::Run { actions } => {
            let max_steps = config.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
            play(&catalog, &config, &actions, max_steps, out)
        }
        CommandKind::Script { path } => {
            let raw = fs::read_to_string(&path).map_err(|error| {
                format!("failed to read script file '{}': {error}", path.display())
            })?;
            let script = parse_run_script(&raw)?;
            let max_steps = config
                .max_steps
                .or(script.max_steps)
                .unwrap_or(DEFAULT_MAX_STEPS);
            play(&catalog, &config, &script.actions, max_steps, out)
        }
    }
}

fn write_listing<W: Write>(catalog: &Catalog, out: &mut W) -> Result<(), String> {
    for (index, transformation) in catalog.transformations().iter().enumerate() {
        let line = match transformation.explicit_name() {
            Some(name) => format!("{index:>4}  {name}  {transformation}"),
            None => format!("{index:>4}  {transformation}"),
        };
        writeln!(out, "{line}").map_err(write_error)?;
    }
    Ok(())
}

fn play<W: Write>(
    catalog: &Catalog,
    config: &SessionConfig,
    actions: &[String],
    max_steps: u32,
    out: &mut W,
) -> Result<(), String> {
    let state = match &config.load {
        Some(path) => read_snapshot(path, catalog.world()).map_err(|error| error.to_string())?,
        None => catalog.new_state(),
    };
    let mut session = Session::new(catalog, state, max_steps);
    info!(
        actions = actions.len(),
        max_steps,
        transformations = catalog.len(),
        "session_started"
    );

    for action in actions {
        if session.is_truncated() {
            info!(steps = session.steps(), max_steps, "session_truncated");
            writeln!(out, "truncated after {} steps", session.steps()).map_err(write_error)?;
            break;
        }
        let id = session.resolve(action)?;
        let Some(record) = session.step(id)? else {
            break;
        };
        let name = catalog
            .get(record.action)
            .map(|transformation| transformation.name())
            .unwrap_or_default();
        let outcome = match record.outcome {
            StepOutcome::Applied => "applied",
            StepOutcome::Invalid => "invalid",
        };
        writeln!(out, "step {}: {name} -> {outcome}", record.step).map_err(write_error)?;
    }

    write_summary(catalog, session.state(), out)?;
    if let Some(path) = &config.save {
        write_snapshot_atomic(path, catalog.world(), session.state())
            .map_err(|error| error.to_string())?;
        writeln!(out, "saved {}", path.display()).map_err(write_error)?;
    }
    Ok(())
}

fn write_summary<W: Write>(
    catalog: &Catalog,
    state: &CraftingState,
    out: &mut W,
) -> Result<(), String> {
    let world = catalog.world();
    let zone = state
        .current_zone_slot()
        .and_then(|slot| world.zone_from_slot(slot))
        .map(|zone| zone.name().to_string())
        .unwrap_or_else(|| "-".to_string());
    writeln!(out, "zone: {zone}").map_err(write_error)?;

    let held = state
        .player_inventory()
        .iter()
        .enumerate()
        .filter(|(_, amount)| **amount != 0)
        .filter_map(|(slot, &amount)| {
            world
                .item_from_slot(slot)
                .map(|item| format!("{}[{amount}]", item.name()))
        })
        .collect::<Vec<_>>();
    writeln!(out, "inventory: {}", held.join(",")).map_err(write_error)
}

fn write_error(error: std::io::Error) -> String {
    format!("failed to write output: {error}")
}
