//! Command-line probe for the note graph core.
//!
//! # Responsibility
//! - Load configuration from `NOTEGRAPH_*` environment variables.
//! - Drive core operations with plain-text, deterministic output.
//!
//! Exit status is non-zero on usage, configuration, or graph errors.

use log::error;
use notegraph_core::{AppConfig, GraphError, NewNote, Note, NoteGraph, NoteId};
use std::process::ExitCode;

const USAGE: &str = "usage: notegraph <command> [args]
commands:
  ping
  add <title> [importance]
  link <parent_id> <child_id>
  unlink <link_id>
  show <note_id>
  ancestors <note_id>
  descendants <note_id>
  delete <note_id>
  list [offset] [limit]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let Some((command, rest)) = args.split_first() else {
        return Err(USAGE.to_string());
    };
    if command == "ping" {
        println!("notegraph_core ping={}", notegraph_core::ping());
        println!("notegraph_core version={}", notegraph_core::core_version());
        return Ok(());
    }

    let config = AppConfig::from_env().map_err(|err| err.to_string())?;
    notegraph_core::init_logging(&config.logging)?;
    let graph = NoteGraph::open(&config.store).map_err(describe)?;

    match (command.as_str(), rest) {
        ("add", [title]) => print_note(&graph.create_note(NewNote::new(title)).map_err(describe)?),
        ("add", [title, importance]) => {
            let importance = importance
                .parse::<u8>()
                .map_err(|_| format!("invalid importance `{importance}`"))?;
            let input = NewNote::new(title).with_importance(importance);
            print_note(&graph.create_note(input).map_err(describe)?);
        }
        ("link", [parent, child]) => {
            let link = graph
                .create_link(parse_id(parent)?, parse_id(child)?)
                .map_err(describe)?;
            println!("link {} {} -> {}", link.id, link.parent_id, link.child_id);
        }
        ("unlink", [link_id]) => {
            println!("{}", graph.delete_link(parse_id(link_id)?).map_err(describe)?);
        }
        ("show", [note_id]) => {
            let view = graph
                .get_note_with_relations(parse_id(note_id)?)
                .map_err(describe)?
                .ok_or_else(|| format!("note not found: {note_id}"))?;
            print_note(&view.note);
            for parent in &view.parents {
                println!("  parent {} {}", parent.id, parent.title);
            }
            for child in &view.children {
                println!("  child {} {}", child.id, child.title);
            }
        }
        ("ancestors", [note_id]) => {
            for note in graph.ancestors(parse_id(note_id)?).map_err(describe)? {
                print_note(&note);
            }
        }
        ("descendants", [note_id]) => {
            for note in graph.descendants(parse_id(note_id)?).map_err(describe)? {
                print_note(&note);
            }
        }
        ("delete", [note_id]) => {
            println!("{}", graph.delete_note(parse_id(note_id)?).map_err(describe)?);
        }
        ("list", paging) if paging.len() <= 2 => {
            let offset = match paging.first() {
                Some(value) => value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid offset `{value}`"))?,
                None => 0,
            };
            let limit = match paging.get(1) {
                Some(value) => Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("invalid limit `{value}`"))?,
                ),
                None => None,
            };
            for summary in graph.list_notes(offset, limit).map_err(describe)? {
                println!("{} {}", summary.id, summary.title);
            }
        }
        _ => return Err(USAGE.to_string()),
    }
    Ok(())
}

fn parse_id(value: &str) -> Result<NoteId, String> {
    value
        .parse::<NoteId>()
        .map_err(|_| format!("invalid id `{value}`"))
}

fn print_note(note: &Note) {
    match note.importance {
        Some(importance) => println!("{} {} [{}]", note.id, note.title, importance),
        None => println!("{} {}", note.id, note.title),
    }
}

fn describe(err: GraphError) -> String {
    match err {
        GraphError::Cycle { .. } => format!("rejected: {err}"),
        other => other.to_string(),
    }
}
