use std::{env, path::PathBuf, sync::Arc};

use clap::Parser;
use cli::{Args, Commands};
use commands::{
    build_query, create_entry, create_term, list_entries, open_context, print_entry,
    print_listing, print_map, print_sql, show_entry, update_options, ListRequest,
};
use error::CliResult;
use events::spawn_event_handler;
use folio_config::{
    config::{config_path, generate_default_config, set_config_path},
    Config,
};
use folio_events::{ChannelSink, EventSinkHandle};
use logging::setup_logging;
use tracing::info;
use utils::{print_json, COLOR};

mod args;
mod cli;
mod commands;
mod error;
mod events;
mod logging;
mod utils;

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args)?;

    if args.no_color {
        if let Ok(mut color) = COLOR.write() {
            *color = false;
        }
    }

    if let Some(ref c) = args.config {
        let path = PathBuf::from(c);
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()?.join(path)
        };
        set_config_path(path);
    }

    match args.command {
        Commands::DefConfig => {
            generate_default_config()?;
        }
        Commands::Config => {
            let config = Config::new()?;
            info!("# {}", config_path().display());
            info!("{}", config.to_toml()?);
        }
        command => {
            let config = Config::new()?;
            let (sink, receiver) = ChannelSink::new();
            let events: EventSinkHandle = Arc::new(sink);
            let guard = spawn_event_handler(receiver);
            let db_path = args
                .db
                .map(PathBuf::from)
                .unwrap_or_else(|| config.get_db_path());
            let ctx = open_context(&config, Some(db_path.clone()), events)?;

            match command {
                Commands::Init => {
                    info!("Content tables ready in {}", db_path.display());
                }
                Commands::List {
                    kind,
                    status,
                    any_status,
                    fields,
                    attrs,
                    order,
                    order_field,
                    numeric,
                    page,
                    per_page,
                    sql,
                } => {
                    let request = ListRequest {
                        kind,
                        status,
                        any_status,
                        fields,
                        attrs,
                        order,
                        order_field,
                        numeric,
                        page,
                        per_page,
                    };
                    if sql {
                        print_sql(&build_query(&ctx, &request)?);
                    } else {
                        print_listing(&list_entries(&ctx, &request)?, args.json);
                    }
                }
                Commands::Show {
                    id,
                    taxonomy,
                    kind,
                } => {
                    let entry = show_entry(&ctx, id, &kind, taxonomy.as_deref())?;
                    print_entry(&entry, args.json);
                }
                Commands::Create {
                    kind,
                    title,
                    attrs,
                    fields,
                } => {
                    let entry = create_entry(&ctx, &kind, title.as_deref(), &attrs, &fields)?;
                    if args.json {
                        print_json(&entry);
                    }
                }
                Commands::Term {
                    name,
                    taxonomy,
                    description,
                } => {
                    let entry = create_term(&ctx, &name, &taxonomy, description.as_deref())?;
                    if args.json {
                        print_json(&entry);
                    }
                }
                Commands::Options {
                    pairs,
                    unset,
                } => {
                    let options = update_options(&ctx, &pairs, &unset)?;
                    if args.json {
                        print_json(&serde_json::Value::Object(options));
                    } else {
                        print_map("options", &options);
                    }
                }
                Commands::DefConfig | Commands::Config => unreachable!(),
            }

            // The context holds the event sender; drop it so the handler drains and exits.
            drop(ctx);
            guard.finish();
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
