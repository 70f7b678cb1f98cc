// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use roadquery;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct StoreLoadError(PathBuf, #[source] roadquery::LoadError);

#[derive(Parser)]
struct Cli {
    /// Directory with segments.dat, names.dat and chains.dat
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Compression of the data files
    #[arg(long, value_enum, default_value_t = roadquery::Compression::Auto)]
    compression: roadquery::Compression,

    /// Log more details; may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find segments with the given address, e.g. "4202,E,Fowler,Ave,*"
    Address { query: String },

    /// Find the fastest route between two segments
    Route {
        source: usize,
        destination: usize,

        /// Only use interstate highways
        #[arg(long)]
        highways_only: bool,

        /// Route far-away segments over the closest interstate highways
        #[arg(long)]
        via_highways: bool,

        /// Maximum number of expanded search nodes
        #[arg(long, default_value_t = roadquery::DEFAULT_STEP_LIMIT)]
        step_limit: usize,
    },

    /// Answer protocol requests read line-by-line from the standard input
    Serve,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    let store = load_store(&cli.data_dir, cli.compression)?;

    match cli.command {
        Command::Address { query } => {
            let query = roadquery::AddressQuery::parse(&query)?;
            for m in query.locate(&store)? {
                println!(
                    "{}: {} {} ({}, {})",
                    m.segment, m.house_number, m.street, m.location.latitude, m.location.longitude
                );
            }
        }

        Command::Route {
            source,
            destination,
            highways_only,
            via_highways,
            step_limit,
        } => {
            let index = roadquery::EndpointIndex::new(&store);
            let options = roadquery::SearchOptions {
                highways_only,
                step_limit,
                endpoint_index: Some(&index),
            };

            let route = if via_highways {
                roadquery::find_route_via_highways(&store, source, destination, options)?
            } else {
                roadquery::find_shortest_path_with(&store, source, destination, options)?
            };

            match route {
                Some(route) => {
                    for &segment in &route.segments {
                        if let Some(description) = store.describe_segment(segment) {
                            println!("{:>8} {}", segment, description);
                        }
                    }
                    println!("Estimated time: {:.1} min", route.cost * 60.0);
                }
                None => println!("No route found."),
            }
        }

        Command::Serve => {
            let index = roadquery::EndpointIndex::new(&store);
            let dispatcher = roadquery::query::Dispatcher::new(&store).with_search_options(
                roadquery::SearchOptions {
                    endpoint_index: Some(&index),
                    ..Default::default()
                },
            );

            let mut out = io::stdout().lock();
            for line in io::stdin().lock().lines() {
                dispatcher.handle(&line?, &mut out)?;
                out.flush()?;
            }
        }
    }

    Ok(())
}

fn load_store(dir: &Path, compression: roadquery::Compression) -> Result<roadquery::Store, StoreLoadError> {
    let options = roadquery::LoadOptions { compression };
    roadquery::Store::load_dir(dir, &options).map_err(|e| StoreLoadError(dir.to_path_buf(), e))
}
