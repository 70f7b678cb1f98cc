// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Line-based text protocol for address and route queries.
//!
//! Every request is a single line with a one-letter command prefix:
//!
//! - `A:<house>,<prefix>,<name>,<type>,<suffix>` - address lookup,
//!   answered with one `A:<segment>:<house> <street>:<lat>,<lon>` line per match,
//! - `R:<source>,<destination>[,<highways only: 0|1>]` - route search,
//!   answered with one `R:<segment>` line per traversed segment,
//! - `M:...` - map rendering, which is not supported.
//!
//! Failures are answered with a single `E:<message>` line.

use std::io;

use crate::{find_shortest_path_with, AddressError, AddressQuery, SearchOptions, Store};

/// Malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid address format.")]
    InvalidAddress,

    #[error("Invalid route request.")]
    InvalidRoute,

    #[error("Command not understood")]
    UnknownCommand,
}

/// Parsed protocol request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    Address(AddressQuery<'a>),
    Route {
        source: usize,
        destination: usize,
        highways_only: bool,
    },
    Map,
}

impl<'a> Request<'a> {
    /// Parses a single request line. Trailing line terminators are ignored.
    pub fn parse(line: &'a str) -> Result<Self, QueryError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(query) = line.strip_prefix("A:") {
            AddressQuery::parse(query).map(Request::Address)
        } else if let Some(query) = line.strip_prefix("R:") {
            parse_route(query)
        } else if line.starts_with("M:") {
            Ok(Request::Map)
        } else {
            Err(QueryError::UnknownCommand)
        }
    }
}

fn parse_route(query: &str) -> Result<Request<'_>, QueryError> {
    let fields: Vec<&str> = query.split(',').map(str::trim).collect();
    let index = |s: &str| s.parse::<usize>().map_err(|_| QueryError::InvalidRoute);

    let (source, destination, highways_only) = match fields.as_slice() {
        [s, d] => (index(s)?, index(d)?, false),
        [s, d, "0"] => (index(s)?, index(d)?, false),
        [s, d, "1"] => (index(s)?, index(d)?, true),
        _ => return Err(QueryError::InvalidRoute),
    };

    Ok(Request::Route {
        source,
        destination,
        highways_only,
    })
}

/// Answers protocol requests against a shared [Store].
///
/// The dispatcher only borrows the store, so any number of dispatchers
/// may serve requests from different threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    store: &'a Store,
    options: SearchOptions<'a>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            options: SearchOptions::default(),
        }
    }

    /// Sets the options used for route requests. `highways_only` is overwritten
    /// by every request.
    pub fn with_search_options(mut self, options: SearchOptions<'a>) -> Self {
        self.options = options;
        self
    }

    /// Answers a single request by writing response lines to `out`.
    ///
    /// Only I/O errors of `out` are returned; all other failures are reported
    /// to the client with an `E:` line.
    pub fn handle<W: io::Write>(&self, request: &str, out: &mut W) -> io::Result<()> {
        log::debug!("request: {:?}", request.trim_end_matches(['\r', '\n']));

        match Request::parse(request) {
            Ok(Request::Address(query)) => self.handle_address(&query, out),
            Ok(Request::Route {
                source,
                destination,
                highways_only,
            }) => self.handle_route(source, destination, highways_only, out),
            Ok(Request::Map) => writeln!(out, "E:Map rendering is not supported."),
            Err(QueryError::UnknownCommand) => writeln!(out, "{}", QueryError::UnknownCommand),
            Err(e) => writeln!(out, "E:{}", e),
        }
    }

    fn handle_address<W: io::Write>(&self, query: &AddressQuery<'_>, out: &mut W) -> io::Result<()> {
        match query.locate(self.store) {
            Ok(matches) => {
                for m in matches {
                    write!(out, "A:{}:", m.segment)?;
                    if m.house_number == 0 {
                        write!(out, "x")?;
                    } else {
                        write!(out, "{}", m.house_number)?;
                    }
                    writeln!(
                        out,
                        " {}:{},{}",
                        m.street, m.location.latitude, m.location.longitude
                    )?;
                }
                Ok(())
            }
            Err(AddressError::TooManyMatches) => writeln!(out, "E:Too many matches.  Narrow search."),
            Err(AddressError::NotFound) => writeln!(out, "E:Address not found."),
        }
    }

    fn handle_route<W: io::Write>(
        &self,
        source: usize,
        destination: usize,
        highways_only: bool,
        out: &mut W,
    ) -> io::Result<()> {
        let options = SearchOptions {
            highways_only,
            ..self.options
        };

        match find_shortest_path_with(self.store, source, destination, options) {
            Ok(Some(route)) => {
                for segment in route.segments {
                    writeln!(out, "R:{}", segment)?;
                }
                Ok(())
            }
            Ok(None) => writeln!(out, "E:No route found."),
            Err(e) => {
                log::debug!("route {} → {} failed: {}", source, destination, e);
                writeln!(out, "E:{}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar::search_tests::triangle;
    use crate::store::tests::store_from_tables;
    use crate::{
        find_shortest_path, locate, EndpointIndex, Point, RoadSegment, RouteError, StreetName,
    };

    fn answer(store: &Store, request: &str) -> String {
        let mut out = Vec::new();
        Dispatcher::new(store).handle(request, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn fowler_store() -> Store {
        let block = |lat: i32, from: i32, to: i32| RoadSegment {
            start_address_left: from + 1,
            end_address_left: to + 1,
            start_address_right: from,
            end_address_right: to,
            street: 0,
            shape: None,
            start: Point::new(lat, -82_400_000),
            end: Point::new(lat + 1000, -82_400_000),
            road_class: 41,
        };

        store_from_tables(
            &[block(28_054_000, 4100, 4198), block(28_055_000, 4200, 4298)],
            &[StreetName::new("E", "Fowler", "Ave", "")],
            &[],
        )
    }

    #[test]
    fn parse_requests() {
        assert_eq!(
            Request::parse("R:0,4\r\n"),
            Ok(Request::Route {
                source: 0,
                destination: 4,
                highways_only: false,
            })
        );
        assert_eq!(
            Request::parse("R:12,7,1"),
            Ok(Request::Route {
                source: 12,
                destination: 7,
                highways_only: true,
            })
        );
        assert_eq!(Request::parse("R:12"), Err(QueryError::InvalidRoute));
        assert_eq!(Request::parse("R:12,7,2"), Err(QueryError::InvalidRoute));
        assert_eq!(Request::parse("R:-1,7"), Err(QueryError::InvalidRoute));
        assert_eq!(Request::parse("M:whatever"), Ok(Request::Map));
        assert_eq!(Request::parse("X:1,2"), Err(QueryError::UnknownCommand));
        assert!(matches!(
            Request::parse("A:4202,E,Fowler,Ave,*\n"),
            Ok(Request::Address(AddressQuery {
                house_number: 4202,
                suffix: "*",
                ..
            }))
        ));
    }

    #[test]
    fn address_found() {
        let store = fowler_store();
        assert_eq!(
            answer(&store, "A:4202,E,Fowler,Ave,*\n"),
            "A:1:4202 E. Fowler Ave:28055000,-82400000\n"
        );
    }

    #[test]
    fn address_any_house_number() {
        let store = fowler_store();
        assert_eq!(
            answer(&store, "A:0,*,Fowl,*,*"),
            "A:0:x E. Fowler Ave:28054000,-82400000\nA:1:x E. Fowler Ave:28055000,-82400000\n"
        );
    }

    #[test]
    fn address_errors() {
        let store = fowler_store();
        assert_eq!(answer(&store, "A:4202,E,Fowler"), "E:Invalid address format.\n");
        assert_eq!(answer(&store, "A:9999,E,Fowler,Ave,*"), "E:Address not found.\n");
    }

    #[test]
    fn route() {
        let store = triangle();
        assert_eq!(answer(&store, "R:0,4"), "R:0\nR:1\nR:2\nR:4\n");
        assert_eq!(answer(&store, "R:0,4,1"), "E:No route found.\n");
        assert_eq!(answer(&store, "R:0,42"), format!("E:{}\n", RouteError::InvalidReference(42)));
        assert_eq!(answer(&store, "R:zero,four"), "E:Invalid route request.\n");
    }

    #[test]
    fn concurrent_requests() {
        let store = triangle();
        let index = EndpointIndex::new(&store);
        let dispatcher = Dispatcher::new(&store).with_search_options(SearchOptions {
            endpoint_index: Some(&index),
            ..SearchOptions::default()
        });

        let requests = [
            "R:0,4",
            "R:4,0",
            "R:1,3",
            "R:0,4,1",
            "A:0,*,Street 1,*,*",
            "A:0,*,Street 2,*,*",
            "A:5,*,Street 1,*,*",
        ];
        let run_all = || -> Vec<String> {
            requests
                .iter()
                .map(|request| {
                    let mut out = Vec::new();
                    dispatcher.handle(request, &mut out).unwrap();
                    String::from_utf8(out).unwrap()
                })
                .collect()
        };

        let expected = run_all();
        let expected_route = find_shortest_path(&store, 0, 4, false).unwrap();
        let expected_matches = locate(&store, 0, "*", "Street 1", "*", "*").unwrap();
        assert_eq!(expected[0], "R:0\nR:1\nR:2\nR:4\n");

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        (
                            run_all(),
                            find_shortest_path(&store, 0, 4, false).unwrap(),
                            locate(&store, 0, "*", "Street 1", "*", "*").unwrap(),
                        )
                    })
                })
                .collect();

            for handle in handles {
                let (answers, route, matches) = handle.join().unwrap();
                assert_eq!(answers, expected);
                assert_eq!(route, expected_route);
                assert_eq!(matches, expected_matches);
            }
        });
    }

    #[test]
    fn other_commands() {
        let store = triangle();
        assert_eq!(answer(&store, "M:0,0,100,100"), "E:Map rendering is not supported.\n");
        assert_eq!(answer(&store, "hello"), "Command not understood\n");
        assert_eq!(answer(&store, ""), "Command not understood\n");
    }
}
