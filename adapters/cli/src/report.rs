use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::Result;
use dot_merge_core::{Cell, CellCoord, Event, SessionState};
use dot_merge_session::GameSession;
use serde::Serialize;

/// Writes session events and the final summary to stdout.
#[derive(Debug)]
pub(crate) struct Reporter {
    json: bool,
}

#[derive(Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record<'a> {
    Event { frame: u64, event: &'a Event },
    Summary(Summary),
}

#[derive(Serialize)]
struct Summary {
    state: SessionState,
    score: u64,
    target_score: u64,
    remaining_ms: u128,
    frames: u64,
}

impl Reporter {
    pub(crate) const fn new(json: bool) -> Self {
        Self { json }
    }

    pub(crate) fn events(&self, frame: u64, events: &[Event]) -> Result<()> {
        let mut stdout = io::stdout().lock();
        for event in events {
            if self.json {
                let record = Record::Event { frame, event };
                writeln!(stdout, "{}", serde_json::to_string(&record)?)?;
            } else if let Some(line) = describe(event) {
                writeln!(stdout, "[{frame:>5}] {line}")?;
            }
        }
        Ok(())
    }

    pub(crate) fn summary(&self, session: &GameSession, frames: u64) -> Result<()> {
        let mut stdout = io::stdout().lock();
        let summary = Summary {
            state: session.state(),
            score: session.score(),
            target_score: session.config().target_score,
            remaining_ms: session.remaining_time().as_millis(),
            frames,
        };
        if self.json {
            writeln!(
                stdout,
                "{}",
                serde_json::to_string(&Record::Summary(summary))?
            )?;
            return Ok(());
        }

        writeln!(stdout)?;
        write!(stdout, "{}", render_grid(session))?;
        writeln!(
            stdout,
            "state {:?}, score {}/{}, {} left after {} frames",
            summary.state,
            summary.score,
            summary.target_score,
            seconds(session.remaining_time()),
            summary.frames
        )?;
        Ok(())
    }
}

/// One line per grid-changing or lifecycle event. Highlight events are skipped.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::Removed { cell } => format!("removed {}", coord(*cell)),
        Event::Moved { from, to, color } => {
            format!("moved {} -> {} ({})", coord(*from), coord(*to), symbol(color.get()))
        }
        Event::Spawned { cell, color } => {
            format!("spawned {} ({})", coord(*cell), symbol(color.get()))
        }
        Event::ScoreChanged { score } => format!("score {score}"),
        Event::TimeChanged { .. } => return None,
        Event::StateChanged { state } => format!("state {state:?}"),
        Event::DotSelected { .. } | Event::DotDeselected { .. } => return None,
    };
    Some(line)
}

/// Renders the grid top row first, one letter per color and `.` for empty.
fn render_grid(session: &GameSession) -> String {
    let grid = session.grid();
    let mut rendered = String::new();
    for row in (0..grid.rows()).rev() {
        for column in 0..grid.columns() {
            let glyph = match grid.get(CellCoord::new(column, row)) {
                Ok(Cell::Occupied(color)) => symbol(color.get()),
                Ok(Cell::Empty) | Err(_) => '.',
            };
            rendered.push(glyph);
        }
        rendered.push('\n');
    }
    rendered
}

fn symbol(color: u8) -> char {
    char::from(b'A'.saturating_add(color))
}

fn coord(cell: CellCoord) -> String {
    format!("({},{})", cell.column(), cell.row())
}

fn seconds(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_merge_core::{ColorId, SessionConfig};

    #[test]
    fn highlight_and_clock_events_are_quiet() {
        assert_eq!(
            describe(&Event::DotSelected {
                cell: CellCoord::new(0, 0)
            }),
            None
        );
        assert_eq!(
            describe(&Event::TimeChanged {
                remaining: Duration::from_secs(3)
            }),
            None
        );
        assert_eq!(
            describe(&Event::Moved {
                from: CellCoord::new(1, 4),
                to: CellCoord::new(1, 0),
                color: ColorId::new(2),
            })
            .as_deref(),
            Some("moved (1,4) -> (1,0) (C)")
        );
    }

    #[test]
    fn grid_renders_top_row_first() {
        let mut session = GameSession::configure(SessionConfig {
            width: 3,
            height: 2,
            ..SessionConfig::default()
        })
        .expect("valid config");
        let mut events = Vec::new();
        session.start_round(&mut events);

        let rendered = render_grid(&session);

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.len() == 3));
        let bottom_left = session
            .grid()
            .get(CellCoord::new(0, 0))
            .ok()
            .and_then(Cell::color)
            .map(|color| symbol(color.get()));
        assert_eq!(lines[1].chars().next(), bottom_left);
    }

    #[test]
    fn json_records_are_tagged() {
        let event = Event::ScoreChanged { score: 40 };
        let record = Record::Event {
            frame: 3,
            event: &event,
        };
        let encoded = serde_json::to_string(&record).expect("serializes");
        assert_eq!(
            encoded,
            r#"{"record":"event","frame":3,"event":{"ScoreChanged":{"score":40}}}"#
        );
    }
}
