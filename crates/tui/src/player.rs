use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use replay_lens_core::ReplayState;
use replay_lens_protocol::{IncrementalSnapshotRecord, RecordData, Segment};

/// Document extent covered by every frame, in CSS pixels.
fn document_extent(frames: &[ReplayState]) -> (f64, f64) {
    frames
        .iter()
        .filter_map(|f| {
            let (x, y, w, h) = f.visible_rect()?;
            let layout = f.viewport.map(|v| {
                let s = f.scroll.unwrap_or_default();
                (
                    f64::from(s.x) + f64::from(v.width),
                    f64::from(s.y) + f64::from(v.height),
                )
            });
            let (lw, lh) = layout.unwrap_or((0.0, 0.0));
            Some(((x + w).max(lw), (y + h).max(lh)))
        })
        .fold((1.0_f64, 1.0_f64), |(mw, mh), (w, h)| (mw.max(w), mh.max(h)))
}

fn describe(record: &IncrementalSnapshotRecord) -> String {
    match record.data {
        RecordData::ViewportResize(v) => format!("resize   {}×{}", v.width, v.height),
        RecordData::Scroll(s) => format!("scroll   ({}, {})", s.x, s.y),
        RecordData::VisualViewport(v) => format!(
            "visual   ×{:.2} {:.0}×{:.0} @ ({:.0}, {:.0})",
            v.scale, v.width, v.height, v.page_left, v.page_top
        ),
    }
}

fn state_lines(index: usize, total: usize, state: &ReplayState) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(format!("record {} / {}", index + 1, total))];
    if let Some(ts) = state.timestamp {
        lines.push(Line::from(format!("t = {ts} ms")));
    }
    lines.push(Line::from(match state.viewport {
        Some(v) => format!("layout   {}×{}", v.width, v.height),
        None => "layout   —".into(),
    }));
    lines.push(Line::from(match state.scroll {
        Some(s) => format!("scroll   ({}, {})", s.x, s.y),
        None => "scroll   —".into(),
    }));
    match state.visual {
        Some(v) => {
            lines.push(Line::from(format!("scale    ×{:.2}", v.scale)));
            lines.push(Line::from(format!("visual   {:.1}×{:.1}", v.width, v.height)));
            lines.push(Line::from(format!(
                "offset   ({:.1}, {:.1})",
                v.offset_left, v.offset_top
            )));
            if let Some((left, top)) = state.visual_page_offset() {
                lines.push(Line::from(format!("page     ({left:.1}, {top:.1})")));
            }
        }
        None => lines.push(Line::from("visual   —")),
    }
    lines
}

/// Outline a document-space rectangle inside `area`.
fn outline(
    buf: &mut Buffer,
    area: Rect,
    extent: (f64, f64),
    rect: (f64, f64, f64, f64),
    ch: char,
    fg: Color,
) {
    let sx = f64::from(area.width.saturating_sub(1)) / extent.0;
    let sy = f64::from(area.height.saturating_sub(1)) / extent.1;
    let (x, y, w, h) = rect;
    let clamp_x = |v: f64| (v * sx).round().clamp(0.0, f64::from(area.width - 1)) as u16;
    let clamp_y = |v: f64| (v * sy).round().clamp(0.0, f64::from(area.height - 1)) as u16;
    let (x0, x1) = (clamp_x(x), clamp_x(x + w));
    let (y0, y1) = (clamp_y(y), clamp_y(y + h));
    for col in x0..=x1 {
        for row in [y0, y1] {
            buf[(area.x + col, area.y + row)].set_char(ch).set_fg(fg);
        }
    }
    for row in y0..=y1 {
        for col in [x0, x1] {
            buf[(area.x + col, area.y + row)].set_char(ch).set_fg(fg);
        }
    }
}

pub fn play(segments: &[Segment]) -> Result<()> {
    let records: Vec<IncrementalSnapshotRecord> = segments
        .iter()
        .flat_map(|s| s.records.iter().copied())
        .collect();
    if records.is_empty() {
        eprintln!("no records to play");
        return Ok(());
    }
    let frames = ReplayState::frames(&records);
    let extent = document_extent(&frames);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut index = 0usize;

    loop {
        let state = frames[index];
        terminal.draw(|frame| {
            let area = frame.area();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(3)])
                .split(area);
            let header = Block::default()
                .title(format!(
                    " replay-lens — {} records | ←→ step | Home/End | q quit ",
                    records.len()
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, rows[0]);

            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(40), Constraint::Min(10)])
                .split(rows[1]);

            let mut lines = state_lines(index, records.len(), &state);
            lines.push(Line::from(""));
            lines.push(Line::from(describe(&records[index])));
            let details =
                Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("State"));
            frame.render_widget(details, cols[0]);

            let map_block = Block::default().borders(Borders::ALL).title("Document");
            let map_area = map_block.inner(cols[1]);
            frame.render_widget(map_block, cols[1]);
            if map_area.width < 2 || map_area.height < 2 {
                return;
            }

            let buf = frame.buffer_mut();
            if let Some(v) = state.viewport {
                let s = state.scroll.unwrap_or_default();
                let layout = (
                    f64::from(s.x),
                    f64::from(s.y),
                    f64::from(v.width),
                    f64::from(v.height),
                );
                outline(buf, map_area, extent, layout, '·', Color::Blue);
            }
            if state.visual.is_some()
                && let Some(visual) = state.visible_rect()
            {
                outline(buf, map_area, extent, visual, '█', Color::Yellow);
            }
        })?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Left => index = index.saturating_sub(1),
                KeyCode::Right => index = (index + 1).min(frames.len() - 1),
                KeyCode::Home => index = 0,
                KeyCode::End => index = frames.len() - 1,
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
