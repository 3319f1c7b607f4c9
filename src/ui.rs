use std::error::Error;
use std::io;
use std::ops::Range;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{
	self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEventKind, MouseButton,
	MouseEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs};
use ratatui::{Frame, Terminal};
use tracing::{debug, info};

use crate::aggregate::{ChartDatum, breakdown, daily_total, valid_keys};
use crate::calendar::{CalendarView, WeekStart, offset_days, period_label, shift_period, visible_range};
use crate::config::Config;
use crate::domain::{ActivityDataset, format_value};
use crate::error::{NO_DATA_NOTICE, NoDataForDate};
use crate::events::{CalendarEvent, build_events, events_in_range};
use crate::selection::{CellDecoration, SelectionController};
use crate::storage::LoadedDataset;

const APP_TITLE: &str = "Attendance / Activity Calendar";
const DATA_BACKGROUND_COLOR: Color = Color::Rgb(255, 247, 230);
const SELECTED_OUTLINE_COLOR: Color = Color::Rgb(250, 140, 22);
const OUTSIDE_PERIOD_COLOR: Color = Color::DarkGray;
const BAR_COLOR: Color = Color::Rgb(136, 132, 216);
const HIGHLIGHTED_BAR_COLOR: Color = Color::Rgb(250, 140, 22);
const BAR_SCALE: f64 = 100.0;
const MIN_BAR_WIDTH: u16 = 3;
const BAR_GAP: u16 = 1;

pub fn run_dashboard(loaded: &LoadedDataset, config: &Config) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	stdout.execute(EnableMouseCapture)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, loaded, config);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	loaded: &LoadedDataset,
	config: &Config,
) -> Result<(), Box<dyn Error>> {
	let dashboard = Dashboard::new(&loaded.dataset);
	let mut app = App::new(&loaded.dataset, config, Local::now().date_naive());
	if !loaded.issues.is_empty() {
		app.status = format!(
			"Skipped {} malformed entries (run `check` for details)",
			loaded.issues.len()
		);
	}
	info!(
		days = loaded.dataset.len(),
		events = dashboard.events.len(),
		"dashboard started"
	);

	let mut hits = HitMap::default();
	loop {
		terminal.draw(|frame| hits = draw_dashboard(frame, &app, &dashboard))?;

		if event::poll(Duration::from_millis(250))? {
			let should_quit = match event::read()? {
				CEvent::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key.code, &dashboard),
				CEvent::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
					handle_click(&mut app, &dashboard, &hits, Position::new(mouse.column, mouse.row));
					false
				}
				_ => false,
			};

			if should_quit {
				break;
			}
		}
	}

	Ok(())
}

/// Read-only data the calendar is drawn from.
struct Dashboard<'a> {
	dataset: &'a ActivityDataset,
	events: Vec<CalendarEvent>,
}

impl<'a> Dashboard<'a> {
	fn new(dataset: &'a ActivityDataset) -> Self {
		Self {
			dataset,
			events: build_events(dataset),
		}
	}

	fn chart_data(&self, app: &App) -> Option<(String, Vec<ChartDatum>)> {
		let key = app.selection.state().selected_key()?;
		let records = self.dataset.records(key.as_str())?;
		Some((key.to_string(), breakdown(records)))
	}
}

struct App {
	view: CalendarView,
	week_start: WeekStart,
	cursor: NaiveDate,
	today: NaiveDate,
	selection: SelectionController,
	highlighted_bar: usize,
	status: String,
}

impl App {
	fn new(dataset: &ActivityDataset, config: &Config, today: NaiveDate) -> Self {
		Self {
			view: config.default_view,
			week_start: config.week_start,
			cursor: today,
			today,
			selection: SelectionController::new(valid_keys(dataset)),
			highlighted_bar: 0,
			status: "Ready".to_string(),
		}
	}

	fn move_cursor(&mut self, days: i64) {
		self.cursor = offset_days(self.cursor, days);
	}

	fn shift_period(&mut self, delta: i32) {
		self.cursor = shift_period(self.view, self.cursor, delta);
	}

	fn change_view(&mut self, view: CalendarView) {
		self.view = view;
		self.selection.on_view_changed(view);
		self.status = format!("{} view", view.label());
	}

	fn select_day(&mut self, date: NaiveDate) {
		self.cursor = date;
		match self.selection.on_day_selected(date) {
			Ok(key) => {
				self.highlighted_bar = 0;
				self.status = format!("Showing {key}");
			}
			Err(NoDataForDate(key)) => {
				debug!(key = %key, "no data for selected day");
				self.status = NO_DATA_NOTICE.to_string();
			}
		}
	}

	fn close_detail(&mut self) {
		self.selection.on_detail_closed();
		self.highlighted_bar = 0;
		self.status = "Ready".to_string();
	}

	fn vertical_step(&self) -> i64 {
		match self.view {
			CalendarView::Month | CalendarView::Week => 7,
			CalendarView::Day => 1,
		}
	}
}

/// Screen regions from the last frame, for mouse hit testing.
#[derive(Default)]
struct HitMap {
	cells: Vec<(Rect, NaiveDate)>,
	tabs: Vec<(Rect, CalendarView)>,
	popup: Option<Rect>,
}

impl HitMap {
	fn date_at(&self, position: Position) -> Option<NaiveDate> {
		self.cells
			.iter()
			.find(|(area, _)| area.contains(position))
			.map(|(_, date)| *date)
	}

	fn view_at(&self, position: Position) -> Option<CalendarView> {
		self.tabs
			.iter()
			.find(|(area, _)| area.contains(position))
			.map(|(_, view)| *view)
	}
}

fn handle_key(app: &mut App, code: KeyCode, dashboard: &Dashboard) -> bool {
	if app.selection.state().detail_open() {
		handle_detail_key(app, code, dashboard);
		return false;
	}

	match code {
		KeyCode::Char('q') | KeyCode::Esc => true,
		KeyCode::Left | KeyCode::Char('h') => {
			app.move_cursor(-1);
			false
		}
		KeyCode::Right | KeyCode::Char('l') => {
			app.move_cursor(1);
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			app.move_cursor(-app.vertical_step());
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			app.move_cursor(app.vertical_step());
			false
		}
		KeyCode::Char('n') => {
			app.shift_period(1);
			false
		}
		KeyCode::Char('N') => {
			app.shift_period(-1);
			false
		}
		KeyCode::Char('t') => {
			app.cursor = app.today;
			false
		}
		KeyCode::Char('m') => {
			app.change_view(CalendarView::Month);
			false
		}
		KeyCode::Char('w') => {
			app.change_view(CalendarView::Week);
			false
		}
		KeyCode::Char('d') => {
			app.change_view(CalendarView::Day);
			false
		}
		KeyCode::Enter | KeyCode::Char(' ') => {
			app.select_day(app.cursor);
			false
		}
		_ => false,
	}
}

fn handle_detail_key(app: &mut App, code: KeyCode, dashboard: &Dashboard) {
	let bar_count = dashboard
		.chart_data(app)
		.map(|(_, data)| data.len())
		.unwrap_or(0);

	match code {
		KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_detail(),
		KeyCode::Left | KeyCode::Char('h') => {
			app.highlighted_bar = app.highlighted_bar.saturating_sub(1);
		}
		KeyCode::Right | KeyCode::Char('l') => {
			app.highlighted_bar = (app.highlighted_bar + 1).min(bar_count.saturating_sub(1));
		}
		_ => {}
	}
}

fn handle_click(app: &mut App, dashboard: &Dashboard, hits: &HitMap, position: Position) {
	if app.selection.state().detail_open() {
		if !hits.popup.is_some_and(|popup| popup.contains(position)) {
			app.close_detail();
		}
		return;
	}

	if let Some(view) = hits.view_at(position) {
		app.change_view(view);
	} else if let Some(date) = hits.date_at(position) {
		debug!(date = %date, events = dashboard.events.len(), "day clicked");
		app.select_day(date);
	}
}

fn draw_dashboard(frame: &mut Frame, app: &App, dashboard: &Dashboard) -> HitMap {
	let mut hits = HitMap::default();
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(4)])
		.split(frame.area());

	render_header(frame, layout[0], app, &mut hits);
	match app.view {
		CalendarView::Month => render_month(frame, layout[1], app, dashboard, &mut hits),
		CalendarView::Week => render_week(frame, layout[1], app, dashboard, &mut hits),
		CalendarView::Day => render_day(frame, layout[1], app, dashboard, &mut hits),
	}
	render_footer(frame, layout[2], app);

	if let Some((key, data)) = dashboard.chart_data(app) {
		hits.popup = Some(render_detail_popup(frame, &key, &data, app.highlighted_bar));
	}

	hits
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, hits: &mut HitMap) {
	let columns = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Min(20), Constraint::Length(24)])
		.split(area);

	let title = Paragraph::new(Line::from(vec![
		Span::styled(APP_TITLE, Style::default().add_modifier(Modifier::BOLD)),
		Span::raw(format!(" | {}", period_label(app.view, app.cursor, app.week_start))),
	]))
	.block(Block::default().borders(Borders::ALL));
	frame.render_widget(title, columns[0]);

	let tabs = Tabs::new(CalendarView::ALL.iter().map(|view| view.label()))
		.select(app.view.index())
		.highlight_style(
			Style::default()
				.fg(SELECTED_OUTLINE_COLOR)
				.add_modifier(Modifier::BOLD),
		)
		.block(Block::default().borders(Borders::ALL).title("View"));
	frame.render_widget(tabs, columns[1]);

	// Tabs render as " Month | Week | Day " inside the border.
	let mut x = columns[1].x + 2;
	for view in CalendarView::ALL {
		let width = view.label().len() as u16;
		hits.tabs.push((Rect::new(x, columns[1].y + 1, width, 1), view));
		x += width + 3;
	}
}

fn render_month(frame: &mut Frame, area: Rect, app: &App, dashboard: &Dashboard, hits: &mut HitMap) {
	let block = Block::default().borders(Borders::ALL).title("Calendar");
	let inner = block.inner(area);
	frame.render_widget(block, area);

	let range = visible_range(CalendarView::Month, app.cursor, app.week_start);
	let events = events_in_range(&dashboard.events, range.first, range.last);

	let mut row_constraints = vec![Constraint::Length(1)];
	row_constraints.extend([Constraint::Ratio(1, 6); 6]);
	let rows = Layout::default()
		.direction(Direction::Vertical)
		.constraints(row_constraints)
		.split(inner);

	let header_cells = week_columns(rows[0]);
	for (label, cell) in app.week_start.header().iter().zip(header_cells.iter()) {
		let header = Paragraph::new(*label)
			.alignment(Alignment::Center)
			.style(Style::default().add_modifier(Modifier::BOLD));
		frame.render_widget(header, *cell);
	}

	let days = range.days().collect::<Vec<_>>();
	for (week, row) in rows[1..].iter().enumerate() {
		for (weekday, cell) in week_columns(*row).iter().enumerate() {
			let Some(date) = days.get(week * 7 + weekday).copied() else {
				continue;
			};
			let in_period = date.month() == app.cursor.month() && date.year() == app.cursor.year();
			let style = cell_style(app.selection.decorate(date), date == app.cursor, in_period);

			let mut lines = vec![Line::from(format!("{:>2}", date.day()))];
			if let Some(event) = event_on(&events, date) {
				lines.push(Line::from(event.title.clone()));
			}
			frame.render_widget(Paragraph::new(lines).style(style), *cell);
			hits.cells.push((*cell, date));
		}
	}
}

fn render_week(frame: &mut Frame, area: Rect, app: &App, dashboard: &Dashboard, hits: &mut HitMap) {
	let range = visible_range(CalendarView::Week, app.cursor, app.week_start);
	let events = events_in_range(&dashboard.events, range.first, range.last);

	for (date, column) in range.days().zip(week_columns(area).iter()) {
		let style = cell_style(app.selection.decorate(date), date == app.cursor, true);
		let title = date.format("%a %d").to_string();
		let body = event_on(&events, date)
			.map(|event| event.title.clone())
			.unwrap_or_default();
		let panel = Paragraph::new(body)
			.style(style)
			.block(Block::default().borders(Borders::ALL).title(title));
		frame.render_widget(panel, *column);
		hits.cells.push((*column, date));
	}
}

fn render_day(frame: &mut Frame, area: Rect, app: &App, dashboard: &Dashboard, hits: &mut HitMap) {
	let date = app.cursor;
	let style = cell_style(app.selection.decorate(date), true, true);

	let mut lines = Vec::new();
	match dashboard.dataset.records_for_date(date) {
		Some(records) => {
			lines.push(Line::from(format!("Total: {}", format_value(daily_total(records)))));
			lines.push(Line::from(""));
			for record in records {
				lines.push(Line::from(format!("{} | {}", record.label, format_value(record.value))));
			}
		}
		None => lines.push(Line::from("(no data)")),
	}

	let panel = Paragraph::new(lines)
		.style(style)
		.block(Block::default().borders(Borders::ALL).title(date.format("%A, %d %B %Y").to_string()));
	frame.render_widget(panel, area);
	hits.cells.push((area, date));
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = if app.selection.state().detail_open() {
		vec![
			Line::from("left/right inspect bar | Enter/Esc/q close | click outside to close"),
			Line::from(app.status.clone()),
		]
	} else {
		vec![
			Line::from(
				"arrows/hjkl move | Enter/space/click select day | n/N next/prev | t today | m/w/d view | q quit",
			),
			Line::from(app.status.clone()),
		]
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn render_detail_popup(frame: &mut Frame, key: &str, data: &[ChartDatum], highlighted: usize) -> Rect {
	let area = centered_rect(70, 70, frame.area());
	frame.render_widget(Clear, area);

	let block = Block::default()
		.borders(Borders::ALL)
		.title(format!("Data for {key}"))
		.border_style(Style::default().fg(SELECTED_OUTLINE_COLOR));
	let inner = block.inner(area);
	frame.render_widget(block, area);

	let sections = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Min(5),
			Constraint::Length(1),
			Constraint::Length(1),
			Constraint::Length(1),
		])
		.split(inner);

	let shown = if data.is_empty() {
		frame.render_widget(Paragraph::new("(no records)"), sections[0]);
		0..0
	} else {
		render_bar_chart(frame, sections[0], data, highlighted)
	};

	let total = data.iter().map(|datum| datum.value).sum::<f64>();
	let mut legend = vec![
		Span::styled("■", Style::default().fg(BAR_COLOR)),
		Span::raw(format!(" value | Total: {}", format_value(total))),
	];
	if shown.len() < data.len() {
		legend.push(Span::styled(
			format!(" | bars {}-{} of {}", shown.start + 1, shown.end, data.len()),
			Style::default().fg(Color::DarkGray),
		));
	}
	frame.render_widget(Paragraph::new(Line::from(legend)), sections[1]);

	let tooltip = data
		.get(highlighted)
		.map(|datum| format!("{}: {}", datum.name, format_value(datum.value)))
		.unwrap_or_default();
	frame.render_widget(
		Paragraph::new(tooltip).style(Style::default().add_modifier(Modifier::BOLD)),
		sections[2],
	);
	frame.render_widget(
		Paragraph::new("Enter/Esc close").style(Style::default().fg(Color::DarkGray)),
		sections[3],
	);

	area
}

/// Draws the bars that fit, scrolled to the highlighted one, and returns their index range.
fn render_bar_chart(frame: &mut Frame, area: Rect, data: &[ChartDatum], highlighted: usize) -> Range<usize> {
	let max = data.iter().map(|datum| datum.value).fold(0.0, f64::max);
	let axis_width = axis_width(max);
	let columns = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Length(axis_width), Constraint::Min(1)])
		.split(area);

	frame.render_widget(
		Paragraph::new(axis_lines(max, columns[0].height))
			.alignment(Alignment::Right)
			.style(Style::default().fg(Color::DarkGray)),
		columns[0],
	);

	let shown = visible_bars(columns[1].width, data.len(), highlighted);
	let bars = data[shown.clone()]
		.iter()
		.enumerate()
		.map(|(offset, datum)| {
			let color = if shown.start + offset == highlighted {
				HIGHLIGHTED_BAR_COLOR
			} else {
				BAR_COLOR
			};
			Bar::default()
				.value(scaled_value(datum.value))
				.text_value(format_value(datum.value))
				.label(Line::from(datum.name.clone()))
				.style(Style::default().fg(color))
		})
		.collect::<Vec<_>>();

	let chart = BarChart::default()
		.data(BarGroup::default().bars(&bars))
		.bar_width(bar_width(columns[1].width, bars.len()))
		.bar_gap(BAR_GAP)
		.max(scaled_value(max).max(1))
		.value_style(Style::default().fg(Color::Black).bg(BAR_COLOR))
		.label_style(Style::default().add_modifier(Modifier::BOLD));
	frame.render_widget(chart, columns[1]);

	shown
}

fn cell_style(decoration: CellDecoration, is_cursor: bool, in_period: bool) -> Style {
	let mut style = Style::default();
	if !in_period {
		style = style.fg(OUTSIDE_PERIOD_COLOR);
	}
	if decoration.has_data {
		style = style.fg(Color::Black).bg(DATA_BACKGROUND_COLOR);
	}
	if decoration.is_selected {
		style = style
			.fg(Color::Black)
			.bg(SELECTED_OUTLINE_COLOR)
			.add_modifier(Modifier::BOLD);
	}
	if is_cursor {
		style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
	}
	style
}

fn event_on<'a>(events: &[&'a CalendarEvent], date: NaiveDate) -> Option<&'a CalendarEvent> {
	events.iter().copied().find(|event| event.start <= date && date <= event.end)
}

fn week_columns(area: Rect) -> Vec<Rect> {
	Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Ratio(1, 7); 7])
		.split(area)
		.to_vec()
}

fn scaled_value(value: f64) -> u64 {
	(value * BAR_SCALE).round().max(0.0) as u64
}

fn bar_width(width: u16, bars: usize) -> u16 {
	if bars == 0 {
		return 1;
	}
	let bars = u16::try_from(bars).unwrap_or(u16::MAX);
	let gaps = bars.saturating_sub(1).saturating_mul(BAR_GAP);
	(width.saturating_sub(gaps) / bars).clamp(MIN_BAR_WIDTH, 12)
}

fn visible_bars(width: u16, total: usize, highlighted: usize) -> Range<usize> {
	let capacity = usize::from(width.saturating_add(BAR_GAP) / (MIN_BAR_WIDTH + BAR_GAP)).max(1);
	let start = (highlighted + 1)
		.saturating_sub(capacity)
		.min(total.saturating_sub(capacity));
	start..(start + capacity).min(total)
}

fn axis_width(max: f64) -> u16 {
	format_value(max).len() as u16 + 1
}

/// Value axis next to the chart: max at the top, zero just above the label row.
fn axis_lines(max: f64, height: u16) -> Vec<Line<'static>> {
	let height = usize::from(height);
	if height < 2 {
		return Vec::new();
	}
	let zero_row = height - 2;
	let mut lines = vec![Line::from(""); height];
	lines[0] = Line::from(format!("{} ", format_value(max)));
	if zero_row > 0 {
		lines[zero_row] = Line::from("0 ");
	}
	if zero_row >= 4 {
		lines[zero_row / 2] = Line::from(format!("{} ", format_value(max / 2.0)));
	}
	lines
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
	let popup_layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Percentage((100 - percent_y) / 2),
			Constraint::Percentage(percent_y),
			Constraint::Percentage((100 - percent_y) / 2),
		])
		.split(area);
	Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage((100 - percent_x) / 2),
			Constraint::Percentage(percent_x),
			Constraint::Percentage((100 - percent_x) / 2),
		])
		.split(popup_layout[1])[1]
}
