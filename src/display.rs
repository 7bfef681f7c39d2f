use crate::{
    config::Config,
    controller::{drive, DeviceController, Schedule, TickDriver, TrackedDevice},
    device::DeviceState,
    graph::GraphBuffer,
    input::InputEvent,
    logger::TrafficLogger,
    options::{OptionField, OptionsPanel, Step},
    stats::DisplayStats,
    units::{format_rate, format_volume, Unit},
};
use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{self, Stdout, Write},
    ops::ControlFlow,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

/// Longest single wait for input before the deadline is re-checked.
const INPUT_POLL: Duration = Duration::from_millis(100);

pub struct DisplayState {
    pub current_device_index: usize,
    pub show_multiple: bool,
    pub traffic_unit: Unit,
    pub data_unit: Unit,
    pub options: OptionsPanel,
    pub settings_message: Option<String>,
    /// Where F5 writes; `None` is the default config location.
    save_path: Option<PathBuf>,
}

impl DisplayState {
    pub fn new(config: &Config) -> Self {
        Self {
            current_device_index: 0,
            show_multiple: config.multiple_devices,
            traffic_unit: config.get_traffic_unit(),
            data_unit: config.get_data_unit(),
            options: OptionsPanel::default(),
            settings_message: None,
            save_path: None,
        }
    }

    #[must_use]
    pub fn with_save_path(mut self, path: PathBuf) -> Self {
        self.save_path = Some(path);
        self
    }

    /// Applies one key press. `Break` means quit.
    pub fn apply(
        &mut self,
        event: InputEvent,
        controller: &mut DeviceController,
        config: &mut Config,
    ) -> ControlFlow<()> {
        if self.options.visible {
            self.apply_in_options(event, controller, config);
            return ControlFlow::Continue(());
        }

        let count = controller.len().max(1);
        match event {
            InputEvent::Quit => return ControlFlow::Break(()),
            InputEvent::NextDevice => {
                self.current_device_index = (self.current_device_index + 1) % count;
            }
            InputEvent::PrevDevice => {
                self.current_device_index = (self.current_device_index + count - 1) % count;
            }
            InputEvent::ToggleTrafficUnits => self.traffic_unit = self.traffic_unit.next(),
            InputEvent::ToggleDataUnits => self.data_unit = self.data_unit.next(),
            InputEvent::ToggleMultiple => self.show_multiple = !self.show_multiple,
            InputEvent::Reset => {
                if let Some(device) = controller.devices_mut().get_mut(self.current_device_index) {
                    debug!(device = device.name(), "statistics reset");
                    device.reset();
                }
            }
            InputEvent::ToggleOptions => self.options.toggle(),
            InputEvent::SaveSettings => self.save_settings(config),
            InputEvent::Increase | InputEvent::Decrease | InputEvent::Unknown => {}
        }
        ControlFlow::Continue(())
    }

    /// Keys while the options panel is open: arrows pick a row, `+`/`-`
    /// change it, `o`/`q`/Esc close the panel.
    fn apply_in_options(
        &mut self,
        event: InputEvent,
        controller: &mut DeviceController,
        config: &mut Config,
    ) {
        match event {
            InputEvent::ToggleOptions | InputEvent::Quit => {
                self.options.toggle();
                self.settings_message = None;
            }
            InputEvent::NextDevice => self.options.select_next(),
            InputEvent::PrevDevice => self.options.select_previous(),
            InputEvent::Increase => self.adjust_option(Step::Up, controller, config),
            InputEvent::Decrease => self.adjust_option(Step::Down, controller, config),
            InputEvent::ToggleTrafficUnits => self.traffic_unit = self.traffic_unit.next(),
            InputEvent::ToggleDataUnits => self.data_unit = self.data_unit.next(),
            InputEvent::SaveSettings => self.save_settings(config),
            InputEvent::Reset | InputEvent::ToggleMultiple | InputEvent::Unknown => {}
        }
    }

    fn adjust_option(
        &mut self,
        step: Step,
        controller: &mut DeviceController,
        config: &mut Config,
    ) {
        let field = self.options.selected();
        match field {
            OptionField::TrafficUnit => self.traffic_unit = step.cycle(self.traffic_unit),
            OptionField::DataUnit => self.data_unit = step.cycle(self.data_unit),
            OptionField::MultipleDevices => self.show_multiple = !self.show_multiple,
            _ => {
                if !field.adjust(config, step) {
                    return;
                }
                let settings = config.monitor_settings();
                controller.set_deflection(settings.deflection_in, settings.deflection_out);
                controller.set_timing(settings.average_window, settings.tick_interval);
                debug!(option = field.label(), "option changed");
            }
        }
    }

    fn save_settings(&mut self, config: &mut Config) {
        config.set_traffic_unit(self.traffic_unit);
        config.set_data_unit(self.data_unit);
        config.multiple_devices = self.show_multiple;

        let saved = match &self.save_path {
            Some(path) => config.save_to(path).map(|()| path.clone()),
            None => config.save(),
        };
        self.settings_message = Some(match saved {
            Ok(path) => format!("Settings saved to {}", path.display()),
            Err(e) => {
                warn!(error = %e, "saving settings failed");
                format!("Failed to save settings: {e}")
            }
        });
    }

    fn option_value(&self, field: OptionField, config: &Config) -> String {
        let bar_max = |kbits: u64| {
            if kbits == 0 {
                "auto".to_string()
            } else {
                format!("{kbits} kbit/s")
            }
        };
        match field {
            OptionField::AverageWindow => format!("{} s", config.average_window),
            OptionField::MaxIncoming => bar_max(config.max_incoming),
            OptionField::MaxOutgoing => bar_max(config.max_outgoing),
            OptionField::RefreshInterval => format!("{} ms", config.refresh_interval),
            OptionField::TrafficUnit => self.traffic_unit.to_string(),
            OptionField::DataUnit => self.data_unit.to_string(),
            OptionField::MultipleDevices => {
                String::from(if self.show_multiple { "on" } else { "off" })
            }
        }
    }
}

/// Raw mode plus alternate screen, restored on drop.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
    }
}

struct TerminalUi {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: DisplayState,
    config: Config,
    logger: Option<TrafficLogger>,
}

impl TerminalUi {
    fn draw(&mut self, controller: &mut DeviceController) -> Result<()> {
        // Graph columns follow the terminal width: margin and borders take 4
        let size = self.terminal.size()?;
        controller.resize_graphs(usize::from(size.width.saturating_sub(4)));

        let state = &self.state;
        let config = &self.config;
        self.terminal.draw(|f| draw_ui(f, state, config, controller))?;
        Ok(())
    }
}

impl TickDriver for TerminalUi {
    type Error = anyhow::Error;

    fn wait(
        &mut self,
        controller: &mut DeviceController,
        interval: Duration,
    ) -> Result<ControlFlow<()>> {
        let deadline = Instant::now() + interval;
        self.draw(controller)?;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(ControlFlow::Continue(()));
            }

            if event::poll(remaining.min(INPUT_POLL))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let input = InputEvent::from_key_event(key);
                        if self.state.apply(input, controller, &mut self.config).is_break() {
                            return Ok(ControlFlow::Break(()));
                        }
                        self.draw(controller)?;
                    }
                    Event::Resize(..) => self.draw(controller)?,
                    _ => {}
                }
            }
        }
    }

    fn on_tick(&mut self, controller: &mut DeviceController) -> Result<ControlFlow<()>> {
        log_devices(&mut self.logger, controller);
        self.draw(controller)?;
        Ok(ControlFlow::Continue(()))
    }
}

/// Runs the interactive view until the user quits. Returns the number of
/// update cycles.
pub fn run_ui(
    controller: &mut DeviceController,
    schedule: Schedule,
    config: Config,
    logger: Option<TrafficLogger>,
) -> Result<usize> {
    let _guard = TerminalGuard::enter()?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut ui = TerminalUi {
        terminal,
        state: DisplayState::new(&config),
        config,
        logger,
    };
    drive(controller, schedule, &mut ui)
}

/// Prints the statistics of every device as plain text after each update.
pub struct TextReport<W: Write> {
    out: W,
    traffic_unit: Unit,
    data_unit: Unit,
    logger: Option<TrafficLogger>,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W, config: &Config, logger: Option<TrafficLogger>) -> Self {
        Self {
            out,
            traffic_unit: config.get_traffic_unit(),
            data_unit: config.get_data_unit(),
            logger,
        }
    }
}

impl<W: Write> TickDriver for TextReport<W> {
    type Error = anyhow::Error;

    fn wait(
        &mut self,
        _controller: &mut DeviceController,
        interval: Duration,
    ) -> Result<ControlFlow<()>> {
        std::thread::sleep(interval);
        Ok(ControlFlow::Continue(()))
    }

    fn on_tick(&mut self, controller: &mut DeviceController) -> Result<ControlFlow<()>> {
        log_devices(&mut self.logger, controller);
        write_report(&mut self.out, controller, self.traffic_unit, self.data_unit)?;
        self.out.flush()?;
        Ok(ControlFlow::Continue(()))
    }
}

fn log_devices(logger: &mut Option<TrafficLogger>, controller: &DeviceController) {
    let Some(logger) = logger else {
        return;
    };
    for device in controller.devices() {
        if let Err(e) = logger.log_traffic(device.name(), device.stats()) {
            warn!(device = device.name(), error = %e, "traffic log write failed");
        }
    }
}

pub fn write_report(
    out: &mut impl Write,
    controller: &DeviceController,
    traffic_unit: Unit,
    data_unit: Unit,
) -> io::Result<()> {
    for device in controller.devices() {
        writeln!(out, "{}", device_title(device))?;
        let stats = device.stats();
        writeln!(
            out,
            "  Incoming: {}",
            incoming_lines(stats, traffic_unit, data_unit).join("  ")
        )?;
        writeln!(
            out,
            "  Outgoing: {}",
            outgoing_lines(stats, traffic_unit, data_unit).join("  ")
        )?;
    }
    Ok(())
}

fn device_title(device: &TrackedDevice) -> String {
    match device.state() {
        DeviceState::Active => format!("Device {} ({})", device.name(), device.backend()),
        state => format!("Device {} ({}) [{}]", device.name(), device.backend(), state.as_str()),
    }
}

fn stat_lines(
    current: f64,
    average: f64,
    min: f64,
    max: f64,
    total: u64,
    traffic_unit: Unit,
    data_unit: Unit,
) -> [String; 5] {
    [
        format!("Curr: {}", format_rate(current, traffic_unit)),
        format!("Avg: {}", format_rate(average, traffic_unit)),
        format!("Min: {}", format_rate(min, traffic_unit)),
        format!("Max: {}", format_rate(max, traffic_unit)),
        format!("Ttl: {}", format_volume(total, data_unit)),
    ]
}

fn incoming_lines(stats: &DisplayStats, traffic_unit: Unit, data_unit: Unit) -> [String; 5] {
    stat_lines(
        stats.current_in,
        stats.average_in,
        stats.min_in,
        stats.max_in,
        stats.total_in,
        traffic_unit,
        data_unit,
    )
}

fn outgoing_lines(stats: &DisplayStats, traffic_unit: Unit, data_unit: Unit) -> [String; 5] {
    stat_lines(
        stats.current_out,
        stats.average_out,
        stats.min_out,
        stats.max_out,
        stats.total_out,
        traffic_unit,
        data_unit,
    )
}

/// Rows of a bar graph, top row first; a column is filled up to its bar.
pub fn graph_lines(bars: &[u16], height: u16) -> Vec<String> {
    (0..height)
        .map(|row| {
            let level = height - row;
            bars.iter()
                .map(|bar| if *bar >= level { '█' } else { ' ' })
                .collect()
        })
        .collect()
}

fn draw_ui(f: &mut Frame, state: &DisplayState, config: &Config, controller: &DeviceController) {
    let mut area = f.area();

    // The options panel takes the top rows, as many as it has fields
    if state.options.visible {
        let panel_height = OptionField::ALL.len() as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(panel_height), Constraint::Min(0)])
            .split(area);
        draw_options(f, chunks[0], state, config);
        area = chunks[1];
    }

    if state.show_multiple {
        draw_multiple_devices_view(f, area, state, controller);
    } else {
        draw_single_device_view(f, area, state, controller);
    }
}

fn draw_options(f: &mut Frame, area: Rect, state: &DisplayState, config: &Config) {
    let selected = state.options.selected();
    let lines: Vec<Line> = OptionField::ALL
        .iter()
        .map(|field| {
            let style = if *field == selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{:<18}{}", field.label(), state.option_value(*field, config)),
                style,
            ))
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Options (↑/↓ select, +/- change, o close)"),
    );
    f.render_widget(panel, area);
}

fn draw_single_device_view(
    f: &mut Frame,
    area: Rect,
    state: &DisplayState,
    controller: &DeviceController,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(7), // Statistics
            Constraint::Min(6),    // Graphs
            Constraint::Length(3), // Status line
        ])
        .split(area);

    let Some(device) = controller.devices().get(state.current_device_index) else {
        let empty = Paragraph::new("No network devices tracked")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Red));
        f.render_widget(empty, chunks[1]);
        return;
    };

    let header = format!(
        "netgauge - {} [{}/{}]",
        device_title(device),
        state.current_device_index + 1,
        controller.len()
    );
    draw_header(f, chunks[0], &header);
    draw_stats(f, chunks[1], device.stats(), state);

    let graph_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    let graphs = device.graphs();
    let unit = state.traffic_unit;
    draw_graph(f, graph_chunks[0], "Incoming", &graphs.incoming, Color::Green, unit);
    draw_graph(f, graph_chunks[1], "Outgoing", &graphs.outgoing, Color::Blue, unit);

    draw_status_line(f, chunks[3], state);
}

fn draw_multiple_devices_view(
    f: &mut Frame,
    area: Rect,
    state: &DisplayState,
    controller: &DeviceController,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(4),    // Device list
            Constraint::Length(3), // Status line
        ])
        .split(area);

    draw_header(f, chunks[0], "netgauge - Multiple Devices View");

    let mut lines = Vec::new();
    for (index, device) in controller.devices().iter().enumerate() {
        let style = if index == state.current_device_index {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(device_title(device), style)));

        let stats = device.stats();
        lines.push(Line::from(format!(
            "  In:  {}",
            incoming_lines(stats, state.traffic_unit, state.data_unit).join("  ")
        )));
        lines.push(Line::from(format!(
            "  Out: {}",
            outgoing_lines(stats, state.traffic_unit, state.data_unit).join("  ")
        )));
        lines.push(Line::from(""));
    }

    // Keep the selected device on screen
    let visible_rows = usize::from(chunks[1].height.saturating_sub(2));
    let selected_bottom = (state.current_device_index + 1) * 4;
    let scroll = selected_bottom.saturating_sub(visible_rows);

    let list = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Devices"))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(list, chunks[1]);

    draw_status_line(f, chunks[2], state);
}

fn draw_header(f: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(title.to_string())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn draw_stats(f: &mut Frame, area: Rect, stats: &DisplayStats, state: &DisplayState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let sides = [
        ("Incoming", incoming_lines(stats, state.traffic_unit, state.data_unit), Color::Green),
        ("Outgoing", outgoing_lines(stats, state.traffic_unit, state.data_unit), Color::Blue),
    ];
    for ((title, text, color), column) in sides.into_iter().zip(columns.iter()) {
        let lines: Vec<Line> = text.into_iter().map(Line::from).collect();
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(color));
        f.render_widget(widget, *column);
    }
}

fn draw_graph(
    f: &mut Frame,
    area: Rect,
    title: &str,
    graph: &GraphBuffer,
    color: Color,
    unit: Unit,
) {
    let height = area.height.saturating_sub(2);
    let width = usize::from(area.width.saturating_sub(2));

    let bars = graph.render(height);
    let visible = &bars[bars.len().saturating_sub(width)..];

    let scale = format_rate(graph.scale(), unit);
    let title = if graph.deflection().is_auto() {
        format!("{title} (auto, 100% = {scale})")
    } else {
        format!("{title} (100% = {scale})")
    };

    let lines: Vec<Line> = graph_lines(visible, height)
        .into_iter()
        .map(Line::from)
        .collect();
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(color));

    f.render_widget(widget, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, state: &DisplayState) {
    let mut spans = vec![
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  "),
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" device  "),
        Span::styled("u/U", Style::default().fg(Color::Yellow)),
        Span::raw(format!(" units [{}/{}]  ", state.traffic_unit, state.data_unit)),
        Span::styled("m", Style::default().fg(Color::Yellow)),
        Span::raw(" view  "),
        Span::styled("o", Style::default().fg(Color::Yellow)),
        Span::raw(" options  "),
        Span::styled("F5", Style::default().fg(Color::Yellow)),
        Span::raw(" save"),
    ];
    if let Some(message) = &state.settings_message {
        spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Green),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}
